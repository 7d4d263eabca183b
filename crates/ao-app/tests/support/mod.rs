use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::mpsc;
use ao_app::backend::schemas::{
    CreatePostRequest, CreatePostResponse, GenerateImageRequest, GenerateImageResponse,
    GenerationHandle, GenerationStatusResponse,
};
use ao_app::{AppConfig, AppError, Backend, Credential, Studio, StudioEvent};

pub const INTERVAL: Duration = Duration::from_secs(3);

/// Failure a scripted call answers with.
#[derive(Debug, Clone)]
pub enum Fault {
    Auth,
    Transport(String),
    Backend(String),
}

impl Fault {
    fn into_error(self) -> AppError {
        match self {
            Self::Auth => AppError::AuthRequired,
            Self::Transport(msg) => AppError::Transport(msg),
            Self::Backend(msg) => AppError::BackendError(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Status(&'static str, Option<&'static str>),
    Rejected(&'static str),
    Fault(Fault),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Generate,
    Status(String),
    Post,
}

#[derive(Default)]
struct Script {
    generate: Option<Result<GenerateImageResponse, Fault>>,
    // The last reply of each queue repeats forever
    statuses: HashMap<String, VecDeque<Reply>>,
    status_delay: Option<Duration>,
    post: Option<Result<CreatePostResponse, Fault>>,
    calls: Vec<Call>,
    generate_requests: Vec<GenerateImageRequest>,
    posts: Vec<CreatePostRequest>,
}

#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Accept a generate call with `req-0..req-{n-1}` / `gen-0..gen-{n-1}`.
    pub fn starts(&self, n: usize) -> &Self {
        let generations = (0..n)
            .map(|i| GenerationHandle {
                request_id: format!("req-{i}"),
                ai_generation_id: format!("gen-{i}"),
            })
            .collect();
        self.script.lock().unwrap().generate = Some(Ok(GenerateImageResponse {
            success: true,
            count: n,
            generations,
            message: None,
        }));
        self
    }

    pub fn generate_replies(&self, reply: Result<GenerateImageResponse, Fault>) -> &Self {
        self.script.lock().unwrap().generate = Some(reply);
        self
    }

    pub fn statuses(&self, request_id: &str, replies: Vec<Reply>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .statuses
            .insert(request_id.to_string(), replies.into());
        self
    }

    pub fn status_delay(&self, delay: Duration) -> &Self {
        self.script.lock().unwrap().status_delay = Some(delay);
        self
    }

    pub fn post_replies(&self, reply: Result<CreatePostResponse, Fault>) -> &Self {
        self.script.lock().unwrap().post = Some(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Status(_)))
            .count()
    }

    pub fn generate_requests(&self) -> Vec<GenerateImageRequest> {
        self.script.lock().unwrap().generate_requests.clone()
    }

    pub fn posts(&self) -> Vec<CreatePostRequest> {
        self.script.lock().unwrap().posts.clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn generate_image(
        &self,
        _credential: &Credential,
        request: &GenerateImageRequest,
    ) -> Result<GenerateImageResponse, AppError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Generate);
        script.generate_requests.push(request.clone());
        script
            .generate
            .clone()
            .unwrap_or_else(|| Err(Fault::Transport("generate not scripted".into())))
            .map_err(Fault::into_error)
    }

    async fn generation_status(
        &self,
        _credential: &Credential,
        request_id: &str,
    ) -> Result<GenerationStatusResponse, AppError> {
        let (reply, delay) = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(Call::Status(request_id.to_string()));
            let queue = script.statuses.entry(request_id.to_string()).or_default();
            let reply = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            (reply, script.status_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match reply.unwrap_or(Reply::Status("processing", None)) {
            Reply::Status(status, url) => Ok(GenerationStatusResponse {
                success: true,
                status: status.to_string(),
                image_url: url.map(str::to_string),
                message: None,
            }),
            Reply::Rejected(message) => Ok(GenerationStatusResponse {
                success: false,
                status: String::new(),
                image_url: None,
                message: Some(message.to_string()),
            }),
            Reply::Fault(fault) => Err(fault.into_error()),
        }
    }

    async fn create_post(
        &self,
        _credential: &Credential,
        request: &CreatePostRequest,
    ) -> Result<CreatePostResponse, AppError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Post);
        script.posts.push(request.clone());
        script
            .post
            .clone()
            .unwrap_or(Ok(CreatePostResponse {
                success: true,
                message: Some("Post created".into()),
            }))
            .map_err(Fault::into_error)
    }
}

pub fn credential() -> Credential {
    Credential::new("test-token").unwrap()
}

pub fn studio(backend: &Arc<ScriptedBackend>) -> (Studio, mpsc::UnboundedReceiver<StudioEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let backend: Arc<dyn Backend> = backend.clone();
    let studio = Studio::with_poll_interval(backend, &AppConfig::default(), INTERVAL, Some(tx));
    (studio, rx)
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<StudioEvent>) -> Vec<StudioEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
