use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, bail};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use ao_app::{AppConfig, HttpBackend, Studio, StudioEvent};
use ao_core::{AspectRatio, GenerationSettings, ImageModel, PromptAnalyzer};

const USAGE: &str = "usage: ao-app <prompt> [--count N] [--model ID] [--aspect RATIO] [--style NAME] \
[--caption TEXT] [--tags TEXT] [--upload PATH]... [--publish]";

#[derive(Debug, Default)]
struct Args {
    prompt: Option<String>,
    count: Option<u32>,
    model: Option<ImageModel>,
    aspect: Option<AspectRatio>,
    style: Option<String>,
    caption: Option<String>,
    tags: Option<String>,
    uploads: Vec<PathBuf>,
    publish: bool,
}

impl Args {
    fn parse(mut raw: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut args = Self::default();

        while let Some(arg) = raw.next() {
            let mut value = |flag: &str| raw.next().with_context(|| format!("{flag} needs a value"));
            match arg.as_str() {
                "--count" => args.count = Some(value("--count")?.parse().context("--count must be a number")?),
                "--model" => args.model = Some(value("--model")?.parse()?),
                "--aspect" => args.aspect = Some(value("--aspect")?.parse()?),
                "--style" => args.style = Some(value("--style")?),
                "--caption" => args.caption = Some(value("--caption")?),
                "--tags" => args.tags = Some(value("--tags")?),
                "--upload" => args.uploads.push(PathBuf::from(value("--upload")?)),
                "--publish" => args.publish = true,
                "-h" | "--help" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
                _ if args.prompt.is_none() => args.prompt = Some(arg),
                _ => bail!("unexpected argument {arg:?}\n{USAGE}"),
            }
        }

        Ok(args)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let args = Args::parse(std::env::args().skip(1))?;
    let credential = config.credential();
    if credential.is_none() {
        warn!("AO_API_TOKEN is not set; backend calls will be refused");
    }

    let backend = Arc::new(HttpBackend::from_config(&config)?);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut studio = Studio::new(backend, &config, Some(events_tx));

    let events = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match event {
                StudioEvent::JobProgress { progress, message, .. } => info!(progress, %message, "progress"),
                StudioEvent::MediaAdded { items, .. } => {
                    for item in items {
                        info!(kind = ?item.kind, url = %item.url, "media added");
                    }
                }
                StudioEvent::GenerationNotice { message, .. } => warn!(%message),
                StudioEvent::JobFailed { error, .. } => error!(%error, "generation failed"),
                other => info!(?other),
            }
        }
    });

    if !args.uploads.is_empty() {
        let added = studio.upload_paths(&args.uploads).await?;
        info!(added, "uploaded files");
    }

    if let Some(prompt) = &args.prompt {
        let model = match args.model {
            Some(model) => model,
            None => match PromptAnalyzer::default().analyze(prompt) {
                Some(suggestion) => {
                    info!(content_type = ?suggestion.content_type, confidence = suggestion.confidence, "prompt analysis");
                    suggestion.suggested_model.unwrap_or(ImageModel::FluxSchnell)
                }
                None => ImageModel::FluxSchnell,
            },
        };

        let mut settings = GenerationSettings::new(prompt.clone(), model);
        if let Some(count) = args.count {
            settings = settings.with_count(count);
        }
        if let Some(aspect) = args.aspect {
            settings = settings.with_aspect_ratio(aspect);
        }
        if let Some(style) = &args.style {
            settings = settings.with_style(style.clone());
        }

        studio.generate(credential.as_ref(), settings).await?;
        studio.wait_for_job().await;
    }

    {
        let flow = studio.flow();
        let mut flow = flow.lock().await;
        if let Some(caption) = &args.caption {
            flow.set_caption(caption.clone());
        }
        if let Some(tags) = &args.tags {
            flow.set_tags(tags);
        }
        info!(media = flow.media().len(), status = flow.status(), "draft ready");
    }

    if args.publish {
        let message = studio.publish(credential.as_ref()).await?;
        info!(message = message.as_deref().unwrap_or("Post created"), "published");
    }

    drop(studio);
    events.await?;
    Ok(())
}
