pub mod agent;
pub mod backend;
pub mod composer;
pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod ingest;
pub mod state;
pub mod studio;

pub use agent::PromptAgent;
pub use backend::{Backend, Credential, HttpBackend};
pub use composer::PostComposer;
pub use config::AppConfig;
pub use error::AppError;
pub use events::{EventSender, StudioEvent};
pub use generator::{GenerationDispatcher, GenerationPoller};
pub use ingest::{SelectedFile, UploadIngestor};
pub use state::{CreationFlow, SharedFlow};
pub use studio::Studio;
