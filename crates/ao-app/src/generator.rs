mod dispatcher;
mod poller;

pub use dispatcher::GenerationDispatcher;
pub use poller::{GenerationPoller, POLL_INTERVAL};
