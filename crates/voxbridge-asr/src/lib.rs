//! Recognition-side pipeline: bilingual merging, sentence accumulation,
//! the per-connection session state machine, and chat dispatch.

pub mod accumulator;
pub mod chat;
pub mod merger;
pub mod session;

pub use accumulator::{SentenceAccumulator, SentenceTerminators};
pub use chat::ChatDispatcher;
pub use merger::merge;
pub use session::RecognitionSession;
