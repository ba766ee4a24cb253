//! Answer generation over retrieved chunks.

pub mod answer;
pub mod types;

pub use answer::{format_context, Answerer, NO_CONTEXT, SYSTEM_PROMPT};
pub use types::{RagAnswer, SourceRef};
