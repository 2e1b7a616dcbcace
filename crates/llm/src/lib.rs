pub mod explain;
pub mod provider;
pub mod providers;

pub use explain::{Explainer, Explanation};
pub use provider::{Completion, LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
