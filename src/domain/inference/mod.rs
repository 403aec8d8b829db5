//! External inference boundary

mod client;
mod completion;
mod error;

pub use client::InferenceClient;
pub use completion::{Completion, Usage};
pub use error::InferenceError;

#[cfg(test)]
pub use client::mock::ScriptedInferenceClient;
#[cfg(test)]
pub use client::MockInferenceClient;
