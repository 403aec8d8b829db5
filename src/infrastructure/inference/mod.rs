//! External inference adapters

mod factory;
pub mod http_client;
mod openai;

pub use factory::{InferenceClientFactory, InferenceConfig};
pub use http_client::{error_for_status, HttpClient, HttpClientTrait};
pub use openai::OpenAiCompletionClient;
