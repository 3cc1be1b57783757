//! Remote adapters: inference providers, identity service and record store over HTTP.

mod http;

pub mod facial_client;
pub mod gemini_client;
pub mod huggingface_client;
pub mod providers;
pub mod rest_identity;
pub mod rest_record_store;

pub use facial_client::RestFacialClient;
pub use gemini_client::GeminiTextClient;
pub use huggingface_client::HuggingFaceTextClient;
pub use rest_identity::RestIdentityProvider;
pub use rest_record_store::RestUserRecordStore;
