//! Model provider clients for the word-sampling lab.
//!
//! Each vendor is a [`ModelProvider`] implementation. The [`ProviderGateway`]
//! owns one provider and one [`RateLimiter`] per [`ProviderId`] and turns a raw
//! completion into a normalised single word with cost and latency attached.
//!
//! [`ProviderId`]: wordlab_core::ProviderId

pub mod community;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod provider;
pub mod providers;
pub mod rate_limit;

pub use community::HttpCommunityReporter;
pub use error::{ProviderError, ProviderResult};
pub use gateway::{GatewayConfig, ProviderGateway};
pub use normalize::normalize_word;
pub use provider::{ModelProvider, RawCompletion, SampleParams, SampledWord};
pub use providers::{AnthropicProvider, GoogleProvider, OpenAIProvider};
pub use rate_limit::RateLimiter;
