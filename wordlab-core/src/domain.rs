pub mod ids;
pub mod provider;
pub mod pricing;
pub mod sweep;
pub mod experiment;
pub mod sample;
pub mod progress;
pub mod results;

pub use ids::*;
pub use provider::*;
pub use pricing::*;
pub use sweep::*;
pub use experiment::*;
pub use sample::*;
pub use progress::*;
pub use results::*;
