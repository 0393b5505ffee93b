pub mod aggregators;
pub mod frequency;
pub mod latency;
pub mod statistical;

pub use aggregators::*;
pub use frequency::*;
pub use latency::*;
pub use statistical::*;
