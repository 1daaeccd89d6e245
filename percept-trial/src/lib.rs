pub mod config;
pub mod legacy;
pub mod normalize;
pub mod params;
pub mod session;

pub use config::SessionConfig;
pub use normalize::{Normalized, normalize, normalize_with_rng};
pub use params::{RawItem, TrialParams};
pub use session::{SessionEvent, TrialSession};
