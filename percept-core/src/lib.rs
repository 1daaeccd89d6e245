pub mod color;
pub mod context;
pub mod error;
pub mod item;
pub mod trial;
pub mod units;

pub use color::Fill;
pub use context::{Combine, TrialContext};
pub use error::{PerceptError, PerceptResult};
pub use item::{BlendMode, Mask, Pattern, Shape, StimulusItem};
pub use trial::{CompletionRecord, ItemEcho, TrialState};
