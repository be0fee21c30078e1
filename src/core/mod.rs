pub mod assignment;
pub mod engine;
pub mod scheduler;
pub mod slots;
pub mod swap;

pub use crate::domain::model::{Committee, Presentation, PresentationSlot};
pub use crate::domain::ports::{SchedulingSettings, ThesisStore};
pub use crate::utils::error::Result;
