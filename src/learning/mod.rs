//! Learning flow
//!
//! Each topic is studied in five fixed stages. [`Step`] is the stage
//! vocabulary; [`LearningFlow`] is the per-topic view that resumes from the
//! stored progress record.

pub mod step;
pub mod flow;

pub use step::Step;
pub use flow::{FlowView, LearningFlow, StepIndicator, StepStatus};
