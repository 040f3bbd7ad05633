//! Persisted application store
//!
//! Holds the user profile, active topic, per-topic progress, UI flags and the
//! VR session. Mutations go through [`TutorState`], which persists the whole
//! state after each one.

pub mod state;
pub mod storage;
pub mod handle;

pub use state::{AppState, Progress, StepData};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use handle::TutorState;
