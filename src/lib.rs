//! NEET Tutor Library
//!
//! A study companion for NEET aspirants:
//! - Mocked sign-in and a 4-step onboarding wizard that recommends a topic
//! - A five-stage learning flow with persisted per-topic progress
//! - Dashboard and profile views over the same state
//! - A VR preview whose quiz hotspot unlocks from video progress
//!
//! # Example
//!
//! ```ignore
//! use neet_tutor::{learning::Step, store::{StepData, TutorState}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let state = TutorState::in_memory();
//!     state.set_current_topic("physics-waves").await;
//!     let progress = state
//!         .complete_step("physics-waves", Step::Topic, &StepData::default())
//!         .await?;
//!     println!("next step: {}", progress.current_step);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod types;
pub mod error;
pub mod config;
pub mod catalog;
pub mod routes;
pub mod store;
pub mod learning;
pub mod onboarding;
pub mod flashcards;
pub mod vr;

// Feature modules
pub mod auth;
pub mod dashboard;
pub mod profile;
pub mod server;
pub mod cli;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{FieldError, TutorError};
pub use learning::{LearningFlow, Step};
pub use store::{AppState, Progress, StepData, TutorState};
pub use vr::{VrBridge, VrSession};

pub use server::{
    ServerState,
    start as start_server,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
