//! Flashcard loading with network-then-seed fallback

pub mod source;
pub mod fallback;

pub use source::{ApiSource, Flashcard, FlashcardSource, SeedFile, SeedSource, SourceError};
pub use fallback::{first_success, FallbackChain, LoadedFlashcards};
