//! Shared owner of the application state
//!
//! [`TutorState`] is the one place state lives. The CLI, the HTTP handlers,
//! and the VR bridge all hold a clone of the same handle, so there is a
//! single source of truth for the current topic and progress.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::TutorError;
use crate::learning::Step;
use crate::onboarding::OnboardingOutcome;
use crate::routes::Route;
use crate::store::storage::{self, MemoryStorage, Storage};
use crate::store::{AppState, Progress, StepData};
use crate::types::User;

#[derive(Clone)]
pub struct TutorState {
    inner: Arc<RwLock<AppState>>,
    storage: Arc<dyn Storage>,
}

impl TutorState {
    /// Rehydrate from storage, falling back to defaults on a missing or bad blob
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let state = match storage.load() {
            Ok(Some(blob)) => match storage::decode(&blob) {
                Ok(state) => {
                    info!("Rehydrated state from {}", storage.describe());
                    state
                }
                Err(e) => {
                    warn!("Ignoring unreadable state in {}: {:#}", storage.describe(), e);
                    match storage.quarantine() {
                        Ok(Some(location)) => warn!("Unreadable state kept at {}", location),
                        Ok(None) => {}
                        Err(e) => warn!("Failed to keep a copy of unreadable state: {:#}", e),
                    }
                    AppState::default()
                }
            },
            Ok(None) => {
                debug!("No stored state in {}, starting fresh", storage.describe());
                AppState::default()
            }
            Err(e) => {
                warn!("Failed to load state from {}: {:#}", storage.describe(), e);
                AppState::default()
            }
        };
        Self {
            inner: Arc::new(RwLock::new(state)),
            storage,
        }
    }

    /// Fresh state backed by process memory
    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemoryStorage::new()))
    }

    pub fn storage_location(&self) -> String {
        self.storage.describe()
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> AppState {
        self.inner.read().await.clone()
    }

    /// Run a read-only closure against the state
    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let guard = self.inner.read().await;
        f(&guard)
    }

    /// Apply a mutation and persist the result
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut guard = self.inner.write().await;
        let result = f(&mut guard);
        self.persist(&guard);
        result
    }

    /// Apply a fallible mutation, persisting only when it succeeds
    pub async fn try_mutate<R>(
        &self,
        f: impl FnOnce(&mut AppState) -> Result<R, TutorError>,
    ) -> Result<R, TutorError> {
        let mut guard = self.inner.write().await;
        let result = f(&mut guard)?;
        self.persist(&guard);
        Ok(result)
    }

    // Synchronous write under the write guard: saves land in mutation order.
    // Write failures never fail the action that triggered them.
    fn persist(&self, state: &AppState) {
        let outcome = storage::encode(state).and_then(|blob| self.storage.save(&blob));
        if let Err(e) = outcome {
            warn!("Failed to persist state to {}: {:#}", self.storage.describe(), e);
        }
    }

    // --- Actions ---

    pub async fn set_user(&self, user: User) {
        self.mutate(|s| s.set_user(user)).await
    }

    pub async fn logout(&self) {
        self.mutate(|s| s.logout()).await
    }

    /// Returns the VR session generation for the new topic
    pub async fn set_current_topic(&self, topic_id: &str) -> u64 {
        self.mutate(|s| s.set_current_topic(topic_id)).await
    }

    /// Complete a learning step for a topic
    pub async fn complete_step(
        &self,
        topic_id: &str,
        step: Step,
        data: &StepData,
    ) -> Result<Progress, TutorError> {
        self.try_mutate(|s| s.update_progress(topic_id, step, data)).await
    }

    /// Complete a step given by name; names outside the five stages are rejected
    pub async fn complete_step_named(
        &self,
        topic_id: &str,
        step: &str,
        data: &StepData,
    ) -> Result<Progress, TutorError> {
        let step: Step = step.parse()?;
        self.complete_step(topic_id, step, data).await
    }

    pub async fn toggle_vr_mode(&self) -> bool {
        self.mutate(|s| s.toggle_vr_mode()).await
    }

    pub async fn set_demo_mode(&self, enabled: bool) {
        self.mutate(|s| s.set_demo_mode(enabled)).await
    }

    /// Store onboarding answers and select the recommended topic
    pub async fn complete_onboarding(&self, outcome: &OnboardingOutcome) -> Result<(), TutorError> {
        self.try_mutate(|s| {
            if !s.complete_onboarding(&outcome.profile) {
                return Err(TutorError::Redirect(Route::SignIn));
            }
            s.set_current_topic(&outcome.recommended_topic);
            info!("Onboarding complete, recommended topic {}", outcome.recommended_topic);
            Ok(())
        })
        .await
    }
}
