//! HTTP JSON handlers

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::auth::{self, SignInRequest, SignUpRequest};
use crate::catalog;
use crate::dashboard::DashboardSummary;
use crate::error::TutorError;
use crate::learning::{LearningFlow, Step};
use crate::onboarding::{OnboardingForm, OnboardingWizard};
use crate::profile::{self, ProfileUpdate};
use crate::routes::{self, Route};
use crate::server::ServerState;
use crate::store::StepData;
use crate::vr::HotspotId;

impl IntoResponse for TutorError {
    fn into_response(self) -> Response {
        let status = match &self {
            TutorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TutorError::UnknownStep(_) | TutorError::UnknownTopic(_) => StatusCode::BAD_REQUEST,
            TutorError::Redirect(_) => StatusCode::CONFLICT,
            TutorError::Locked(_) => StatusCode::FORBIDDEN,
        };
        let mut body = json!({ "error": self.to_string() });
        match &self {
            TutorError::Validation(fields) => body["fields"] = json!(fields),
            TutorError::Redirect(route) => body["redirect"] = json!(route.path()),
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

fn respond<T: Serialize>(result: Result<T, TutorError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            debug!("Request rejected: {}", e);
            e.into_response()
        }
    }
}

/// Status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub demo_mode: bool,
    pub storage: String,
}

pub async fn status_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let response = StatusResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        demo_mode: state.tutor.read(|s| s.demo_mode).await,
        storage: state.tutor.storage_location(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

pub async fn topics_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(catalog::topics())).into_response()
}

#[derive(Debug, Deserialize)]
pub struct TopicQuery {
    pub topic: String,
}

/// Seed-backed flashcard endpoint; unknown topics are 404 so clients fall back
pub async fn flashcards_handler(
    State(state): State<ServerState>,
    Query(query): Query<TopicQuery>,
) -> impl IntoResponse {
    match state.seeds.cards_for(&query.topic) {
        Some(cards) => (StatusCode::OK, Json(cards)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown topic '{}'", query.topic) })),
        )
            .into_response(),
    }
}

pub async fn seeds_handler(State(state): State<ServerState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.seeds.as_ref().clone())).into_response()
}

pub async fn sign_in_handler(
    State(state): State<ServerState>,
    Json(req): Json<SignInRequest>,
) -> Response {
    respond(auth::sign_in(&state.tutor, &req).await)
}

pub async fn sign_up_handler(
    State(state): State<ServerState>,
    Json(req): Json<SignUpRequest>,
) -> Response {
    respond(auth::sign_up(&state.tutor, &req).await)
}

pub async fn logout_handler(State(state): State<ServerState>) -> impl IntoResponse {
    state.tutor.logout().await;
    (StatusCode::OK, Json(json!({ "next": Route::Home.path() }))).into_response()
}

pub async fn state_handler(State(state): State<ServerState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.tutor.snapshot().await)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub path: String,
}

pub async fn navigate_handler(
    State(state): State<ServerState>,
    Query(query): Query<NavigateQuery>,
) -> impl IntoResponse {
    let navigation = state.tutor.read(|s| routes::resolve(&query.path, s)).await;
    (StatusCode::OK, Json(navigation)).into_response()
}

/// Run the whole wizard over a submitted form
pub async fn onboarding_handler(
    State(state): State<ServerState>,
    Json(form): Json<OnboardingForm>,
) -> Response {
    let outcome = match OnboardingWizard::with_form(form).run_to_completion() {
        Ok(outcome) => outcome,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = state.tutor.complete_onboarding(&outcome).await {
        return e.into_response();
    }
    state.bridge.set_current_topic(&outcome.recommended_topic, None).await;
    (
        StatusCode::OK,
        Json(json!({
            "recommendedTopic": outcome.recommended_topic,
            "profile": outcome.profile,
            "next": Route::Learn.path(),
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct LearnQuery {
    /// Deep-linked step, as in `/learn#quiz`
    #[serde(default)]
    pub step: Option<String>,
}

pub async fn learn_handler(
    State(state): State<ServerState>,
    Query(query): Query<LearnQuery>,
) -> Response {
    let view = state
        .tutor
        .read(|s| LearningFlow::enter_at(s, query.step.as_deref()).map(|flow| flow.view()))
        .await;
    respond(view)
}

#[derive(Debug, Deserialize)]
pub struct CompleteStepRequest {
    pub step: String,
    #[serde(flatten)]
    pub data: StepData,
}

/// Complete a step of the current topic and return the updated flow
pub async fn learn_complete_handler(
    State(state): State<ServerState>,
    Json(req): Json<CompleteStepRequest>,
) -> Response {
    let result = state
        .tutor
        .try_mutate(|s| {
            let mut flow = LearningFlow::enter(s)?;
            let step: Step = req.step.parse()?;
            let topic_id = flow.topic().id.clone();
            let progress = s.update_progress(&topic_id, step, &req.data)?;
            flow.record_completion(step, progress);
            Ok(flow.view())
        })
        .await;
    respond(result)
}

pub async fn dashboard_handler(State(state): State<ServerState>) -> Response {
    respond(state.tutor.read(DashboardSummary::build).await)
}

pub async fn profile_handler(State(state): State<ServerState>) -> Response {
    let user = state
        .tutor
        .read(|s| s.user.clone().ok_or(TutorError::Redirect(Route::SignIn)))
        .await;
    respond(user)
}

pub async fn profile_update_handler(
    State(state): State<ServerState>,
    Json(update): Json<ProfileUpdate>,
) -> Response {
    respond(profile::save_profile(&state.tutor, &update).await)
}

pub async fn toggle_vr_mode_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let enabled = state.tutor.toggle_vr_mode().await;
    (StatusCode::OK, Json(json!({ "isVRMode": enabled }))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct DemoModeRequest {
    pub enabled: bool,
}

pub async fn demo_mode_handler(
    State(state): State<ServerState>,
    Json(req): Json<DemoModeRequest>,
) -> impl IntoResponse {
    state.tutor.set_demo_mode(req.enabled).await;
    (StatusCode::OK, Json(json!({ "demoMode": req.enabled }))).into_response()
}

pub async fn vr_scene_handler(State(state): State<ServerState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.bridge.scene().await)).into_response()
}

pub async fn vr_state_handler(State(state): State<ServerState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.bridge.session().await)).into_response()
}

pub async fn vr_message_handler(
    State(state): State<ServerState>,
    Json(message): Json<Value>,
) -> impl IntoResponse {
    let handled = state.bridge.handle_message(&message).await;
    let unlocked = state.bridge.session().await.unlocked;
    (StatusCode::OK, Json(json!({ "handled": handled, "unlocked": unlocked }))).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VrTopicRequest {
    pub topic_id: String,
    #[serde(default)]
    pub topic_name: Option<String>,
}

pub async fn vr_topic_handler(
    State(state): State<ServerState>,
    Json(req): Json<VrTopicRequest>,
) -> Response {
    if req.topic_id.trim().is_empty() {
        return TutorError::invalid("topicId", "Topic is required").into_response();
    }
    let load = state
        .bridge
        .set_current_topic(req.topic_id.trim(), req.topic_name.as_deref())
        .await;
    (StatusCode::OK, Json(load)).into_response()
}

pub async fn vr_complete_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let added = state.bridge.mark_topic_complete().await;
    let session = state.bridge.session().await;
    (
        StatusCode::OK,
        Json(json!({ "added": added, "topicsCompleted": session.topics_completed })),
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenVideoRequest {
    /// True when the scene runs inside a parent frame
    #[serde(default)]
    pub embedded: bool,
}

pub async fn vr_open_video_handler(
    State(state): State<ServerState>,
    Json(req): Json<OpenVideoRequest>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(state.bridge.open_video(req.embedded).await)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct HotspotRequest {
    pub hotspot: String,
}

pub async fn vr_hotspot_handler(
    State(state): State<ServerState>,
    Json(req): Json<HotspotRequest>,
) -> Response {
    let id: HotspotId = match req.hotspot.parse() {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    respond(state.bridge.activate_hotspot(id).await)
}
