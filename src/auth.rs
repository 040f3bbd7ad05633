//! Mocked authentication
//!
//! There is no credential check. Sign-in and sign-up only validate the form,
//! create a local demo user, and switch demo mode on.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FieldError, TutorError};
use crate::routes::Route;
use crate::store::TutorState;
use crate::types::User;

pub const DEMO_USER_ID: &str = "demo-user-1";
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInOutcome {
    pub user: User,
    /// Where the learner goes next
    pub next: Route,
}

pub fn validate_email(email: &str) -> Option<FieldError> {
    (!EMAIL_RE.is_match(email.trim())).then(|| FieldError::new("email", "Invalid email address"))
}

fn validate_password(password: &str) -> Option<FieldError> {
    (password.chars().count() < MIN_PASSWORD_LEN).then(|| {
        FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        )
    })
}

impl SignInRequest {
    pub fn validate(&self) -> Result<(), TutorError> {
        let errors: Vec<FieldError> = validate_email(&self.email)
            .into_iter()
            .chain(validate_password(&self.password))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TutorError::Validation(errors))
        }
    }
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), TutorError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        errors.extend(validate_email(&self.email));
        errors.extend(validate_password(&self.password));
        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TutorError::Validation(errors))
        }
    }
}

/// Fresh demo user with preferences left for onboarding
pub fn mock_user(email: &str, name: Option<&str>) -> User {
    let email = email.trim().to_string();
    let name = name
        .map(|n| n.trim().to_string())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    User {
        id: DEMO_USER_ID.to_string(),
        email,
        name,
        daily_study_time: 0.0,
        preferred_format: None,
        weak_subject: None,
        confidence: 0,
        exam_date: None,
        vr_enabled: true,
        onboarding_completed: false,
    }
}

fn next_route(user: &User) -> Route {
    if user.onboarding_completed {
        Route::Dashboard
    } else {
        Route::Onboarding
    }
}

async fn establish(state: &TutorState, user: User) -> SignInOutcome {
    info!("Demo sign-in for {}", user.email);
    let next = next_route(&user);
    let stored = user.clone();
    state
        .mutate(move |s| {
            s.set_user(stored);
            s.set_demo_mode(true);
        })
        .await;
    SignInOutcome { user, next }
}

pub async fn sign_in(state: &TutorState, req: &SignInRequest) -> Result<SignInOutcome, TutorError> {
    req.validate()?;
    Ok(establish(state, mock_user(&req.email, None)).await)
}

pub async fn sign_up(state: &TutorState, req: &SignUpRequest) -> Result<SignInOutcome, TutorError> {
    req.validate()?;
    Ok(establish(state, mock_user(&req.email, Some(&req.name))).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_reports_all_field_errors() {
        let req = SignInRequest {
            email: "not-an-email".into(),
            password: "123".into(),
        };
        let err = req.validate().unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
        assert_eq!(
            err.field_errors()[1].message,
            "Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_sign_up_checks_confirmation() {
        let req = SignUpRequest {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.field_errors()[0].field, "confirmPassword");
    }

    #[test]
    fn test_mock_user_name_from_email() {
        let user = mock_user("asha.k@example.com", None);
        assert_eq!(user.name, "asha.k");
        assert_eq!(user.id, DEMO_USER_ID);
        assert!(user.vr_enabled);
        assert!(!user.onboarding_completed);
    }

    #[tokio::test]
    async fn test_sign_in_stores_user_and_enables_demo_mode() {
        let state = TutorState::in_memory();
        state.set_demo_mode(false).await;
        let outcome = sign_in(
            &state,
            &SignInRequest {
                email: "asha@example.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.next, Route::Onboarding);
        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.user.unwrap().email, "asha@example.com");
        assert!(snapshot.demo_mode);
    }
}
