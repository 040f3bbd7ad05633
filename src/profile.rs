//! Profile editing

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::auth::validate_email;
use crate::error::{FieldError, TutorError};
use crate::onboarding::wizard::{validate_confidence, validate_hours};
use crate::routes::Route;
use crate::store::TutorState;
use crate::types::{StudyFormat, Subject, User};

/// Fields to change; `None` leaves a field as it is
///
/// `exam_date` can also be cleared: `Some(None)` removes the stored date.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub daily_study_time: Option<f64>,
    pub preferred_format: Option<StudyFormat>,
    pub weak_subject: Option<Subject>,
    pub confidence: Option<u8>,
    #[serde(default, deserialize_with = "clearable_date")]
    pub exam_date: Option<Option<NaiveDate>>,
    pub vr_enabled: Option<bool>,
}

/// A present `null` or empty string clears the date; an absent key leaves it
fn clearable_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Some(None)),
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| Some(Some(d)))
            .map_err(serde::de::Error::custom),
    }
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.daily_study_time.is_none()
            && self.preferred_format.is_none()
            && self.weak_subject.is_none()
            && self.confidence.is_none()
            && self.exam_date.is_none()
            && self.vr_enabled.is_none()
    }

    /// Validate only the fields being changed
    pub fn validate(&self) -> Result<(), TutorError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.push(FieldError::new("name", "Name is required"));
            }
        }
        if let Some(email) = &self.email {
            errors.extend(validate_email(email));
        }
        if let Some(hours) = self.daily_study_time {
            errors.extend(validate_hours(hours));
        }
        if let Some(confidence) = self.confidence {
            errors.extend(validate_confidence(confidence));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TutorError::Validation(errors))
        }
    }

    /// The user with this update applied
    pub fn apply(&self, user: &User) -> User {
        let mut updated = user.clone();
        if let Some(name) = &self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            updated.email = email.trim().to_string();
        }
        if let Some(hours) = self.daily_study_time {
            updated.daily_study_time = hours;
        }
        if let Some(format) = self.preferred_format {
            updated.preferred_format = Some(format);
        }
        if let Some(subject) = self.weak_subject {
            updated.weak_subject = Some(subject);
        }
        if let Some(confidence) = self.confidence {
            updated.confidence = confidence;
        }
        if let Some(date) = self.exam_date {
            updated.exam_date = date;
        }
        if let Some(vr_enabled) = self.vr_enabled {
            updated.vr_enabled = vr_enabled;
        }
        updated
    }
}

/// Save a profile update for the signed-in user
pub async fn save_profile(state: &TutorState, update: &ProfileUpdate) -> Result<User, TutorError> {
    update.validate()?;
    state
        .try_mutate(|s| {
            let user = s.user.as_ref().ok_or(TutorError::Redirect(Route::SignIn))?;
            let updated = update.apply(user);
            s.set_user(updated.clone());
            info!("Profile updated for {}", updated.id);
            Ok(updated)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::mock_user;

    #[test]
    fn test_partial_update_only_validates_given_fields() {
        let update = ProfileUpdate {
            name: Some("Asha".into()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let user = mock_user("asha@example.com", None);
        let updated = update.apply(&user);
        assert_eq!(updated.name, "Asha");
        assert_eq!(updated.email, "asha@example.com");
    }

    #[test]
    fn test_invalid_fields_are_collected() {
        let update = ProfileUpdate {
            email: Some("bad".into()),
            confidence: Some(9),
            daily_study_time: Some(0.0),
            ..Default::default()
        };
        let err = update.validate().unwrap_err();
        assert_eq!(err.field_errors().len(), 3);
    }

    #[test]
    fn test_exam_date_absent_null_and_set_are_distinct() {
        let absent: ProfileUpdate = serde_json::from_str(r#"{"name": "Asha"}"#).unwrap();
        assert_eq!(absent.exam_date, None);

        let cleared: ProfileUpdate = serde_json::from_str(r#"{"examDate": null}"#).unwrap();
        assert_eq!(cleared.exam_date, Some(None));
        assert!(!cleared.is_empty());

        let blank: ProfileUpdate = serde_json::from_str(r#"{"examDate": ""}"#).unwrap();
        assert_eq!(blank.exam_date, Some(None));

        let set: ProfileUpdate = serde_json::from_str(r#"{"examDate": "2027-05-02"}"#).unwrap();
        assert_eq!(set.exam_date, Some(NaiveDate::from_ymd_opt(2027, 5, 2)));

        assert!(serde_json::from_str::<ProfileUpdate>(r#"{"examDate": "May 2nd"}"#).is_err());
    }

    #[tokio::test]
    async fn test_exam_date_can_be_cleared() {
        let state = TutorState::in_memory();
        state.set_user(mock_user("asha@example.com", None)).await;
        let exam = NaiveDate::from_ymd_opt(2027, 5, 2);

        let set: ProfileUpdate = serde_json::from_str(r#"{"examDate": "2027-05-02"}"#).unwrap();
        assert_eq!(save_profile(&state, &set).await.unwrap().exam_date, exam);

        let untouched: ProfileUpdate = serde_json::from_str(r#"{"name": "Asha"}"#).unwrap();
        assert_eq!(save_profile(&state, &untouched).await.unwrap().exam_date, exam);

        let cleared: ProfileUpdate = serde_json::from_str(r#"{"examDate": null}"#).unwrap();
        assert_eq!(save_profile(&state, &cleared).await.unwrap().exam_date, None);
        assert_eq!(state.snapshot().await.user.unwrap().exam_date, None);
    }

    #[tokio::test]
    async fn test_save_without_user_redirects() {
        let state = TutorState::in_memory();
        let update = ProfileUpdate {
            vr_enabled: Some(false),
            ..Default::default()
        };
        assert_eq!(
            save_profile(&state, &update).await.unwrap_err(),
            TutorError::Redirect(Route::SignIn)
        );
    }

    #[tokio::test]
    async fn test_save_replaces_user() {
        let state = TutorState::in_memory();
        state.set_user(mock_user("asha@example.com", None)).await;
        let update = ProfileUpdate {
            weak_subject: Some(Subject::Chemistry),
            vr_enabled: Some(false),
            ..Default::default()
        };
        let user = save_profile(&state, &update).await.unwrap();
        assert_eq!(user.weak_subject, Some(Subject::Chemistry));
        assert!(!state.snapshot().await.user.unwrap().vr_enabled);
    }
}
