//! Shared types used across modules
//!
//! The learner profile and its enumerations live here so that the store,
//! onboarding, and profile modules can all use them without depending on
//! each other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Subject a topic belongs to, also the learner's self-reported weak subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Physics,
    Chemistry,
    Biology,
    Mathematics,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::Mathematics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::Mathematics => "Mathematics",
        }
    }

    /// Parse the canonical subject name (surrounding whitespace ignored)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Physics" => Some(Subject::Physics),
            "Chemistry" => Some(Subject::Chemistry),
            "Biology" => Some(Subject::Biology),
            "Mathematics" => Some(Subject::Mathematics),
            _ => None,
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Preferred learning format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyFormat {
    Visual,
    Auditory,
    Kinesthetic,
    Reading,
    Mixed,
}

impl StudyFormat {
    pub const ALL: [StudyFormat; 5] = [
        StudyFormat::Visual,
        StudyFormat::Auditory,
        StudyFormat::Kinesthetic,
        StudyFormat::Reading,
        StudyFormat::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudyFormat::Visual => "visual",
            StudyFormat::Auditory => "auditory",
            StudyFormat::Kinesthetic => "kinesthetic",
            StudyFormat::Reading => "reading",
            StudyFormat::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "visual" => Some(StudyFormat::Visual),
            "auditory" => Some(StudyFormat::Auditory),
            "kinesthetic" => Some(StudyFormat::Kinesthetic),
            "reading" => Some(StudyFormat::Reading),
            "mixed" => Some(StudyFormat::Mixed),
            _ => None,
        }
    }

    /// Human-readable label shown next to the choice
    pub fn label(&self) -> &'static str {
        match self {
            StudyFormat::Visual => "Visual (Diagrams & Images)",
            StudyFormat::Auditory => "Auditory (Videos & Audio)",
            StudyFormat::Kinesthetic => "Kinesthetic (Interactive & VR)",
            StudyFormat::Reading => "Reading & Writing",
            StudyFormat::Mixed => "Mixed Approach",
        }
    }
}

impl std::fmt::Display for StudyFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Learner identity and study preferences
///
/// Numeric preferences are zero and the enums unset between mocked sign-in
/// and the end of onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Hours per day
    #[serde(default)]
    pub daily_study_time: f64,
    #[serde(default)]
    pub preferred_format: Option<StudyFormat>,
    #[serde(default)]
    pub weak_subject: Option<Subject>,
    /// 1 to 5 once onboarded
    #[serde(default)]
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub vr_enabled: bool,
    #[serde(default)]
    pub onboarding_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_parse() {
        assert_eq!(Subject::parse("Biology"), Some(Subject::Biology));
        assert_eq!(Subject::parse("  Physics "), Some(Subject::Physics));
        assert_eq!(Subject::parse("biology"), None);
        assert_eq!(Subject::parse("History"), None);
    }

    #[test]
    fn test_study_format_roundtrip_names() {
        for format in StudyFormat::ALL {
            assert_eq!(StudyFormat::parse(format.as_str()), Some(format));
        }
        assert_eq!(StudyFormat::parse(""), None);
    }

    #[test]
    fn test_user_uses_camel_case_fields() {
        let user = User {
            id: "demo-user-1".into(),
            email: "asha@example.com".into(),
            name: "asha".into(),
            daily_study_time: 2.5,
            preferred_format: Some(StudyFormat::Visual),
            weak_subject: Some(Subject::Chemistry),
            confidence: 3,
            exam_date: None,
            vr_enabled: true,
            onboarding_completed: false,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["dailyStudyTime"], 2.5);
        assert_eq!(json["preferredFormat"], "visual");
        assert_eq!(json["weakSubject"], "Chemistry");
        assert_eq!(json["onboardingCompleted"], false);
        assert!(json.get("examDate").is_none());
    }
}
