//! Rule-based topic recommendation

use crate::types::Subject;

/// Topic recommended when no weak subject is known
pub const DEFAULT_TOPIC: &str = "physics-waves";

/// Map a weak subject to its starter topic
pub fn recommend_topic(weak_subject: Option<Subject>) -> &'static str {
    match weak_subject {
        Some(Subject::Physics) => "physics-waves",
        Some(Subject::Chemistry) => "chemistry-organic",
        Some(Subject::Biology) => "biology-genetics",
        Some(Subject::Mathematics) => "math-calculus",
        None => DEFAULT_TOPIC,
    }
}

/// Same lookup for a raw subject name; unrecognized names get the default
pub fn recommend_topic_for(weak_subject: Option<&str>) -> &'static str {
    recommend_topic(weak_subject.and_then(Subject::parse))
}
