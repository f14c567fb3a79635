use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 5;

/// Outcome record for one VR therapy session.
///
/// Ratings use a 1 to 5 scale:
/// - engagement_level: very low .. very high
/// - satisfaction: very dissatisfied .. very satisfied
/// - physical_impact / cognitive_impact: negative, 3 neutral, 5 very positive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub id: Uuid,
    pub resident_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub session_date: NaiveDate,
    /// Minutes.
    pub session_duration: i32,
    pub vr_experience: String,
    pub engagement_level: i16,
    pub satisfaction: i16,
    pub physical_impact: i16,
    pub cognitive_impact: i16,
    pub emotional_response: String,
    pub feedback_notes: String,
}

impl Feedback {
    pub fn validate(&self) -> Result<(), String> {
        if self.session_duration < 0 {
            return Err("session_duration must be a positive number of minutes.".into());
        }
        let ratings = [
            ("engagement_level", self.engagement_level),
            ("satisfaction", self.satisfaction),
            ("physical_impact", self.physical_impact),
            ("cognitive_impact", self.cognitive_impact),
        ];
        for (field, value) in ratings {
            if !(RATING_MIN..=RATING_MAX).contains(&value) {
                return Err(format!(
                    "{field} must be between {RATING_MIN} and {RATING_MAX}."
                ));
            }
        }
        if self.vr_experience.trim().is_empty() {
            return Err("vr_experience is required.".into());
        }
        if self.emotional_response.trim().is_empty() {
            return Err("emotional_response is required.".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            resident_id: Uuid::new_v4(),
            created_at: Utc::now(),
            session_date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
            session_duration: 45,
            vr_experience: "Virtual beach walk".into(),
            engagement_level: 4,
            satisfaction: 5,
            physical_impact: 3,
            cognitive_impact: 4,
            emotional_response: "Calm and relaxed".into(),
            feedback_notes: String::new(),
        }
    }

    #[test]
    fn accepts_ratings_within_scale() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_scale_ratings() {
        let mut fb = sample();
        fb.satisfaction = 6;
        assert!(fb.validate().unwrap_err().contains("satisfaction"));
        let mut fb = sample();
        fb.engagement_level = 0;
        assert!(fb.validate().unwrap_err().contains("engagement_level"));
    }

    #[test]
    fn rejects_negative_duration() {
        let mut fb = sample();
        fb.session_duration = -1;
        assert!(fb.validate().is_err());
        fb.session_duration = 0;
        assert!(fb.validate().is_ok());
    }
}
