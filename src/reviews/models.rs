use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

/// Maximum stored length of a reviewer name, in characters
pub const MAX_NAME_CHARS: usize = 100;
/// Maximum stored length of a review body, in characters
pub const MAX_TEXT_CHARS: usize = 2000;
/// Rating used when the guest does not give one
pub const DEFAULT_RATING: f64 = 5.0;

/// Moderation state of a review
///
/// Only `Approved` reviews are public. Any state may move to any other; the
/// admin decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Approved => write!(f, "approved"),
            ReviewStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(format!("Invalid review status: {}", s)),
        }
    }
}

/// A guest review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    #[schema(example = "rev_1717000000000_a1b2c3d")]
    pub id: String,
    #[schema(example = "Giulia")]
    pub name: String,
    #[schema(example = "Colazione ottima e camere pulitissime.")]
    pub text: String,
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: u8,
    /// Creation instant
    pub date: DateTime<Utc>,
    pub status: ReviewStatus,
}

/// Guest-supplied fields of a new review
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    /// 1 to 5; out-of-range values are clamped, anything but a number means 5
    #[schema(value_type = Option<f64>)]
    pub rating: Option<serde_json::Value>,
}

impl SubmitReviewRequest {
    /// The rating when it was sent as a JSON number
    pub fn numeric_rating(&self) -> Option<f64> {
        self.rating.as_ref().and_then(serde_json::Value::as_f64)
    }
}

/// Request body for PATCH /api/admin/reviews
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateReviewStatusRequest {
    pub id: Option<String>,
    /// pending | approved | rejected
    pub status: Option<String>,
}

/// Optional filter on the admin listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    /// pending | approved | rejected
    pub status: Option<String>,
}

/// Round then clamp a rating into 1..=5
pub fn clamp_rating(rating: f64) -> u8 {
    if rating.is_nan() {
        return DEFAULT_RATING as u8;
    }
    rating.round().clamp(1.0, 5.0) as u8
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(7.0), 5);
        assert_eq!(clamp_rating(0.0), 1);
        assert_eq!(clamp_rating(-3.0), 1);
        assert_eq!(clamp_rating(3.4), 3);
        assert_eq!(clamp_rating(3.5), 4);
        assert_eq!(clamp_rating(f64::NAN), 5);
    }

    #[test]
    fn test_numeric_rating() {
        let parse = |body: &str| serde_json::from_str::<SubmitReviewRequest>(body).unwrap();
        assert_eq!(parse(r#"{"rating":4}"#).numeric_rating(), Some(4.0));
        assert_eq!(parse(r#"{"rating":3.6}"#).numeric_rating(), Some(3.6));
        assert_eq!(parse(r#"{"rating":"4"}"#).numeric_rating(), None);
        assert_eq!(parse(r#"{"rating":null}"#).numeric_rating(), None);
        assert_eq!(parse("{}").numeric_rating(), None);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("approved".parse::<ReviewStatus>().unwrap(), ReviewStatus::Approved);
        assert!("deleted".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn test_review_json_shape() {
        let review = Review {
            id: "rev_1".to_string(),
            name: "Anna".to_string(),
            text: "Bello".to_string(),
            rating: 4,
            date: "2025-05-01T10:00:00Z".parse().unwrap(),
            status: ReviewStatus::Pending,
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["rating"], 4);
        assert_eq!(json["date"], "2025-05-01T10:00:00Z");
    }
}
