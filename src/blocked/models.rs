use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::rooms::RoomId;
use crate::validation::validate_stay_dates;

/// A date range during which a room cannot be booked
///
/// `check_out` is exclusive: the last occupied night ends the morning of
/// `check_out`, so another stay may start that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockedPeriod {
    #[schema(example = "blk_1717000000000_k3j9x2a")]
    pub id: String,
    pub room_id: RoomId,
    #[schema(value_type = String, example = "2025-06-01")]
    pub check_in: NaiveDate,
    #[schema(value_type = String, example = "2025-06-05")]
    pub check_out: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Payment session that created this block, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl BlockedPeriod {
    /// Whether this block intersects `[check_in, check_out)` for `room`
    pub fn blocks(&self, room: RoomId, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.room_id == room && overlaps(check_in, check_out, self.check_in, self.check_out)
    }
}

/// Half-open interval intersection
///
/// `[a_start, a_end)` and `[b_start, b_end)` overlap iff
/// `a_start < b_end && a_end > b_start`. Touching ranges do not overlap.
pub fn overlaps(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start < b_end && a_end > b_start
}

/// Fields of a block about to be stored
#[derive(Debug, Clone)]
pub struct NewBlockedPeriod {
    pub room_id: RoomId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub note: Option<String>,
    pub session_id: Option<String>,
}

/// Answer of an availability check
///
/// `Unknown` means the store could not be read; public callers treat it as
/// available, stricter callers may refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Blocked,
    Unknown,
}

impl Availability {
    /// Fail-open reading: only a confirmed block is unavailable
    pub fn is_available(&self) -> bool {
        !matches!(self, Availability::Blocked)
    }
}

/// Query for GET /api/availability/check
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// sun | moon | earth
    pub room_id: Option<String>,
    /// YYYY-MM-DD
    pub check_in: Option<String>,
    /// YYYY-MM-DD
    pub check_out: Option<String>,
}

/// Response of GET /api/availability/check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
    pub status: Availability,
}

impl From<Availability> for AvailabilityResponse {
    fn from(status: Availability) -> Self {
        Self {
            available: status.is_available(),
            status,
        }
    }
}

/// Request body for POST /api/admin/blocked
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_block_dates", skip_on_field_errors = false))]
pub struct CreateBlockedPeriodRequest {
    pub room_id: RoomId,
    #[schema(value_type = String, example = "2025-06-01")]
    pub check_in: NaiveDate,
    #[schema(value_type = String, example = "2025-06-05")]
    pub check_out: NaiveDate,
    #[validate(length(max = 500, message = "La nota non può superare 500 caratteri"))]
    pub note: Option<String>,
}

fn validate_block_dates(request: &CreateBlockedPeriodRequest) -> Result<(), validator::ValidationError> {
    validate_stay_dates(request.check_in, request.check_out)
}

/// Request body for DELETE on admin collections
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteByIdRequest {
    pub id: Option<String>,
}

/// Message for a delete without a usable id
pub const ID_REQUIRED: &str = "Parametro id richiesto.";

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn block(room: RoomId, check_in: &str, check_out: &str) -> BlockedPeriod {
        BlockedPeriod {
            id: "blk_test".to_string(),
            room_id: room,
            check_in: date(check_in),
            check_out: date(check_out),
            note: None,
            session_id: None,
        }
    }

    #[test]
    fn test_same_day_turnover_is_allowed() {
        let b = block(RoomId::Sun, "2024-01-10", "2024-01-12");
        assert!(!b.blocks(RoomId::Sun, date("2024-01-12"), date("2024-01-14")));
        assert!(!b.blocks(RoomId::Sun, date("2024-01-08"), date("2024-01-10")));
    }

    #[test]
    fn test_partial_overlap() {
        let b = block(RoomId::Sun, "2024-01-10", "2024-01-12");
        assert!(b.blocks(RoomId::Sun, date("2024-01-11"), date("2024-01-13")));
        assert!(b.blocks(RoomId::Sun, date("2024-01-09"), date("2024-01-11")));
    }

    #[test]
    fn test_containment_overlaps() {
        let b = block(RoomId::Moon, "2024-03-01", "2024-03-10");
        assert!(b.blocks(RoomId::Moon, date("2024-03-03"), date("2024-03-04")));
        assert!(b.blocks(RoomId::Moon, date("2024-02-01"), date("2024-04-01")));
    }

    #[test]
    fn test_other_room_never_blocks() {
        let b = block(RoomId::Sun, "2024-01-10", "2024-01-12");
        assert!(!b.blocks(RoomId::Earth, date("2024-01-10"), date("2024-01-12")));
    }

    #[test]
    fn test_availability_fail_open() {
        assert!(Availability::Available.is_available());
        assert!(Availability::Unknown.is_available());
        assert!(!Availability::Blocked.is_available());
    }

    #[test]
    fn test_serialization_shape() {
        let mut b = block(RoomId::Sun, "2025-06-01", "2025-06-05");
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["roomId"], "sun");
        assert_eq!(json["checkIn"], "2025-06-01");
        assert_eq!(json["checkOut"], "2025-06-05");
        assert!(json.get("note").is_none());
        assert!(json.get("sessionId").is_none());

        b.session_id = Some("cs_test_1".to_string());
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["sessionId"], "cs_test_1");
    }

    #[test]
    fn test_create_request_rejects_inverted_dates() {
        let request = CreateBlockedPeriodRequest {
            room_id: RoomId::Sun,
            check_in: date("2025-06-05"),
            check_out: date("2025-06-05"),
            note: None,
        };
        assert!(request.validate().is_err());

        let request = CreateBlockedPeriodRequest {
            check_out: date("2025-06-06"),
            ..request
        };
        assert!(request.validate().is_ok());
    }
}
