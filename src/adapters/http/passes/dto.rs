//! Request and response bodies for pass issuance.

use serde::{Deserialize, Serialize};

use crate::application::handlers::IssuePassResult;
use crate::domain::foundation::{GymId, PassId, Timestamp};
use crate::domain::pass::{PassKind, PassStatus};
use crate::domain::subscription::{PriceSnapshot, SubscriptionTier};

/// `POST /passes` body.
///
/// `gym_id` is optional here so that a missing field is reported as a
/// validation failure instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePassRequest {
    pub gym_id: Option<i64>,
    #[serde(default)]
    pub guest: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassResponse {
    pub id: PassId,
    pub code: String,
    pub gym_id: GymId,
    pub gym_name: String,
    pub kind: PassKind,
    pub status: PassStatus,
    pub issued_at: Timestamp,
    pub valid_until: Timestamp,
    pub tier: SubscriptionTier,
    pub cost: PriceSnapshot,
}

impl From<IssuePassResult> for PassResponse {
    fn from(result: IssuePassResult) -> Self {
        let pass = result.pass;
        Self {
            id: pass.id,
            code: pass.code.as_str().to_string(),
            gym_id: pass.gym_id,
            gym_name: result.gym.name,
            kind: pass.kind,
            status: pass.status,
            issued_at: pass.issued_at,
            valid_until: pass.valid_until,
            tier: pass.tier,
            cost: pass.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_camel_case_and_defaults_guest() {
        let req: IssuePassRequest = serde_json::from_str(r#"{"gymId": 12}"#).unwrap();
        assert_eq!(req.gym_id, Some(12));
        assert!(!req.guest);

        let req: IssuePassRequest = serde_json::from_str(r#"{"gymId": 3, "guest": true}"#).unwrap();
        assert!(req.guest);
    }

    #[test]
    fn request_without_gym_id_still_parses() {
        let req: IssuePassRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.gym_id, None);
    }
}
