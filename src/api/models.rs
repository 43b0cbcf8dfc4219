use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which review queue a view is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Queue {
    Membership,
    Beneficiaries,
}

impl Queue {
    pub fn title(&self) -> &'static str {
        match self {
            Queue::Membership => "Membership applications",
            Queue::Beneficiaries => "Beneficiary registrations",
        }
    }

    pub fn list_path(&self) -> &'static str {
        match self {
            Queue::Membership => "/api/membership-applications",
            Queue::Beneficiaries => "/api/beneficiaries",
        }
    }

    /// Only the membership queue filters by status server-side.
    pub fn status_filter(&self) -> Option<&'static str> {
        match self {
            Queue::Membership => Some("pending"),
            Queue::Beneficiaries => None,
        }
    }

    pub fn next(&self) -> Queue {
        match self {
            Queue::Membership => Queue::Beneficiaries,
            Queue::Beneficiaries => Queue::Membership,
        }
    }
}

/// Review status as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Approved,
    Rejected,
    /// Forward-compatible catch-all.
    #[serde(other)]
    Unknown,
}

/// One row in a review queue. Both queues share this shape; fields the
/// server does not send for a given queue simply stay `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    pub id: u64,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Pagination block returned by list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// Per-status counts some list endpoints include.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub rejected: u64,
}

/// Envelope shape of list responses: `{success, data, meta, summary?}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<QueueRecord>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
    #[serde(default)]
    pub summary: Option<QueueSummary>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Envelope shape of mutation responses: `{success, error?}`.
#[derive(Debug, Default, Deserialize)]
pub struct AckEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of a batch endpoint call. Built once from a selection snapshot and
/// never mutated while the request is in flight.
#[derive(Debug, Serialize)]
pub struct BatchRequest {
    pub ids: Vec<u64>,
}

/// Body of `PATCH /api/membership-applications/{id}/status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One decoded page of a queue, ready for the view layer.
#[derive(Debug)]
pub struct QueuePage {
    pub rows: Vec<QueueRecord>,
    pub meta: ListMeta,
    pub summary: Option<QueueSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_list_envelope() {
        let body = r#"{
            "success": true,
            "data": [{
                "id": 7,
                "fullName": "Amina Khatun",
                "district": "Sylhet",
                "status": "pending",
                "submittedAt": "2026-01-05T10:00:00Z"
            }],
            "meta": {"page": 1, "pageSize": 25, "total": 1, "totalPages": 1},
            "summary": {"pending": 1, "approved": 0, "rejected": 0}
        }"#;

        let envelope: ListEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].full_name, "Amina Khatun");
        assert_eq!(envelope.data[0].status, Some(RecordStatus::Pending));
        assert_eq!(envelope.meta.unwrap().total, 1);
        assert_eq!(envelope.summary.unwrap().pending, 1);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let body = r#"{"id": 1, "fullName": "X", "status": "archived"}"#;
        let record: QueueRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.status, Some(RecordStatus::Unknown));
    }

    #[test]
    fn status_update_skips_absent_fields() {
        let request = StatusUpdateRequest {
            status: RecordStatus::Rejected,
            organization_id: None,
            notes: Some("incomplete form".to_string()),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"status":"rejected","notes":"incomplete form"}"#);
    }

    #[test]
    fn ack_envelope_defaults_to_failure() {
        let ack: AckEnvelope = serde_json::from_str("{}").unwrap();
        assert!(!ack.success);
        assert!(ack.error.is_none());
    }
}
