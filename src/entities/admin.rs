//! Back-office records: dashboard counters and the approval queue

use serde::{Deserialize, Serialize};

use crate::core::status::ApprovalStatus;

/// Headline counters shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_businesses: u64,
    pub pending_approvals: u64,
    pub total_users: u64,
    pub total_bookings: u64,
    pub total_transactions: u64,
}

/// A business registration waiting in (or resolved from) the approval queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBusiness {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub owner_email: String,
    #[serde(default)]
    pub submitted_at: String,
    #[serde(default)]
    pub status: ApprovalStatus,
}

/// Decision recorded by an admin on a pending registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecision {
    pub business_id: String,
    pub status: ApprovalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApprovalDecision {
    pub fn approve(business_id: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            status: ApprovalStatus::Approved,
            reason: None,
        }
    }

    pub fn reject(business_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            status: ApprovalStatus::Rejected,
            reason: Some(reason.into()),
        }
    }

    /// Endpoint path below the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self.status {
            ApprovalStatus::Rejected => "admin/reject",
            _ => "admin/approve",
        }
    }
}
