//! Reference data used by the registration form's select inputs

use serde::{Deserialize, Serialize};

/// One selectable option (bank, account type, business type, ownership type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub id: String,
    pub name: String,
}

impl ReferenceItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Which reference list an item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Banks,
    AccountTypes,
    BusinessTypes,
    OwnershipTypes,
}

impl ReferenceKind {
    /// Endpoint path below the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            ReferenceKind::Banks => "businesses/banks",
            ReferenceKind::AccountTypes => "businesses/account-types",
            ReferenceKind::BusinessTypes => "businesses/business-types",
            ReferenceKind::OwnershipTypes => "businesses/ownership-types",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Banks => "banks",
            ReferenceKind::AccountTypes => "account types",
            ReferenceKind::BusinessTypes => "business types",
            ReferenceKind::OwnershipTypes => "ownership types",
        }
    }
}

/// All reference lists the wizard needs. An empty list means the fetch
/// failed or returned nothing; membership checks are skipped for it.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub banks: Vec<ReferenceItem>,
    pub account_types: Vec<ReferenceItem>,
    pub business_types: Vec<ReferenceItem>,
    pub ownership_types: Vec<ReferenceItem>,
}

impl ReferenceData {
    /// Borrow the list for a kind
    pub fn list(&self, kind: ReferenceKind) -> &[ReferenceItem] {
        match kind {
            ReferenceKind::Banks => &self.banks,
            ReferenceKind::AccountTypes => &self.account_types,
            ReferenceKind::BusinessTypes => &self.business_types,
            ReferenceKind::OwnershipTypes => &self.ownership_types,
        }
    }

    /// `None` when the list is empty (unknown), otherwise whether `id` is listed
    pub fn contains(&self, kind: ReferenceKind, id: &str) -> Option<bool> {
        let list = self.list(kind);
        if list.is_empty() {
            None
        } else {
            Some(list.iter().any(|item| item.id == id))
        }
    }

    /// Display name for an id, if known
    pub fn name_of(&self, kind: ReferenceKind, id: &str) -> Option<&str> {
        self.list(kind)
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.name.as_str())
    }
}
