//! Normalization boundary between backend JSON and internal types
//!
//! Backend responses come wrapped as `{success, data, message}` or
//! `{success, returnObject, message}`, or as bare arrays, with snake_case or
//! camelCase keys and numeric or string ids. Each endpoint gets one adapter
//! here that maps whatever arrives onto a fixed internal type, so nothing
//! outside this module has to care.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::core::session::{Session, UserProfile};
use crate::entities::address::{AddressHierarchy, AddressItem};
use crate::entities::admin::{DashboardSummary, PendingBusiness};
use crate::entities::reference::ReferenceItem;

/// Server acknowledgement of a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub business_id: Option<String>,
    pub message: String,
}

/// Human-readable message carried by a response body, if any
pub fn message_of(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => ["message", "error", "detail"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(String::from),
        _ => None,
    }
}

/// Strip the envelope. `success: false` becomes [`ApiError::Rejected`].
pub fn unwrap_envelope(body: Value) -> Result<Value, ApiError> {
    let Value::Object(mut map) = body else {
        return Ok(body);
    };
    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let message = message_of(&Value::Object(map.clone()))
            .unwrap_or_else(|| "The request was not accepted".to_string());
        return Err(ApiError::Rejected {
            status: None,
            message,
        });
    }
    for key in ["data", "returnObject", "return_object"] {
        if let Some(inner) = map.remove(key) {
            if !inner.is_null() {
                return Ok(inner);
            }
        }
    }
    Ok(Value::Object(map))
}

/// Accept `"12"`, `12` or `null`
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(id_string(&Value::deserialize(deserializer)?))
}

fn flexible_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let id = id_string(&value);
    Ok(if id.is_empty() { None } else { Some(id) })
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::decode(endpoint, e.to_string()))
}

#[derive(Deserialize)]
struct RawAddressItem {
    #[serde(deserialize_with = "flexible_id")]
    id: String,
    name: String,
    #[serde(
        default,
        rename = "parentId",
        deserialize_with = "flexible_opt_id",
        alias = "parent_id",
        alias = "regionId",
        alias = "region_id",
        alias = "districtId",
        alias = "district_id",
        alias = "countyId",
        alias = "county_id",
        alias = "subCountyId",
        alias = "sub_county_id",
        alias = "subcountyId"
    )]
    parent_id: Option<String>,
}

impl From<RawAddressItem> for AddressItem {
    fn from(raw: RawAddressItem) -> Self {
        AddressItem {
            id: raw.id,
            name: raw.name.trim().to_string(),
            parent_id: raw.parent_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAddressTree {
    #[serde(default)]
    regions: Vec<RawAddressItem>,
    #[serde(default)]
    districts: Vec<RawAddressItem>,
    #[serde(default)]
    counties: Vec<RawAddressItem>,
    #[serde(default, alias = "sub_counties", alias = "subcounties")]
    sub_counties: Vec<RawAddressItem>,
    #[serde(default)]
    parishes: Vec<RawAddressItem>,
}

fn convert(items: Vec<RawAddressItem>) -> Vec<AddressItem> {
    items.into_iter().map(AddressItem::from).collect()
}

/// `address/getaddress`
pub fn address_hierarchy(body: Value) -> Result<AddressHierarchy, ApiError> {
    let endpoint = "address/getaddress";
    let tree: RawAddressTree = decode(endpoint, unwrap_envelope(body)?)?;
    Ok(AddressHierarchy::new(
        convert(tree.regions),
        convert(tree.districts),
        convert(tree.counties),
        convert(tree.sub_counties),
        convert(tree.parishes),
    ))
}

#[derive(Deserialize)]
struct RawReferenceItem {
    #[serde(
        deserialize_with = "flexible_id",
        alias = "bankId",
        alias = "bank_id",
        alias = "typeId",
        alias = "type_id",
        alias = "value"
    )]
    id: String,
    #[serde(
        alias = "bankName",
        alias = "bank_name",
        alias = "typeName",
        alias = "type_name",
        alias = "label",
        alias = "description"
    )]
    name: String,
}

/// Any of the `businesses/*` reference lists
pub fn reference_items(endpoint: &str, body: Value) -> Result<Vec<ReferenceItem>, ApiError> {
    let raw: Vec<RawReferenceItem> = decode(endpoint, unwrap_envelope(body)?)?;
    Ok(raw
        .into_iter()
        .map(|r| ReferenceItem::new(r.id, r.name.trim()))
        .collect())
}

/// `businesses/register`
pub fn registration_receipt(body: Value) -> Result<RegistrationReceipt, ApiError> {
    let message = message_of(&body).unwrap_or_else(|| "Registration received".to_string());
    let inner = unwrap_envelope(body)?;
    let business_id = match &inner {
        Value::Object(map) => ["businessId", "business_id", "id"]
            .iter()
            .find_map(|k| map.get(*k))
            .map(id_string)
            .filter(|s| !s.is_empty()),
        Value::Number(_) | Value::String(_) => Some(id_string(&inner)).filter(|s| !s.is_empty()),
        _ => None,
    };
    Ok(RegistrationReceipt {
        business_id,
        message,
    })
}

#[derive(Deserialize)]
struct RawUser {
    #[serde(deserialize_with = "flexible_id", alias = "userId", alias = "user_id")]
    id: String,
    email: String,
    #[serde(default, alias = "fullName", alias = "full_name", alias = "username")]
    name: String,
    #[serde(default, alias = "userRole", alias = "user_role")]
    role: String,
}

#[derive(Deserialize)]
struct RawLogin {
    #[serde(alias = "accessToken", alias = "access_token", alias = "jwt")]
    token: String,
    user: RawUser,
}

/// `auth/login`
pub fn session(body: Value) -> Result<Session, ApiError> {
    let raw: RawLogin = decode("auth/login", unwrap_envelope(body)?)?;
    Ok(Session {
        token: raw.token,
        user: UserProfile {
            id: raw.user.id,
            email: raw.user.email,
            name: raw.user.name,
            role: raw.user.role,
        },
    })
}

#[derive(Deserialize)]
struct RawDashboard {
    #[serde(default, alias = "total_businesses", alias = "businesses")]
    #[serde(rename = "totalBusinesses")]
    total_businesses: u64,
    #[serde(default, alias = "pending_approvals", alias = "pending")]
    #[serde(rename = "pendingApprovals")]
    pending_approvals: u64,
    #[serde(default, alias = "total_users", alias = "users")]
    #[serde(rename = "totalUsers")]
    total_users: u64,
    #[serde(default, alias = "total_bookings", alias = "bookings")]
    #[serde(rename = "totalBookings")]
    total_bookings: u64,
    #[serde(default, alias = "total_transactions", alias = "transactions")]
    #[serde(rename = "totalTransactions")]
    total_transactions: u64,
}

/// `admin/dashboard`
pub fn dashboard(body: Value) -> Result<DashboardSummary, ApiError> {
    let raw: RawDashboard = decode("admin/dashboard", unwrap_envelope(body)?)?;
    Ok(DashboardSummary {
        total_businesses: raw.total_businesses,
        pending_approvals: raw.pending_approvals,
        total_users: raw.total_users,
        total_bookings: raw.total_bookings,
        total_transactions: raw.total_transactions,
    })
}

#[derive(Deserialize)]
struct RawPending {
    #[serde(deserialize_with = "flexible_id", alias = "businessId", alias = "business_id")]
    id: String,
    #[serde(alias = "legalName", alias = "legal_name", alias = "businessName", alias = "business_name")]
    name: String,
    #[serde(default, alias = "business_type", alias = "type")]
    #[serde(rename = "businessType")]
    business_type: String,
    #[serde(default, alias = "owner_email", alias = "email", alias = "contactEmail")]
    #[serde(rename = "ownerEmail")]
    owner_email: String,
    #[serde(default, alias = "submitted_at", alias = "createdAt", alias = "created_at")]
    #[serde(rename = "submittedAt")]
    submitted_at: String,
    #[serde(default)]
    status: Option<String>,
}

/// `admin/pending`
pub fn pending_businesses(body: Value) -> Result<Vec<PendingBusiness>, ApiError> {
    let raw: Vec<RawPending> = decode("admin/pending", unwrap_envelope(body)?)?;
    Ok(raw
        .into_iter()
        .map(|r| PendingBusiness {
            id: r.id,
            name: r.name,
            business_type: r.business_type,
            owner_email: r.owner_email,
            submitted_at: r.submitted_at,
            status: r
                .status
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::ApprovalStatus;
    use crate::entities::address::AddressLevel;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes_normalize_identically() {
        let items = json!([{ "id": 1, "name": "Stanbic" }, { "bankId": "2", "bankName": "Centenary " }]);
        let expected = vec![ReferenceItem::new("1", "Stanbic"), ReferenceItem::new("2", "Centenary")];

        for body in [
            items.clone(),
            json!({ "success": true, "data": items.clone() }),
            json!({ "success": true, "returnObject": items.clone(), "message": "ok" }),
        ] {
            assert_eq!(reference_items("businesses/banks", body).unwrap(), expected);
        }
    }

    #[test]
    fn test_unsuccessful_envelope_is_rejected_with_message() {
        let err = unwrap_envelope(json!({ "success": false, "message": "Email already registered" }))
            .unwrap_err();
        match err {
            ApiError::Rejected { message, .. } => assert_eq!(message, "Email already registered"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_null_data_falls_through_to_object() {
        let value = unwrap_envelope(json!({ "success": true, "data": null, "id": 5 })).unwrap();
        assert_eq!(value["id"], 5);
    }

    #[test]
    fn test_address_tree_snake_and_camel_case() {
        let body = json!({
            "success": true,
            "returnObject": {
                "regions": [{ "id": 1, "name": "Central" }],
                "districts": [{ "id": 10, "name": "Kampala", "region_id": 1 }],
                "counties": [{ "id": "100", "name": "Kampala Central", "districtId": "10" }],
                "sub_counties": [{ "id": 1000, "name": "Nakasero", "county_id": 100 }],
                "parishes": [{ "id": 5, "name": "Nakasero I", "subCountyId": 1000 }]
            }
        });
        let hierarchy = address_hierarchy(body).unwrap();
        assert_eq!(hierarchy.items(AddressLevel::SubCounty).len(), 1);
        let chain = hierarchy.fill_address_hierarchy("5");
        assert_eq!(chain.region.name, "Central");
        assert_eq!(chain.county.id, "100");
    }

    #[test]
    fn test_receipt_picks_up_id_and_message() {
        let receipt = registration_receipt(json!({
            "success": true,
            "message": "Business registered, pending approval",
            "data": { "businessId": 77 }
        }))
        .unwrap();
        assert_eq!(receipt.business_id.as_deref(), Some("77"));
        assert_eq!(receipt.message, "Business registered, pending approval");

        let bare = registration_receipt(json!({ "id": "B-1" })).unwrap();
        assert_eq!(bare.business_id.as_deref(), Some("B-1"));
        assert_eq!(bare.message, "Registration received");
    }

    #[test]
    fn test_session_from_login() {
        let session = session(json!({
            "success": true,
            "data": {
                "accessToken": "jwt-abc",
                "user": { "userId": 3, "email": "admin@stay.ug", "fullName": "Ada", "role": "ADMIN" }
            }
        }))
        .unwrap();
        assert_eq!(session.token, "jwt-abc");
        assert_eq!(session.user.id, "3");
        assert!(session.user.is_admin());
    }

    #[test]
    fn test_pending_and_dashboard() {
        let pending = pending_businesses(json!({
            "data": [{ "business_id": 9, "legal_name": "Lakeside Lodge", "status": "PENDING", "created_at": "2024-05-01" }]
        }))
        .unwrap();
        assert_eq!(pending[0].id, "9");
        assert_eq!(pending[0].name, "Lakeside Lodge");
        assert_eq!(pending[0].status, ApprovalStatus::Pending);
        assert_eq!(pending[0].submitted_at, "2024-05-01");

        let summary = dashboard(json!({ "returnObject": { "pending": 4, "total_users": 20 } })).unwrap();
        assert_eq!(summary.pending_approvals, 4);
        assert_eq!(summary.total_users, 20);
        assert_eq!(summary.total_bookings, 0);
    }

    #[test]
    fn test_decode_error_names_endpoint() {
        let err = reference_items("businesses/banks", json!({ "data": "nope" })).unwrap_err();
        assert!(err.to_string().contains("businesses/banks"));
    }

    #[test]
    fn test_message_of() {
        assert_eq!(message_of(&json!({ "error": "boom" })).as_deref(), Some("boom"));
        assert_eq!(message_of(&json!("plain text")).as_deref(), Some("plain text"));
        assert_eq!(message_of(&json!(42)), None);
    }
}
