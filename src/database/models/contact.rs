use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;
pub const MAX_PHONE_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Field-wise update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Listing parameters shared by both contact list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ContactQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn search(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let query = ContactQuery::default();
        assert_eq!((query.page(), query.limit(), query.offset()), (1, 10, 0));
        assert_eq!(query.search(), "");
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let query = ContactQuery {
            page: Some(2),
            limit: Some(5),
            search: None,
        };
        assert_eq!(query.offset(), 5);
    }

    #[test]
    fn offset_saturates_for_huge_pages() {
        let query = ContactQuery {
            page: Some(i64::MAX),
            limit: Some(MAX_LIMIT),
            search: None,
        };
        assert_eq!(query.offset(), i64::MAX);
    }

    #[test]
    fn changes_serialize_only_supplied_fields() {
        let changes = ContactChanges {
            phone: Some("555".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&changes).unwrap(), serde_json::json!({ "phone": "555" }));
        assert!(!changes.is_empty());
        assert!(ContactChanges::default().is_empty());
    }
}
