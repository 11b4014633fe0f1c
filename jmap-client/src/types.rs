// jmap-client/src/types.rs
use crate::id::Id;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// RFC 3339 timestamp in UTC, the JMAP `UTCDate` type
pub type UtcDate = chrono::DateTime<chrono::Utc>;

/// Capability URI for the JMAP core protocol
pub const CORE_CAPABILITY: &str = "urn:ietf:params:jmap:core";

/// JMAP Session response (RFC 8620 Section 2)
///
/// Every field is required; a session document missing any of them is
/// rejected as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Capabilities supported by the server, keyed by URI
    pub capabilities: HashMap<String, serde_json::Value>,
    /// The accounts available to the user
    pub accounts: HashMap<Id, AccountData>,
    /// Default account per capability
    #[serde(rename = "primaryAccounts")]
    pub primary_accounts: HashMap<String, Id>,
    pub username: String,
    /// The URL to use for JMAP API requests
    #[serde(rename = "apiUrl")]
    pub api_url: String,
    /// Download URL template for binary data
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    /// Upload URL template for files
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    /// Event source URL for push notifications
    #[serde(rename = "eventSourceUrl")]
    pub event_source_url: String,
    pub state: String,
}

impl Session {
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains_key(capability)
    }

    pub fn primary_account(&self, capability: &str) -> Option<&Id> {
        self.primary_accounts.get(capability)
    }

    pub fn account(&self, id: &Id) -> Option<&AccountData> {
        self.accounts.get(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    pub name: String,
    #[serde(rename = "isPersonal")]
    pub is_personal: bool,
    #[serde(rename = "isReadOnly")]
    pub is_read_only: bool,
    #[serde(rename = "accountCapabilities")]
    pub account_capabilities: HashMap<String, serde_json::Value>,
}

/// A property that may be left out, sent as `null`, or sent with a value.
///
/// Create and update payloads use this instead of `Option` so that "do not
/// send" and "reset to the server default" stay distinct. Fields of this
/// type need `#[serde(default, skip_serializing_if = "Field::is_absent")]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reached when the skip attribute is missing
            Field::Absent | Field::Null => serializer.serialize_none(),
            Field::Value(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Field::Value(v),
            None => Field::Null,
        })
    }
}
