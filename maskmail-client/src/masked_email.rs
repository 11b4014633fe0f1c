use jmap_client::{Error, Field, Id, JmapObject, UtcDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability URI of the Fastmail masked email extension
pub const MASKED_EMAIL_CAPABILITY: &str = "https://www.fastmail.com/dev/maskedemail";

/// Masked Email (Fastmail extension)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskedEmail {
    pub id: Id,
    pub email: String,
    #[serde(default)]
    pub state: Option<MaskedEmailState>,
    #[serde(rename = "forDomain", default)]
    pub for_domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "lastMessageAt", default)]
    pub last_message_at: Option<UtcDate>,
    #[serde(rename = "createdAt")]
    pub created_at: UtcDate,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "emailPrefix", default)]
    pub email_prefix: Option<String>,
}

impl JmapObject for MaskedEmail {
    const NAME: &'static str = "MaskedEmail";
    const CAPABILITY: &'static str = MASKED_EMAIL_CAPABILITY;
    type Patch = PartialMaskedEmail;

    fn id(&self) -> &Id {
        &self.id
    }
}

/// Masked Email state (Fastmail extension)
///
/// `pending` addresses turn `enabled` once they receive mail; `deleted` is
/// terminal. Transitions are enforced by the server only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaskedEmailState {
    Pending,
    Enabled,
    Disabled,
    Deleted,
}

impl MaskedEmailState {
    pub const ALL: [MaskedEmailState; 4] = [
        MaskedEmailState::Pending,
        MaskedEmailState::Enabled,
        MaskedEmailState::Disabled,
        MaskedEmailState::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for MaskedEmailState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaskedEmailState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                Error::validation(format!(
                    "unknown masked email state {:?} (expected pending, enabled, disabled or deleted)",
                    s
                ))
            })
    }
}

/// Create or update payload for a masked email
///
/// Only fields that are not [`Field::Absent`] go on the wire, so a create
/// carrying just `state`, `forDomain` and `description` leaves every other
/// property to the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialMaskedEmail {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub state: Field<MaskedEmailState>,
    #[serde(rename = "forDomain", default, skip_serializing_if = "Field::is_absent")]
    pub for_domain: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,
    #[serde(rename = "emailPrefix", default, skip_serializing_if = "Field::is_absent")]
    pub email_prefix: Field<String>,
}

impl PartialMaskedEmail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, state: MaskedEmailState) -> Self {
        self.state = Field::Value(state);
        self
    }

    pub fn for_domain(mut self, domain: impl Into<String>) -> Self {
        self.for_domain = Field::Value(domain.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Field::Value(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Field::Value(url.into());
        self
    }

    pub fn email_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.email_prefix = Field::Value(prefix.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_masked_email_deserialization() {
        let value = json!({
            "id": "masked-1",
            "email": "dull.tree1234@fastmail.com",
            "state": "enabled",
            "forDomain": "https://example.com",
            "description": "shopping",
            "lastMessageAt": "2024-03-01T12:00:00Z",
            "createdAt": "2024-01-15T08:30:00Z",
            "createdBy": "maskmail",
            "url": null,
            "emailPrefix": "shop"
        });
        let me: MaskedEmail = serde_json::from_value(value).unwrap();
        assert_eq!(me.id.as_str(), "masked-1");
        assert_eq!(me.state, Some(MaskedEmailState::Enabled));
        assert_eq!(me.for_domain.as_deref(), Some("https://example.com"));
        assert!(me.last_message_at.is_some());
        assert_eq!(me.url, None);
        assert_eq!(me.created_at.to_rfc3339(), "2024-01-15T08:30:00+00:00");
    }

    #[test]
    fn test_masked_email_state_may_be_absent() {
        let value = json!({
            "id": "masked-1",
            "email": "a@b.c",
            "createdAt": "2024-01-15T08:30:00Z",
            "createdBy": "maskmail"
        });
        let me: MaskedEmail = serde_json::from_value(value).unwrap();
        assert_eq!(me.state, None);
        assert_eq!(me.description, None);
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let value = json!({
            "id": "masked-1",
            "email": "a@b.c",
            "state": "archived",
            "createdAt": "2024-01-15T08:30:00Z",
            "createdBy": "maskmail"
        });
        assert!(serde_json::from_value::<MaskedEmail>(value).is_err());
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let value = json!({
            "id": "masked-1",
            "email": "a@b.c",
            "createdAt": "yesterday",
            "createdBy": "maskmail"
        });
        assert!(serde_json::from_value::<MaskedEmail>(value).is_err());
    }

    #[test]
    fn test_missing_created_by_is_rejected() {
        let value = json!({
            "id": "masked-1",
            "email": "a@b.c",
            "createdAt": "2024-01-15T08:30:00Z"
        });
        assert!(serde_json::from_value::<MaskedEmail>(value).is_err());
    }

    #[test]
    fn test_partial_sends_only_set_fields() {
        let create = PartialMaskedEmail::new()
            .state(MaskedEmailState::Pending)
            .for_domain("example.com")
            .description("test");
        assert_eq!(
            serde_json::to_value(&create).unwrap(),
            json!({"state": "pending", "forDomain": "example.com", "description": "test"})
        );
    }

    #[test]
    fn test_partial_distinguishes_empty_from_absent() {
        let patch = PartialMaskedEmail {
            description: Field::Value(String::new()),
            url: Field::Null,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"description": "", "url": null})
        );
    }

    #[test]
    fn test_state_from_str() {
        assert_eq!(
            "disabled".parse::<MaskedEmailState>().unwrap(),
            MaskedEmailState::Disabled
        );
        assert!("Disabled".parse::<MaskedEmailState>().is_err());
        for state in MaskedEmailState::ALL {
            assert_eq!(state.to_string().parse::<MaskedEmailState>().unwrap(), state);
        }
    }
}
