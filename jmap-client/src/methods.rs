// jmap-client/src/methods.rs
//! Standard `/get` and `/set` methods (RFC 8620 Section 5.1 and 5.3),
//! generic over the object type.

use crate::envelope::Method;
use crate::error::{Error, Result};
use crate::id::Id;
use crate::types::CORE_CAPABILITY;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::marker::PhantomData;

/// A JMAP data type that supports `/get` and `/set`
pub trait JmapObject: DeserializeOwned + Debug + Clone {
    /// Type name, used as the method prefix
    const NAME: &'static str;
    /// Capability URI the type belongs to
    const CAPABILITY: &'static str;
    /// Partial object used for both create and update
    type Patch: Serialize + Debug + Clone;

    fn id(&self) -> &Id;
}

/// `Foo/get` arguments
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct GetRequest<T> {
    #[serde(rename = "accountId")]
    pub account_id: Id,
    /// `None` is sent as `null` and means "all"
    pub ids: Option<Vec<Id>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
    #[serde(skip)]
    object: PhantomData<fn() -> T>,
}

impl<T> GetRequest<T> {
    pub fn new(account_id: Id) -> Self {
        Self {
            account_id,
            ids: None,
            properties: None,
            object: PhantomData,
        }
    }

    pub fn ids(mut self, ids: Option<Vec<Id>>) -> Self {
        self.ids = ids;
        self
    }

    pub fn properties(mut self, properties: Option<Vec<String>>) -> Self {
        self.properties = properties;
        self
    }
}

impl<T: JmapObject> Method for GetRequest<T> {
    type Response = GetResponse<T>;

    fn name() -> String {
        format!("{}/get", T::NAME)
    }

    fn using() -> Vec<String> {
        vec![CORE_CAPABILITY.to_string(), T::CAPABILITY.to_string()]
    }
}

/// `Foo/get` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse<T> {
    #[serde(rename = "accountId")]
    pub account_id: Id,
    pub state: String,
    pub list: Vec<T>,
    #[serde(rename = "notFound")]
    pub not_found: Vec<Id>,
}

impl<T: JmapObject> GetResponse<T> {
    /// Check that `notFound` is consistent with the request and the list
    pub fn check_not_found(&self, requested: Option<&[Id]>) -> Result<()> {
        for id in &self.not_found {
            if self.list.iter().any(|item| item.id() == id) {
                return Err(Error::validation(format!(
                    "{} is both returned and not found",
                    id
                )));
            }
            if let Some(requested) = requested {
                if !requested.contains(id) {
                    return Err(Error::validation(format!(
                        "{} reported as not found but was never requested",
                        id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// `Foo/set` arguments
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct SetRequest<T: JmapObject> {
    #[serde(rename = "accountId")]
    pub account_id: Id,
    /// Fail with `stateMismatch` unless the server is in this state
    #[serde(rename = "ifInState", skip_serializing_if = "Option::is_none")]
    pub if_in_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<HashMap<Id, T::Patch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<HashMap<Id, T::Patch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destroy: Option<Vec<Id>>,
}

impl<T: JmapObject> SetRequest<T> {
    pub fn new(account_id: Id) -> Self {
        Self {
            account_id,
            if_in_state: None,
            create: None,
            update: None,
            destroy: None,
        }
    }

    pub fn if_in_state(mut self, state: impl Into<String>) -> Self {
        self.if_in_state = Some(state.into());
        self
    }

    pub fn create(mut self, creation_id: Id, object: T::Patch) -> Self {
        self.create
            .get_or_insert_with(HashMap::new)
            .insert(creation_id, object);
        self
    }

    pub fn update(mut self, id: Id, patch: T::Patch) -> Self {
        self.update.get_or_insert_with(HashMap::new).insert(id, patch);
        self
    }

    pub fn destroy(mut self, id: Id) -> Self {
        self.destroy.get_or_insert_with(Vec::new).push(id);
        self
    }
}

impl<T: JmapObject> Method for SetRequest<T> {
    type Response = SetResponse<T>;

    fn name() -> String {
        format!("{}/set", T::NAME)
    }

    fn using() -> Vec<String> {
        vec![CORE_CAPABILITY.to_string(), T::CAPABILITY.to_string()]
    }
}

/// Per-item failure inside a `/set` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Offending properties for `invalidProperties`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
}

impl std::fmt::Display for SetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.error_type, description),
            None => write!(f, "{}", self.error_type),
        }
    }
}

/// `Foo/set` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetResponse<T> {
    #[serde(rename = "accountId")]
    pub account_id: Id,
    #[serde(rename = "oldState")]
    pub old_state: Option<String>,
    #[serde(rename = "newState")]
    pub new_state: Option<String>,
    pub created: Option<HashMap<Id, T>>,
    /// `null` values mean "updated, nothing to report"
    pub updated: Option<HashMap<Id, Option<T>>>,
    pub destroyed: Option<Vec<Id>>,
    #[serde(rename = "notCreated", default)]
    pub not_created: Option<HashMap<Id, SetError>>,
    #[serde(rename = "notUpdated", default)]
    pub not_updated: Option<HashMap<Id, SetError>>,
    #[serde(rename = "notDestroyed", default)]
    pub not_destroyed: Option<HashMap<Id, SetError>>,
}

/// What the server reported for one key of a `/set` call
#[derive(Debug, PartialEq)]
pub enum SetOutcome<'a, T> {
    /// Applied; carries the returned object when there is one
    Done(Option<&'a T>),
    Rejected(&'a SetError),
    /// The key appears in neither the success nor the failure map
    Unreported,
}

impl<T> SetResponse<T> {
    pub fn create_outcome(&self, creation_id: &str) -> SetOutcome<'_, T> {
        if let Some(obj) = self.created.as_ref().and_then(|m| m.get(creation_id)) {
            return SetOutcome::Done(Some(obj));
        }
        outcome_from_errors(self.not_created.as_ref(), creation_id)
    }

    pub fn update_outcome(&self, id: &str) -> SetOutcome<'_, T> {
        if let Some(obj) = self.updated.as_ref().and_then(|m| m.get(id)) {
            return SetOutcome::Done(obj.as_ref());
        }
        outcome_from_errors(self.not_updated.as_ref(), id)
    }

    pub fn destroy_outcome(&self, id: &str) -> SetOutcome<'_, T> {
        if self
            .destroyed
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|d| d.as_str() == id))
        {
            return SetOutcome::Done(None);
        }
        outcome_from_errors(self.not_destroyed.as_ref(), id)
    }

    /// Reject responses that report a key as both applied and failed
    pub fn check_pairing(&self) -> Result<()> {
        let created = self.created.iter().flat_map(|m| m.keys());
        check_disjoint("created", created, self.not_created.as_ref())?;

        let updated = self.updated.iter().flat_map(|m| m.keys());
        check_disjoint("updated", updated, self.not_updated.as_ref())?;

        let destroyed = self.destroyed.iter().flatten();
        check_disjoint("destroyed", destroyed, self.not_destroyed.as_ref())
    }
}

fn outcome_from_errors<'a, T>(
    errors: Option<&'a HashMap<Id, SetError>>,
    key: &str,
) -> SetOutcome<'a, T> {
    match errors.and_then(|m| m.get(key)) {
        Some(err) => SetOutcome::Rejected(err),
        None => SetOutcome::Unreported,
    }
}

fn check_disjoint<'a>(
    verb: &str,
    done: impl Iterator<Item = &'a Id>,
    failed: Option<&HashMap<Id, SetError>>,
) -> Result<()> {
    let Some(failed) = failed else {
        return Ok(());
    };
    for id in done {
        if failed.contains_key(id) {
            return Err(Error::validation(format!(
                "{} reported as both {} and failed",
                id, verb
            )));
        }
    }
    Ok(())
}
