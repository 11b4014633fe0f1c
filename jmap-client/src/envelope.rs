// jmap-client/src/envelope.rs
//! JMAP request/response envelope (RFC 8620 Section 3.3 and 3.4).
//!
//! Each method call travels as a `[name, arguments, callId]` triple. The
//! envelope is generic over the argument type, and [`Method`] ties a request
//! type to its method name, capabilities and response type.

use crate::error::{Error, MethodError, Result};
use serde::de::DeserializeOwned;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Method name the server uses for a method-level error
pub const ERROR_METHOD: &str = "error";

/// A typed JMAP method call
pub trait Method: Serialize {
    type Response: DeserializeOwned;

    /// Wire name, e.g. `MaskedEmail/get`
    fn name() -> String;

    /// Capability URIs to declare in `using`
    fn using() -> Vec<String>;
}

/// One `[name, arguments, callId]` triple
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation<A> {
    pub name: String,
    pub arguments: A,
    pub call_id: String,
}

impl<A> Invocation<A> {
    pub fn new(name: impl Into<String>, arguments: A, call_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
            call_id: call_id.into(),
        }
    }
}

impl<A: Serialize> Serialize for Invocation<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.name)?;
        tuple.serialize_element(&self.arguments)?;
        tuple.serialize_element(&self.call_id)?;
        tuple.end()
    }
}

impl<'de, A: Deserialize<'de>> Deserialize<'de> for Invocation<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // A 3-tuple rejects both short and long arrays
        let (name, arguments, call_id) = <(String, A, String)>::deserialize(deserializer)?;
        Ok(Self {
            name,
            arguments,
            call_id,
        })
    }
}

/// JMAP request object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request<A> {
    pub using: Vec<String>,
    #[serde(rename = "methodCalls")]
    pub method_calls: Vec<Invocation<A>>,
}

impl<A> Request<A> {
    /// Request carrying exactly one method call
    pub fn single(using: Vec<String>, call: Invocation<A>) -> Self {
        Self {
            using,
            method_calls: vec![call],
        }
    }
}

/// JMAP response object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response<A> {
    #[serde(rename = "sessionState")]
    pub session_state: String,
    #[serde(rename = "methodResponses")]
    pub method_responses: Vec<Invocation<A>>,
}

/// Wrap a single method call and serialize it
pub fn encode<M: Method>(request: &M, call_id: &str) -> Result<Vec<u8>> {
    let envelope = Request::single(M::using(), Invocation::new(M::name(), request, call_id));
    serde_json::to_vec(&envelope).map_err(Into::into)
}

/// Parse a response body and return the typed arguments at index 0
pub fn decode<M: Method>(body: &[u8], call_id: &str) -> Result<M::Response> {
    let response: Response<serde_json::Value> = serde_json::from_slice(body)?;

    let first = response
        .method_responses
        .into_iter()
        .next()
        .ok_or_else(|| Error::validation("empty methodResponses"))?;

    if first.call_id != call_id {
        return Err(Error::validation(format!(
            "expected call id {:?}, got {:?}",
            call_id, first.call_id
        )));
    }

    if first.name == ERROR_METHOD {
        let err: MethodError = serde_json::from_value(first.arguments)?;
        return Err(Error::Method(err));
    }

    let expected = M::name();
    if first.name != expected {
        return Err(Error::validation(format!(
            "expected {} response, got {}",
            expected, first.name
        )));
    }

    serde_json::from_value(first.arguments).map_err(Into::into)
}
