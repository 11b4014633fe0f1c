// jmap-client/src/lib.rs
pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod id;
pub mod methods;
pub mod session;
pub mod types;

pub use client::{JmapClient, DEFAULT_TIMEOUT};
pub use envelope::{Invocation, Method, Request, Response};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpError};
pub use id::Id;
pub use methods::{
    GetRequest, GetResponse, JmapObject, SetError, SetOutcome, SetRequest, SetResponse,
};
pub use session::fetch_session;
pub use types::{AccountData, Field, Session, UtcDate, CORE_CAPABILITY};

// Re-export error types separately
pub use error::error_types;
pub use error::MethodError;

// Re-export reqwest client when feature is enabled
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
