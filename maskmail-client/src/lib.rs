pub mod client;
pub mod config;
pub mod masked_email;

pub use client::{Change, MaskmailClient, FASTMAIL_SESSION_URL, NEW_MASKED_EMAIL};
pub use config::{Config, Overrides};
pub use masked_email::{
    MaskedEmail, MaskedEmailState, PartialMaskedEmail, MASKED_EMAIL_CAPABILITY,
};

// Re-export JMAP types for convenience
pub use jmap_client::{
    error_types, Error, Field, GetResponse, Id, MethodError, Result, Session, SetError,
    SetResponse,
};
