//! SOAP plumbing for the registry service
//!
//! - `header` - per-call header context (WS-Addressing + `sid`)
//! - `envelope` - SOAP 1.2 request encoding and response decoding
//! - `transport` - the dispatch seam and its HTTP implementation
//! - `xml` - generic result tree for envelopes and nested payloads

pub mod envelope;
mod header;
mod transport;
pub mod xml;

pub use header::{HeaderContext, SESSION_HEADER, SoapHeader, WS_ADDRESSING_NS};
pub use transport::{HttpTransport, SoapTransport, TransportOptions};
pub use xml::{ResultNode, XmlError};

use thiserror::Error;

/// Failures at the SOAP/HTTP layer, surfaced to callers unchanged
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("SOAP fault {code}: {reason}")]
    Fault { code: String, reason: String },

    #[error("Malformed SOAP envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type TransportResult<T> = Result<T, TransportError>;
