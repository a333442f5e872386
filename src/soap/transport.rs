//! SOAP transport: dispatches one envelope per call over HTTP

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::envelope;
use super::header::HeaderContext;
use super::{TransportError, TransportResult};
use crate::operation::OperationRequest;

/// Something that can carry one SOAP call to the service
///
/// Header state is passed in per call and never kept by the transport.
#[async_trait]
pub trait SoapTransport: Send + Sync {
    /// Send the request under the given headers and return the raw
    /// response body
    async fn dispatch(
        &self,
        context: &HeaderContext,
        request: &OperationRequest<'_>,
    ) -> TransportResult<String>;
}

/// HTTP-level options applied when the transport is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Route all traffic through this proxy
    #[serde(default)]
    pub proxy: Option<String>,

    /// Skip TLS certificate verification
    /// WARNING: Only enable against a trusted test endpoint
    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    concat!("gus_bir_client/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            timeout_ms: default_timeout_ms(),
            proxy: None,
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }
}

/// SOAP 1.2 over HTTP using `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport posting to `base_url`
    ///
    /// # Errors
    /// Fails if the URL does not parse, the proxy URL is invalid, or the
    /// HTTP client cannot be constructed.
    pub fn new(base_url: &str, options: &TransportOptions) -> TransportResult<Self> {
        let endpoint = Url::parse(base_url)?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(options.connect_timeout_ms))
            .timeout(Duration::from_millis(options.timeout_ms))
            .user_agent(options.user_agent.as_str())
            .danger_accept_invalid_certs(options.accept_invalid_certs);

        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        if options.accept_invalid_certs {
            warn!("TLS certificate verification disabled for {}", endpoint);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SoapTransport for HttpTransport {
    async fn dispatch(
        &self,
        context: &HeaderContext,
        request: &OperationRequest<'_>,
    ) -> TransportResult<String> {
        let body = envelope::encode_request(context, request)?;
        let action = context.action().unwrap_or_default();

        let mut http = self
            .client
            .post(self.endpoint.clone())
            .header(
                CONTENT_TYPE,
                format!("application/soap+xml; charset=utf-8; action=\"{action}\""),
            )
            .body(body);

        for (name, value) in context.http_headers() {
            http = http.header(name, value);
        }

        let response = http.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(
            operation = %request.operation(),
            status = status.as_u16(),
            bytes = text.len(),
            "SOAP response received"
        );

        // Faults arrive with a 500 status but still carry an envelope
        if !status.is_success() && envelope::extract_envelope(&text).is_none() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}
