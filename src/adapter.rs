//! Registry client adapter
//!
//! Translates the five logical registry operations into SOAP calls against
//! one fixed endpoint.
//!
//! # Call protocol
//!
//! Every remote call follows the same steps:
//! 1. Build a fresh [`HeaderContext`] with the operation's `Action` and the
//!    configured `To` address (previous call state is never reused)
//! 2. Attach the session id as the `sid` HTTP header when one is supplied
//! 3. Dispatch the typed request through the [`SoapTransport`]
//! 4. Read the single `<Operation>Result` field from the response
//!
//! `search` and `get_full_data` results are XML documents encoded as
//! strings. They are decoded into a [`ResultNode`]. Any decode failure means
//! "no data found" and is reported as [`AdapterError::NotFound`], never as a
//! transport error.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::Config;
use crate::operation::{Operation, OperationRequest, SearchParameters};
use crate::soap::{
    HeaderContext, HttpTransport, ResultNode, SoapTransport, TransportOptions, TransportResult,
    envelope, xml,
};
use crate::utils::{AdapterError, AdapterResult, redact};

/// Element holding each record in a search result
const SEARCH_RECORD: &str = "dane";

/// Operations offered by the registry service
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Open a session and return its id
    async fn login(&self, user_key: &str) -> AdapterResult<String>;

    /// Close a session; returns the service's success flag
    async fn logout(&self, session_id: &str) -> AdapterResult<bool>;

    /// Search records and return the first `dane` element of the result
    async fn search(
        &self,
        session_id: &str,
        parameters: &SearchParameters,
    ) -> AdapterResult<ResultNode>;

    /// Download a full report for one REGON
    async fn get_full_data(
        &self,
        session_id: &str,
        regon: &str,
        report_type: &str,
    ) -> AdapterResult<ResultNode>;

    /// Read a service metadata value, returned verbatim
    async fn get_value(&self, session_id: Option<&str>, param_name: &str) -> AdapterResult<String>;
}

/// SOAP implementation of [`RegistryAdapter`]
pub struct SoapAdapter<T = HttpTransport> {
    transport: T,
    address: String,
}

impl SoapAdapter<HttpTransport> {
    /// Create an adapter talking HTTP to `base_url`
    ///
    /// # Arguments
    /// * `base_url` - service URL requests are posted to
    /// * `address` - destination placed in the WS-Addressing `To` header
    /// * `options` - HTTP options; defaults apply when `None`
    pub fn new(
        base_url: &str,
        address: impl Into<String>,
        options: Option<TransportOptions>,
    ) -> TransportResult<Self> {
        let options = options.unwrap_or_default();
        let transport = HttpTransport::new(base_url, &options)?;
        Ok(Self::with_transport(transport, address))
    }

    pub fn from_config(config: &Config) -> TransportResult<Self> {
        Self::new(
            &config.base_url,
            config.address.clone(),
            Some(config.transport.clone()),
        )
    }
}

impl<T: SoapTransport> SoapAdapter<T> {
    /// Create an adapter over any transport
    pub fn with_transport(transport: T, address: impl Into<String>) -> Self {
        Self {
            transport,
            address: address.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Destination address sent in the `To` header
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Search records and return every `dane` element of the result
    ///
    /// Batch searches (`Nipy`, `Regony9zn`, ...) can match several records.
    /// A result with no `dane` element is reported as
    /// [`AdapterError::NotFound`].
    pub async fn search_all(
        &self,
        session_id: &str,
        parameters: &SearchParameters,
    ) -> AdapterResult<Vec<ResultNode>> {
        let records = self
            .search_payload(session_id, parameters)
            .await?
            .into_children_named(SEARCH_RECORD);

        if records.is_empty() {
            debug!("search payload has no {} elements", SEARCH_RECORD);
            return Err(AdapterError::NotFound);
        }
        Ok(records)
    }

    async fn search_payload(
        &self,
        session_id: &str,
        parameters: &SearchParameters,
    ) -> AdapterResult<ResultNode> {
        let payload = self
            .call(OperationRequest::Search { parameters }, Some(session_id))
            .await?;
        decode_payload(Operation::Search, &payload)
    }

    fn prepare_header(&self, operation: Operation, session_id: Option<&str>) -> HeaderContext {
        HeaderContext::prepare(operation.action(), &self.address, session_id)
    }

    async fn call(
        &self,
        request: OperationRequest<'_>,
        session_id: Option<&str>,
    ) -> TransportResult<String> {
        let operation = request.operation();
        let context = self.prepare_header(operation, session_id);

        debug!(
            operation = %operation,
            session = %session_id.map(redact).unwrap_or_else(|| "-".to_string()),
            "dispatching SOAP call"
        );

        let raw = self.transport.dispatch(&context, &request).await?;
        envelope::decode_response(&raw, operation)
    }
}

/// Decode an XML-string payload; every failure means "no data found"
fn decode_payload(operation: Operation, payload: &str) -> AdapterResult<ResultNode> {
    xml::parse(payload).map_err(|e| {
        debug!(operation = %operation, error = %e, "payload not decodable, reporting no data");
        AdapterError::NotFound
    })
}

/// `xs:boolean` lexical forms: `true`/`1` are true
fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[async_trait]
impl<T: SoapTransport> RegistryAdapter for SoapAdapter<T> {
    async fn login(&self, user_key: &str) -> AdapterResult<String> {
        let session_id = self
            .call(OperationRequest::Login { user_key }, None)
            .await?;
        info!(
            key = %redact(user_key),
            session = %redact(&session_id),
            "logged in to registry"
        );
        Ok(session_id)
    }

    async fn logout(&self, session_id: &str) -> AdapterResult<bool> {
        let result = self
            .call(OperationRequest::Logout { session_id }, None)
            .await?;
        let logged_out = parse_flag(&result);
        info!(session = %redact(session_id), logged_out, "logged out of registry");
        Ok(logged_out)
    }

    async fn search(
        &self,
        session_id: &str,
        parameters: &SearchParameters,
    ) -> AdapterResult<ResultNode> {
        self.search_all(session_id, parameters)
            .await?
            .into_iter()
            .next()
            .ok_or(AdapterError::NotFound)
    }

    async fn get_full_data(
        &self,
        session_id: &str,
        regon: &str,
        report_type: &str,
    ) -> AdapterResult<ResultNode> {
        let payload = self
            .call(
                OperationRequest::FullReport {
                    regon,
                    report_name: report_type,
                },
                Some(session_id),
            )
            .await?;
        decode_payload(Operation::FullReport, &payload)
    }

    async fn get_value(&self, session_id: Option<&str>, param_name: &str) -> AdapterResult<String> {
        let value = self
            .call(OperationRequest::GetValue { param_name }, session_id)
            .await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_accepts_xs_boolean_forms() {
        assert!(parse_flag("true"));
        assert!(parse_flag("True"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn payload_decode_failure_is_not_found() {
        assert!(matches!(
            decode_payload(Operation::Search, ""),
            Err(AdapterError::NotFound)
        ));
        assert!(matches!(
            decode_payload(Operation::FullReport, "<root><dane>"),
            Err(AdapterError::NotFound)
        ));
    }

    #[test]
    fn http_adapter_keeps_address_separate_from_url() {
        let adapter = SoapAdapter::new(
            "https://example.test/svc",
            "https://public.example.test/svc",
            None,
        )
        .unwrap();
        assert_eq!(adapter.address(), "https://public.example.test/svc");
        assert_eq!(adapter.transport().endpoint().as_str(), "https://example.test/svc");
    }
}
