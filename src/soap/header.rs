//! Per-call header context
//!
//! Every remote call builds a fresh [`HeaderContext`] and hands it to the
//! transport by reference. Nothing is stored on the transport between
//! calls, so headers from one call cannot reach the next.

use quick_xml::escape::escape;

/// WS-Addressing namespace used for the `Action` and `To` headers
pub const WS_ADDRESSING_NS: &str = "http://www.w3.org/2005/08/addressing";

/// HTTP header carrying the session id on authenticated calls
pub const SESSION_HEADER: &str = "sid";

/// A single SOAP envelope header block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapHeader {
    pub namespace: String,
    pub name: String,
    pub value: String,
    pub must_understand: bool,
}

impl SoapHeader {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value: value.into(),
            must_understand: false,
        }
    }

    /// Append this header as XML, declaring its namespace on the element
    ///
    /// `envelope_prefix` is the prefix bound to the SOAP envelope namespace
    /// and qualifies the `mustUnderstand` attribute.
    pub(crate) fn write_xml(&self, envelope_prefix: &str, out: &mut String) {
        out.push_str("<h:");
        out.push_str(&self.name);
        out.push_str(" xmlns:h=\"");
        out.push_str(&escape(self.namespace.as_str()));
        out.push('"');
        if self.must_understand {
            out.push(' ');
            out.push_str(envelope_prefix);
            out.push_str(":mustUnderstand=\"true\"");
        }
        out.push('>');
        out.push_str(&escape(self.value.as_str()));
        out.push_str("</h:");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Headers scoped to exactly one remote call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderContext {
    soap_headers: Vec<SoapHeader>,
    session_id: Option<String>,
}

impl HeaderContext {
    /// Build the header set for one call
    ///
    /// # Arguments
    /// * `action` - WS-Addressing action URI of the operation
    /// * `to` - destination address placed in the `To` header
    /// * `session_id` - attached as the `sid` HTTP header when present
    pub fn prepare(action: &str, to: &str, session_id: Option<&str>) -> Self {
        Self {
            soap_headers: vec![
                SoapHeader::new(WS_ADDRESSING_NS, "Action", action),
                SoapHeader::new(WS_ADDRESSING_NS, "To", to),
            ],
            session_id: session_id.map(str::to_owned),
        }
    }

    pub fn soap_headers(&self) -> &[SoapHeader] {
        &self.soap_headers
    }

    /// Value of the WS-Addressing `Action` header
    pub fn action(&self) -> Option<&str> {
        self.addressing_header("Action")
    }

    /// Value of the WS-Addressing `To` header
    pub fn to(&self) -> Option<&str> {
        self.addressing_header("To")
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Transport-level (HTTP) headers for this call
    pub fn http_headers(&self) -> Vec<(&'static str, &str)> {
        self.session_id
            .as_deref()
            .map(|sid| vec![(SESSION_HEADER, sid)])
            .unwrap_or_default()
    }

    fn addressing_header(&self, name: &str) -> Option<&str> {
        self.soap_headers
            .iter()
            .find(|h| h.namespace == WS_ADDRESSING_NS && h.name == name)
            .map(|h| h.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_sets_addressing_headers() {
        let ctx = HeaderContext::prepare("urn:action", "https://example.test/svc", None);
        assert_eq!(ctx.action(), Some("urn:action"));
        assert_eq!(ctx.to(), Some("https://example.test/svc"));
        assert_eq!(ctx.session_id(), None);
        assert!(ctx.http_headers().is_empty());
        assert!(ctx.soap_headers().iter().all(|h| !h.must_understand));
    }

    #[test]
    fn session_id_goes_to_http_headers_only() {
        let ctx = HeaderContext::prepare("urn:action", "urn:to", Some("abc123"));
        assert_eq!(ctx.http_headers(), vec![("sid", "abc123")]);
        assert_eq!(ctx.soap_headers().len(), 2);
        assert!(ctx.soap_headers().iter().all(|h| h.value != "abc123"));
    }

    #[test]
    fn header_xml_is_escaped() {
        let mut out = String::new();
        SoapHeader {
            must_understand: true,
            ..SoapHeader::new(WS_ADDRESSING_NS, "To", "https://x.test/?a=1&b=2")
        }
        .write_xml("soap", &mut out);
        assert_eq!(
            out,
            "<h:To xmlns:h=\"http://www.w3.org/2005/08/addressing\" soap:mustUnderstand=\"true\">https://x.test/?a=1&amp;b=2</h:To>"
        );
    }
}
