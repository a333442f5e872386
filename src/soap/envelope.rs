//! SOAP 1.2 envelope encoding and response decoding

use tracing::debug;

use super::header::HeaderContext;
use super::xml::{self, ResultNode};
use super::{TransportError, TransportResult};
use crate::operation::{Operation, OperationRequest};

/// SOAP 1.2 envelope namespace
pub const SOAP_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

const ENVELOPE_PREFIX: &str = "soap";

/// Build the complete request envelope for one call
pub fn encode_request(
    context: &HeaderContext,
    request: &OperationRequest<'_>,
) -> TransportResult<String> {
    let body = request.body_xml()?;
    let mut out = String::with_capacity(body.len() + 512);

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    out.push_str("<soap:Envelope xmlns:soap=\"");
    out.push_str(SOAP_ENVELOPE_NS);
    out.push_str("\"><soap:Header>");
    for header in context.soap_headers() {
        header.write_xml(ENVELOPE_PREFIX, &mut out);
    }
    out.push_str("</soap:Header><soap:Body>");
    out.push_str(&body);
    out.push_str("</soap:Body></soap:Envelope>");

    Ok(out)
}

/// Locate the SOAP envelope inside a response body
///
/// The service answers with MTOM/XOP `multipart/related` bodies, so the
/// envelope may sit between MIME boundaries. Returns the slice from the
/// first `Envelope` start tag through the end tag with the same qualified
/// name (`<s:Envelope ...>` closes at `</s:Envelope>`).
pub fn extract_envelope(body: &str) -> Option<&str> {
    let (start, name) = find_envelope_start(body)?;
    let end_tag = format!("</{name}>");
    let end = body[start..].find(&end_tag)? + start + end_tag.len();
    Some(&body[start..end])
}

fn find_envelope_start(body: &str) -> Option<(usize, &str)> {
    let mut offset = 0;
    while let Some(pos) = body[offset..].find('<') {
        let tag_start = offset + pos;
        let rest = &body[tag_start + 1..];
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        if name.rsplit(':').next() == Some("Envelope") {
            return Some((tag_start, name));
        }
        offset = tag_start + 1;
    }
    None
}

/// Decode a response envelope and return the text of the operation's
/// result field
///
/// A SOAP fault becomes [`TransportError::Fault`]. A missing or nil result
/// field reads as an empty string.
pub fn decode_response(raw: &str, operation: Operation) -> TransportResult<String> {
    let envelope = extract_envelope(raw).ok_or_else(|| {
        TransportError::MalformedEnvelope("response contains no SOAP envelope".into())
    })?;

    let root = xml::parse(envelope).map_err(|e| TransportError::MalformedEnvelope(e.to_string()))?;

    let body = root
        .child("Body")
        .ok_or_else(|| TransportError::MalformedEnvelope("envelope has no Body".into()))?;

    if let Some(fault) = body.child("Fault") {
        return Err(fault_error(fault));
    }

    let response = body.child(operation.response_element()).ok_or_else(|| {
        TransportError::MalformedEnvelope(format!(
            "Body has no {} element",
            operation.response_element()
        ))
    })?;

    match response.child(operation.result_field()) {
        Some(result) => Ok(result.text().to_string()),
        None => {
            debug!(operation = %operation, "result field absent, reading as empty");
            Ok(String::new())
        }
    }
}

fn fault_error(fault: &ResultNode) -> TransportError {
    let code = fault
        .path(&["Code", "Value"])
        .or_else(|| fault.child("faultcode"))
        .map(|n| n.text().to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let reason = fault
        .path(&["Reason", "Text"])
        .or_else(|| fault.child("faultstring"))
        .map(|n| n.text().to_string())
        .unwrap_or_default();

    TransportError::Fault { code, reason }
}
