//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use gus_bir_client::{
    HeaderContext, Operation, OperationRequest, SoapTransport, TransportError, TransportResult,
};
use parking_lot::Mutex;
use quick_xml::escape::escape;
use std::collections::VecDeque;

pub const ADDRESS: &str = "https://registry.example.test/wsBIR/UslugaBIRzewnPubl.svc";

/// One call as seen by the transport at dispatch time
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: Operation,
    pub context: HeaderContext,
    pub body: String,
}

/// Transport that records every dispatch and replays canned responses
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response whose result field holds `result`
    pub fn reply(self, operation: Operation, result: &str) -> Self {
        self.responses.lock().push_back(result_envelope(operation, result));
        self
    }

    /// Queue a raw response body
    pub fn reply_raw(self, body: impl Into<String>) -> Self {
        self.responses.lock().push_back(body.into());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SoapTransport for RecordingTransport {
    async fn dispatch(
        &self,
        context: &HeaderContext,
        request: &OperationRequest<'_>,
    ) -> TransportResult<String> {
        self.calls.lock().push(RecordedCall {
            operation: request.operation(),
            context: context.clone(),
            body: request.body_xml()?,
        });

        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::MalformedEnvelope("no canned response left".into()))
    }
}

pub fn envelope(body: &str) -> String {
    format!(
        "<s:Envelope xmlns:s=\"http://www.w3.org/2003/05/soap-envelope\" \
         xmlns:a=\"http://www.w3.org/2005/08/addressing\">\
         <s:Header><a:Action s:mustUnderstand=\"1\">urn:reply</a:Action></s:Header>\
         <s:Body>{body}</s:Body></s:Envelope>"
    )
}

/// Response envelope carrying `result` in the operation's result field
pub fn result_envelope(operation: Operation, result: &str) -> String {
    envelope(&format!(
        "<{response} xmlns=\"{ns}\"><{field}>{value}</{field}></{response}>",
        response = operation.response_element(),
        ns = operation.namespace(),
        field = operation.result_field(),
        value = escape(result),
    ))
}

pub fn fault_envelope(code: &str, reason: &str) -> String {
    envelope(&format!(
        "<s:Fault><s:Code><s:Value>{code}</s:Value></s:Code>\
         <s:Reason><s:Text xml:lang=\"en-US\">{reason}</s:Text></s:Reason></s:Fault>"
    ))
}
