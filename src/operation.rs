//! Remote operations of the registry service
//!
//! Each WSDL operation is a variant of [`Operation`] carrying its wire name,
//! action URI and namespace. Requests are typed per operation through
//! [`OperationRequest`], which renders its own body element.

use quick_xml::escape::escape;
use std::collections::BTreeMap;
use std::fmt;

use crate::soap::{TransportError, TransportResult};
use crate::utils::constants::{
    BIR_NS, DATA_CONTRACT_NS, PARAM_PARAM_NAME, PARAM_REGON, PARAM_REPORT_NAME, PARAM_SEARCH,
    PARAM_SESSION_ID, PARAM_USER_KEY, PUBL_NS,
};

/// Search criteria, field name to value
///
/// Ordered so requests render deterministically. The service's data
/// contract also expects its fields in alphabetical order.
pub type SearchParameters = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Logout,
    Search,
    FullReport,
    GetValue,
}

impl Operation {
    /// Case-sensitive operation name from the WSDL
    pub fn name(self) -> &'static str {
        match self {
            Operation::Login => "Zaloguj",
            Operation::Logout => "Wyloguj",
            Operation::Search => "DaneSzukaj",
            Operation::FullReport => "DanePobierzPelnyRaport",
            Operation::GetValue => "GetValue",
        }
    }

    /// WS-Addressing action URI
    pub fn action(self) -> &'static str {
        match self {
            Operation::Login => "http://CIS/BIR/PUBL/2014/07/IUslugaBIRzewnPubl/Zaloguj",
            Operation::Logout => "http://CIS/BIR/PUBL/2014/07/IUslugaBIRzewnPubl/Wyloguj",
            Operation::Search => "http://CIS/BIR/PUBL/2014/07/IUslugaBIRzewnPubl/DaneSzukaj",
            Operation::FullReport => {
                "http://CIS/BIR/PUBL/2014/07/IUslugaBIRzewnPubl/DanePobierzPelnyRaport"
            }
            Operation::GetValue => "http://CIS/BIR/2014/07/IUslugaBIR/GetValue",
        }
    }

    /// Namespace of the request and response elements
    pub fn namespace(self) -> &'static str {
        match self {
            Operation::GetValue => BIR_NS,
            _ => PUBL_NS,
        }
    }

    pub fn response_element(self) -> &'static str {
        match self {
            Operation::Login => "ZalogujResponse",
            Operation::Logout => "WylogujResponse",
            Operation::Search => "DaneSzukajResponse",
            Operation::FullReport => "DanePobierzPelnyRaportResponse",
            Operation::GetValue => "GetValueResponse",
        }
    }

    /// Name of the single result field inside the response element
    pub fn result_field(self) -> &'static str {
        match self {
            Operation::Login => "ZalogujResult",
            Operation::Logout => "WylogujResult",
            Operation::Search => "DaneSzukajResult",
            Operation::FullReport => "DanePobierzPelnyRaportResult",
            Operation::GetValue => "GetValueResult",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed parameter payload of one remote call
#[derive(Debug, Clone, Copy)]
pub enum OperationRequest<'a> {
    Login { user_key: &'a str },
    Logout { session_id: &'a str },
    Search { parameters: &'a SearchParameters },
    FullReport { regon: &'a str, report_name: &'a str },
    GetValue { param_name: &'a str },
}

impl OperationRequest<'_> {
    pub fn operation(&self) -> Operation {
        match self {
            OperationRequest::Login { .. } => Operation::Login,
            OperationRequest::Logout { .. } => Operation::Logout,
            OperationRequest::Search { .. } => Operation::Search,
            OperationRequest::FullReport { .. } => Operation::FullReport,
            OperationRequest::GetValue { .. } => Operation::GetValue,
        }
    }

    /// Render the SOAP body element for this request
    ///
    /// Fails only when a search parameter key is not a usable element name.
    pub fn body_xml(&self) -> TransportResult<String> {
        let operation = self.operation();
        let mut out = String::new();

        out.push('<');
        out.push_str(operation.name());
        out.push_str(" xmlns=\"");
        out.push_str(operation.namespace());
        out.push_str("\">");

        match self {
            OperationRequest::Login { user_key } => write_param(&mut out, PARAM_USER_KEY, user_key),
            OperationRequest::Logout { session_id } => {
                write_param(&mut out, PARAM_SESSION_ID, session_id)
            }
            OperationRequest::Search { parameters } => {
                out.push('<');
                out.push_str(PARAM_SEARCH);
                out.push_str(" xmlns:dat=\"");
                out.push_str(DATA_CONTRACT_NS);
                out.push_str("\">");
                for (key, value) in parameters.iter() {
                    if !is_element_name(key) {
                        return Err(TransportError::InvalidRequest(format!(
                            "search parameter {key:?} is not a valid element name"
                        )));
                    }
                    write_param(&mut out, &format!("dat:{key}"), value);
                }
                out.push_str("</");
                out.push_str(PARAM_SEARCH);
                out.push('>');
            }
            OperationRequest::FullReport { regon, report_name } => {
                write_param(&mut out, PARAM_REGON, regon);
                write_param(&mut out, PARAM_REPORT_NAME, report_name);
            }
            OperationRequest::GetValue { param_name } => {
                write_param(&mut out, PARAM_PARAM_NAME, param_name)
            }
        }

        out.push_str("</");
        out.push_str(operation.name());
        out.push('>');
        Ok(out)
    }
}

fn write_param(out: &mut String, name: &str, value: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(&escape(value));
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Operation; 5] = [
        Operation::Login,
        Operation::Logout,
        Operation::Search,
        Operation::FullReport,
        Operation::GetValue,
    ];

    #[test]
    fn result_fields_follow_operation_names() {
        for op in ALL {
            assert_eq!(op.result_field(), format!("{}Result", op.name()));
            assert_eq!(op.response_element(), format!("{}Response", op.name()));
            assert!(op.action().ends_with(op.name()));
        }
    }

    #[test]
    fn login_body_escapes_key() {
        let body = OperationRequest::Login { user_key: "a<b" }.body_xml().unwrap();
        assert_eq!(
            body,
            "<Zaloguj xmlns=\"http://CIS/BIR/PUBL/2014/07\"><pKluczUzytkownika>a&lt;b</pKluczUzytkownika></Zaloguj>"
        );
    }

    #[test]
    fn search_body_nests_parameters_in_data_contract() {
        let mut parameters = SearchParameters::new();
        parameters.insert("Regon".into(), "000331501".into());
        parameters.insert("Nip".into(), "5261040828".into());

        let body = OperationRequest::Search { parameters: &parameters }
            .body_xml()
            .unwrap();
        assert_eq!(
            body,
            "<DaneSzukaj xmlns=\"http://CIS/BIR/PUBL/2014/07\">\
             <pParametryWyszukiwania xmlns:dat=\"http://CIS/BIR/PUBL/2014/07/DataContract\">\
             <dat:Nip>5261040828</dat:Nip><dat:Regon>000331501</dat:Regon>\
             </pParametryWyszukiwania></DaneSzukaj>"
        );
    }

    #[test]
    fn search_rejects_unusable_keys() {
        let mut parameters = SearchParameters::new();
        parameters.insert("Nip><x".into(), "1".into());
        let err = OperationRequest::Search { parameters: &parameters }
            .body_xml()
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn get_value_uses_shared_namespace() {
        let request = OperationRequest::GetValue { param_name: "StatusUslugi" };
        assert_eq!(request.operation(), Operation::GetValue);
        assert!(request.body_xml().unwrap().starts_with("<GetValue xmlns=\"http://CIS/BIR/2014/07\">"));
    }

    #[test]
    fn full_report_body_carries_both_parameters() {
        let body = OperationRequest::FullReport {
            regon: "000331501",
            report_name: "PublDaneRaportPrawna",
        }
        .body_xml()
        .unwrap();
        assert!(body.contains("<pRegon>000331501</pRegon>"));
        assert!(body.contains("<pNazwaRaportu>PublDaneRaportPrawna</pNazwaRaportu>"));
    }
}
