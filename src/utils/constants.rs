//! Fixed names and addresses of the BIR1 registry service
//!
//! Values here mirror the service's published WSDL (2014/07 contract).
//! They are plain names; interpreting the records they select is left to
//! the caller.

/// Production endpoint
pub const PRODUCTION_URL: &str = "https://wyszukiwarkaregon.stat.gov.pl/wsBIR/UslugaBIRzewnPubl.svc";

/// Test endpoint, accepts [`TEST_USER_KEY`]
pub const TEST_URL: &str = "https://wyszukiwarkaregontest.stat.gov.pl/wsBIR/UslugaBIRzewnPubl.svc";

/// Public user key of the test environment
pub const TEST_USER_KEY: &str = "abcde12345abcde12345";

/// Namespace of the public operations (`Zaloguj`, `DaneSzukaj`, ...)
pub const PUBL_NS: &str = "http://CIS/BIR/PUBL/2014/07";

/// Namespace of the shared `GetValue` operation
pub const BIR_NS: &str = "http://CIS/BIR/2014/07";

/// Namespace of the search parameter data contract
pub const DATA_CONTRACT_NS: &str = "http://CIS/BIR/PUBL/2014/07/DataContract";

// Operation parameter names
pub const PARAM_USER_KEY: &str = "pKluczUzytkownika";
pub const PARAM_SESSION_ID: &str = "pIdentyfikatorSesji";
pub const PARAM_SEARCH: &str = "pParametryWyszukiwania";
pub const PARAM_REGON: &str = "pRegon";
pub const PARAM_REPORT_NAME: &str = "pNazwaRaportu";
pub const PARAM_PARAM_NAME: &str = "pNazwaParametru";

/// Keys accepted inside `pParametryWyszukiwania`
pub mod search {
    pub const REGON: &str = "Regon";
    pub const NIP: &str = "Nip";
    pub const KRS: &str = "Krs";
    pub const REGONS_9: &str = "Regony9zn";
    pub const REGONS_14: &str = "Regony14zn";
    pub const NIPS: &str = "Nipy";
    pub const KRSES: &str = "Krsy";
}

/// Parameter names accepted by `GetValue`
pub mod value {
    pub const DATA_STATE: &str = "StanDanych";
    pub const MESSAGE_CODE: &str = "KomunikatKod";
    pub const MESSAGE_TEXT: &str = "KomunikatTresc";
    pub const SESSION_STATUS: &str = "StatusSesji";
    pub const SERVICE_STATUS: &str = "StatusUslugi";
    pub const SERVICE_MESSAGE: &str = "KomunikatUslugi";
}

/// Full report names accepted by `DanePobierzPelnyRaport`
pub mod report {
    pub const PHYSIC_PERSON: &str = "PublDaneRaportFizycznaOsoba";
    pub const ACTIVITY_PHYSIC_CEIDG: &str = "PublDaneRaportDzialalnoscFizycznejCeidg";
    pub const ACTIVITY_PHYSIC_AGRO: &str = "PublDaneRaportDzialalnoscFizycznejRolnicza";
    pub const ACTIVITY_PHYSIC_OTHER: &str = "PublDaneRaportDzialalnoscFizycznejPozostala";
    pub const ACTIVITY_PHYSIC_KRUPGN: &str = "PublDaneRaportDzialalnoscFizycznejWKrupgn";
    pub const LOCAL_PHYSIC: &str = "PublDaneRaportLokalnaFizycznej";
    pub const LOCALS_PHYSIC: &str = "PublDaneRaportLokalneFizycznej";
    pub const LAW_PERSON: &str = "PublDaneRaportPrawna";
    pub const ACTIVITY_LAW: &str = "PublDaneRaportDzialalnosciPrawnej";
    pub const LOCAL_LAW: &str = "PublDaneRaportLokalnaPrawnej";
    pub const LOCALS_LAW: &str = "PublDaneRaportLokalnePrawnej";
    pub const PARTNERS_LAW: &str = "PublDaneRaportWspolnicyPrawnej";
    pub const UNIT_TYPE: &str = "PublDaneRaportTypJednostki";
}
