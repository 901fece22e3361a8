//! Browsable URL derivation for coding systems and codes.

use shr_models::{DiagnosticCode, Logger};

/// Coding systems with a known public browser.
///
/// Each entry pairs a system URI with a code template (`{code}` is replaced)
/// and a landing page used when no code is given.
pub mod well_known {
    /// A well-known coding system.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WellKnownSystem {
        /// System URI as it appears in concepts.
        pub system: &'static str,
        /// Code page template, if the browser addresses individual codes.
        pub code_url: Option<&'static str>,
        /// Landing page for the system.
        pub system_url: &'static str,
    }

    /// SNOMED CT
    pub const SNOMED_CT: WellKnownSystem = WellKnownSystem {
        system: "http://snomed.info/sct",
        code_url: Some("https://browser.ihtsdotools.org/?perspective=full&conceptId1={code}"),
        system_url: "https://browser.ihtsdotools.org/",
    };

    /// LOINC
    pub const LOINC: WellKnownSystem = WellKnownSystem {
        system: "http://loinc.org",
        code_url: Some("https://loinc.org/{code}/"),
        system_url: "https://loinc.org/",
    };

    /// RxNorm
    pub const RXNORM: WellKnownSystem = WellKnownSystem {
        system: "http://www.nlm.nih.gov/research/umls/rxnorm",
        code_url: Some("https://mor.nlm.nih.gov/RxNav/search?searchBy=RXCUI&searchTerm={code}"),
        system_url: "https://www.nlm.nih.gov/research/umls/rxnorm/",
    };

    /// UMLS Metathesaurus
    pub const UMLS: WellKnownSystem = WellKnownSystem {
        system: "http://www.nlm.nih.gov/research/umls",
        code_url: Some("https://uts.nlm.nih.gov/uts/umls/concept/{code}"),
        system_url: "https://www.nlm.nih.gov/research/umls/",
    };

    /// ICD-10 (WHO)
    pub const ICD_10: WellKnownSystem = WellKnownSystem {
        system: "http://hl7.org/fhir/sid/icd-10",
        code_url: Some("https://icd.who.int/browse10/2019/en#/{code}"),
        system_url: "https://icd.who.int/browse10/2019/en",
    };

    /// ICD-10-CM
    pub const ICD_10_CM: WellKnownSystem = WellKnownSystem {
        system: "http://hl7.org/fhir/sid/icd-10-cm",
        code_url: Some("https://www.icd10data.com/search?s={code}"),
        system_url: "https://www.cdc.gov/nchs/icd/icd-10-cm.htm",
    };

    /// CVX vaccine codes
    pub const CVX: WellKnownSystem = WellKnownSystem {
        system: "http://hl7.org/fhir/sid/cvx",
        code_url: None,
        system_url: "https://www2a.cdc.gov/vaccines/iis/iisstandards/vaccines.asp?rpt=cvx",
    };

    /// UCUM units
    pub const UCUM: WellKnownSystem = WellKnownSystem {
        system: "http://unitsofmeasure.org",
        code_url: None,
        system_url: "https://ucum.org/ucum",
    };

    /// CPT
    pub const CPT: WellKnownSystem = WellKnownSystem {
        system: "http://www.ama-assn.org/go/cpt",
        code_url: Some("https://www.aapc.com/codes/cpt-codes/{code}"),
        system_url: "https://www.ama-assn.org/amaone/cpt-current-procedural-terminology",
    };

    /// NCI Metathesaurus
    pub const NCI_METATHESAURUS: WellKnownSystem = WellKnownSystem {
        system: "http://ncimeta.nci.nih.gov",
        code_url: Some("https://ncim.nci.nih.gov/ncimbrowser/ConceptReport.jsp?dictionary=NCI%20Metathesaurus&code={code}"),
        system_url: "https://ncim.nci.nih.gov/ncimbrowser/",
    };

    /// ISO 3166 country codes
    pub const ISO_3166: WellKnownSystem = WellKnownSystem {
        system: "urn:iso:std:iso:3166",
        code_url: Some("https://www.iso.org/obp/ui/#iso:code:3166:{code}"),
        system_url: "https://www.iso.org/iso-3166-country-codes.html",
    };

    /// BCP 47 language tags
    pub const BCP_47: WellKnownSystem = WellKnownSystem {
        system: "urn:ietf:bcp:47",
        code_url: None,
        system_url: "https://tools.ietf.org/html/bcp47",
    };

    /// Every well-known system.
    pub const ALL: [WellKnownSystem; 12] = [
        SNOMED_CT,
        LOINC,
        RXNORM,
        UMLS,
        ICD_10,
        ICD_10_CM,
        CVX,
        UCUM,
        CPT,
        NCI_METATHESAURUS,
        ISO_3166,
        BCP_47,
    ];

    /// Looks up a system, ignoring a trailing `/`.
    pub fn lookup(system: &str) -> Option<&'static WellKnownSystem> {
        let system = system.trim_end_matches('/');
        ALL.iter().find(|s| s.system == system)
    }
}

/// Prefixes of systems whose URIs resolve to their own definition pages.
pub const KNOWN_BASES: [&str; 2] = ["http://hl7.org/fhir/", "http://terminology.hl7.org/"];

/// Derives a browsable URL for `system` and an optional `code`.
///
/// Resolution order:
/// 1. empty system: empty URL
/// 2. a [`well_known`] system: its code page, or its landing page without a code
/// 3. a system under one of [`KNOWN_BASES`]: `{system}#definition`
/// 4. `project_url` itself or a path below it: the system unchanged
/// 5. anything else: an `UnknownCodeSystem` warning and `{system}/{code}`
///
/// # Example
///
/// ```rust
/// use shr_export::derive_url;
/// use shr_models::{Diagnostics, Logger};
///
/// let mut diagnostics = Diagnostics::new();
/// let mut logger = Logger::new(&mut diagnostics);
///
/// let url = derive_url("http://loinc.org", Some("8310-5"), "", &mut logger);
/// assert_eq!(url, "https://loinc.org/8310-5/");
///
/// let url = derive_url("http://hl7.org/fhir/v2/0203", Some("MR"), "", &mut logger);
/// assert_eq!(url, "http://hl7.org/fhir/v2/0203#definition");
/// assert!(diagnostics.is_empty());
/// ```
pub fn derive_url(
    system: &str,
    code: Option<&str>,
    project_url: &str,
    logger: &mut Logger<'_>,
) -> String {
    if system.is_empty() {
        return String::new();
    }

    if let Some(known) = well_known::lookup(system) {
        return match (known.code_url, code) {
            (Some(template), Some(code)) => template.replace("{code}", code),
            _ => known.system_url.to_string(),
        };
    }

    if KNOWN_BASES.iter().any(|base| system.starts_with(base)) {
        return format!("{}#definition", system);
    }

    if is_under(system, project_url) {
        return system.to_string();
    }

    logger.warn(DiagnosticCode::UnknownCodeSystem, &[("system", system)]);
    match code {
        Some(code) => format!("{}/{}", system, code),
        None => system.to_string(),
    }
}

/// True when `system` is `base` itself or a path below it.
fn is_under(system: &str, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return false;
    }
    match system.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
