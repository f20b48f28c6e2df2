//! Output vocabulary: JSON-LD context, key strings and controlled value tables.
//!
//! Key strings are a compatibility contract with the view builder and the front
//! end; change them only together with those consumers.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const NS_RICO: &str = "https://www.ica.org/standards/RiC/ontology#";
pub const NS_M3GIM: &str = "https://dhcraft.org/m3gim/vocab#";
pub const NS_M3GIM_DFT: &str = "https://dhcraft.org/m3gim/documentaryFormTypes#";
pub const NS_M3GIM_ROLE: &str = "https://dhcraft.org/m3gim/roles#";
pub const NS_WIKIDATA: &str = "http://www.wikidata.org/entity/";
pub const NS_SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const NS_XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Prefix → namespace map emitted as `@context`.
pub fn context() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("rico", NS_RICO),
        ("m3gim", NS_M3GIM),
        ("m3gim-dft", NS_M3GIM_DFT),
        ("m3gim-role", NS_M3GIM_ROLE),
        ("wd", NS_WIKIDATA),
        ("skos", NS_SKOS),
        ("xsd", NS_XSD),
    ])
}

// Node types
pub const TYPE_RECORD: &str = "rico:Record";
pub const TYPE_PHOTOGRAPH: &str = "rico:Photograph";
pub const TYPE_RECORD_SET: &str = "rico:RecordSet";
pub const RECORD_SET_FILE: &str = "rico:File";
pub const RECORD_SET_FONDS: &str = "rico:Fonds";

// Entry types
pub const TYPE_PERSON: &str = "rico:Person";
pub const TYPE_CORPORATE_BODY: &str = "rico:CorporateBody";
pub const TYPE_GROUP: &str = "rico:Group";
pub const TYPE_MUSICAL_WORK: &str = "m3gim:MusicalWork";

// Scalar keys
pub const KEY_ID: &str = "@id";
pub const KEY_TYPE: &str = "@type";
pub const KEY_IDENTIFIER: &str = "rico:identifier";
pub const KEY_TITLE: &str = "rico:title";
pub const KEY_DATE: &str = "rico:date";
pub const KEY_FORM_TYPE: &str = "rico:hasDocumentaryFormType";
pub const KEY_LANGUAGE: &str = "rico:hasOrHadLanguage";
pub const KEY_EXTENT: &str = "rico:hasExtent";
pub const KEY_SCOPE: &str = "rico:scopeAndContent";
pub const KEY_CREATOR: &str = "rico:hasCreator";
pub const KEY_RECORD_SET_TYPE: &str = "rico:hasRecordSetType";
pub const KEY_PART: &str = "rico:hasOrHadPart";
pub const KEY_WORKFLOW: &str = "m3gim:bearbeitungsstand";
pub const KEY_ACCESS: &str = "m3gim:accessStatus";
pub const KEY_DIGITIZATION: &str = "m3gim:digitizationStatus";
pub const KEY_PHOTO_TYPE: &str = "m3gim:photoType";
pub const KEY_FILENAME: &str = "m3gim:filename";

// Relation-derived keys
pub const KEY_AGENT: &str = "rico:hasOrHadAgent";
pub const KEY_LOCATION: &str = "rico:hasOrHadLocation";
pub const KEY_SUBJECT: &str = "rico:hasOrHadSubject";
pub const KEY_MENTIONS: &str = "m3gim:mentions";
pub const KEY_ASSOCIATED_DATE: &str = "rico:isAssociatedWithDate";
pub const KEY_PERFORMANCE_ROLE: &str = "m3gim:hasPerformanceRole";

// Document keys
pub const KEY_CONTEXT: &str = "@context";
pub const KEY_GRAPH: &str = "@graph";
pub const KEY_EXPORT_DATE: &str = "m3gim:exportDate";
pub const KEY_RECORD_COUNT: &str = "m3gim:recordCount";
pub const KEY_CONTAINER_COUNT: &str = "m3gim:konvolutCount";

/// Keys a node can carry on its own; extension fields may never use them.
pub const FIXED_NODE_KEYS: &[&str] = &[
    KEY_ID,
    KEY_TYPE,
    KEY_IDENTIFIER,
    KEY_TITLE,
    KEY_DATE,
    KEY_FORM_TYPE,
    KEY_LANGUAGE,
    KEY_EXTENT,
    KEY_SCOPE,
    KEY_CREATOR,
    KEY_RECORD_SET_TYPE,
    KEY_PART,
    KEY_WORKFLOW,
    KEY_ACCESS,
    KEY_DIGITIZATION,
    KEY_PHOTO_TYPE,
    KEY_FILENAME,
    KEY_AGENT,
    KEY_LOCATION,
    KEY_SUBJECT,
    KEY_MENTIONS,
    KEY_ASSOCIATED_DATE,
    KEY_PERFORMANCE_ROLE,
];

/// Extension key in the project namespace.
pub fn extension_key(local: &str) -> String {
    format!("m3gim:{local}")
}

/// Document-type code (lowercase) → documentary form type.
pub const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("korrespondenz", "m3gim-dft:brief"),
    ("vertrag", "m3gim-dft:vertrag"),
    ("presse", "m3gim-dft:zeitungsausschnitt"),
    ("programm", "m3gim-dft:programmheft"),
    ("konzertprogramm", "m3gim-dft:programmheft"),
    ("plakat", "m3gim-dft:plakat"),
    ("tontraeger", "m3gim-dft:tontraeger"),
    ("autobiografie", "m3gim-dft:biographie"),
    ("biographie", "m3gim-dft:biographie"),
    ("identitaetsdokument", "m3gim-dft:ausweis"),
    ("studienunterlagen", "m3gim-dft:dokument"),
    ("repertoire", "m3gim-dft:dokument"),
    ("repertoireliste", "m3gim-dft:dokument"),
    ("sammlung", "m3gim-dft:konvolut"),
    ("konvolut", "m3gim-dft:konvolut"),
    ("tagebuch", "m3gim-dft:tagebuch"),
    ("notizbuch", "m3gim-dft:notiz"),
    ("notiz", "m3gim-dft:notiz"),
    ("urkunde", "m3gim-dft:urkunde"),
    ("zeugnis", "m3gim-dft:urkunde"),
    ("lebenslauf", "m3gim-dft:lebenslauf"),
    ("widmung", "m3gim-dft:dokument"),
    ("photokopie", "m3gim-dft:photokopie"),
    ("quittung", "m3gim-dft:quittung"),
    ("rezension", "m3gim-dft:rezension"),
    ("typoskript", "m3gim-dft:typoskript"),
    ("visitenkarte", "m3gim-dft:visitenkarte"),
    ("noten", "m3gim-dft:noten"),
    ("dokument", "m3gim-dft:dokument"),
    ("sonstiges", "m3gim-dft:sonstiges"),
];

pub fn documentary_form_type(code: &str) -> Option<&'static str> {
    DOCUMENT_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, dft)| *dft)
}

/// Role labels that turn a person relation into a mention.
///
/// Both the precomposed and the decomposed umlaut spelling occur in the sheets.
pub const MENTION_ROLES: &[&str] = &["erwähnt", "erwa\u{308}hnt", "erwaehnt", "mentioned"];

pub fn is_mention_role(role: Option<&str>) -> bool {
    role.map(|r| r.trim().to_lowercase())
        .is_some_and(|r| MENTION_ROLES.contains(&r.as_str()))
}

fn wikidata_qid() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Q\d+$").expect("valid qid regex"))
}

/// `wd:` reference for a well-formed Wikidata item id.
pub fn wikidata_ref(id: &str) -> Option<String> {
    let id = id.trim();
    wikidata_qid().is_match(id).then(|| format!("wd:{id}"))
}
