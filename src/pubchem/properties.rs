//! Typed property record decoded from the PubChem property table.
//!
//! Optional values that the service does not report are kept as
//! [`Field::Unavailable`] rather than being dropped or zeroed: XLogP, for
//! example, is simply absent for many charged species.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display marker for a value the service did not report.
pub const UNAVAILABLE: &str = "N/A";

/// Comma-joined property list requested alongside every structure.
pub const PROPERTY_LIST: &str = "Title,MolecularFormula,CanonicalSMILES,\
InChI,MolecularWeight,IUPACName,XLogP,TPSA,Charge";

/// Landing page for a compound on the PubChem website.
const COMPOUND_PAGE: &str = "https://pubchem.ncbi.nlm.nih.gov/compound";

/// A property value that may be missing from the service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Field<T> {
    /// The service reported a value.
    Available(T),
    /// The service had no value for this property.
    #[default]
    Unavailable,
}

impl<T> Field<T> {
    /// Whether a value is present.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Borrow the value, if present.
    #[must_use]
    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(v) => Some(v),
            Self::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unavailable, Self::Available)
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(v) => fmt::Display::fmt(v, f),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Descriptive properties for one compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// PubChem compound ID.
    pub cid: u64,
    /// Display name (the record title).
    pub name: Field<String>,
    /// Canonical SMILES.
    pub smiles: Field<String>,
    /// InChI with the leading `InChI=` prefix removed.
    pub inchi: Field<String>,
    /// Molecular formula, e.g. `C9H8O4`.
    pub formula: Field<String>,
    /// Molecular weight in g/mol, as reported.
    pub molecular_weight: Field<String>,
    /// Systematic (IUPAC) name.
    pub iupac_name: Field<String>,
    /// Computed XLogP3 hydrophobicity index.
    pub xlogp: Field<f64>,
    /// Topological polar surface area in square angstroms.
    pub tpsa: Field<f64>,
    /// Net formal charge.
    pub charge: Field<i64>,
}

/// One labelled line of the details panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    /// Row label.
    pub label: &'static str,
    /// Formatted value, [`UNAVAILABLE`] when missing.
    pub value: String,
}

/// The property response decoded but did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyParseError(pub String);

impl fmt::Display for PropertyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for PropertyParseError {}

impl PropertyRecord {
    /// Decode a `property/.../JSON` response body.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyParseError`] if the body is not JSON, if
    /// `PropertyTable.Properties[0]` is absent, or if it carries no CID.
    pub fn from_json(body: &str) -> Result<Self, PropertyParseError> {
        let response: PropertyResponse =
            serde_json::from_str(body).map_err(|e| {
                log::debug!("property body is not valid JSON: {e}");
                PropertyParseError(PARSE_FAILURE.to_owned())
            })?;

        let raw = response
            .property_table
            .and_then(|table| table.properties.into_iter().next())
            .ok_or_else(|| PropertyParseError(PARSE_FAILURE.to_owned()))?;

        let cid = raw.cid.ok_or_else(|| {
            PropertyParseError(format!("{PARSE_FAILURE}: record has no CID"))
        })?;

        let smiles = raw
            .canonical_smiles
            .or(raw.smiles)
            .or(raw.connectivity_smiles);
        let inchi = raw.inchi.map(|s| {
            s.strip_prefix("InChI=").map_or_else(|| s.clone(), str::to_owned)
        });

        Ok(Self {
            cid,
            name: raw.title.into(),
            smiles: smiles.into(),
            inchi: inchi.into(),
            formula: raw.molecular_formula.into(),
            molecular_weight: raw
                .molecular_weight
                .map(NumberOrText::into_text)
                .into(),
            iupac_name: raw.iupac_name.into(),
            xlogp: raw.xlogp.into(),
            tpsa: raw.tpsa.into(),
            charge: raw.charge.into(),
        })
    }

    /// Link to the compound's page on the PubChem website.
    #[must_use]
    pub fn compound_url(&self) -> String {
        format!("{COMPOUND_PAGE}/{}", self.cid)
    }

    /// Formatted rows for the details panel, in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<DetailRow> {
        vec![
            row("Name", self.name.to_string()),
            row("Formula", self.formula.to_string()),
            row("IUPAC Name", self.iupac_name.to_string()),
            row("PubChem CID", self.cid.to_string()),
            row("SMILES", self.smiles.to_string()),
            row("InChI", self.inchi.to_string()),
            row(
                "Molecular Weight",
                with_unit(&self.molecular_weight, "g/mol"),
            ),
            row("XLogP3 (Hydrophobicity)", self.xlogp.to_string()),
            row("TPSA (Polar Surface Area)", with_unit(&self.tpsa, "Å²")),
            row("Formal Charge", self.charge.to_string()),
        ]
    }
}

const PARSE_FAILURE: &str = "Failed to parse molecule properties";

fn row(label: &'static str, value: String) -> DetailRow {
    DetailRow { label, value }
}

fn with_unit<T: fmt::Display>(field: &Field<T>, unit: &str) -> String {
    match field {
        Field::Available(v) => format!("{v} {unit}"),
        Field::Unavailable => UNAVAILABLE.to_owned(),
    }
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    property_table: Option<PropertyTable>,
}

#[derive(Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties", default)]
    properties: Vec<RawProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawProperties {
    #[serde(rename = "CID")]
    cid: Option<u64>,
    title: Option<String>,
    molecular_formula: Option<String>,
    #[serde(rename = "CanonicalSMILES")]
    canonical_smiles: Option<String>,
    #[serde(rename = "SMILES")]
    smiles: Option<String>,
    #[serde(rename = "ConnectivitySMILES")]
    connectivity_smiles: Option<String>,
    #[serde(rename = "InChI")]
    inchi: Option<String>,
    molecular_weight: Option<NumberOrText>,
    #[serde(rename = "IUPACName")]
    iupac_name: Option<String>,
    #[serde(rename = "XLogP")]
    xlogp: Option<f64>,
    #[serde(rename = "TPSA")]
    tpsa: Option<f64>,
    charge: Option<i64>,
}

/// Molecular weight is a JSON string in current responses and a number in
/// older ones.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}
