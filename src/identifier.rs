//! User-supplied molecule identifiers and their validation.
//!
//! [`resolve`] is the only way to obtain a [`ResolvedIdentifier`], so every
//! value that reaches the network layer has been trimmed, checked for
//! emptiness, and percent-encoded for use as a single URL path segment.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What kind of identifier the user typed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    /// Common or systematic name (e.g. "Aspirin").
    #[default]
    Name,
    /// SMILES line notation.
    Smiles,
    /// InChI structure-identity string.
    Inchi,
    /// Numeric PubChem compound ID.
    #[serde(rename = "cid")]
    DatabaseId,
}

impl IdentifierKind {
    /// Every kind, in the order offered to the user.
    pub const ALL: [Self; 4] =
        [Self::Name, Self::Smiles, Self::Inchi, Self::DatabaseId];

    /// Literal namespace token used in the PubChem URL path.
    #[must_use]
    pub fn path_token(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Smiles => "smiles",
            Self::Inchi => "inchi",
            Self::DatabaseId => "cid",
        }
    }

    /// Human-readable label for input forms.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Common Name (e.g., IUPAC)",
            Self::Smiles => "SMILES",
            Self::Inchi => "InChI",
            Self::DatabaseId => "PubChem CID",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_token())
    }
}

impl FromStr for IdentifierKind {
    type Err = RejectedInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.path_token() == token)
            .ok_or_else(|| RejectedInput::UnknownKind(s.to_owned()))
    }
}

/// A submitted identifier. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    value: String,
    kind: IdentifierKind,
}

impl Identifier {
    /// The trimmed identifier text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The declared identifier kind.
    #[must_use]
    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.kind)
    }
}

/// An identifier that passed validation, with its URL-safe encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedIdentifier {
    identifier: Identifier,
    encoded: String,
}

impl ResolvedIdentifier {
    /// The validated identifier.
    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Percent-encoded value, safe to place in a single path segment.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Shorthand for `self.identifier().kind()`.
    #[must_use]
    pub fn kind(&self) -> IdentifierKind {
        self.identifier.kind
    }
}

/// Reasons an identifier is refused before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectedInput {
    /// Nothing left after trimming whitespace.
    Empty {
        /// The kind the user had selected.
        kind: IdentifierKind,
    },
    /// A compound ID that is not a positive decimal integer.
    InvalidDatabaseId(String),
    /// An identifier kind token that is not recognised.
    UnknownKind(String),
}

impl fmt::Display for RejectedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => {
                write!(f, "enter a molecule identifier ({})", kind.label())
            }
            Self::InvalidDatabaseId(value) => {
                write!(f, "'{value}' is not a valid PubChem CID")
            }
            Self::UnknownKind(token) => {
                write!(f, "unknown identifier kind '{token}'")
            }
        }
    }
}

impl std::error::Error for RejectedInput {}

/// Validate and encode a raw identifier. Pure; never touches the network.
pub fn resolve(
    raw: &str,
    kind: IdentifierKind,
) -> Result<ResolvedIdentifier, RejectedInput> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RejectedInput::Empty { kind });
    }
    if kind == IdentifierKind::DatabaseId && !is_database_id(value) {
        return Err(RejectedInput::InvalidDatabaseId(value.to_owned()));
    }

    let encoded = urlencoding::encode(value).into_owned();
    Ok(ResolvedIdentifier {
        identifier: Identifier {
            value: value.to_owned(),
            kind,
        },
        encoded,
    })
}

fn is_database_id(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
        && value.bytes().any(|b| b != b'0')
}
