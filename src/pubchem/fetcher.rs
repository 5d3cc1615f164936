//! Structure and property retrieval for a single identifier.
//!
//! Both requests are issued concurrently and joined before either response
//! is looked at, so a structure is never reported without the properties
//! that describe it (or vice versa). There is no retry and no caching: every
//! call goes to the network exactly once per request.

use std::thread;

use web_time::Instant;

use super::properties::{PropertyRecord, PROPERTY_LIST};
use super::transport::{
    HttpResponse, HttpTransport, TransportError, UreqTransport,
};
use crate::identifier::{Identifier, ResolvedIdentifier};
use crate::options::PubChemOptions;

/// Format tag handed to the rendering surface alongside the payload text.
pub const STRUCTURE_FORMAT: &str = "sdf";

/// Raw 3D structure text (SDF) and the identifier it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructurePayload {
    text: String,
    identifier: Identifier,
}

impl StructurePayload {
    /// Wrap a structure body exactly as received.
    #[must_use]
    pub fn new(text: String, identifier: Identifier) -> Self {
        Self { text, identifier }
    }

    /// The structure encoding, byte-for-byte as the service sent it.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The identifier this structure was resolved from.
    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Format tag understood by the rendering surface.
    #[must_use]
    pub fn format(&self) -> &'static str {
        STRUCTURE_FORMAT
    }
}

/// A structure and the property record describing it. Always travel
/// together.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeData {
    /// The 3D structure.
    pub structure: StructurePayload,
    /// Descriptive properties for the same compound.
    pub properties: PropertyRecord,
}

/// Result of one fetch. Failures are values so the caller can present
/// each kind differently.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Both requests succeeded and the properties decoded.
    Success(Box<MoleculeData>),
    /// The structure request reported 404: no 3D structure for this
    /// identifier.
    NotFound(Identifier),
    /// A request failed in transport or returned a non-success status.
    SourceError(String),
    /// The property response succeeded but was not in the expected shape.
    ParseError(String),
}

impl FetchOutcome {
    /// Whether this is [`FetchOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// User-facing message for failure outcomes, `None` on success.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::NotFound(id) => Some(format!(
                "Molecule not found or 3D structure unavailable for: {} as \
                 input type {}",
                id.value(),
                id.kind()
            )),
            Self::SourceError(msg) | Self::ParseError(msg) => {
                Some(msg.clone())
            }
        }
    }
}

/// Issues the paired structure/property requests against one base URL.
pub struct Fetcher<T = UreqTransport> {
    transport: T,
    base_url: String,
}

impl Fetcher<UreqTransport> {
    /// Fetcher talking to the configured PubChem endpoint over `ureq`.
    #[must_use]
    pub fn new(options: &PubChemOptions) -> Self {
        Self::with_transport(UreqTransport::new(options), &options.base_url)
    }
}

impl<T: HttpTransport> Fetcher<T> {
    /// Fetcher over an arbitrary transport.
    pub fn with_transport(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// `GET` URL for the 3D structure record.
    #[must_use]
    pub fn structure_url(&self, id: &ResolvedIdentifier) -> String {
        format!(
            "{}/compound/{}/{}/SDF?record_type=3d",
            self.base_url,
            id.kind().path_token(),
            id.encoded()
        )
    }

    /// `GET` URL for the fixed property table.
    #[must_use]
    pub fn property_url(&self, id: &ResolvedIdentifier) -> String {
        format!(
            "{}/compound/{}/{}/property/{PROPERTY_LIST}/JSON",
            self.base_url,
            id.kind().path_token(),
            id.encoded()
        )
    }

    /// Fetch structure and properties concurrently and classify the pair.
    ///
    /// Blocks until both requests have settled.
    pub fn fetch(&self, id: &ResolvedIdentifier) -> FetchOutcome {
        let structure_url = self.structure_url(id);
        let property_url = self.property_url(id);
        log::debug!("GET {structure_url}");
        log::debug!("GET {property_url}");

        let started = Instant::now();
        let (structure, properties) = thread::scope(|s| {
            let properties = s.spawn(|| self.transport.get(&property_url));
            let structure = self.transport.get(&structure_url);
            let properties = properties.join().unwrap_or_else(|_| {
                Err(TransportError("property request panicked".to_owned()))
            });
            (structure, properties)
        });

        let outcome = classify(id.identifier(), structure, properties);
        log::info!(
            "fetch {} finished in {:.0?}: {}",
            id.identifier(),
            started.elapsed(),
            outcome_label(&outcome)
        );
        outcome
    }
}

/// Reconcile the two settled responses into one outcome.
///
/// The structure response is inspected first, so a structure 404 is
/// `NotFound` whatever happened to the property request, and a structure
/// failure takes precedence when both requests fail.
pub fn classify(
    identifier: &Identifier,
    structure: Result<HttpResponse, TransportError>,
    properties: Result<HttpResponse, TransportError>,
) -> FetchOutcome {
    let structure = match structure {
        Err(e) => {
            return FetchOutcome::SourceError(format!("API Error (SDF): {e}"))
        }
        Ok(r) if r.is_not_found() => {
            return FetchOutcome::NotFound(identifier.clone())
        }
        Ok(r) if !r.is_success() => {
            return FetchOutcome::SourceError(format!(
                "API Error (SDF): {}",
                r.status_text
            ))
        }
        Ok(r) => r,
    };

    let properties = match properties {
        Err(e) => {
            return FetchOutcome::SourceError(format!(
                "API Error (Metadata): {e}"
            ))
        }
        Ok(r) if !r.is_success() => {
            return FetchOutcome::SourceError(format!(
                "API Error (Metadata): {}",
                r.status_text
            ))
        }
        Ok(r) => r,
    };

    match PropertyRecord::from_json(&properties.body) {
        Ok(record) => FetchOutcome::Success(Box::new(MoleculeData {
            structure: StructurePayload::new(
                structure.body,
                identifier.clone(),
            ),
            properties: record,
        })),
        Err(e) => FetchOutcome::ParseError(e.0),
    }
}

fn outcome_label(outcome: &FetchOutcome) -> &'static str {
    match outcome {
        FetchOutcome::Success(_) => "success",
        FetchOutcome::NotFound(_) => "not found",
        FetchOutcome::SourceError(_) => "source error",
        FetchOutcome::ParseError(_) => "parse error",
    }
}
