//! Data acquisition from the PubChem PUG REST service.
//!
//! [`fetcher::Fetcher`] issues the structure and property requests for one
//! identifier and reconciles them into a single [`FetchOutcome`].
//! [`worker::FetchWorker`] runs fetches on a background thread and tags
//! every result with the [`Ticket`](crate::ticket::Ticket) of the
//! submission that produced it, so callers can discard superseded results.

pub mod fetcher;
pub mod properties;
pub mod transport;
pub mod worker;

pub use fetcher::{FetchOutcome, Fetcher, MoleculeData, StructurePayload};
pub use properties::{
    DetailRow, Field, PropertyParseError, PropertyRecord, UNAVAILABLE,
};
pub use transport::{
    HttpResponse, HttpTransport, TransportError, UreqTransport,
};
pub use worker::{Completed, FetchWorker};
