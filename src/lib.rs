// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Look up a molecule in PubChem and keep a 3D viewport in sync with it.
//!
//! Molview resolves a user-typed identifier (name, SMILES, InChI or CID),
//! fetches the compound's 3D structure and descriptive properties in
//! parallel, and drives a rendering surface through a small state machine
//! that keeps structure, style, background and spin changes independent.
//!
//! # Key entry points
//!
//! - [`identifier::resolve`] - validate and encode an identifier
//! - [`pubchem::Fetcher`] - paired structure/property fetch
//! - [`viewport::ViewportController`] - owns the rendering surface
//! - [`session::Session`] - headless model of the viewer UI
//! - [`options::Options`] - runtime configuration (service, display)
//!
//! # Architecture
//!
//! Submissions go to a background [`pubchem::FetchWorker`] thread, which
//! runs the two requests of each fetch concurrently and returns outcomes
//! tagged with a [`ticket::Ticket`]. The caller's thread applies outcomes
//! to the [`viewport::ViewportController`]; results for superseded tickets
//! are dropped, so the most recently submitted identifier always wins.
//! The rendering engine sits behind [`viewport::RenderSurface`];
//! [`viewport::SceneSurface`] is a headless implementation backed by the
//! [`structure`] parser.

pub mod color;
pub mod error;
pub mod identifier;
pub mod options;
pub mod pubchem;
pub mod session;
pub mod structure;
pub mod ticket;
pub mod viewport;
