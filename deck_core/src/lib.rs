//! # deck_core - Girder-Deck Design Helper Engine
//!
//! `deck_core` checks and balances the transverse layout of a steel-girder
//! bridge deck and serves the environmental and material reference data a
//! design starts from. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Pure engine**: geometry functions take numbers and return reports; they never fail
//! - **JSON-First**: all request and response types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use deck_core::geometry::{validate_geometry, GeometryInput};
//!
//! let report = validate_geometry(&GeometryInput {
//!     span: 30.0,
//!     carriageway_width: 8.5,
//!     skew_angle: 0.0,
//!     girder_spacing: 2.5,
//!     girder_count: 4,
//!     deck_overhang: 1.75,
//!     changed_field: None,
//! });
//!
//! assert!(report.is_valid);
//! assert!(report.warnings.is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Range checks, consistency checks and auto-balancing
//! - [`loading`] - Custom environmental loading validation
//! - [`reference`] - Location and material reference data
//! - [`store`] - Reference store container
//! - [`file_io`] - Store files with atomic saves and locking
//! - [`config`] - Service configuration
//! - [`errors`] - Structured error types

pub mod cache;
pub mod config;
pub mod errors;
pub mod file_io;
pub mod geometry;
mod lenient;
pub mod loading;
pub mod reference;
pub mod store;

pub use config::ServiceConfig;
pub use errors::{DeckError, DeckResult};
pub use file_io::{load_or_default, load_store, save_store, FileLock};
pub use geometry::{validate_geometry, GeometryReport, GeometryRequest};
pub use reference::{ReferenceData, ReferenceService};
pub use store::{IngestReport, ReferenceStore};
