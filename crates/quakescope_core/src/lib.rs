//! Quakescope Core
//!
//! Foundational pieces shared by every Quakescope view:
//!
//! - **Event records**: the immutable, normalized form of one seismic event
//! - **Ingestion**: CSV rows to records, dropping malformed rows
//! - **Timezone lookup**: opaque `(lat, lon)` to offset/label collaborator
//! - **State machines**: flat table-driven machines for gesture handling
//!
//! # Example
//!
//! ```rust
//! use quakescope_core::ingest::{ingest, RawRow};
//! use quakescope_core::timezone::ZoneTable;
//!
//! let rows = vec![RawRow {
//!     latitude: "35.7".into(),
//!     longitude: "139.7".into(),
//!     depth: "10".into(),
//!     mag: "5.1".into(),
//!     time: "2024-03-01T03:00:00Z".into(),
//!     place: "near Tokyo".into(),
//!     dmin: "0.4".into(),
//! }];
//!
//! let ingested = ingest(rows, &ZoneTable::builtin());
//! assert_eq!(ingested.records.len(), 1);
//! assert_eq!(ingested.records[0].local_timezone_label, "JST");
//! ```

pub mod error;
pub mod fsm;
pub mod ingest;
pub mod record;
pub mod timezone;

pub use error::{IngestError, Result};
pub use fsm::{EventId, StateId, StateMachine, Transition};
pub use ingest::{ingest, load_csv, read_rows, Ingested, RawRow, REQUIRED_COLUMNS};
pub use record::{EventRecord, EventStore};
pub use timezone::{fallback_zone, resolve_zone, TimezoneLookup, ZoneOffset, ZoneRegion, ZoneTable};
