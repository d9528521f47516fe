//! Semantic projection of decoded BUFR observations into station-enriched,
//! GeoJSON-shaped E-SOH messages.
//!
//! Builds on `norbufr-core`'s decoder: this crate owns the per-subset
//! context tracker, the station registry (OSCAR) lookup, the time-window
//! acceptance check, and the ingest driver that ties a byte stream to a
//! sequence of emitted observation strings.

pub mod cf_names;
pub mod country_codes;
pub mod error;
pub mod ingest;
pub mod oscar;
pub mod projector;
pub mod time_window;

pub use error::ProjectionError;
pub use ingest::{ingest_bytes, ingest_path};
pub use oscar::{Oscar, Station};
pub use projector::{project_message, ProjectorConfig};
pub use time_window::TimeWindowConfig;
