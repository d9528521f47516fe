//! Decoder core for WMO FM-94 BUFR messages: message framing, descriptor
//! tables, the descriptor expansion engine (including compressed-subset
//! handling), and bit-level value extraction.
//!
//! This crate stops at the decoded, expanded descriptor stream; mapping that
//! stream into station-enriched observation messages is `norbufr-esoh`.

pub mod bitbuffer;
pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod framing;
pub mod log;
pub mod sections;
pub mod tables;
pub mod value_extractor;
pub mod wsi;

pub use bitbuffer::BitBuffer;
pub use decoder::{decode_message, DecodedMessage};
pub use descriptor::{Descriptor, DescriptorId, DescriptorMeta, MetaPool};
pub use error::CoreError;
pub use framing::{find_next, read_next_envelope, RawEnvelope};
pub use log::{LogBuffer, LogEntry, LogLevel};
pub use wsi::Wsi;
