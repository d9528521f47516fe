use std::fmt;

/// Errors raised while framing, parsing, or expanding a BUFR envelope.
///
/// Bit-level primitives in [`crate::bitbuffer`] are total and never produce
/// this type; only section framing, table lookups, and descriptor expansion
/// can fail in a way that aborts the current message.
#[derive(Debug)]
pub enum CoreError {
    /// No `BUFR` marker found in the remaining input. Callers should treat
    /// this as end-of-stream, not as a parse failure.
    NoMarker,
    /// A section or the envelope as a whole ended before its declared length.
    ShortRead { wanted: usize, have: usize },
    /// Section 3 or Section 4 failed a structural check (e.g. subset count
    /// of zero, or a bit-vector length that disagrees with the declared
    /// descriptor layout).
    MalformedSection { section: u8, detail: String },
    /// A bit-level read would have started or ended past the end of the
    /// buffer supplying the current message's payload.
    BitOverrun { start: usize, width: usize, len: usize },
    /// A replication (`1 X 0`) descriptor was not immediately followed by a
    /// delayed-repetition counter (`0 31 Y`).
    MissingDelayedCounter,
    /// Under compression, subsets disagreed on the value of a delayed
    /// repetition counter or associated descriptor that compression requires
    /// to be uniform across all subsets.
    CompressedCounterMismatch,
    /// A Table B/C/D lookup failed and the caller asked for a hard error
    /// rather than a sentinel empty meta.
    TableLookupMiss(crate::descriptor::DescriptorId),
    /// A table file could not be read or did not match its expected format.
    TableFile(String),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::NoMarker => write!(f, "no BUFR marker found"),
            CoreError::ShortRead { wanted, have } => {
                write!(f, "short read: wanted {wanted} bytes, have {have}")
            }
            CoreError::MalformedSection { section, detail } => {
                write!(f, "malformed section {section}: {detail}")
            }
            CoreError::BitOverrun { start, width, len } => write!(
                f,
                "bit read [{start}, {}) overruns buffer of length {len}",
                start + width
            ),
            CoreError::MissingDelayedCounter => {
                write!(f, "replication descriptor missing its delayed repetition counter")
            }
            CoreError::CompressedCounterMismatch => write!(
                f,
                "subsets disagree on a value that compression requires to be uniform"
            ),
            CoreError::TableLookupMiss(id) => write!(f, "no table entry for descriptor {id}"),
            CoreError::TableFile(detail) => write!(f, "table file error: {detail}"),
            CoreError::Io(e) => write!(f, "I/O error: {e}"),
            CoreError::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Io(e) => Some(e),
            CoreError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Io(e)
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Csv(e)
    }
}
