use crate::error::CoreError;
use crate::log::{LogBuffer, LogLevel};
use chrono::Utc;

const MARKER: &[u8; 4] = b"BUFR";
const END_MARKER: &[u8; 4] = b"7777";

/// A single complete BUFR envelope as found in a byte stream: its raw bytes
/// (from the `BUFR` marker through the `7777` end marker, inclusive) and the
/// edition read out of Section 0.
#[derive(Debug, Clone)]
pub struct RawEnvelope {
    pub bytes: Vec<u8>,
    pub edition: u8,
}

/// Scans for the literal `BUFR` marker starting at `from`.
pub fn find_next(stream: &[u8], from: usize) -> Option<usize> {
    if from >= stream.len() {
        return None;
    }
    stream[from..].windows(MARKER.len()).position(|w| w == MARKER).map(|p| p + from)
}

fn find_end_marker(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..].windows(END_MARKER.len()).position(|w| w == END_MARKER).map(|p| p + from)
}

/// Outcome of [`check_buffer`]'s scan for a rogue second marker.
struct RecoveryCheck {
    /// Corrected total length to use for this envelope, if truncation is needed.
    truncated_len: Option<usize>,
}

/// Scans a loaded envelope buffer for a spurious second `BUFR` marker, which
/// indicates the declared Section 0 length overran into the next envelope
/// (a truncated or corrupt length field). If found, the caller should
/// truncate the current envelope to end just before the rogue marker and
/// resume scanning from there, per spec §4.2 / §4.9's framing recovery rule.
fn check_buffer(buf: &[u8]) -> RecoveryCheck {
    if let Some(rogue) = find_next(buf, 4) {
        return RecoveryCheck { truncated_len: Some(rogue) };
    }
    RecoveryCheck { truncated_len: None }
}

/// Reads the next complete BUFR envelope from `stream` starting at `pos`,
/// advancing `pos` past it (or past the point recovery rewound to).
///
/// Returns `Ok(None)` at clean end-of-stream (no marker found — a benign
/// condition, not an error). Recoverable framing corruption (a declared
/// length overrunning into a second envelope) is logged as an Error and the
/// envelope is truncated rather than propagated as an `Err`; only a short
/// read that leaves no usable envelope at all is returned as `Err`.
pub fn read_next_envelope(stream: &[u8], pos: &mut usize, log: &mut LogBuffer, bufr_id: Option<&str>) -> Result<Option<RawEnvelope>, CoreError> {
    let Some(marker_at) = find_next(stream, *pos) else {
        *pos = stream.len();
        return Ok(None);
    };
    if marker_at + 8 > stream.len() {
        *pos = stream.len();
        return Err(CoreError::ShortRead { wanted: 8, have: stream.len() - marker_at });
    }
    let header = &stream[marker_at..marker_at + 8];
    let declared_len = u32::from_be_bytes([0, header[4], header[5], header[6]]) as usize;
    let edition = header[7];

    let available = stream.len() - marker_at;
    let mut envelope_len = declared_len.min(available);
    let mut envelope = stream[marker_at..marker_at + envelope_len].to_vec();

    let recovery = check_buffer(&envelope);
    if let Some(truncated) = recovery.truncated_len {
        log.add(
            Utc::now(),
            LogLevel::Error,
            "framing",
            bufr_id.map(str::to_string),
            format!("spurious inner BUFR marker at offset {truncated}; truncating envelope and rewinding"),
        );
        envelope.truncate(truncated);
        envelope_len = truncated;
    } else if let Some(end_at) = find_end_marker(&envelope, 0) {
        let wanted_end = end_at + END_MARKER.len();
        if wanted_end < envelope_len {
            envelope.truncate(wanted_end);
            envelope_len = wanted_end;
        }
    }

    *pos = marker_at + envelope_len;
    Ok(Some(RawEnvelope { bytes: envelope, edition }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_envelope(inner_len: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MARKER);
        let len_bytes = (inner_len as u32).to_be_bytes();
        buf.extend_from_slice(&len_bytes[1..4]);
        buf.push(4); // edition
        buf.extend(std::iter::repeat(0u8).take(inner_len.saturating_sub(8).saturating_sub(4)));
        buf.extend_from_slice(END_MARKER);
        buf
    }

    #[test]
    fn finds_marker() {
        let mut stream = vec![0u8; 10];
        stream.extend_from_slice(MARKER);
        assert_eq!(find_next(&stream, 0), Some(10));
    }

    #[test]
    fn reads_single_clean_envelope() {
        let env = make_envelope(20);
        let mut log = LogBuffer::new(100, LogLevel::Trace);
        let mut pos = 0;
        let result = read_next_envelope(&env, &mut pos, &mut log, None).unwrap().unwrap();
        assert_eq!(result.edition, 4);
        assert_eq!(pos, env.len());
        assert!(log.is_empty());
    }

    #[test]
    fn recovers_from_spurious_inner_marker() {
        let first = make_envelope(16);
        let second = make_envelope(16);
        // Corrupt the first envelope's declared length so it overruns into the second.
        let mut stream = first.clone();
        stream[4..7].copy_from_slice(&(1000u32.to_be_bytes())[1..4]);
        stream.extend_from_slice(&second);

        let mut log = LogBuffer::new(100, LogLevel::Trace);
        let mut pos = 0;
        let first_result = read_next_envelope(&stream, &mut pos, &mut log, None).unwrap().unwrap();
        assert!(first_result.bytes.len() < 1000);
        assert_eq!(log.len(), 1);

        let second_result = read_next_envelope(&stream, &mut pos, &mut log, None).unwrap().unwrap();
        assert_eq!(second_result.edition, 4);
    }

    #[test]
    fn returns_none_at_clean_eof() {
        let stream = vec![0u8; 4];
        let mut log = LogBuffer::new(100, LogLevel::Trace);
        let mut pos = 0;
        assert!(read_next_envelope(&stream, &mut pos, &mut log, None).unwrap().is_none());
    }
}
