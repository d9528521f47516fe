use crate::error::ProjectionError;
use crate::oscar::Oscar;
use crate::projector::{self, ProjectorConfig};
use crate::time_window::TimeWindowConfig;
use chrono::Utc;
use norbufr_core::tables::{TableB, TableC, TableD};
use norbufr_core::{decoder, framing, LogBuffer, LogLevel};
use std::path::Path;

/// Decodes and projects every envelope found in `data`, in stream order.
/// A malformed envelope aborts only that envelope (logged at Error); framing
/// corruption is recovered from inside [`framing::read_next_envelope`]
/// itself. Returns every observation JSON string produced across the whole
/// stream.
#[allow(clippy::too_many_arguments)]
pub fn ingest_bytes(
    data: &[u8],
    table_b: &TableB,
    table_d: &TableD,
    table_c: &TableC,
    oscar: &Oscar,
    time_window: &TimeWindowConfig,
    config: &ProjectorConfig,
    log: &mut LogBuffer,
) -> Vec<String> {
    let mut pos = 0usize;
    let mut out = Vec::new();

    loop {
        let envelope = match framing::read_next_envelope(data, &mut pos, log, None) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => break,
            Err(e) => {
                log.add(Utc::now(), LogLevel::Error, "ingest", None, format!("framing error: {e}"));
                break;
            }
        };

        let decoded = match decoder::decode_message(&envelope, table_b, table_d, log, None) {
            Ok(decoded) => decoded,
            Err(e) => {
                log.add(Utc::now(), LogLevel::Error, "ingest", None, format!("decode error: {e}"));
                continue;
            }
        };

        let emitted = projector::project_message(&decoded, table_c, oscar, time_window, config, log);
        out.extend(emitted);
    }

    out
}

/// Reads `path` (or stdin if `path` is `-`) and runs [`ingest_bytes`] over
/// its contents.
#[allow(clippy::too_many_arguments)]
pub fn ingest_path(
    path: &Path,
    table_b: &TableB,
    table_d: &TableD,
    table_c: &TableC,
    oscar: &Oscar,
    time_window: &TimeWindowConfig,
    config: &ProjectorConfig,
    log: &mut LogBuffer,
) -> Result<Vec<String>, ProjectionError> {
    let data = if path == Path::new("-") {
        use std::io::Read;
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        std::fs::read(path)?
    };
    Ok(ingest_bytes(&data, table_b, table_d, table_c, oscar, time_window, config, log))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_bytes_reports_decode_error_and_keeps_going() {
        let mut log = LogBuffer::new(100, LogLevel::Trace);
        let table_b = TableB::new();
        let table_d = TableD::new();
        let table_c = TableC::new();
        let oscar = Oscar::default();
        let time_window = TimeWindowConfig::default();
        let config = ProjectorConfig::default();

        // Section 3 with a zero subset count is rejected by Section3::parse,
        // which should surface as a logged decode error, not a panic.
        let mut bad = Vec::new();
        bad.extend_from_slice(b"BUFR");
        bad.extend_from_slice(&[0, 0, 30, 4]);
        bad.extend_from_slice(&[0u8; 22]); // minimal section1-ish filler
        bad.extend_from_slice(b"7777");

        let out = ingest_bytes(&bad, &table_b, &table_d, &table_c, &oscar, &time_window, &config, &mut log);
        assert!(out.is_empty());
    }
}
