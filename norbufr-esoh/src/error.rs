use std::fmt;

/// Errors raised above the decoder core: station registry loading and
/// projection-level failures that abort a whole ingest run rather than just
/// skipping a subset (subset-scoped failures like missing geolocation are
/// not errors — they're Warn log entries and an empty emission, per §4.9).
#[derive(Debug)]
pub enum ProjectionError {
    Core(norbufr_core::CoreError),
    OscarFile(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::Core(e) => write!(f, "{e}"),
            ProjectionError::OscarFile(detail) => write!(f, "OSCAR registry error: {detail}"),
            ProjectionError::Io(e) => write!(f, "I/O error: {e}"),
            ProjectionError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for ProjectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProjectionError::Core(e) => Some(e),
            ProjectionError::Io(e) => Some(e),
            ProjectionError::Json(e) => Some(e),
            ProjectionError::OscarFile(_) => None,
        }
    }
}

impl From<norbufr_core::CoreError> for ProjectionError {
    fn from(e: norbufr_core::CoreError) -> Self {
        ProjectionError::Core(e)
    }
}

impl From<std::io::Error> for ProjectionError {
    fn from(e: std::io::Error) -> Self {
        ProjectionError::Io(e)
    }
}

impl From<serde_json::Error> for ProjectionError {
    fn from(e: serde_json::Error) -> Self {
        ProjectionError::Json(e)
    }
}
