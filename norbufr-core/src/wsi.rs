use std::fmt;

/// A WIGOS Station Identifier: `series-issuer-issue_num-local_id`.
///
/// `issuer` and `issue_num` are capped at 65534 (65535 is reserved as a
/// "missing" marker in the WIGOS scheme) and `local_id` at 16 characters,
/// matching the source's `WSI` class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wsi {
    pub series: i32,
    pub issuer: u16,
    pub issue_num: u16,
    pub local_id: String,
}

impl Default for Wsi {
    fn default() -> Self {
        Wsi { series: 0, issuer: 0, issue_num: 0, local_id: String::new() }
    }
}

#[derive(Debug)]
pub struct WsiParseError(pub String);

impl fmt::Display for WsiParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid WIGOS station identifier: {}", self.0)
    }
}

impl std::error::Error for WsiParseError {}

impl Wsi {
    pub fn new(series: i32, issuer: u16, issue_num: u16, local_id: impl Into<String>) -> Self {
        let local_id = local_id.into();
        debug_assert!(local_id.len() <= 16);
        Wsi { series, issuer, issue_num, local_id }
    }

    /// Builds a WSI from a 5-digit WMO block+station number, as used when a
    /// BUFR message carries a legacy WMO identifier rather than a native
    /// WIGOS one. Matches the source's `setWmoId`: issuer is fixed at 20000,
    /// series/issue_num at 0, and the local id is the zero-padded 5-digit
    /// number.
    pub fn from_wmo_id(wmo_id: u32) -> Self {
        Wsi { series: 0, issuer: 20000, issue_num: 0, local_id: format!("{wmo_id:05}") }
    }

    pub fn is_empty(&self) -> bool {
        self.local_id.is_empty()
    }

    pub fn parse(s: &str) -> Result<Self, WsiParseError> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 4 {
            return Err(WsiParseError(s.to_string()));
        }
        let series: i32 = parts[0].parse().map_err(|_| WsiParseError(s.to_string()))?;
        let issuer: u16 = parts[1].parse().map_err(|_| WsiParseError(s.to_string()))?;
        let issue_num: u16 = parts[2].parse().map_err(|_| WsiParseError(s.to_string()))?;
        let local_id = parts[3].to_string();
        if local_id.len() > 16 || issuer > 65534 || issue_num > 65534 {
            return Err(WsiParseError(s.to_string()));
        }
        Ok(Wsi { series, issuer, issue_num, local_id })
    }
}

impl fmt::Display for Wsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.series, self.issuer, self.issue_num, self.local_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_round_trips() {
        let s = "0-20000-0-12345";
        let wsi = Wsi::parse(s).unwrap();
        assert_eq!(wsi.to_string(), s);
    }

    #[test]
    fn from_wmo_id_matches_source_convention() {
        let wsi = Wsi::from_wmo_id(12345);
        assert_eq!(wsi.to_string(), "0-20000-0-12345");
    }

    #[test]
    fn rejects_local_id_over_16_chars() {
        assert!(Wsi::parse("0-1-0-12345678901234567").is_err());
    }

    #[test]
    fn ordering_is_lexicographic_over_tuple() {
        let a = Wsi::new(0, 1, 0, "a");
        let b = Wsi::new(0, 2, 0, "a");
        assert!(a < b);
    }
}
