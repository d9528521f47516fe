use crate::error::ProjectionError;
use norbufr_core::Wsi;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A station record as returned by an OSCAR lookup: its canonical WIGOS id
/// plus whatever attributes the registry has for it. `latitude`/`longitude`
/// are `None` when OSCAR itself has no coordinates on file for the station.
#[derive(Debug, Clone)]
pub struct Station {
    pub wigos_id: Wsi,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawIdentifier {
    #[serde(rename = "wigosStationIdentifier")]
    wigos_station_identifier: String,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    #[serde(rename = "wigosId")]
    wigos_id: String,
    #[serde(rename = "wigosStationIdentifiers", default)]
    wigos_station_identifiers: Vec<RawIdentifier>,
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResults {
    #[serde(rename = "stationSearchResults")]
    station_search_results: Vec<RawStation>,
}

/// An immutable, in-process station registry loaded from a WMO OSCAR JSON
/// snapshot. Lookup is by WIGOS id, including any alias ids a station
/// declares in `wigosStationIdentifiers`.
#[derive(Debug, Default)]
pub struct Oscar {
    stations: HashMap<Wsi, Station>,
}

impl Oscar {
    pub fn load(path: &Path) -> Result<Oscar, ProjectionError> {
        let contents = std::fs::read_to_string(path)?;
        let parsed: RawSearchResults = serde_json::from_str(&contents)?;
        let mut stations = HashMap::new();
        for raw in parsed.station_search_results {
            let Ok(primary) = Wsi::parse(&raw.wigos_id) else { continue };
            let station = Station {
                wigos_id: primary.clone(),
                name: raw.name.clone().unwrap_or_default(),
                latitude: raw.latitude,
                longitude: raw.longitude,
            };
            for alias in &raw.wigos_station_identifiers {
                if let Ok(alias_wsi) = Wsi::parse(&alias.wigos_station_identifier) {
                    stations.insert(alias_wsi, station.clone());
                }
            }
            stations.insert(primary, station);
        }
        Ok(Oscar { stations })
    }

    /// Returns the station for `wigos_id`, or `None` on a miss. Misses are
    /// not logged here — the projector decides whether a miss is
    /// significant in context (spec §7: "Oscar miss: empty return; no log").
    pub fn find(&self, wigos_id: &Wsi) -> Option<&Station> {
        self.stations.get(wigos_id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_snapshot() {
        let json = r#"{
            "stationSearchResults": [
                {
                    "wigosId": "0-20000-0-12345",
                    "name": "OSLO BLINDERN",
                    "latitude": 59.933,
                    "longitude": 10.72
                }
            ]
        }"#;
        let path = std::env::temp_dir().join(format!("norbufr-oscar-test-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        let oscar = Oscar::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let station = oscar.find(&Wsi::parse("0-20000-0-12345").unwrap()).unwrap();
        assert_eq!(station.name, "OSLO BLINDERN");
        assert_eq!(station.latitude, Some(59.933));
    }
}
