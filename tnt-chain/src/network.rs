//! Offline sink resolution over a network description
//!
//! A network file lists tank schematics by id and the sinks to resolve:
//!
//! ```json
//! {
//!   "tanks": [{ "id": 1, "schematic": { "asset_type": 0, "attachments": {} } }],
//!   "resolve": [{ "tank": 1, "sink": { "account": 9 }, "asset": 0 }]
//! }
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tnt_protocol::{AssetId, LookupUtilities, Sink, SinkChain, TankId, TankSchematic};
use tracing::debug;

/// Tank entry in a network file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankEntry {
    /// Tank id
    pub id: TankId,
    /// Tank configuration
    pub schematic: TankSchematic,
}

/// Sink to resolve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Tank the sink is relative to; when absent the sink must name its tanks
    #[serde(default)]
    pub tank: Option<TankId>,
    /// Starting sink
    pub sink: Sink,
    /// Asset every sink must accept
    #[serde(default)]
    pub asset: Option<AssetId>,
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Resolved chain
    Chain(SinkChain),
    /// Resolution failure, rendered
    Error(String),
}

/// Tanks and requests loaded from a network file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    /// Tanks
    #[serde(default)]
    pub tanks: Vec<TankEntry>,
    /// Requests
    #[serde(default)]
    pub resolve: Vec<ResolveRequest>,
}

impl Network {
    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Resolve every request with chains of at most `max_chain_length` sinks
    pub fn resolve_all(&self, max_chain_length: usize) -> Vec<(ResolveRequest, Resolution)> {
        let tanks: BTreeMap<TankId, &TankSchematic> = self
            .tanks
            .iter()
            .map(|entry| (entry.id, &entry.schematic))
            .collect();

        self.resolve
            .iter()
            .map(|request| {
                let resolution = Self::resolve_one(&tanks, request, max_chain_length);
                debug!(sink = %request.sink, ?resolution, "Resolved request");
                (request.clone(), resolution)
            })
            .collect()
    }

    fn resolve_one(
        tanks: &BTreeMap<TankId, &TankSchematic>,
        request: &ResolveRequest,
        max_chain_length: usize,
    ) -> Resolution {
        let detached = TankSchematic::default();
        let current = match request.tank {
            Some(id) => match tanks.get(&id) {
                Some(schematic) => *schematic,
                None => return Resolution::Error(format!("Tank not found: {}", id)),
            },
            None => match request.sink {
                Sink::SameTank => {
                    return Resolution::Error(
                        "Same-tank sink requires a tank to resolve against".to_string(),
                    )
                }
                Sink::Attachment(id) if id.tank_id.is_none() => {
                    return Resolution::Error(format!("Attachment {} does not name its tank", id))
                }
                _ => &detached,
            },
        };
        let utils = LookupUtilities::new(current).with_lookup(|id| tanks.get(&id).copied());
        match utils.get_sink_chain(&request.sink, max_chain_length, request.asset) {
            Ok(chain) => Resolution::Chain(chain),
            Err(err) => Resolution::Error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NETWORK: &str = r#"{
        "tanks": [
            {
                "id": 1,
                "schematic": {
                    "asset_type": 0,
                    "attachments": {
                        "0": {
                            "asset_flow_meter": {
                                "asset_type": 0,
                                "destination_sink": { "tank": 2 }
                            }
                        }
                    }
                }
            },
            { "id": 2, "schematic": { "asset_type": 1 } }
        ],
        "resolve": [
            { "sink": { "attachment": { "tank_id": 1, "attachment_id": 0 } } },
            { "sink": { "attachment": { "tank_id": 1, "attachment_id": 0 } }, "asset": 0 },
            { "tank": 1, "sink": { "attachment": { "attachment_id": 5 } } },
            { "tank": 7, "sink": "same_tank" }
        ]
    }"#;

    #[test]
    fn test_resolve_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", NETWORK).unwrap();

        let network = Network::from_file(file.path()).unwrap();
        let results = network.resolve_all(10);
        assert_eq!(results.len(), 4);

        match &results[0].1 {
            Resolution::Chain(chain) => {
                assert_eq!(chain.terminal(), Some(&Sink::Tank(TankId(2))))
            }
            other => panic!("expected chain, got {:?}", other),
        }
        assert_eq!(
            results[1].1,
            Resolution::Error("Bad sink tank:2: receives wrong asset".to_string())
        );
        assert!(matches!(&results[2].1, Resolution::Error(msg) if msg.contains("does not exist")));
        assert_eq!(results[3].1, Resolution::Error("Tank not found: tank:7".to_string()));
    }

    #[test]
    fn test_relative_sinks_need_a_tank() {
        let network: Network = serde_json::from_str(
            r#"{
                "tanks": [{ "id": 1, "schematic": { "asset_type": 3 } }],
                "resolve": [
                    { "sink": "same_tank", "asset": 3 },
                    { "sink": { "attachment": { "attachment_id": 0 } } },
                    { "tank": 1, "sink": "same_tank", "asset": 3 }
                ]
            }"#,
        )
        .unwrap();
        let results = network.resolve_all(10);

        assert!(matches!(&results[0].1, Resolution::Error(msg) if msg.contains("requires a tank")));
        assert!(matches!(&results[1].1, Resolution::Error(msg) if msg.contains("does not name its tank")));
        match &results[2].1 {
            Resolution::Chain(chain) => assert_eq!(chain.sinks, vec![Sink::SameTank]),
            other => panic!("expected chain, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"tanks\": 3 }}").unwrap();
        assert!(matches!(
            Network::from_file(file.path()),
            Err(crate::Error::Serialization(_))
        ));
    }
}
