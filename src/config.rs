use crate::domain::ballot::Ballot;
use crate::domain::identity::Identity;
use crate::domain::ledger::Ledger;
use crate::domain::registry::Registry;
use crate::domain::snapshot::Snapshot;
use crate::error::Result;
use crate::infrastructure::in_memory::{ReceiverBehavior, ScriptedReceiver, StaticReceivers};
use serde::Deserialize;
use std::path::Path;

/// Construction parameters for the engines, read from a TOML file.
///
/// Every section is optional:
///
/// ```toml
/// [ledger]
/// name = "Token"
/// symbol = "TKN"
/// total_supply = 10000
/// decimals = 18
/// creator = 1
///
/// [ballot]
/// options = ["Alice", "Bob"]
/// chairperson = 1
///
/// [[receivers]]
/// identity = 42
/// behavior = "accept"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    pub ballot: BallotConfig,
    pub receivers: Vec<ReceiverConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub name: String,
    pub symbol: String,
    pub total_supply: u128,
    pub decimals: u8,
    pub creator: Identity,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "Token".to_string(),
            symbol: "TKN".to_string(),
            total_supply: 10_000,
            decimals: 18,
            creator: Identity(1),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BallotConfig {
    pub options: Vec<String>,
    pub chairperson: Identity,
}

impl Default for BallotConfig {
    fn default() -> Self {
        Self {
            options: ["Alice", "Bob", "Charlie", "David", "Eve"]
                .into_iter()
                .map(String::from)
                .collect(),
            chairperson: Identity(1),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReceiverConfig {
    pub identity: Identity,
    #[serde(default)]
    pub behavior: ReceiverBehavior,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Builds the initial state of the three engines.
    pub fn genesis(&self) -> Result<Snapshot> {
        let ledger = Ledger::create(
            self.ledger.name.as_str(),
            self.ledger.symbol.as_str(),
            self.ledger.total_supply,
            self.ledger.decimals,
            self.ledger.creator,
        );
        let ballot = Ballot::construct(&self.ballot.options, self.ballot.chairperson)?;
        Ok(Snapshot::new(ledger, Registry::new(), ballot))
    }

    pub fn receivers(&self) -> StaticReceivers {
        let mut receivers = StaticReceivers::new();
        for receiver in &self.receivers {
            receivers.insert(receiver.identity, ScriptedReceiver::new(receiver.behavior));
        }
        receivers
    }
}
