//! The contract address book.
//!
//! Provisioning uploads contracts and persists their addresses as a JSON
//! object keyed by contract name; every wrapper resolves its target
//! address from here.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use alloy_primitives::Address;
use tracing::info;

use crate::error::{ContractError, Result};

/// Mapping from contract name to deployed address.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<String, Address>,
}

impl ContractRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let mut contracts = BTreeMap::new();
        for (name, address) in raw {
            let address = Address::from_str(&address).map_err(|e| {
                ContractError::InvalidAddress {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            contracts.insert(name, address);
        }
        Ok(Self { contracts })
    }

    /// Load a registry from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let registry = Self::from_json(&content)?;
        info!(
            path = %path.as_ref().display(),
            contracts = registry.contracts.len(),
            "loaded contract addresses"
        );
        Ok(registry)
    }

    /// Persist the registry as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let raw: BTreeMap<&str, String> = self
            .contracts
            .iter()
            .map(|(name, address)| (name.as_str(), format!("{address}")))
            .collect();
        let json = serde_json::to_string_pretty(&raw)?;
        std::fs::write(path.as_ref(), json)?;
        info!(path = %path.as_ref().display(), "saved contract addresses");
        Ok(())
    }

    /// Address of a named contract.
    pub fn address(&self, name: &str) -> std::result::Result<Address, ContractError> {
        self.contracts
            .get(name)
            .copied()
            .ok_or_else(|| ContractError::UnknownContract { name: name.into() })
    }

    /// Register (or replace) a contract address.
    pub fn insert(&mut self, name: impl Into<String>, address: Address) {
        self.contracts.insert(name.into(), address);
    }

    /// Number of registered contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether the registry holds no addresses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Iterate over `(name, address)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.contracts
            .iter()
            .map(|(name, address)| (name.as_str(), *address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x05e793ce0c6027323b4a83e8d416871087c1e773";

    #[test]
    fn from_json_parses_addresses() {
        let registry =
            ContractRegistry::from_json(&format!(r#"{{"namereg": "{ADDR}"}}"#)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.address("namereg").unwrap(),
            Address::from_str(ADDR).unwrap()
        );
    }

    #[test]
    fn unknown_contract_is_an_error() {
        let registry = ContractRegistry::new();
        assert!(matches!(
            registry.address("trading"),
            Err(ContractError::UnknownContract { .. })
        ));
    }

    #[test]
    fn bad_address_is_rejected() {
        let result = ContractRegistry::from_json(r#"{"cash": "not-an-address"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn json_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gospel.json");

        let mut registry = ContractRegistry::new();
        registry.insert("cash", Address::from_str(ADDR).unwrap());
        registry.save(&path).unwrap();

        let reloaded = ContractRegistry::load(&path).unwrap();
        assert_eq!(reloaded.address("cash").unwrap(), registry.address("cash").unwrap());
    }
}
