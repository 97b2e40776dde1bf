use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;

/// Canonical EntryPoint v0.7 deployment (same address on every chain).
pub const ENTRY_POINT_V07: &str = "0x0000000071727De22E5E9d8BAf0edAc6f37da032";

/// Where to deploy and which EntryPoint the account trusts.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Network {
    pub chain_id: u64,
    pub rpc_url: String,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

fn default_entry_point() -> String {
    ENTRY_POINT_V07.to_string()
}

fn builtin(chain_id: u64, rpc_url: &str) -> Network {
    Network {
        chain_id,
        rpc_url: rpc_url.to_string(),
        entry_point: default_entry_point(),
    }
}

/// Known networks, optionally extended or overridden by a JSON file of the form
/// `{ "<name>": { "chain_id": .., "rpc_url": "..", "entry_point": "0x.." } }`.
pub fn network_table(overrides: Option<&Path>) -> Result<BTreeMap<String, Network>> {
    let mut table = BTreeMap::from([
        ("devnet".to_string(), builtin(412_346, "http://localhost:8547")),
        (
            "arb-sepolia".to_string(),
            builtin(421_614, "https://sepolia-rollup.arbitrum.io/rpc"),
        ),
        ("arb-one".to_string(), builtin(42_161, "https://arb1.arbitrum.io/rpc")),
    ]);

    if let Some(path) = overrides {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        let extra: BTreeMap<String, Network> = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing JSON in {}", path.display()))?;
        table.extend(extra);
    }

    for (name, network) in &table {
        ensure_address(&network.entry_point)
            .with_context(|| format!("network `{name}` has an invalid entry_point"))?;
    }
    Ok(table)
}

pub fn resolve(table: &BTreeMap<String, Network>, name: &str) -> Result<Network> {
    table.get(name).cloned().ok_or_else(|| {
        let known: Vec<&str> = table.keys().map(String::as_str).collect();
        anyhow!("unknown network `{name}` (known: {})", known.join(", "))
    })
}

/// `0x` + 40 hex digits.
pub fn ensure_address(value: &str) -> Result<()> {
    let re = Regex::new(r"^0x[a-fA-F0-9]{40}$")?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(anyhow!("`{value}` is not a 20-byte hex address"))
    }
}
