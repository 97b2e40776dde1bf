use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::network::Network;

/// Keep recorded `cargo stylus` output bounded.
const MAX_RECORDED_OUTPUT: usize = 16_000;

/// One successful deployment.
#[derive(Debug)]
pub struct Deployment<'a> {
    pub network_name: &'a str,
    pub network: &'a Network,
    pub contract_key: &'a str,
    pub address: &'a str,
    pub tx_hashes: &'a [String],
    pub raw_output: &'a str,
}

/// Merge `deployment` into the JSON ledger at `path` and write it back atomically.
pub fn record(path: &Path, deployment: &Deployment<'_>) -> Result<Value> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?
    } else {
        String::new()
    };

    let mut root: Value = if existing.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&existing)
            .with_context(|| format!("failed parsing JSON in {}", path.display()))?
    };
    if !root.is_object() {
        root = json!({});
    }

    root["network"] = json!(deployment.network_name);
    root["chain_id"] = json!(deployment.network.chain_id);
    root["updated_at"] = json!(now);
    if root.get("deployments").and_then(Value::as_object).is_none() {
        root["deployments"] = json!({});
    }

    let mut entry = json!({
        "address": deployment.address,
        "entry_point": deployment.network.entry_point,
        "rpc_url": deployment.network.rpc_url,
        "deployed_at": now,
    });
    if !deployment.tx_hashes.is_empty() {
        entry["tx_hashes"] = json!(deployment.tx_hashes);
    }
    let trimmed = deployment.raw_output.trim();
    if !trimmed.is_empty() {
        entry["cargo_stylus_output"] = json!(truncate(trimmed, MAX_RECORDED_OUTPUT));
    }
    root["deployments"][deployment.contract_key] = entry;

    write_json_atomic(path, &root)?;
    Ok(root)
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised =
        serde_json::to_string_pretty(value).context("failed serialising deployments JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
