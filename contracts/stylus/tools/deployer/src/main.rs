use std::{
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use regex::Regex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod deployments;
mod network;

use deployments::Deployment;
use network::{ensure_address, network_table, resolve, Network};

/// Deploy the minimal account with `cargo stylus deploy`, then write/update a deployments JSON.
///
/// The account constructor takes the EntryPoint address; it comes from `--entry-point` or the
/// selected network.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory containing the Stylus contract crate (where `cargo stylus deploy` should be run).
    #[arg(long, default_value = "src/minimal-account")]
    contract_dir: PathBuf,

    /// Network name (devnet, arb-sepolia, arb-one, or one from --networks-file).
    #[arg(long, default_value = "devnet")]
    network: String,

    /// JSON file adding or overriding networks.
    #[arg(long, env = "NETWORKS_FILE")]
    networks_file: Option<PathBuf>,

    /// RPC URL used by `cargo stylus deploy`; defaults to the network's.
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// EntryPoint the account will trust; defaults to the network's.
    #[arg(long, env = "ENTRY_POINT")]
    entry_point: Option<String>,

    /// Path to a file containing the deployer private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key")]
    private_key_path: Option<String>,

    /// Private key (hex string, 0x...).
    #[arg(long, env = "PKEY", conflicts_with = "private_key_path")]
    private_key: Option<String>,

    /// Path to write deployment info; defaults to `deployments.<network>.json`.
    #[arg(long)]
    deployments_path: Option<PathBuf>,

    /// Key under `deployments` to store this contract.
    #[arg(long, default_value = "minimal-account")]
    contract_key: String,

    /// Extra args to pass through to `cargo stylus deploy` (after `--`).
    ///
    /// Example:
    /// `-- --estimate-gas`
    #[arg(last = true)]
    passthrough: Vec<String>,
}

impl Cli {
    /// Selected network with CLI/env overrides applied.
    fn target_network(&self) -> Result<Network> {
        let table = network_table(self.networks_file.as_deref())?;
        let mut network = resolve(&table, &self.network)?;
        if let Some(rpc_url) = &self.rpc_url {
            network.rpc_url = rpc_url.clone();
        }
        if let Some(entry_point) = &self.entry_point {
            ensure_address(entry_point).context("invalid --entry-point")?;
            network.entry_point = entry_point.clone();
        }
        Ok(network)
    }

    fn deployments_path(&self) -> PathBuf {
        self.deployments_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("deployments.{}.json", self.network)))
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let network = cli.target_network()?;
    info!(
        network = %cli.network,
        chain_id = network.chain_id,
        entry_point = %network.entry_point,
        "deploying"
    );

    let (address, tx_hashes, raw_output) = run_cargo_stylus_deploy(&cli, &network)?;
    let path = cli.deployments_path();
    deployments::record(
        &path,
        &Deployment {
            network_name: &cli.network,
            network: &network,
            contract_key: &cli.contract_key,
            address: &address,
            tx_hashes: &tx_hashes,
            raw_output: &raw_output,
        },
    )?;
    debug!(path = %path.display(), "deployments ledger updated");

    println!("Deployed `{}` to {}", cli.contract_key, address);
    Ok(())
}

fn stylus_deploy_command(cli: &Cli, network: &Network) -> Result<Command> {
    let mut cmd = Command::new("cargo");
    cmd.current_dir(&cli.contract_dir);
    cmd.arg("stylus").arg("deploy");
    cmd.arg("-e").arg(&network.rpc_url);

    if let Some(ref pk_path) = cli.private_key_path {
        cmd.arg("--private-key-path").arg(pk_path);
    } else if let Some(ref pk) = cli.private_key {
        cmd.arg("--private-key").arg(pk);
    } else {
        return Err(anyhow!(
            "missing deployer key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PKEY)"
        ));
    }

    cmd.arg("--constructor-args").arg(&network.entry_point);

    // Allow passing flags like --estimate-gas, --no-verify, etc.
    cmd.args(&cli.passthrough);
    Ok(cmd)
}

fn run_cargo_stylus_deploy(cli: &Cli, network: &Network) -> Result<(String, Vec<String>, String)> {
    let mut cmd = stylus_deploy_command(cli, network)?;
    // Keep stdout/stderr for parsing and for debugging when runs fail.
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let output = cmd
        .output()
        .context("failed to run `cargo stylus deploy`")?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let combined = format!("{stdout}\n{stderr}");

    if !output.status.success() {
        return Err(anyhow!(
            "`cargo stylus deploy` failed (exit {}):\n{}",
            output.status,
            combined
        ));
    }

    let (address, tx_hashes) = parse_deploy_output(&combined)?;
    Ok((address, tx_hashes, combined))
}

/// Pull the deployed address and confirmed tx hashes out of `cargo stylus deploy` output:
///   deployed code at address: 0x...
///   Deploying program to address 0x...
///   Confirmed tx 0x...
fn parse_deploy_output(output: &str) -> Result<(String, Vec<String>)> {
    let re_address =
        Regex::new(r"(?:Deploying program to address|deployed code at address:?)\s+(0x[a-fA-F0-9]{40})")?;
    let re_tx = Regex::new(r"Confirmed tx (0x[a-fA-F0-9]{64})")?;

    let address = re_address
        .captures_iter(output)
        .next()
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
        .ok_or_else(|| {
            anyhow!("could not parse deployed address from `cargo stylus deploy` output")
        })?;

    let tx_hashes = re_tx
        .captures_iter(output)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    Ok((address, tx_hashes))
}
