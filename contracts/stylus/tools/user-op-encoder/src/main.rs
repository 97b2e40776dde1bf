//! Build and sign operations for the minimal account.
//!
//! Usage:
//!   user-op-encoder user-op \
//!     --private-key <owner_key> --sender <account> --chain-id <id> \
//!     --target <dest> [--value <wei>] [--data <hex>] [--nonce <n>]
//!
//!   user-op-encoder zksync-tx \
//!     --private-key <owner_key> --account <account> --chain-id <id> \
//!     --to <dest> [--value <wei>] [--data <hex>] [--nonce <n>]
//!
//! The signed result is printed to stdout as JSON; diagnostics go through `RUST_LOG`.

use alloy_primitives::{Address, U256};
use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use minimal_account_core::entry_point::ENTRY_POINT_V07;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use user_op_encoder::{
    encoder::{
        build_execute_call_data, build_transaction, build_user_operation, parse_hex_bytes,
        parse_signing_key, sign_transaction, sign_user_operation, signer_address,
    },
    types::{SignedTransaction, SignedUserOperation, UserOperationParams},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Signed ERC-4337 v0.7 user operation calling `execute(target, value, data)`.
    UserOp(UserOpArgs),
    /// Signed zkSync EIP-712 transaction from the account.
    ZksyncTx(ZksyncTxArgs),
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Owner private key (hex, with or without 0x).
    #[arg(long, env = "PKEY")]
    private_key: String,

    #[arg(long)]
    chain_id: u64,
}

#[derive(Args, Debug)]
struct UserOpArgs {
    #[command(flatten)]
    key: KeyArgs,

    /// Address of the smart account.
    #[arg(long)]
    sender: Address,

    #[arg(long, env = "ENTRY_POINT", default_value_t = ENTRY_POINT_V07)]
    entry_point: Address,

    /// Target of the inner call.
    #[arg(long)]
    target: Address,

    /// Wei sent with the inner call.
    #[arg(long, default_value = "0")]
    value: U256,

    /// Inner call payload.
    #[arg(long, default_value = "0x")]
    data: String,

    #[arg(long, default_value = "0")]
    nonce: U256,

    #[arg(long, default_value_t = 300_000)]
    verification_gas_limit: u128,

    #[arg(long, default_value_t = 100_000)]
    call_gas_limit: u128,

    #[arg(long, default_value_t = 50_000)]
    pre_verification_gas: u64,

    #[arg(long, default_value_t = 2_000_000_000)]
    max_fee_per_gas: u128,

    #[arg(long, default_value_t = 1_000_000_000)]
    max_priority_fee_per_gas: u128,
}

#[derive(Args, Debug)]
struct ZksyncTxArgs {
    #[command(flatten)]
    key: KeyArgs,

    /// Address of the smart account.
    #[arg(long)]
    account: Address,

    #[arg(long)]
    to: Address,

    #[arg(long, default_value = "0")]
    value: U256,

    #[arg(long, default_value = "0x")]
    data: String,

    #[arg(long, default_value = "0")]
    nonce: U256,

    #[arg(long, default_value_t = 1_000_000)]
    gas_limit: u64,

    #[arg(long, default_value_t = 250_000_000)]
    max_fee_per_gas: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = match cli.command {
        Command::UserOp(args) => user_op(args)?,
        Command::ZksyncTx(args) => zksync_tx(args)?,
    };
    println!("{json}");
    Ok(())
}

fn user_op(args: UserOpArgs) -> Result<String> {
    let key = parse_signing_key(&args.key.private_key).wrap_err("failed parsing --private-key")?;
    let data = parse_hex_bytes(&args.data).wrap_err("failed parsing --data")?;
    let call_data = build_execute_call_data(args.target, args.value, &data);
    debug!(target = %args.target, value = %args.value, call_data_len = call_data.len(), "built execute calldata");

    let mut user_op = build_user_operation(&UserOperationParams {
        sender: args.sender,
        nonce: args.nonce,
        init_code: Vec::new(),
        call_data,
        verification_gas_limit: args.verification_gas_limit,
        call_gas_limit: args.call_gas_limit,
        pre_verification_gas: U256::from(args.pre_verification_gas),
        max_priority_fee_per_gas: args.max_priority_fee_per_gas,
        max_fee_per_gas: args.max_fee_per_gas,
    });
    let user_op_hash =
        sign_user_operation(&mut user_op, &key, args.entry_point, args.key.chain_id)?;
    info!(%user_op_hash, entry_point = %args.entry_point, chain_id = args.key.chain_id, "signed user operation");

    let signed = SignedUserOperation::new(&user_op, user_op_hash, signer_address(&key));
    serde_json::to_string_pretty(&signed).wrap_err("failed serialising user operation")
}

fn zksync_tx(args: ZksyncTxArgs) -> Result<String> {
    let key = parse_signing_key(&args.key.private_key).wrap_err("failed parsing --private-key")?;
    let data = parse_hex_bytes(&args.data).wrap_err("failed parsing --data")?;

    let mut transaction = build_transaction(
        args.account,
        args.to,
        args.value,
        data,
        args.nonce,
        U256::from(args.gas_limit),
        U256::from(args.max_fee_per_gas),
    );
    let tx_hash = sign_transaction(&mut transaction, &key, args.key.chain_id)?;
    info!(%tx_hash, chain_id = args.key.chain_id, "signed zkSync transaction");

    let signed = SignedTransaction::new(&transaction, tx_hash, signer_address(&key));
    serde_json::to_string_pretty(&signed).wrap_err("failed serialising transaction")
}
