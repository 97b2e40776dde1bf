//! Mock collaborators: a mintable token, the zkSync nonce holder and deployer, and two
//! contracts that always refuse.

use alloc::vec::Vec;

use alloy_primitives::{keccak256, Address, FixedBytes, U256};
use alloy_sol_types::{sol, SolError, SolInterface, SolValue};

use super::{slot, CallContext, ChainState, MockContract};
use crate::zksync::{IContractDeployer, INonceHolder};

sol! {
    interface IMockToken {
        function mint(address to, uint256 amount) external;
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address holder) external view returns (uint256);
    }

    error InsufficientTokenBalance(address holder, uint256 balance, uint256 needed);
    error InvalidNonce(uint256 expected, uint256 actual);
    error SystemCallRequired();
    error AlreadyDeployed(address account);
    error Unsupported();
    error Reverted(bytes reason);
}

/// ERC-20-shaped token with an open `mint`.
pub struct MockToken;

impl MockToken {
    fn balance_key(holder: Address) -> FixedBytes<32> {
        slot(&[b"balance", holder.as_slice()])
    }

    /// Read a holder's balance straight from chain state.
    pub fn balance_of(state: &ChainState, token: Address, holder: Address) -> U256 {
        state.sload(token, Self::balance_key(holder))
    }
}

impl MockContract for MockToken {
    fn call(
        &self,
        state: &mut ChainState,
        ctx: &CallContext,
        input: &[u8],
    ) -> Result<Vec<u8>, Vec<u8>> {
        if !ctx.value.is_zero() {
            return Err(Unsupported {}.abi_encode());
        }
        let call = IMockToken::IMockTokenCalls::abi_decode(input, true)
            .map_err(|_| Unsupported {}.abi_encode())?;
        match call {
            IMockToken::IMockTokenCalls::mint(mint) => {
                let key = Self::balance_key(mint.to);
                let balance = state.sload(ctx.this, key);
                state.sstore(ctx.this, key, balance + mint.amount);
                Ok(Vec::new())
            }
            IMockToken::IMockTokenCalls::transfer(transfer) => {
                let from_key = Self::balance_key(ctx.caller);
                let from_balance = state.sload(ctx.this, from_key);
                if from_balance < transfer.amount {
                    return Err(InsufficientTokenBalance {
                        holder: ctx.caller,
                        balance: from_balance,
                        needed: transfer.amount,
                    }
                    .abi_encode());
                }
                state.sstore(ctx.this, from_key, from_balance - transfer.amount);
                let to_key = Self::balance_key(transfer.to);
                let to_balance = state.sload(ctx.this, to_key);
                state.sstore(ctx.this, to_key, to_balance + transfer.amount);
                Ok(true.abi_encode())
            }
            IMockToken::IMockTokenCalls::balanceOf(query) => {
                Ok(state.sload(ctx.this, Self::balance_key(query.holder)).abi_encode())
            }
        }
    }
}

/// zkSync nonce holder: one monotonic minimal nonce per account, advanced by system call only.
pub struct NonceHolder;

impl NonceHolder {
    fn nonce_key(account: Address) -> FixedBytes<32> {
        slot(&[b"minNonce", account.as_slice()])
    }

    pub fn min_nonce(state: &ChainState, holder: Address, account: Address) -> U256 {
        state.sload(holder, Self::nonce_key(account))
    }
}

impl MockContract for NonceHolder {
    fn call(
        &self,
        state: &mut ChainState,
        ctx: &CallContext,
        input: &[u8],
    ) -> Result<Vec<u8>, Vec<u8>> {
        let call = INonceHolder::INonceHolderCalls::abi_decode(input, true)
            .map_err(|_| Unsupported {}.abi_encode())?;
        match call {
            INonceHolder::INonceHolderCalls::incrementMinNonceIfEquals(increment) => {
                if !ctx.is_system {
                    return Err(SystemCallRequired {}.abi_encode());
                }
                let key = Self::nonce_key(ctx.caller);
                let current = state.sload(ctx.this, key);
                if current != increment.expectedNonce {
                    return Err(InvalidNonce {
                        expected: current,
                        actual: increment.expectedNonce,
                    }
                    .abi_encode());
                }
                state.sstore(ctx.this, key, current + U256::from(1u64));
                Ok(Vec::new())
            }
            INonceHolder::INonceHolderCalls::getMinNonce(query) => {
                Ok(state.sload(ctx.this, Self::nonce_key(query.account)).abi_encode())
            }
        }
    }
}

/// zkSync contract deployer. Only `create2` is modelled; it records the bytecode hash at the
/// derived address.
pub struct ContractDeployer;

impl ContractDeployer {
    /// zkSync CREATE2 address:
    /// `keccak256(keccak256("zksyncCreate2") || sender || salt || bytecodeHash || keccak256(input))`.
    pub fn create2_address(
        sender: Address,
        salt: FixedBytes<32>,
        bytecode_hash: FixedBytes<32>,
        input: &[u8],
    ) -> Address {
        let prefix = keccak256(b"zksyncCreate2");
        let sender_word = FixedBytes::<32>::left_padding_from(sender.as_slice());
        let hash = slot(&[
            prefix.as_slice(),
            sender_word.as_slice(),
            salt.as_slice(),
            bytecode_hash.as_slice(),
            keccak256(input).as_slice(),
        ]);
        Address::from_word(hash)
    }

    /// Bytecode hash recorded for `account`, zero if nothing was deployed there.
    pub fn deployed_code_hash(state: &ChainState, deployer: Address, account: Address) -> U256 {
        state.sload(deployer, slot(&[b"code", account.as_slice()]))
    }
}

impl MockContract for ContractDeployer {
    fn call(
        &self,
        state: &mut ChainState,
        ctx: &CallContext,
        input: &[u8],
    ) -> Result<Vec<u8>, Vec<u8>> {
        if !ctx.is_system {
            return Err(SystemCallRequired {}.abi_encode());
        }
        let call = IContractDeployer::IContractDeployerCalls::abi_decode(input, true)
            .map_err(|_| Unsupported {}.abi_encode())?;
        match call {
            IContractDeployer::IContractDeployerCalls::create2(create2) => {
                let account = Self::create2_address(
                    ctx.caller,
                    create2.salt,
                    create2.bytecodeHash,
                    &create2.input,
                );
                let key = slot(&[b"code", account.as_slice()]);
                if !state.sload(ctx.this, key).is_zero() {
                    return Err(AlreadyDeployed { account }.abi_encode());
                }
                state.sstore(ctx.this, key, U256::from_be_bytes(create2.bytecodeHash.0));
                if !ctx.value.is_zero() && !state.transfer(ctx.this, account, ctx.value) {
                    return Err(Unsupported {}.abi_encode());
                }
                Ok(account.abi_encode())
            }
            IContractDeployer::IContractDeployerCalls::create(_) => Err(Unsupported {}.abi_encode()),
        }
    }
}

/// Always reverts with `Reverted(reason)`.
pub struct Reverter {
    pub reason: Vec<u8>,
}

impl MockContract for Reverter {
    fn call(
        &self,
        _state: &mut ChainState,
        _ctx: &CallContext,
        _input: &[u8],
    ) -> Result<Vec<u8>, Vec<u8>> {
        Err(Reverted {
            reason: self.reason.clone().into(),
        }
        .abi_encode())
    }
}

/// Refuses any native value sent to it.
pub struct RejectingReceiver;

impl MockContract for RejectingReceiver {
    fn call(
        &self,
        _state: &mut ChainState,
        ctx: &CallContext,
        _input: &[u8],
    ) -> Result<Vec<u8>, Vec<u8>> {
        if ctx.value.is_zero() {
            Ok(Vec::new())
        } else {
            Err(Vec::new())
        }
    }
}
