//! In-memory chain for exercising accounts off-chain.
//!
//! `MemoryChain` keeps balances, storage slots and emitted events, runs registered mock
//! contracts, and gives each call (and each top-level transaction) all-or-nothing semantics by
//! snapshotting state and restoring it on failure.

use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};

use alloy_primitives::{keccak256, Address, FixedBytes, U256};

use crate::{
    host::Host,
    signature::recover_address,
    types::{AccountEvent, CallOutcome},
    zksync::{DEPLOYER_SYSTEM_CONTRACT, NONCE_HOLDER_SYSTEM_CONTRACT},
};

pub mod mocks;
pub mod simulators;

pub use mocks::{ContractDeployer, MockToken, NonceHolder, RejectingReceiver, Reverter};
pub use simulators::{
    BootloaderSimulator, EntryPointSimulator, HandleOpError, OpReceipt, ProcessTxError,
};

/// Storage key derived from its parts: `keccak256(part_0 || part_1 || ...)`.
pub fn slot(parts: &[&[u8]]) -> FixedBytes<32> {
    let mut buf = Vec::new();
    for part in parts {
        buf.extend_from_slice(part);
    }
    keccak256(buf)
}

/// Everything a transaction can change.
#[derive(Clone, Debug, Default)]
pub struct ChainState {
    balances: BTreeMap<Address, U256>,
    storage: BTreeMap<(Address, FixedBytes<32>), U256>,
    logs: Vec<(Address, AccountEvent)>,
}

impl ChainState {
    pub fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn set_balance(&mut self, account: Address, amount: U256) {
        self.balances.insert(account, amount);
    }

    /// Move `amount` between accounts; `false` (and no change) when `from` cannot cover it.
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let from_balance = self.balance(from);
        if from_balance < amount {
            return false;
        }
        self.set_balance(from, from_balance - amount);
        let to_balance = self.balance(to);
        self.set_balance(to, to_balance + amount);
        true
    }

    pub fn sload(&self, contract: Address, key: FixedBytes<32>) -> U256 {
        self.storage.get(&(contract, key)).copied().unwrap_or_default()
    }

    pub fn sstore(&mut self, contract: Address, key: FixedBytes<32>, value: U256) {
        self.storage.insert((contract, key), value);
    }

    pub fn logs(&self) -> &[(Address, AccountEvent)] {
        &self.logs
    }
}

/// Call frame as seen by a mock contract.
#[derive(Clone, Copy, Debug)]
pub struct CallContext {
    pub caller: Address,
    pub this: Address,
    pub value: U256,
    pub is_system: bool,
}

/// Contract code living on the in-memory chain. State lives in [`ChainState`] storage so that
/// snapshots cover it.
pub trait MockContract {
    fn call(
        &self,
        state: &mut ChainState,
        ctx: &CallContext,
        input: &[u8],
    ) -> Result<Vec<u8>, Vec<u8>>;
}

pub struct MemoryChain {
    chain_id: u64,
    state: ChainState,
    contracts: BTreeMap<Address, Box<dyn MockContract>>,
}

impl MemoryChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: ChainState::default(),
            contracts: BTreeMap::new(),
        }
    }

    /// Chain with the nonce holder and deployer system contracts installed.
    pub fn with_zksync_system_contracts(chain_id: u64) -> Self {
        let mut chain = Self::new(chain_id);
        chain.deploy(NONCE_HOLDER_SYSTEM_CONTRACT, NonceHolder);
        chain.deploy(DEPLOYER_SYSTEM_CONTRACT, ContractDeployer);
        chain
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn deploy(&mut self, address: Address, contract: impl MockContract + 'static) {
        self.contracts.insert(address, Box::new(contract));
    }

    pub fn fund(&mut self, account: Address, amount: U256) {
        let balance = self.state.balance(account);
        self.state.set_balance(account, balance + amount);
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.state.balance(account)
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn logs(&self) -> &[(Address, AccountEvent)] {
        self.state.logs()
    }

    /// Top-level plain value transfer (e.g. funding an account through its receive hook).
    pub fn send_value(&mut self, from: Address, to: Address, amount: U256) -> CallOutcome {
        self.invoke(from, to, amount, &[], false)
    }

    /// Read-only call; state changes made by the callee are discarded.
    pub fn static_call(&self, target: Address, input: &[u8]) -> Result<Vec<u8>, Vec<u8>> {
        let mut scratch = self.state.clone();
        let ctx = CallContext {
            caller: Address::ZERO,
            this: target,
            value: U256::ZERO,
            is_system: false,
        };
        match self.contracts.get(&target) {
            Some(contract) => contract.call(&mut scratch, &ctx, input),
            None => Ok(Vec::new()),
        }
    }

    /// Run one top-level call into the account at `account`, sent by `sender`.
    ///
    /// If `f` fails, every state change it made is rolled back.
    pub fn transact<T, E>(
        &mut self,
        sender: Address,
        account: Address,
        f: impl FnOnce(&mut Frame<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        let snapshot = self.state.clone();
        let mut frame = Frame {
            chain: self,
            sender,
            account,
        };
        let result = f(&mut frame);
        if result.is_err() {
            self.state = snapshot;
        }
        result
    }

    fn invoke(
        &mut self,
        caller: Address,
        target: Address,
        value: U256,
        input: &[u8],
        is_system: bool,
    ) -> CallOutcome {
        let snapshot = self.state.clone();
        if !value.is_zero() && !self.state.transfer(caller, target, value) {
            return CallOutcome::Failure(Vec::new());
        }
        let ctx = CallContext {
            caller,
            this: target,
            value,
            is_system,
        };
        let result = match self.contracts.get(&target) {
            Some(contract) => contract.call(&mut self.state, &ctx, input),
            None => Ok(Vec::new()),
        };
        match result {
            Ok(output) => CallOutcome::Success(output),
            Err(revert) => {
                self.state = snapshot;
                CallOutcome::Failure(revert)
            }
        }
    }
}

/// [`Host`] view of the chain from inside one account call.
pub struct Frame<'a> {
    chain: &'a mut MemoryChain,
    sender: Address,
    account: Address,
}

impl Frame<'_> {
    pub fn chain_id(&self) -> u64 {
        self.chain.chain_id
    }

    pub fn state(&self) -> &ChainState {
        &self.chain.state
    }

    pub fn state_mut(&mut self) -> &mut ChainState {
        &mut self.chain.state
    }
}

impl Host for Frame<'_> {
    fn msg_sender(&self) -> Address {
        self.sender
    }

    fn contract_address(&self) -> Address {
        self.account
    }

    fn self_balance(&self) -> U256 {
        self.chain.balance_of(self.account)
    }

    fn call(&mut self, target: Address, value: U256, data: &[u8]) -> CallOutcome {
        self.chain.invoke(self.account, target, value, data, false)
    }

    fn system_call(&mut self, target: Address, value: U256, data: &[u8]) -> CallOutcome {
        self.chain.invoke(self.account, target, value, data, true)
    }

    fn recover_signer(&self, digest: FixedBytes<32>, signature: &[u8; 65]) -> Option<Address> {
        recover_address(digest, signature)
    }

    fn emit(&mut self, event: AccountEvent) {
        self.chain.state.logs.push((self.account, event));
    }
}
