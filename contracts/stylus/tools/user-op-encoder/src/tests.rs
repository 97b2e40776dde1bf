#[cfg(test)]
mod tests {
    use crate::encoder::{
        build_execute_call_data, build_transaction, build_user_operation, parse_hex_bytes,
        parse_signing_key, sign_transaction, sign_user_operation, signer_address,
    };
    use crate::types::{SignedUserOperation, UserOperationParams};
    use alloy_primitives::{address, Address, U256};
    use minimal_account_core::{
        entry_point::ENTRY_POINT_V07,
        testing::{EntryPointSimulator, MemoryChain},
        zksync::BOOTLOADER_FORMAL_ADDRESS,
        CallDescriptor, SmartAccount,
    };

    const OWNER_KEY: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
    const ACCOUNT: Address = address!("00000000000000000000000000000000000a11ce");
    const RECIPIENT: Address = address!("00000000000000000000000000000000000000b0");

    fn params(call_data: Vec<u8>) -> UserOperationParams {
        UserOperationParams {
            sender: ACCOUNT,
            nonce: U256::ZERO,
            init_code: Vec::new(),
            call_data,
            verification_gas_limit: 300_000,
            call_gas_limit: 100_000,
            pre_verification_gas: U256::from(50_000u64),
            max_priority_fee_per_gas: 1_000_000_000,
            max_fee_per_gas: 2_000_000_000,
        }
    }

    #[test]
    fn test_parse_inputs() {
        assert_eq!(parse_hex_bytes("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(parse_hex_bytes("beef").unwrap(), vec![0xbe, 0xef]);
        assert!(parse_hex_bytes("0x").unwrap().is_empty());
        assert!(parse_signing_key("0x1234").is_err());
        assert!(parse_signing_key(OWNER_KEY).is_ok());
    }

    #[test]
    fn test_execute_call_data() {
        let encoded = build_execute_call_data(RECIPIENT, U256::from(9u64), &[1, 2, 3]);
        let decoded = CallDescriptor::decode_execute(&encoded).unwrap();
        assert_eq!(decoded, CallDescriptor::new(RECIPIENT, U256::from(9u64), vec![1, 2, 3]));
    }

    #[test]
    fn test_signed_user_op_is_accepted_by_account() {
        let key = parse_signing_key(OWNER_KEY).unwrap();
        let mut chain = MemoryChain::new(421_614);
        chain.fund(ACCOUNT, U256::from(1_000u64));
        let account =
            SmartAccount::new_with_entry_point(signer_address(&key), ENTRY_POINT_V07).unwrap();

        let call_data = build_execute_call_data(RECIPIENT, U256::from(10u64), &[]);
        let mut user_op = build_user_operation(&params(call_data));
        let hash = sign_user_operation(&mut user_op, &key, ENTRY_POINT_V07, 421_614).unwrap();
        assert_eq!(user_op.signature.len(), 65);

        let json = serde_json::to_value(SignedUserOperation::new(&user_op, hash, signer_address(&key)))
            .unwrap();
        assert_eq!(json["userOpHash"], serde_json::json!(hash));
        assert!(json.get("accountGasLimits").is_some());

        let receipt = EntryPointSimulator::new(ENTRY_POINT_V07)
            .handle_op(&mut chain, &account, user_op, U256::ZERO)
            .unwrap();
        assert!(receipt.success);
        assert_eq!(chain.balance_of(RECIPIENT), U256::from(10u64));
    }

    #[test]
    fn test_signed_transaction_validates() {
        let key = parse_signing_key(OWNER_KEY).unwrap();
        let mut chain = MemoryChain::with_zksync_system_contracts(300);
        chain.fund(ACCOUNT, U256::from(10u64).pow(U256::from(18u64)));
        let account = SmartAccount::new_with_bootloader(signer_address(&key), 300).unwrap();

        let mut transaction = build_transaction(
            ACCOUNT,
            RECIPIENT,
            U256::from(5u64),
            Vec::new(),
            U256::ZERO,
            U256::from(1_000_000u64),
            U256::from(100u64),
        );
        let hash = sign_transaction(&mut transaction, &key, 300).unwrap();
        assert_eq!(hash, transaction.encode_hash(300));

        let magic = chain
            .transact(BOOTLOADER_FORMAL_ADDRESS, ACCOUNT, |frame| {
                account.validate_transaction(frame, &transaction)
            })
            .unwrap();
        assert_eq!(magic, minimal_account_core::zksync::ACCOUNT_VALIDATION_SUCCESS_MAGIC);
    }
}
