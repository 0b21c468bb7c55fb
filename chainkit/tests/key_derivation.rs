//! Tests for key derivation

use chainkit::account::Wallet;
use chainkit::crypto::keys::*;
use chainkit::crypto::mnemonic::*;
use chainkit::ChainFamily;

const MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

#[test]
fn test_evm_key_derivation() {
    let seed = mnemonic_to_seed(MNEMONIC, None).unwrap();

    let key_pair = derive_key_pair(&seed, ChainFamily::Evm, &ChainFamily::Evm.derivation_path(0)).unwrap();

    assert_eq!(key_pair.family(), ChainFamily::Evm);

    let address = ethereum::public_key_to_address(key_pair.public_key()).unwrap();
    assert_eq!(address, "0x9858effd232b4033e47d90003d41ec34ecaeda94");
}

#[test]
fn test_flow_key_derivation() {
    let seed = mnemonic_to_seed(MNEMONIC, None).unwrap();

    let key_pair = derive_key_pair(&seed, ChainFamily::Flow, "m/44'/539'/0'/0/0").unwrap();

    assert_eq!(key_pair.family(), ChainFamily::Flow);

    let public_key = flow::public_key_to_hex(key_pair.public_key()).unwrap();
    assert_eq!(public_key.len(), 128);
}

#[test]
fn test_mnemonic_derivation_matches_seed_derivation() {
    let seed = mnemonic_to_seed(MNEMONIC, None).unwrap();
    let from_seed = derive_private_key(&seed, ChainFamily::Flow, &ChainFamily::Flow.derivation_path(5)).unwrap();
    let from_mnemonic = derive_private_key_from_mnemonic(MNEMONIC, 5, ChainFamily::Flow).unwrap();

    assert_eq!(from_seed.as_bytes(), from_mnemonic.as_bytes());
}

#[test]
fn test_generated_mnemonic_round_trips() {
    let mnemonic = generate_mnemonic(MnemonicStrength::Words12).unwrap();
    assert_eq!(mnemonic.split_whitespace().count(), 12);
    assert!(validate_mnemonic(&mnemonic).is_ok());

    let wallet = Wallet::from_mnemonic(&mnemonic, ChainFamily::Evm).unwrap();
    assert_eq!(wallet.address(0).unwrap().len(), 42);
}

#[test]
fn test_private_key_hex_round_trip() {
    let key = derive_private_key_from_mnemonic(MNEMONIC, 0, ChainFamily::Evm).unwrap();
    let restored = PrivateKey::from_hex(&format!("0x{}", key.to_hex().as_str()), ChainFamily::Evm).unwrap();
    assert_eq!(key.as_bytes(), restored.as_bytes());
    assert!(!format!("{:?}", key).contains(key.to_hex().as_str()));
}
