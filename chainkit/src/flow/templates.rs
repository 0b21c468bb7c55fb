//! Cadence transaction templates
//!
//! Placeholders of the form `0xNAME` are replaced with network specific contract
//! addresses before a script is submitted.

use super::constants::{FlowContracts, TokenInfo, NFT_CONTRACT_NAME};

const TRANSFER: &str = r#"import FungibleToken from 0xFUNGIBLE_TOKEN
import TOKEN_NAME from 0xTOKEN_ADDRESS

transaction(amount: UFix64, recipient: Address) {
    let sentVault: @FungibleToken.Vault

    prepare(signer: AuthAccount) {
        let vaultRef = signer.borrow<&TOKEN_NAME.Vault>(from: /storage/VAULT_PATH)
            ?? panic("Could not borrow reference to the owner's vault")
        self.sentVault <- vaultRef.withdraw(amount: amount)
    }

    execute {
        let receiverRef = getAccount(recipient)
            .getCapability(/public/RECEIVER_PATH)
            .borrow<&{FungibleToken.Receiver}>()
            ?? panic("Could not borrow receiver reference to the recipient's vault")
        receiverRef.deposit(from: <-self.sentVault)
    }
}
"#;

const MINT_NFT: &str = r#"import NFT_CONTRACT from 0xNFT_ADDRESS

transaction(recipient: Address, url: String, type: String) {
    let minter: &NFT_CONTRACT.NFTMinter

    prepare(signer: AuthAccount) {
        self.minter = signer.borrow<&NFT_CONTRACT.NFTMinter>(from: NFT_CONTRACT.MinterStoragePath)
            ?? panic("Could not borrow a reference to the NFT minter")
    }

    execute {
        let receiver = getAccount(recipient)
            .getCapability(NFT_CONTRACT.CollectionPublicPath)
            .borrow<&{NFT_CONTRACT.TatumMultiNftCollectionPublic}>()
            ?? panic("Could not borrow the recipient's collection")
        self.minter.mintNFT(recipient: receiver, type: type, url: url, address: recipient)
    }
}
"#;

const MINT_MULTIPLE_NFT: &str = r#"import NFT_CONTRACT from 0xNFT_ADDRESS

transaction(recipient: [Address], url: [String], type: String) {
    let minter: &NFT_CONTRACT.NFTMinter

    prepare(signer: AuthAccount) {
        self.minter = signer.borrow<&NFT_CONTRACT.NFTMinter>(from: NFT_CONTRACT.MinterStoragePath)
            ?? panic("Could not borrow a reference to the NFT minter")
    }

    execute {
        var i = 0
        while i < recipient.length {
            let receiver = getAccount(recipient[i])
                .getCapability(NFT_CONTRACT.CollectionPublicPath)
                .borrow<&{NFT_CONTRACT.TatumMultiNftCollectionPublic}>()
                ?? panic("Could not borrow the recipient's collection")
            self.minter.mintNFT(recipient: receiver, type: type, url: url[i], address: recipient[i])
            i = i + 1
        }
    }
}
"#;

const BURN_NFT: &str = r#"import NFT_CONTRACT from 0xNFT_ADDRESS

transaction(withdrawID: UInt64, type: String) {
    let collectionRef: &NFT_CONTRACT.Collection

    prepare(signer: AuthAccount) {
        self.collectionRef = signer.borrow<&NFT_CONTRACT.Collection>(from: NFT_CONTRACT.CollectionStoragePath)
            ?? panic("Could not borrow a reference to the owner's collection")
    }

    execute {
        let nft <- self.collectionRef.withdraw(withdrawID: withdrawID, type: type)
        destroy nft
    }
}
"#;

const TRANSFER_NFT: &str = r#"import NFT_CONTRACT from 0xNFT_ADDRESS

transaction(recipient: Address, withdrawID: UInt64) {
    let collectionRef: &NFT_CONTRACT.Collection

    prepare(signer: AuthAccount) {
        self.collectionRef = signer.borrow<&NFT_CONTRACT.Collection>(from: NFT_CONTRACT.CollectionStoragePath)
            ?? panic("Could not borrow a reference to the owner's collection")
    }

    execute {
        let depositRef = getAccount(recipient)
            .getCapability(NFT_CONTRACT.CollectionPublicPath)
            .borrow<&{NFT_CONTRACT.TatumMultiNftCollectionPublic}>()
            ?? panic("Could not borrow the recipient's collection")
        let nft <- self.collectionRef.withdraw(withdrawID: withdrawID)
        depositRef.deposit(token: <-nft)
    }
}
"#;

const CREATE_ACCOUNT: &str = r#"transaction(publicKeys: [String]) {
    prepare(signer: AuthAccount) {
        let account = AuthAccount(payer: signer)
        for key in publicKeys {
            account.addPublicKey(key.decodeHex())
        }
    }
}
"#;

const ADD_PUBLIC_KEY: &str = r#"transaction(publicKey: String) {
    prepare(signer: AuthAccount) {
        signer.addPublicKey(publicKey.decodeHex())
    }
}
"#;

pub fn transfer(contracts: &FlowContracts, token: &TokenInfo) -> String {
    TRANSFER
        .replace("0xFUNGIBLE_TOKEN", &contracts.fungible_token.to_string())
        .replace("0xTOKEN_ADDRESS", &token.address.to_string())
        .replace("TOKEN_NAME", token.name)
        .replace("VAULT_PATH", token.vault_path)
        .replace("RECEIVER_PATH", token.receiver_path)
}

fn nft(template: &str, contracts: &FlowContracts) -> String {
    template
        .replace("0xNFT_ADDRESS", &contracts.nft.to_string())
        .replace("NFT_CONTRACT", NFT_CONTRACT_NAME)
}

pub fn mint_nft(contracts: &FlowContracts) -> String {
    nft(MINT_NFT, contracts)
}

pub fn mint_multiple_nft(contracts: &FlowContracts) -> String {
    nft(MINT_MULTIPLE_NFT, contracts)
}

pub fn burn_nft(contracts: &FlowContracts) -> String {
    nft(BURN_NFT, contracts)
}

pub fn transfer_nft(contracts: &FlowContracts) -> String {
    nft(TRANSFER_NFT, contracts)
}

pub fn create_account() -> String {
    CREATE_ACCOUNT.to_string()
}

pub fn add_public_key() -> String {
    ADD_PUBLIC_KEY.to_string()
}
