//! Contract bindings for custodial wallets

use ethers::contract::abigen;

// Custodial smart-contract wallet holding assets on behalf of its owner
abigen!(
    CustodialWallet,
    r#"[
        function transfer(address tokenAddress, uint256 contractType, address recipient, uint256 amount, uint256 tokenId) external payable
        function transferBatch(address[] tokenAddress, uint256[] contractType, address[] recipient, uint256[] amount, uint256[] tokenId) external payable
        function approve(address tokenAddress, uint256 contractType, address spender, uint256 amount, uint256 tokenId) external
    ]"#,
);

// Factory cloning new custodial wallets for an owner
abigen!(
    CustodialWalletFactory,
    r#"[
        function cloneNewWallet(address owner, uint256 count) external
    ]"#,
);

abigen!(
    Erc20Metadata,
    r#"[
        function decimals() external view returns (uint8)
    ]"#,
);
