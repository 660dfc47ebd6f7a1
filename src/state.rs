use crate::address::Address;
use crate::cluster::Cluster;
use crate::metadata::{Attribute, Creator};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_NFT_NAME: &str = "Unnamed NFT";
pub const DEFAULT_NFT_SYMBOL: &str = "SAND";
pub const DEFAULT_NFT_DESCRIPTION: &str = "A collection of digital art Minted with The Solana Advanced NFT Dashboard (S.A.N.D) program made by: Staplez Studio.";
pub const DEFAULT_CNFT_METADATA_URL: &str =
    "https://arweave.net/z_U8Fw7a_3c2B2a_8c1D1f_E3g5h_7j_9k_L0m_N1o";

pub const DEFAULT_MAX_DEPTH: u32 = 5;
pub const DEFAULT_MAX_BUFFER_SIZE: u32 = 8;
pub const DEFAULT_CANOPY_DEPTH: u32 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct RpcState {
    pub url: String,
    pub verified: bool,
    pub loading: bool,
    pub airdropping: bool,
    /// ミリ秒 (Unix epoch)
    pub airdrop_cooldown_end: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeState {
    pub address: Option<Address>,
    pub loading: bool,
    pub max_depth: u32,
    pub max_buffer_size: u32,
    pub canopy_depth: u32,
}

/// 親 NFT（コレクション or 単体 NFT）の入力フォーム
#[derive(Debug, Clone, PartialEq)]
pub struct NftForm {
    pub address: Option<Address>,
    pub loading: bool,
    pub fetching_metadata: bool,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image_url: String,
    pub external_url: String,
    /// ロイヤリティ (%)
    pub seller_fee: f64,
    pub is_mutable: bool,
    pub is_collection: bool,
    pub creators: Vec<Creator>,
    pub attributes: Vec<Attribute>,
    pub generated_json: Option<String>,
    pub show_metadata_viewer: bool,
    pub metadata_url: String,
    pub mint_to_different_wallet: bool,
    pub recipient_address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CnftForm {
    pub use_existing_metadata: bool,
    pub tree_address: String,
    pub collection_address: String,
    pub loading: bool,
    pub fetching_metadata: bool,
    pub metadata_url: String,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image_url: String,
    pub mint_to_collection: bool,
    pub mint_to_different_wallet: bool,
    pub recipient_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MintKind {
    #[serde(rename = "cNFT")]
    Cnft,
    #[serde(rename = "Parent NFT", alias = "ParentNFT")]
    ParentNft,
    #[serde(rename = "NFT")]
    Nft,
    #[serde(rename = "Merkle Tree", alias = "MerkleTree")]
    MerkleTree,
}

impl MintKind {
    pub fn label(&self) -> &'static str {
        match self {
            MintKind::Cnft => "cNFT",
            MintKind::ParentNft => "Parent NFT",
            MintKind::Nft => "NFT",
            MintKind::MerkleTree => "Merkle Tree",
        }
    }
}

/// ミント履歴の 1 件。id はトランザクション署名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MintKind,
    pub transaction_id: String,
    pub cluster: Cluster,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_collection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_address: Option<String>,
}

impl MintRecord {
    /// 履歴から再選択するのに必要なフィールドが揃っているか
    pub fn is_selectable(&self) -> bool {
        match self.kind {
            MintKind::MerkleTree | MintKind::ParentNft | MintKind::Nft => self
                .address
                .as_deref()
                .is_some_and(|a| !a.is_empty()),
            MintKind::Cnft => self
                .metadata_url
                .as_deref()
                .is_some_and(|u| !u.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub rpc: RpcState,
    pub tree: TreeState,
    pub parent_nft: NftForm,
    pub cnft: CnftForm,
    pub mint_history: Vec<MintRecord>,
}

impl Default for RpcState {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            verified: false,
            loading: false,
            airdropping: false,
            airdrop_cooldown_end: None,
        }
    }
}

impl Default for TreeState {
    fn default() -> Self {
        Self {
            address: None,
            loading: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            canopy_depth: DEFAULT_CANOPY_DEPTH,
        }
    }
}

impl Default for NftForm {
    fn default() -> Self {
        Self {
            address: None,
            loading: false,
            fetching_metadata: false,
            name: DEFAULT_NFT_NAME.to_string(),
            symbol: DEFAULT_NFT_SYMBOL.to_string(),
            description: DEFAULT_NFT_DESCRIPTION.to_string(),
            image_url: String::new(),
            external_url: String::new(),
            seller_fee: 0.0,
            is_mutable: true,
            is_collection: true,
            creators: Vec::new(),
            attributes: Vec::new(),
            generated_json: None,
            show_metadata_viewer: false,
            metadata_url: String::new(),
            mint_to_different_wallet: false,
            recipient_address: String::new(),
        }
    }
}

impl Default for CnftForm {
    fn default() -> Self {
        Self {
            use_existing_metadata: true,
            tree_address: String::new(),
            collection_address: String::new(),
            loading: false,
            fetching_metadata: false,
            metadata_url: DEFAULT_CNFT_METADATA_URL.to_string(),
            name: DEFAULT_NFT_NAME.to_string(),
            symbol: DEFAULT_NFT_SYMBOL.to_string(),
            description: String::new(),
            image_url: String::new(),
            mint_to_collection: false,
            mint_to_different_wallet: false,
            recipient_address: String::new(),
        }
    }
}
