use crate::address::Address;
use crate::metadata::{Attribute, Creator};
use crate::persistence::PersistedSession;
use crate::state::MintRecord;

/// Session に対する唯一の更新手段
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // RPC
    SetRpcUrl(String),
    SetRpcStatus { verified: bool, loading: bool },
    AirdropStart,
    AirdropFinish,
    SetAirdropCooldownEnd(Option<u64>),

    // Merkle tree
    CreateTreeStart,
    CreateTreeSuccess(Address),
    CreateTreeFailure,
    SetTreeConfig(TreeConfigField),
    ResetTreeSelection,

    // 親 NFT
    SetParentNftForm(ParentNftField),
    SetAllParentNftFormFields(ParentNftPatch),
    UpdateParentNftCreators(Vec<Creator>),
    AddParentAttribute,
    RemoveParentAttribute(usize),
    UpdateParentAttribute {
        index: usize,
        field: AttributeField,
        value: String,
    },
    FetchParentMetadataStart,
    FetchParentMetadataFinish,
    GenerateParentMetadata(String),
    HideMetadataViewer,
    SetParentMetadataUrl(String),
    ResetParentNftForm,
    MintParentStart,
    MintParentSuccess(Address),
    MintParentFailure,

    // cNFT
    SetCnftForm(CnftField),
    FetchCnftMetadataStart,
    FetchCnftMetadataFinish(CnftPreview),
    MintCnftStart,
    MintCnftSuccess,
    MintCnftFailure,

    // 履歴・保存
    AddToHistory(MintRecord),
    LoadDatabase(PersistedSession),
    ResetAppState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeConfigField {
    MaxDepth(u32),
    MaxBufferSize(u32),
    CanopyDepth(u32),
}

/// 親 NFT フォームの 1 フィールド更新
#[derive(Debug, Clone, PartialEq)]
pub enum ParentNftField {
    Name(String),
    Symbol(String),
    Description(String),
    ImageUrl(String),
    ExternalUrl(String),
    SellerFee(f64),
    IsMutable(bool),
    IsCollection(bool),
    MintToDifferentWallet(bool),
    RecipientAddress(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeField {
    TraitType,
    Value,
}

/// cNFT フォームの 1 フィールド更新
#[derive(Debug, Clone, PartialEq)]
pub enum CnftField {
    UseExistingMetadata(bool),
    TreeAddress(String),
    CollectionAddress(String),
    MetadataUrl(String),
    Name(String),
    Symbol(String),
    Description(String),
    ImageUrl(String),
    MintToCollection(bool),
    MintToDifferentWallet(bool),
    RecipientAddress(String),
}

/// 親 NFT フォームの部分更新。None のフィールドは変更しない
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentNftPatch {
    pub address: Option<Option<Address>>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
    pub seller_fee: Option<f64>,
    pub is_mutable: Option<bool>,
    pub is_collection: Option<bool>,
    pub creators: Option<Vec<Creator>>,
    pub attributes: Option<Vec<Attribute>>,
    pub metadata_url: Option<String>,
    pub mint_to_different_wallet: Option<bool>,
    pub recipient_address: Option<String>,
}

/// 既存メタデータから読み込んだ cNFT プレビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnftPreview {
    pub image_url: String,
    pub name: String,
    pub symbol: String,
}

impl CnftPreview {
    /// 取得失敗時に表示するプレースホルダ
    pub fn failed() -> Self {
        Self {
            image_url: String::new(),
            name: "Error".to_string(),
            symbol: "ERR".to_string(),
        }
    }
}
