//! 外部ライブラリとの境界。署名・トランザクション構築・Merkle tree の作成はすべてこの先で行う

use crate::address::Address;
use crate::metadata::Creator;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, Utc};

#[async_trait]
pub trait RpcClient: Send + Sync {
    /// 疎通確認（getVersion 相当）
    async fn verify(&self, url: &str) -> Result<()>;
    async fn request_airdrop(&self, url: &str, recipient: &Address, lamports: u64)
    -> Result<String>;
    async fn confirm(&self, url: &str, signature: &str) -> Result<()>;
}

#[async_trait]
pub trait Wallet: Send + Sync {
    fn public_key(&self) -> Option<Address>;
    async fn disconnect(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: u32,
    pub max_buffer_size: u32,
    pub canopy_depth: u32,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTree {
    pub signature: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NftParams {
    pub name: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub is_mutable: bool,
    pub is_collection: bool,
    pub creators: Vec<(Address, u8)>,
    pub token_owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedNft {
    pub signature: String,
    pub mint: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CnftParams {
    pub leaf_owner: Address,
    pub merkle_tree: Address,
    pub collection: Option<Address>,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Vec<Creator>,
}

#[async_trait]
pub trait MintingSdk: Send + Sync {
    async fn create_tree(&self, params: TreeParams) -> Result<CreatedTree>;
    async fn create_nft(&self, params: NftParams) -> Result<CreatedNft>;
    async fn mint_to_collection(&self, params: CnftParams) -> Result<String>;
    async fn mint(&self, params: CnftParams) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// 現在時刻。ハンドラはこれを通してのみ時刻を得る
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
    fn local_now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
