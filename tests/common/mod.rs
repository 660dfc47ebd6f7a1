#![allow(dead_code)]

use advanced_mint::action::Action;
use advanced_mint::address::Address;
use advanced_mint::collaborators::{
    Clock, CnftParams, CreatedNft, CreatedTree, HttpResponse, MetadataFetcher, MintingSdk,
    NftParams, RpcClient, TreeParams, Wallet,
};
use advanced_mint::config::Config;
use advanced_mint::dashboard::{Collaborators, Dashboard};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const WALLET: Address = Address::new([1; 32]);
pub const TREE: Address = Address::new([2; 32]);
pub const MINT: Address = Address::new([3; 32]);
pub const START_MS: u64 = 1_700_000_000_000;

#[derive(Default)]
pub struct MockRpc {
    pub verify_error: Mutex<Option<String>>,
    pub airdrop_error: Mutex<Option<String>>,
    pub airdrop_calls: AtomicUsize,
}

#[async_trait]
impl RpcClient for MockRpc {
    async fn verify(&self, _url: &str) -> Result<()> {
        match self.verify_error.lock().unwrap().clone() {
            Some(msg) => Err(anyhow!(msg)),
            None => Ok(()),
        }
    }

    async fn request_airdrop(&self, _url: &str, _recipient: &Address, _lamports: u64) -> Result<String> {
        let n = self.airdrop_calls.fetch_add(1, Ordering::SeqCst);
        match self.airdrop_error.lock().unwrap().clone() {
            Some(msg) => Err(anyhow!(msg)),
            None => Ok(format!("airdrop-sig-{}", n)),
        }
    }

    async fn confirm(&self, _url: &str, _signature: &str) -> Result<()> {
        Ok(())
    }
}

pub struct MockWallet {
    pub key: Mutex<Option<Address>>,
    pub fail_disconnect: bool,
    pub disconnects: AtomicUsize,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            key: Mutex::new(Some(WALLET)),
            fail_disconnect: false,
            disconnects: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn public_key(&self) -> Option<Address> {
        *self.key.lock().unwrap()
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        *self.key.lock().unwrap() = None;
        if self.fail_disconnect {
            Err(anyhow!("wallet adapter is stuck"))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct MockSdk {
    pub error: Mutex<Option<String>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub last_nft: Mutex<Option<NftParams>>,
    pub last_cnft: Mutex<Option<CnftParams>>,
}

impl MockSdk {
    fn outcome(&self, call: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.error.lock().unwrap().clone() {
            Some(msg) => Err(anyhow!(msg)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MintingSdk for MockSdk {
    async fn create_tree(&self, _params: TreeParams) -> Result<CreatedTree> {
        self.outcome("create_tree")?;
        Ok(CreatedTree {
            signature: "tree-sig".to_string(),
            address: TREE,
        })
    }

    async fn create_nft(&self, params: NftParams) -> Result<CreatedNft> {
        *self.last_nft.lock().unwrap() = Some(params);
        self.outcome("create_nft")?;
        Ok(CreatedNft {
            signature: "nft-sig".to_string(),
            mint: MINT,
        })
    }

    async fn mint_to_collection(&self, params: CnftParams) -> Result<String> {
        *self.last_cnft.lock().unwrap() = Some(params);
        self.outcome("mint_to_collection")?;
        Ok("cnft-collection-sig".to_string())
    }

    async fn mint(&self, params: CnftParams) -> Result<String> {
        *self.last_cnft.lock().unwrap() = Some(params);
        self.outcome("mint")?;
        Ok("cnft-sig".to_string())
    }
}

#[derive(Default)]
pub struct MockFetcher {
    pub responses: Mutex<HashMap<String, HttpResponse>>,
}

impl MockFetcher {
    pub fn serve_json(&self, url: &str, body: &str) {
        self.serve(url, 200, Some("application/json; charset=utf-8"), body);
    }

    pub fn serve(&self, url: &str, status: u16, content_type: Option<&str>, body: &str) {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            HttpResponse {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_string(),
            },
        );
    }
}

#[async_trait]
impl MetadataFetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", url))
    }
}

pub struct FixedClock {
    pub now: AtomicU64,
}

impl FixedClock {
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn local_now(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }
}

pub struct Harness {
    pub dashboard: Dashboard,
    pub rpc: Arc<MockRpc>,
    pub wallet: Arc<MockWallet>,
    pub sdk: Arc<MockSdk>,
    pub fetcher: Arc<MockFetcher>,
    pub clock: Arc<FixedClock>,
}

pub fn harness() -> Harness {
    harness_with(Config::default(), MockWallet::default())
}

pub fn harness_with(config: Config, wallet: MockWallet) -> Harness {
    let rpc = Arc::new(MockRpc::default());
    let wallet = Arc::new(wallet);
    let sdk = Arc::new(MockSdk::default());
    let fetcher = Arc::new(MockFetcher::default());
    let clock = Arc::new(FixedClock {
        now: AtomicU64::new(START_MS),
    });

    let dashboard = Dashboard::new(
        config,
        Collaborators {
            rpc: rpc.clone(),
            wallet: wallet.clone(),
            sdk: sdk.clone(),
            fetcher: fetcher.clone(),
            clock: clock.clone(),
        },
    );

    Harness {
        dashboard,
        rpc,
        wallet,
        sdk,
        fetcher,
        clock,
    }
}

/// RPC 検証済みの状態から始める
pub fn connected() -> Harness {
    connected_with(Config::default(), MockWallet::default())
}

pub fn connected_with(config: Config, wallet: MockWallet) -> Harness {
    let h = harness_with(config, wallet);
    h.dashboard.dispatch(Action::SetRpcStatus {
        verified: true,
        loading: false,
    });
    h
}

pub fn without_wallet() -> MockWallet {
    MockWallet {
        key: Mutex::new(None),
        ..MockWallet::default()
    }
}
