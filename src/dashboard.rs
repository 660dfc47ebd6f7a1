use crate::action::{Action, CnftField, CnftPreview, ParentNftPatch};
use crate::address::Address;
use crate::cluster::{cluster_of, explorer_address_url, explorer_tx_url};
use crate::collaborators::{
    Clock, CnftParams, MetadataFetcher, MintingSdk, NftParams, RpcClient, TreeParams, Wallet,
};
use crate::config::Config;
use crate::error::{DashboardError, classify};
use crate::metadata::{
    Creator, FetchedMetadata, MetadataError, NftMetadata, basis_points, parse_response,
};
use crate::notification::{NotificationCenter, Severity};
use crate::persistence::{self, SaveMode};
use crate::state::{MintKind, MintRecord, Session};
use crate::store::{Bracket, Store};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ダッシュボードが使う外部コンポーネント一式
#[derive(Clone)]
pub struct Collaborators {
    pub rpc: Arc<dyn RpcClient>,
    pub wallet: Arc<dyn Wallet>,
    pub sdk: Arc<dyn MintingSdk>,
    pub fetcher: Arc<dyn MetadataFetcher>,
    pub clock: Arc<dyn Clock>,
}

/// UI イベントを受けて外部呼び出しとアクション発行を行うハンドラ群
pub struct Dashboard {
    store: Store,
    config: Config,
    notifications: NotificationCenter,
    deps: Collaborators,
}

impl Dashboard {
    pub fn new(config: Config, deps: Collaborators) -> Self {
        let store = Store::new(Session::default());
        if let Some(url) = &config.rpc.url {
            store.dispatch(Action::SetRpcUrl(url.clone()));
        }
        let notifications = NotificationCenter::new(config.notifications.dismiss_after_ms);
        Self {
            store,
            config,
            notifications,
            deps,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> Arc<Session> {
        self.store.state()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// フォーム入力など I/O を伴わない更新
    pub fn dispatch(&self, action: Action) {
        self.store.dispatch(action);
    }

    pub async fn verify_rpc(&self) -> Result<(), DashboardError> {
        let url = self.state().rpc.url.clone();
        let bracket = Bracket::open(
            &self.store,
            Action::SetRpcStatus {
                verified: false,
                loading: true,
            },
            Action::SetRpcStatus {
                verified: false,
                loading: false,
            },
        );

        match self.deps.rpc.verify(&url).await {
            Ok(()) => {
                bracket.close_with(Action::SetRpcStatus {
                    verified: true,
                    loading: false,
                });
                tracing::info!(%url, "rpc endpoint verified");
                self.notify(Severity::Success, "RPC endpoint verified successfully!", None);
                Ok(())
            }
            Err(e) => {
                drop(bracket);
                let err = match classify(&e) {
                    DashboardError::Collaborator(detail) => DashboardError::Connectivity(detail),
                    other => other,
                };
                Err(self.report("Failed to verify RPC endpoint.", err))
            }
        }
    }

    pub async fn airdrop(&self) -> Result<String, DashboardError> {
        let state = self.state();
        let now = self.deps.clock.now_ms();
        if let Some(end) = state.rpc.airdrop_cooldown_end {
            if now < end {
                let seconds = (end - now).div_ceil(1000);
                let err = DashboardError::CooldownActive { seconds };
                self.notify(Severity::Info, err.user_message(), None);
                return Err(err);
            }
        }
        let recipient = self.signer(&state)?;

        let url = state.rpc.url.as_str();
        let _bracket = Bracket::open(&self.store, Action::AirdropStart, Action::AirdropFinish);
        let result = async {
            let signature = self
                .deps
                .rpc
                .request_airdrop(url, &recipient, self.config.airdrop.lamports)
                .await?;
            self.deps.rpc.confirm(url, &signature).await?;
            anyhow::Ok(signature)
        }
        .await;

        match result {
            Ok(signature) => {
                let end = self.deps.clock.now_ms() + self.config.airdrop.cooldown_ms;
                self.store.dispatch(Action::SetAirdropCooldownEnd(Some(end)));
                tracing::info!(%signature, %recipient, "airdrop confirmed");
                self.notify(
                    Severity::Success,
                    "Airdrop successful!",
                    Some(explorer_tx_url(&signature, cluster_of(url))),
                );
                Ok(signature)
            }
            Err(e) => match classify(&e) {
                err @ DashboardError::RateLimited(_) => {
                    tracing::error!(error = ?e, "airdrop rate limited");
                    self.notify(
                        Severity::Error,
                        "Too many airdrop requests.",
                        Some("Please wait a moment before trying again.".to_string()),
                    );
                    Err(err)
                }
                err => Err(self.report("Airdrop failed.", err)),
            },
        }
    }

    pub async fn create_tree(&self) -> Result<Address, DashboardError> {
        let state = self.state();
        self.signer(&state)?;
        let params = TreeParams {
            max_depth: state.tree.max_depth,
            max_buffer_size: state.tree.max_buffer_size,
            canopy_depth: state.tree.canopy_depth,
            public: false,
        };

        let bracket = Bracket::open(&self.store, Action::CreateTreeStart, Action::CreateTreeFailure);
        match self.deps.sdk.create_tree(params).await {
            Ok(created) => {
                bracket.close_with(Action::CreateTreeSuccess(created.address));
                let cluster = cluster_of(&state.rpc.url);
                let address = created.address.to_string();
                let record = MintRecord {
                    address: Some(address.clone()),
                    ..new_record(
                        &created.signature,
                        format!(
                            "Merkle Tree ({}, {})",
                            state.tree.max_depth, state.tree.max_buffer_size
                        ),
                        MintKind::MerkleTree,
                        &state.rpc.url,
                    )
                };
                self.store.dispatch(Action::AddToHistory(record));
                tracing::info!(%address, signature = %created.signature, "merkle tree created");
                self.notify(
                    Severity::Success,
                    "Merkle Tree created successfully!",
                    Some(explorer_address_url(&address, cluster)),
                );
                Ok(created.address)
            }
            Err(e) => {
                drop(bracket);
                Err(self.report("Failed to create Merkle Tree.", classify(&e)))
            }
        }
    }

    pub fn reset_tree(&self) {
        self.store.dispatch(Action::ResetTreeSelection);
        self.notify(Severity::Info, "Tree selection has been reset.", None);
    }

    pub async fn fetch_parent_metadata(&self, url: &str) -> Result<(), DashboardError> {
        if url.is_empty() {
            return Err(self.reject(DashboardError::MissingField("Metadata URL")));
        }
        let _bracket = Bracket::open(
            &self.store,
            Action::FetchParentMetadataStart,
            Action::FetchParentMetadataFinish,
        );

        match self.fetch_metadata(url).await {
            Ok(metadata) => {
                self.store
                    .dispatch(Action::SetAllParentNftFormFields(metadata.to_form_patch()));
                self.store
                    .dispatch(Action::SetParentMetadataUrl(url.to_string()));
                self.notify(Severity::Success, "Metadata fetched and form populated.", None);
                Ok(())
            }
            Err(err) => Err(self.report("Failed to fetch metadata.", err)),
        }
    }

    /// 親 NFT フォームからメタデータ JSON を作りビューアに表示する
    pub fn generate_parent_metadata(&self) -> Result<String, DashboardError> {
        let state = self.state();
        let json = NftMetadata::from_form(&state.parent_nft)
            .to_pretty_json()
            .map_err(|e| {
                self.report(
                    "Could not generate metadata.",
                    DashboardError::from(MetadataError::from(e)),
                )
            })?;
        self.store
            .dispatch(Action::GenerateParentMetadata(json.clone()));
        Ok(json)
    }

    pub fn hide_metadata_viewer(&self) {
        self.store.dispatch(Action::HideMetadataViewer);
    }

    pub async fn mint_parent_nft(&self) -> Result<Address, DashboardError> {
        let state = self.state();
        let identity = self.signer(&state)?;
        let form = &state.parent_nft;
        if form.metadata_url.is_empty() {
            return Err(self.reject(DashboardError::MissingField("Metadata URL")));
        }
        let token_owner = if form.mint_to_different_wallet && !form.recipient_address.is_empty() {
            self.parse_address("recipient", &form.recipient_address)?
        } else {
            identity
        };
        let creators = form
            .creators
            .iter()
            .map(|c| -> Result<(Address, u8), DashboardError> {
                Ok((self.parse_address("creator", &c.address)?, c.share))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let kind = if form.is_collection {
            MintKind::ParentNft
        } else {
            MintKind::Nft
        };
        let params = NftParams {
            name: form.name.clone(),
            uri: form.metadata_url.clone(),
            seller_fee_basis_points: basis_points(form.seller_fee),
            is_mutable: form.is_mutable,
            is_collection: form.is_collection,
            creators,
            token_owner,
        };

        let bracket = Bracket::open(&self.store, Action::MintParentStart, Action::MintParentFailure);
        match self.deps.sdk.create_nft(params).await {
            Ok(created) => {
                bracket.close_with(Action::MintParentSuccess(created.mint));
                let mint = created.mint.to_string();
                let record = MintRecord {
                    address: Some(mint.clone()),
                    is_collection: Some(form.is_collection),
                    metadata_url: Some(form.metadata_url.clone()),
                    ..new_record(&created.signature, form.name.clone(), kind, &state.rpc.url)
                };
                self.store.dispatch(Action::AddToHistory(record));
                tracing::info!(%mint, kind = kind.label(), "nft minted");
                self.notify(
                    Severity::Success,
                    format!("{} minted successfully!", kind.label()),
                    Some(explorer_address_url(&mint, cluster_of(&state.rpc.url))),
                );
                Ok(created.mint)
            }
            Err(e) => {
                drop(bracket);
                Err(self.report(&format!("Failed to mint {}.", kind.label()), classify(&e)))
            }
        }
    }

    /// 親 NFT フォームと cNFT 側のコレクション指定をまとめて初期化
    pub fn reset_parent_nft(&self) {
        self.store.dispatch(Action::ResetParentNftForm);
        self.store
            .dispatch(Action::SetCnftForm(CnftField::MintToCollection(false)));
        self.store
            .dispatch(Action::SetCnftForm(CnftField::CollectionAddress(String::new())));
        self.notify(Severity::Info, "NFT Minter form has been reset.", None);
    }

    pub async fn fetch_cnft_metadata(&self, url: &str) -> Result<(), DashboardError> {
        if url.is_empty() {
            return Err(self.reject(DashboardError::MissingField("Metadata URL")));
        }
        let bracket = Bracket::open(
            &self.store,
            Action::FetchCnftMetadataStart,
            Action::FetchCnftMetadataFinish(CnftPreview::failed()),
        );

        let preview = match self.fetch_metadata(url).await {
            Ok(metadata) => metadata.preview().map_err(DashboardError::from),
            Err(err) => Err(err),
        };
        match preview {
            Ok(preview) => {
                bracket.close_with(Action::FetchCnftMetadataFinish(preview));
                self.notify(Severity::Success, "Metadata preview loaded.", None);
                Ok(())
            }
            Err(err) => {
                drop(bracket);
                Err(self.report("Failed to fetch or parse metadata.", err))
            }
        }
    }

    pub async fn mint_cnft(&self) -> Result<String, DashboardError> {
        let state = self.state();
        let identity = self.signer(&state)?;
        let cnft = &state.cnft;
        if cnft.tree_address.is_empty() {
            return Err(self.reject(DashboardError::MissingField("Merkle Tree address")));
        }
        if cnft.mint_to_collection && cnft.collection_address.is_empty() {
            return Err(self.reject(DashboardError::MissingField("Collection NFT address")));
        }
        if cnft.metadata_url.is_empty() {
            return Err(self.reject(DashboardError::MissingField("Metadata URL")));
        }
        let merkle_tree = self.parse_address("Merkle Tree", &cnft.tree_address)?;
        let collection = if cnft.mint_to_collection {
            Some(self.parse_address("collection", &cnft.collection_address)?)
        } else {
            None
        };
        let leaf_owner = if cnft.mint_to_different_wallet && !cnft.recipient_address.is_empty() {
            self.parse_address("recipient", &cnft.recipient_address)?
        } else {
            identity
        };

        let params = CnftParams {
            leaf_owner,
            merkle_tree,
            collection,
            name: cnft.name.clone(),
            symbol: cnft.symbol.clone(),
            uri: cnft.metadata_url.clone(),
            seller_fee_basis_points: 0,
            creators: vec![Creator {
                address: identity.to_string(),
                share: 100,
            }],
        };

        let bracket = Bracket::open(&self.store, Action::MintCnftStart, Action::MintCnftFailure);
        let result = match collection {
            Some(_) => self.deps.sdk.mint_to_collection(params).await,
            None => self.deps.sdk.mint(params).await,
        };
        match result {
            Ok(signature) => {
                bracket.close_with(Action::MintCnftSuccess);
                let record = MintRecord {
                    metadata_url: Some(cnft.metadata_url.clone()),
                    collection_address: collection.map(|c| c.to_string()),
                    ..new_record(&signature, cnft.name.clone(), MintKind::Cnft, &state.rpc.url)
                };
                self.store.dispatch(Action::AddToHistory(record));
                tracing::info!(%signature, tree = %merkle_tree, "cnft minted");
                self.notify(
                    Severity::Success,
                    "cNFT minted successfully!",
                    Some(explorer_tx_url(&signature, cluster_of(&state.rpc.url))),
                );
                Ok(signature)
            }
            Err(e) => {
                drop(bracket);
                Err(self.report("Failed to mint cNFT.", classify(&e)))
            }
        }
    }

    pub fn save_database(&self, mode: SaveMode) -> Result<PathBuf, DashboardError> {
        let state = self.state();
        let storage = &self.config.storage;
        match persistence::save_to_dir(
            &storage.directory,
            &storage.basename,
            mode,
            self.deps.clock.local_now(),
            &state,
        ) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "session saved");
                self.notify(
                    Severity::Success,
                    "Database file saved successfully!",
                    Some(path.display().to_string()),
                );
                Ok(path)
            }
            Err(e) => Err(self.report("Could not save database file.", e.into())),
        }
    }

    pub fn load_database(&self, path: &Path) -> Result<(), DashboardError> {
        match persistence::load_from_path(path) {
            Ok(db) => {
                tracing::info!(
                    path = %path.display(),
                    records = db.mint_history.len(),
                    "session loaded"
                );
                self.store.dispatch(Action::LoadDatabase(db));
                self.notify(
                    Severity::Success,
                    "Database loaded successfully!",
                    Some("RPC endpoint will need to be re-verified.".to_string()),
                );
                Ok(())
            }
            Err(e) => Err(self.report(
                "Failed to load database. File may be corrupt or invalid.",
                e.into(),
            )),
        }
    }

    /// 履歴の項目をフォームへ読み戻す
    pub async fn select_history_item(&self, record: &MintRecord) -> Result<(), DashboardError> {
        if !record.is_selectable() {
            let (headline, field) = match record.kind {
                MintKind::Cnft => (
                    "No metadata URL found for this cNFT in history.".to_string(),
                    "Metadata URL",
                ),
                kind => (
                    format!("No address found for this {} in history.", kind.label()),
                    "Address",
                ),
            };
            return Err(self.report(&headline, DashboardError::MissingField(field)));
        }

        match record.kind {
            MintKind::MerkleTree => {
                let address = record.address.clone().unwrap_or_default();
                self.store
                    .dispatch(Action::SetCnftForm(CnftField::TreeAddress(address)));
                self.notify(
                    Severity::Info,
                    "Merkle Tree address selected for cNFT minting.",
                    None,
                );
            }
            MintKind::ParentNft | MintKind::Nft => {
                self.store
                    .dispatch(Action::SetAllParentNftFormFields(ParentNftPatch {
                        address: Some(None),
                        ..ParentNftPatch::default()
                    }));
                let collection = match record.is_collection {
                    Some(true) => record.address.clone(),
                    _ => None,
                };
                self.select_collection(collection);
                if let Some(url) = &record.metadata_url {
                    if let Err(err) = self.fetch_parent_metadata(url).await {
                        tracing::debug!(error = %err, "metadata refetch for history item failed");
                    }
                }
            }
            MintKind::Cnft => {
                let url = record.metadata_url.clone().unwrap_or_default();
                self.store
                    .dispatch(Action::SetCnftForm(CnftField::MetadataUrl(url.clone())));
                let collection = record
                    .collection_address
                    .clone()
                    .filter(|c| !c.is_empty());
                self.select_collection(collection);
                self.notify(Severity::Info, "cNFT data loaded for preview.", None);
                if let Err(err) = self.fetch_cnft_metadata(&url).await {
                    tracing::debug!(error = %err, "preview fetch for history item failed");
                }
            }
        }
        Ok(())
    }

    pub async fn disconnect_and_reset(&self) {
        if let Err(e) = self.deps.wallet.disconnect().await {
            tracing::error!(error = ?e, "failed to disconnect wallet");
        }
        self.store.dispatch(Action::ResetAppState);
        self.notify(
            Severity::Info,
            "Session Reset",
            Some("The application state and wallet connection have been cleared.".to_string()),
        );
    }

    /// 接続中のウォレットを creators の先頭に設定する。更新したら true
    pub fn sync_creators_with_wallet(&self) -> bool {
        let state = self.state();
        if !state.rpc.verified {
            return false;
        }
        let Some(identity) = self.deps.wallet.public_key() else {
            return false;
        };
        let identity = identity.to_string();
        if state
            .parent_nft
            .creators
            .first()
            .is_some_and(|c| c.address == identity)
        {
            return false;
        }
        self.store
            .dispatch(Action::UpdateParentNftCreators(vec![Creator {
                address: identity,
                share: 100,
            }]));
        true
    }

    /// 検証済みの RPC と接続中のウォレットが揃っているときだけ署名者を返す
    fn signer(&self, state: &Session) -> Result<Address, DashboardError> {
        match self.deps.wallet.public_key() {
            Some(identity) if state.rpc.verified => Ok(identity),
            _ => Err(self.reject(DashboardError::WalletNotConnected)),
        }
    }

    async fn fetch_metadata(&self, url: &str) -> Result<FetchedMetadata, DashboardError> {
        let response = self
            .deps
            .fetcher
            .get(url)
            .await
            .map_err(|e| classify(&e))?;
        Ok(parse_response(
            response.status,
            response.content_type.as_deref(),
            &response.body,
        )?)
    }

    fn select_collection(&self, collection: Option<String>) {
        let (enabled, address) = match collection {
            Some(address) => (true, address),
            None => (false, String::new()),
        };
        self.store
            .dispatch(Action::SetCnftForm(CnftField::MintToCollection(enabled)));
        self.store
            .dispatch(Action::SetCnftForm(CnftField::CollectionAddress(address)));
    }

    fn parse_address(&self, field: &'static str, value: &str) -> Result<Address, DashboardError> {
        value.parse().map_err(|e| {
            tracing::warn!(field, value, error = %e, "invalid address");
            self.reject(DashboardError::InvalidAddress {
                field,
                value: value.to_string(),
            })
        })
    }

    fn notify(&self, severity: Severity, message: impl Into<String>, details: Option<String>) {
        self.notifications
            .push(severity, message, details, self.deps.clock.now_ms());
    }

    /// 操作の失敗を通知し、ログに詳細を残す
    fn report(&self, headline: &str, err: DashboardError) -> DashboardError {
        tracing::error!(error = ?err, "{}", headline);
        self.notify(Severity::Error, headline, Some(err.user_message()));
        err
    }

    /// 入力不備など、状態を変えずに弾く
    fn reject(&self, err: DashboardError) -> DashboardError {
        tracing::warn!(error = %err, "request rejected");
        self.notify(Severity::Error, err.user_message(), None);
        err
    }
}

fn new_record(signature: &str, name: String, kind: MintKind, rpc_url: &str) -> MintRecord {
    MintRecord {
        id: signature.to_string(),
        name,
        kind,
        transaction_id: signature.to_string(),
        cluster: cluster_of(rpc_url),
        address: None,
        is_collection: None,
        metadata_url: None,
        collection_address: None,
    }
}
