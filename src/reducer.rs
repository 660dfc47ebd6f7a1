use crate::action::{
    Action, AttributeField, CnftField, ParentNftField, ParentNftPatch, TreeConfigField,
};
use crate::address::Address;
use crate::metadata::Attribute;
use crate::persistence::PersistedSession;
use crate::state::{CnftForm, NftForm, Session};

/// 状態遷移。I/O は一切行わない
pub fn reduce(state: &Session, action: Action) -> Session {
    let mut next = state.clone();
    apply(&mut next, action);
    next
}

fn apply(s: &mut Session, action: Action) {
    match action {
        Action::SetRpcUrl(url) => {
            s.rpc.url = url;
            s.rpc.verified = false;
        }
        Action::SetRpcStatus { verified, loading } => {
            s.rpc.verified = verified;
            s.rpc.loading = loading;
        }
        Action::AirdropStart => s.rpc.airdropping = true,
        Action::AirdropFinish => s.rpc.airdropping = false,
        Action::SetAirdropCooldownEnd(end) => s.rpc.airdrop_cooldown_end = end,

        Action::CreateTreeStart => s.tree.loading = true,
        Action::CreateTreeSuccess(address) => {
            s.tree.loading = false;
            sync_tree_address(s, Some(address));
        }
        Action::CreateTreeFailure => s.tree.loading = false,
        Action::SetTreeConfig(field) => match field {
            TreeConfigField::MaxDepth(v) => s.tree.max_depth = v,
            TreeConfigField::MaxBufferSize(v) => s.tree.max_buffer_size = v,
            TreeConfigField::CanopyDepth(v) => s.tree.canopy_depth = v,
        },
        Action::ResetTreeSelection => sync_tree_address(s, None),

        Action::SetParentNftForm(field) => set_parent_field(&mut s.parent_nft, field),
        Action::SetAllParentNftFormFields(patch) => merge_parent_patch(&mut s.parent_nft, patch),
        Action::UpdateParentNftCreators(creators) => s.parent_nft.creators = creators,
        Action::AddParentAttribute => s.parent_nft.attributes.push(Attribute::default()),
        Action::RemoveParentAttribute(index) => {
            if index < s.parent_nft.attributes.len() {
                s.parent_nft.attributes.remove(index);
            }
        }
        Action::UpdateParentAttribute {
            index,
            field,
            value,
        } => {
            if let Some(attr) = s.parent_nft.attributes.get_mut(index) {
                match field {
                    AttributeField::TraitType => attr.trait_type = value,
                    AttributeField::Value => attr.value = value,
                }
            }
        }
        Action::FetchParentMetadataStart => s.parent_nft.fetching_metadata = true,
        Action::FetchParentMetadataFinish => s.parent_nft.fetching_metadata = false,
        Action::GenerateParentMetadata(json) => {
            s.parent_nft.generated_json = Some(json);
            s.parent_nft.show_metadata_viewer = true;
        }
        Action::HideMetadataViewer => s.parent_nft.show_metadata_viewer = false,
        Action::SetParentMetadataUrl(url) => s.parent_nft.metadata_url = url,
        Action::ResetParentNftForm => {
            let creators = std::mem::take(&mut s.parent_nft.creators);
            s.parent_nft = NftForm {
                creators,
                ..NftForm::default()
            };
        }
        Action::MintParentStart => s.parent_nft.loading = true,
        Action::MintParentSuccess(address) => {
            s.parent_nft.loading = false;
            sync_collection_address(s, address);
        }
        Action::MintParentFailure => s.parent_nft.loading = false,

        Action::SetCnftForm(field) => set_cnft_field(&mut s.cnft, field),
        Action::FetchCnftMetadataStart => s.cnft.fetching_metadata = true,
        Action::FetchCnftMetadataFinish(preview) => {
            s.cnft.fetching_metadata = false;
            s.cnft.image_url = preview.image_url;
            s.cnft.name = preview.name;
            s.cnft.symbol = preview.symbol;
        }
        Action::MintCnftStart => s.cnft.loading = true,
        Action::MintCnftSuccess | Action::MintCnftFailure => s.cnft.loading = false,

        Action::AddToHistory(record) => s.mint_history.insert(0, record),
        Action::LoadDatabase(db) => load_database(s, db),
        Action::ResetAppState => {
            let url = std::mem::take(&mut s.rpc.url);
            *s = Session::default();
            s.rpc.url = url;
        }
    }
}

/// tree.address と cnft.tree_address は常に一緒に更新する
fn sync_tree_address(s: &mut Session, address: Option<Address>) {
    s.cnft.tree_address = address.map(|a| a.to_string()).unwrap_or_default();
    s.tree.address = address;
}

/// ミントした親 NFT を cNFT のコレクション欄にも反映する
fn sync_collection_address(s: &mut Session, address: Address) {
    s.parent_nft.address = Some(address);
    s.cnft.collection_address = address.to_string();
}

/// コレクションは属性を持たない。単体 NFT に戻すと空の属性を 1 行用意する
fn set_collection_flag(form: &mut NftForm, is_collection: bool) {
    form.is_collection = is_collection;
    form.attributes = if is_collection {
        Vec::new()
    } else {
        vec![Attribute {
            trait_type: "type".to_string(),
            value: String::new(),
        }]
    };
}

fn set_parent_field(form: &mut NftForm, field: ParentNftField) {
    match field {
        ParentNftField::Name(v) => form.name = v,
        ParentNftField::Symbol(v) => form.symbol = v,
        ParentNftField::Description(v) => form.description = v,
        ParentNftField::ImageUrl(v) => form.image_url = v,
        ParentNftField::ExternalUrl(v) => form.external_url = v,
        ParentNftField::SellerFee(v) => form.seller_fee = v.clamp(0.0, 100.0),
        ParentNftField::IsMutable(v) => form.is_mutable = v,
        ParentNftField::IsCollection(v) => set_collection_flag(form, v),
        ParentNftField::MintToDifferentWallet(v) => form.mint_to_different_wallet = v,
        ParentNftField::RecipientAddress(v) => form.recipient_address = v,
    }
}

fn merge_parent_patch(form: &mut NftForm, patch: ParentNftPatch) {
    let ParentNftPatch {
        address,
        name,
        symbol,
        description,
        image_url,
        external_url,
        seller_fee,
        is_mutable,
        is_collection,
        creators,
        attributes,
        metadata_url,
        mint_to_different_wallet,
        recipient_address,
    } = patch;

    if let Some(v) = address {
        form.address = v;
    }
    if let Some(v) = name {
        form.name = v;
    }
    if let Some(v) = symbol {
        form.symbol = v;
    }
    if let Some(v) = description {
        form.description = v;
    }
    if let Some(v) = image_url {
        form.image_url = v;
    }
    if let Some(v) = external_url {
        form.external_url = v;
    }
    if let Some(v) = seller_fee {
        form.seller_fee = v.clamp(0.0, 100.0);
    }
    if let Some(v) = is_mutable {
        form.is_mutable = v;
    }
    if let Some(v) = is_collection {
        form.is_collection = v;
    }
    if let Some(v) = creators {
        form.creators = v;
    }
    if let Some(v) = attributes {
        form.attributes = v;
    }
    if let Some(v) = metadata_url {
        form.metadata_url = v;
    }
    if let Some(v) = mint_to_different_wallet {
        form.mint_to_different_wallet = v;
    }
    if let Some(v) = recipient_address {
        form.recipient_address = v;
    }

    if form.is_collection {
        form.attributes.clear();
    }
}

fn set_cnft_field(form: &mut CnftForm, field: CnftField) {
    match field {
        CnftField::UseExistingMetadata(v) => form.use_existing_metadata = v,
        CnftField::TreeAddress(v) => form.tree_address = v,
        CnftField::CollectionAddress(v) => form.collection_address = v,
        CnftField::MetadataUrl(v) => form.metadata_url = v,
        CnftField::Name(v) => form.name = v,
        CnftField::Symbol(v) => form.symbol = v,
        CnftField::Description(v) => form.description = v,
        CnftField::ImageUrl(v) => form.image_url = v,
        CnftField::MintToCollection(v) => {
            form.mint_to_collection = v;
            if !v {
                form.collection_address.clear();
            }
        }
        CnftField::MintToDifferentWallet(v) => form.mint_to_different_wallet = v,
        CnftField::RecipientAddress(v) => form.recipient_address = v,
    }
}

fn load_database(s: &mut Session, db: PersistedSession) {
    s.rpc.url = db.rpc_url;
    s.rpc.verified = false;
    sync_tree_address(s, db.tree_address);
    s.mint_history = db.mint_history;
}
