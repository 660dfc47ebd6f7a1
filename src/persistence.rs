use crate::address::{Address, AddressError};
use crate::state::{DEFAULT_RPC_URL, MintRecord, Session};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASENAME: &str = "AdvancedMint";

const EXPECTED_KEYS: [&str; 3] = ["rpcUrl", "treeAddress", "mintHistory"];

/// 保存ファイルの中身。Session のうち rpc URL / tree / 履歴だけを持つ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub rpc_url: String,
    pub tree_address: Option<Address>,
    pub mint_history: Vec<MintRecord>,
}

#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid database file format. Does not contain expected data.")]
    Format,
    #[error("treeAddress is not a valid address: {0}")]
    InvalidTreeAddress(#[source] AddressError),
    #[error("mintHistory entry #{index} is malformed: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 保存モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// 固定ファイル名に上書き
    Overwrite,
    /// タイムスタンプ付きの新規ファイル
    New,
}

pub fn serialize(session: &Session) -> PersistedSession {
    PersistedSession {
        rpc_url: session.rpc.url.clone(),
        tree_address: session.tree.address,
        mint_history: session.mint_history.clone(),
    }
}

pub fn to_json(db: &PersistedSession) -> serde_json::Result<String> {
    serde_json::to_string_pretty(db)
}

/// 保存ファイルを読む。古い形式で欠けているキーは既定値で補う
pub fn deserialize(raw: &str) -> Result<PersistedSession, DeserializeError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let Value::Object(map) = parsed else {
        return Err(DeserializeError::Format);
    };
    if !EXPECTED_KEYS
        .iter()
        .any(|k| map.get(*k).is_some_and(is_truthy))
    {
        return Err(DeserializeError::Format);
    }

    let rpc_url = match map.get("rpcUrl") {
        Some(Value::String(url)) if !url.is_empty() => url.clone(),
        _ => DEFAULT_RPC_URL.to_string(),
    };

    let tree_address = match map.get("treeAddress") {
        Some(Value::String(addr)) if !addr.is_empty() => Some(
            addr.parse::<Address>()
                .map_err(DeserializeError::InvalidTreeAddress)?,
        ),
        _ => None,
    };

    let mint_history = match map.get("mintHistory") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                MintRecord::deserialize(item)
                    .map_err(|source| DeserializeError::Record { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(PersistedSession {
        rpc_url,
        tree_address,
        mint_history,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 保存ファイル名（New は YYYYMMDD-HHMMSS のローカル時刻）
pub fn save_filename(basename: &str, mode: SaveMode, now: NaiveDateTime) -> String {
    match mode {
        SaveMode::Overwrite => format!("{}.json", basename),
        SaveMode::New => format!("{}-{}.json", basename, now.format("%Y%m%d-%H%M%S")),
    }
}

pub fn save_to_dir(
    dir: &Path,
    basename: &str,
    mode: SaveMode,
    now: NaiveDateTime,
    session: &Session,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(save_filename(basename, mode, now));
    let json = to_json(&serialize(session))?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn load_from_path(path: &Path) -> Result<PersistedSession, DeserializeError> {
    let text = fs::read_to_string(path).map_err(|source| DeserializeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize(&text)
}
