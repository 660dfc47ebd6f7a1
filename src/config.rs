use serde::Deserialize;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::persistence::DEFAULT_BASENAME;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&text)?;
        Ok(config)
    }

    /// ファイルが無ければ既定値を使う
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(?path, "config file not found, using defaults");
            Ok(Self::default())
        }
    }
}


#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcConfig,
    pub airdrop: AirdropConfig,
    pub notifications: NotificationConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// 起動時に設定する RPC URL（未指定なら devnet）
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirdropConfig {
    pub lamports: u64,
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub dismiss_after_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub directory: PathBuf,
    pub basename: String,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            lamports: 2 * LAMPORTS_PER_SOL,
            cooldown_ms: 30_000,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: 5_000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            basename: DEFAULT_BASENAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str(
            "airdrop:\n  cooldown_ms: 60000\nstorage:\n  directory: saves\n",
        )
        .unwrap();
        assert_eq!(cfg.airdrop.cooldown_ms, 60_000);
        assert_eq!(cfg.airdrop.lamports, 2 * LAMPORTS_PER_SOL);
        assert_eq!(cfg.storage.directory, PathBuf::from("saves"));
        assert_eq!(cfg.storage.basename, "AdvancedMint");
        assert_eq!(cfg.notifications.dismiss_after_ms, 5_000);
        assert!(cfg.rpc.url.is_none());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(dir.path().join("config.yaml")).unwrap();
        assert_eq!(cfg.airdrop.cooldown_ms, 30_000);
    }
}
