use crate::metadata::MetadataError;
use crate::persistence::DeserializeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("RPC endpoint could not be reached: {0}")]
    Connectivity(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("User rejected the request")]
    WalletRejected,
    #[error(transparent)]
    MetadataFormat(#[from] MetadataError),
    #[error("invalid {field} address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },
    #[error(transparent)]
    FileFormat(#[from] DeserializeError),
    #[error("wallet is not connected")]
    WalletNotConnected,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("airdrop cooldown active for {seconds}s")]
    CooldownActive { seconds: u64 },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
    #[error("{0}")]
    Collaborator(String),
}

impl DashboardError {
    /// 利用者向けの短い説明
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Connectivity(_) => "Failed to verify RPC endpoint.".to_string(),
            DashboardError::RateLimited(_) => {
                "Too many requests sent in a short period. Please wait a moment and try again."
                    .to_string()
            }
            DashboardError::WalletRejected => {
                "Transaction was rejected in your wallet.".to_string()
            }
            DashboardError::MetadataFormat(e) => e.to_string(),
            DashboardError::InvalidAddress { field, .. } => format!("Invalid {} address.", field),
            DashboardError::FileFormat(e) => e.to_string(),
            DashboardError::WalletNotConnected => {
                "Please connect your wallet to continue.".to_string()
            }
            DashboardError::MissingField(field) => format!("{} is required.", field),
            DashboardError::CooldownActive { seconds } => format!(
                "Please wait {} seconds before requesting another airdrop.",
                seconds
            ),
            DashboardError::Storage(e) => e.to_string(),
            DashboardError::Collaborator(msg) => msg.clone(),
        }
    }
}

/// 外部ライブラリのエラーをメッセージの部分一致で分類する
pub fn classify(err: &anyhow::Error) -> DashboardError {
    let messages: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    if messages
        .iter()
        .any(|m| m.contains("User rejected the request"))
    {
        return DashboardError::WalletRejected;
    }
    if messages
        .iter()
        .any(|m| m.contains("429") || m.to_lowercase().contains("too many requests"))
    {
        return DashboardError::RateLimited(err.to_string());
    }
    // 下位ライブラリが包んだ原因のほうが具体的
    let detail = messages.last().cloned().unwrap_or_default();
    DashboardError::Collaborator(detail)
}
