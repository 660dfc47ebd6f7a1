use serde::{Deserialize, Serialize};
use std::fmt;

const EXPLORER_BASE: &str = "https://explorer.solana.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cluster {
    #[serde(rename = "devnet")]
    Devnet,
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
    #[serde(rename = "custom")]
    Custom,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Custom => "custom",
        }
    }

    fn query(&self) -> String {
        match self {
            Cluster::Custom => String::new(),
            other => format!("?cluster={}", other.as_str()),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RPC URL の部分文字列からクラスタを判定する（URL のパースはしない）
pub fn cluster_of(url: &str) -> Cluster {
    if url.contains("devnet") {
        Cluster::Devnet
    } else if url.contains("mainnet-beta") {
        Cluster::MainnetBeta
    } else {
        Cluster::Custom
    }
}

pub fn explorer_tx_url(signature: &str, cluster: Cluster) -> String {
    format!("{}/tx/{}{}", EXPLORER_BASE, signature, cluster.query())
}

pub fn explorer_address_url(address: &str, cluster: Cluster) -> String {
    format!("{}/address/{}{}", EXPLORER_BASE, address, cluster.query())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_substring() {
        assert_eq!(cluster_of("https://api.devnet.solana.com"), Cluster::Devnet);
        assert_eq!(
            cluster_of("https://api.mainnet-beta.solana.com"),
            Cluster::MainnetBeta
        );
        assert_eq!(cluster_of("http://127.0.0.1:8899"), Cluster::Custom);
        // custom host that happens to contain "devnet"
        assert_eq!(cluster_of("https://my-devnet-proxy.example.org"), Cluster::Devnet);
        assert_eq!(
            cluster_of("https://devnet.mainnet-beta.example"),
            Cluster::Devnet
        );
    }

    #[test]
    fn explorer_links_carry_cluster_query() {
        assert_eq!(
            explorer_tx_url("sig", Cluster::Devnet),
            "https://explorer.solana.com/tx/sig?cluster=devnet"
        );
        assert_eq!(
            explorer_address_url("addr", Cluster::MainnetBeta),
            "https://explorer.solana.com/address/addr?cluster=mainnet-beta"
        );
        assert_eq!(
            explorer_address_url("addr", Cluster::Custom),
            "https://explorer.solana.com/address/addr"
        );
    }

    #[test]
    fn serializes_with_wire_names() {
        assert_eq!(
            serde_json::to_string(&Cluster::MainnetBeta).unwrap(),
            "\"mainnet-beta\""
        );
        let c: Cluster = serde_json::from_str("\"custom\"").unwrap();
        assert_eq!(c, Cluster::Custom);
    }
}
