use advanced_mint::action::Action;
use advanced_mint::address::shorten_address;
use advanced_mint::cluster::{cluster_of, explorer_address_url, explorer_tx_url};
use advanced_mint::collaborators::{Clock, SystemClock};
use advanced_mint::config::Config;
use advanced_mint::persistence::{self, SaveMode};
use advanced_mint::state::{MintKind, MintRecord};
use advanced_mint::store::Store;
use advanced_mint::telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "advanced-mint", about = "Inspect and re-save minting session files")]
struct Cli {
    /// 設定ファイル（無ければ既定値）
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 保存ファイルの内容と履歴を表示する
    Inspect { file: PathBuf },
    /// 読み込んだ内容を現在の形式で保存し直す
    Resave {
        file: PathBuf,
        /// タイムスタンプ付きではなく固定ファイル名に上書きする
        #[arg(long)]
        overwrite: bool,
    },
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let cfg = Config::load_or_default(&cli.config)
        .with_context(|| format!("設定ファイルの読み込みに失敗しました: {:?}", cli.config))?;

    match cli.command {
        Command::Inspect { file } => inspect(&file),
        Command::Resave { file, overwrite } => resave(&cfg, &file, overwrite),
    }
}

/// 保存ファイルを読み込んだ Store を作る
fn hydrate(file: &Path) -> Result<Store> {
    let db = persistence::load_from_path(file)
        .with_context(|| format!("保存ファイルの読み込みに失敗しました: {:?}", file))?;
    let store = Store::default();
    store.dispatch(Action::LoadDatabase(db));
    Ok(store)
}

fn inspect(file: &Path) -> Result<()> {
    let store = hydrate(file)?;
    let session = store.state();
    let cluster = cluster_of(&session.rpc.url);

    println!("==============================");
    println!(" RPC     : {} ({})", session.rpc.url, cluster);
    match session.tree.address {
        Some(addr) => {
            let addr = addr.to_string();
            println!(" Tree    : {}", addr);
            println!("           {}", explorer_address_url(&addr, cluster));
        }
        None => println!(" Tree    : (none)"),
    }
    println!(" History : {} item(s)", session.mint_history.len());
    println!("==============================\n");

    for record in &session.mint_history {
        println!(
            "  {:12} {:30} {:>11}  {}",
            record.kind.label(),
            record.name,
            shorten_address(&record.id, 4),
            explorer_link(record)
        );
    }

    Ok(())
}

fn explorer_link(record: &MintRecord) -> String {
    match (record.kind, record.address.as_deref()) {
        (MintKind::Cnft, _) | (_, None) => explorer_tx_url(&record.transaction_id, record.cluster),
        (_, Some(addr)) => explorer_address_url(addr, record.cluster),
    }
}

fn resave(cfg: &Config, file: &Path, overwrite: bool) -> Result<()> {
    let store = hydrate(file)?;
    let mode = if overwrite {
        SaveMode::Overwrite
    } else {
        SaveMode::New
    };

    let path = persistence::save_to_dir(
        &cfg.storage.directory,
        &cfg.storage.basename,
        mode,
        SystemClock.local_now(),
        &store.state(),
    )
    .with_context(|| format!("保存に失敗しました: {:?}", cfg.storage.directory))?;

    println!(
        "✅ {} -> {} ({} records)",
        file.display(),
        path.display(),
        store.state().mint_history.len()
    );

    Ok(())
}
