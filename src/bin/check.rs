use advanced_mint::persistence::{self, PersistedSession};
use advanced_mint::state::MintRecord;
use anyhow::Result;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn main() -> Result<()> {
    advanced_mint::telemetry::init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let files = collect_json_files(&dir);
    let results: Vec<(PathBuf, Result<PersistedSession, String>)> = files
        .into_par_iter()
        .map(|path| {
            let parsed = persistence::load_from_path(&path).map_err(|e| e.to_string());
            (path, parsed)
        })
        .collect();

    let mut kinds: HashMap<&'static str, usize> = HashMap::new();
    let mut clusters: HashMap<&'static str, usize> = HashMap::new();
    let mut invalid_files: Vec<(String, String)> = Vec::new();
    let mut problems: Vec<(String, String)> = Vec::new();
    let mut sessions = 0usize;
    let mut total = 0usize;

    for (path, parsed) in &results {
        let file = file_name(path);
        let db = match parsed {
            Ok(db) => db,
            Err(msg) => {
                invalid_files.push((file, msg.clone()));
                continue;
            }
        };

        sessions += 1;
        let mut seen: HashSet<&str> = HashSet::new();
        for record in &db.mint_history {
            total += 1;
            *kinds.entry(record.kind.label()).or_insert(0) += 1;
            *clusters.entry(record.cluster.as_str()).or_insert(0) += 1;

            if !seen.insert(record.id.as_str()) {
                problems.push((file.clone(), format!("duplicate id {}", record.id)));
            }
            if let Some(msg) = missing_field(record) {
                problems.push((file.clone(), msg));
            }
        }
    }

    println!("==============================");
    println!(" Session File Check");
    println!(" Files: {} ({} valid)", results.len(), sessions);
    println!(" Records: {}", total);
    println!("==============================\n");

    for (title, counts) in [("Type", &kinds), ("Cluster", &clusters)] {
        println!("▶ {}", title);
        let mut sorted: Vec<_> = counts.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1));
        for (name, count) in sorted {
            let ratio = *count as f64 / total.max(1) as f64 * 100.0;
            println!("  {:15} {:5} ({:.2}%)", name, count, ratio);
        }
        println!();
    }

    if !problems.is_empty() {
        println!("⚠ 履歴から再選択できない項目があります:");
        for (file, msg) in &problems {
            println!("  - {} : {}", file, msg);
        }
        println!();
    }

    if invalid_files.is_empty() {
        println!("✅ すべての保存ファイルを読み込めました");
    } else {
        println!("❌ 読み込めない保存ファイルがあります:");
        for (file, msg) in &invalid_files {
            println!("  - {} : {}", file, msg);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// ディレクトリ以下の JSON ファイルを列挙
fn collect_json_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

fn missing_field(record: &MintRecord) -> Option<String> {
    if record.is_selectable() {
        return None;
    }
    Some(format!(
        "{} {:?} ({}) has no {}",
        record.kind.label(),
        record.name,
        record.id,
        match record.kind {
            advanced_mint::state::MintKind::Cnft => "metadataUrl",
            _ => "address",
        }
    ))
}
