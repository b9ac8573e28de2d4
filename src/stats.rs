//! Database statistics.
//!
//! Used by `clink stats` to show how many identities exist and how much
//! linking has happened.

use anyhow::Result;

use contact_link_core::store::ContactStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let counts = store.counts().await;
    store.pool().close().await;
    let counts = counts?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Contact Link — Database Stats");
    println!("=============================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Contacts:    {}", counts.total);
    println!("  Primary:     {}", counts.primary);
    println!("  Secondary:   {}", counts.secondary);
    println!();

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
