//! TodoBox offline debug console.
//!
//! Small command-line surface over the library for poking at the cache
//! from a terminal: warm the precache, prune stale namespaces, route a
//! URL the way a page fetch would be routed, and pull a todo's edit
//! payload.

use std::io;

use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use todobox_offline::{
    CacheRouter, DiskStore, HttpOrigin, OfflineConfig, Request, TodoClient,
};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn build_router(config: &OfflineConfig, base_url: &str) -> Result<CacheRouter<DiskStore>> {
    let store = DiskStore::new(OfflineConfig::cache_dir()?)?;
    let origin = HttpOrigin::new(base_url)?;
    Ok(CacheRouter::new(
        store,
        Box::new(origin),
        config.route_table(),
        config.static_cache_name(),
        config.dynamic_cache_name(),
    ))
}

fn usage() {
    eprintln!("Usage: todobox-offline <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  warm         Fetch the precache manifest into the static cache");
    eprintln!("  prune        Delete cache namespaces from older versions");
    eprintln!("  fetch <url>  Route a GET through the cache router");
    eprintln!("  todo <id>    Fetch a todo's edit payload (needs TODOBOX_CSRF_TOKEN)");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = OfflineConfig::load()?;
    let base_url =
        std::env::var("TODOBOX_BASE_URL").unwrap_or_else(|_| config.base_url.clone());

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("warm") => {
            let router = build_router(&config, &base_url)?;
            let count = router.install(&config.precache).await?;
            info!(count, "Precache warmed");
            println!(
                "Cached {} assets into {}",
                count,
                config.static_cache_name()
            );
        }
        Some("prune") => {
            let router = build_router(&config, &base_url)?;
            let deleted = router.activate()?;
            if deleted.is_empty() {
                println!("No stale namespaces");
            } else {
                println!("Deleted: {}", deleted.join(", "));
            }
        }
        Some("fetch") => {
            let url = args
                .get(2)
                .ok_or_else(|| anyhow!("usage: todobox-offline fetch <url>"))?;
            let router = build_router(&config, &base_url)?;
            let routed = router.handle(&Request::get(url.clone())).await?;
            println!(
                "{} {} via {} ({} bytes, cached {}m ago)",
                routed.response.status,
                url,
                routed.served_from,
                routed.response.body.len(),
                routed.response.age_minutes()
            );
        }
        Some("todo") => {
            let id: i64 = args
                .get(2)
                .ok_or_else(|| anyhow!("usage: todobox-offline todo <id>"))?
                .parse()?;
            let csrf_token = std::env::var("TODOBOX_CSRF_TOKEN")
                .map_err(|_| anyhow!("TODOBOX_CSRF_TOKEN is not set"))?;
            let client = TodoClient::new(base_url.as_str(), csrf_token)?;
            let payload = client.fetch_todo(id).await?;
            println!("#{} {}", payload.id, payload.title);
            if let Some(activities) = payload.activities.as_deref() {
                println!("{}", activities);
            }
            if payload.reminder_enabled {
                println!(
                    "Reminder: {}",
                    payload.reminder_time.as_deref().unwrap_or("(unset)")
                );
            }
        }
        _ => usage(),
    }

    Ok(())
}
