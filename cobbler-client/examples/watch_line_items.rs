//! Watch line items on the shared push channel
//!
//! Logs every pickup and keeps a branch's storage list fresh: each change
//! event schedules a re-fetch 300ms later.
//!
//! Run: COBBLER_API_BASE_URL=http://localhost:3000 cargo run --example watch_line_items -- <branch_id>

use cobbler_client::realtime::DelayedRefresh;
use cobbler_client::{ClientConfig, Fallback, LineItemWatch, logger, shared_channel};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logger("info", false)?;

    let branch_id = std::env::args().nth(1).unwrap_or_else(|| "main".to_string());
    let config = ClientConfig::from_env()?;
    let api = Arc::new(config.build_api_client()?);

    println!("\n👟 Watching line items for branch {}", branch_id);
    println!("=====================================\n");

    let initial = api.branch_storage(&branch_id).await.or_fallback("branch storage");
    println!("{} pair(s) waiting for pickup", initial.len());

    let refresh = {
        let api = Arc::clone(&api);
        let branch_id = branch_id.clone();
        Arc::new(DelayedRefresh::new(move || {
            let api = Arc::clone(&api);
            let branch_id = branch_id.clone();
            async move {
                let items = api.branch_storage(&branch_id).await.or_fallback("branch storage");
                tracing::info!(count = items.len(), "Storage list refreshed");
            }
        }))
    };

    let channel = shared_channel(&config);
    let _watch = LineItemWatch::new()
        .on_picked_up(|change| {
            tracing::info!(line_item = ?change.document_id(), "Picked up");
        })
        .on_any_change({
            let refresh = Arc::clone(&refresh);
            move |_| refresh.schedule()
        })
        .attach(&channel);

    tokio::signal::ctrl_c().await?;
    cobbler_client::disconnect_shared();
    println!("\n👋 Bye");
    Ok(())
}
