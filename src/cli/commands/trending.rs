use tracing::warn;

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_trending(config: &Config, limit: Option<u64>) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let limit = limit.unwrap_or(config.trending.default_limit);

    let trending = match state.tracker.top_searches(limit).await {
        Ok(trending) => trending,
        Err(e) => {
            warn!(error = %e, "Failed to load trending searches");
            Vec::new()
        }
    };

    if trending.is_empty() {
        println!("No searches recorded yet.");
        return Ok(());
    }

    println!("Trending Searches:");
    println!("{:-<60}", "");
    for entry in &trending {
        println!(
            "{:>2}. {:<30} {:>6} searches  ({})",
            entry.rank, entry.title, entry.count, entry.key
        );
    }

    Ok(())
}
