use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::print_movie;
use crate::config::Config;
use crate::services::SessionState;
use crate::services::session::{SessionDriver, SessionEvent, SessionHandle};
use crate::state::SharedState;

fn render(config: &Config, snapshot: &SessionState) {
    println!();
    if let Some(message) = &snapshot.error_message {
        println!("{message}");
        return;
    }

    if snapshot.debounced_term.is_empty() {
        println!("Popular Movies:");
    } else {
        println!("Results for '{}':", snapshot.debounced_term);
    }
    println!("{:-<60}", "");

    if snapshot.movies.is_empty() {
        println!("No movies found.");
    }
    for movie in snapshot.movies.iter().take(10) {
        print_movie(config, movie);
    }
}

pub async fn cmd_browse(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let driver = SessionDriver::new(
        state.search_service.clone(),
        state.tracker.clone(),
        Duration::from_millis(config.search.debounce_ms),
        config.trending.default_limit,
    );

    let SessionHandle {
        input,
        state: mut session,
        task,
    } = driver.spawn();

    println!("Type a search and press Enter. Ctrl+D quits.");

    let printer_config = config.clone();
    let printer = tokio::spawn(async move {
        let mut rendered_request = 0;
        let mut trending_shown = false;

        while session.changed().await.is_ok() {
            let snapshot = session.borrow_and_update().clone();

            if !trending_shown && !snapshot.trending.is_empty() {
                trending_shown = true;
                println!("Trending: ");
                for entry in &snapshot.trending {
                    println!("  {}. {} ({})", entry.rank, entry.title, entry.count);
                }
            }

            if snapshot.is_loading || snapshot.request == rendered_request {
                continue;
            }
            rendered_request = snapshot.request;
            render(&printer_config, &snapshot);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if input.send(SessionEvent::QueryChanged(line)).await.is_err() {
            break;
        }
    }

    drop(input);
    task.await?;
    printer.await?;

    Ok(())
}
