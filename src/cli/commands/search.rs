use super::print_movie;
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_search_movies(config: &Config, query: &str) -> anyhow::Result<()> {
    println!("Searching for: {query}");

    let state = SharedState::new(config.clone()).await?;
    let results = state.search_service.search(query).await?;

    if results.movies.is_empty() {
        println!("No movies found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("Search Results:");
    println!("{:-<60}", "");

    for movie in results.movies.iter().take(10) {
        print_movie(config, movie);
        println!();
    }

    // The process exits right after this command, so wait for the count.
    if let Some(recording) = results.recording {
        match recording.outcome().await {
            Some(Ok(outcome)) => println!(
                "Search '{}' {} (count: {})",
                outcome.counter().key,
                outcome.as_str(),
                outcome.counter().count
            ),
            Some(Err(e)) => println!("Search was not recorded: {e}"),
            None => {}
        }
    }

    Ok(())
}

pub async fn cmd_discover(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let results = state.search_service.search("").await?;

    println!("Popular Movies:");
    println!("{:-<60}", "");

    for movie in results.movies.iter().take(20) {
        print_movie(config, movie);
        println!();
    }

    Ok(())
}
