use crate::config::Config;
use crate::domain::MovieId;
use crate::state::SharedState;

pub async fn cmd_movie_info(config: &Config, id: i64, region: Option<&str>) -> anyhow::Result<()> {
    let id = MovieId::new(id);
    if !id.is_valid() {
        println!("Invalid movie ID: {id}");
        return Ok(());
    }

    let state = SharedState::new(config.clone()).await?;
    let extras = state.catalog.extras(id, region).await;

    println!("Movie {id}");
    println!("{:-<60}", "");

    if extras.keywords.is_empty() {
        println!("Keywords: none");
    } else {
        let names: Vec<&str> = extras.keywords.iter().map(|k| k.name.as_str()).collect();
        println!("Keywords: {}", names.join(", "));
    }

    match &extras.trailer {
        Some(trailer) => println!(
            "Trailer:  {} ({})",
            trailer.name,
            trailer.url.as_deref().unwrap_or(&trailer.key)
        ),
        None => println!("Trailer:  not available"),
    }

    println!();
    println!("Where to watch ({}):", extras.region);
    if extras.providers.is_empty() {
        println!("  Not available in this region");
    }
    for (label, providers) in [
        ("Stream", &extras.providers.flatrate),
        ("Rent", &extras.providers.rent),
        ("Buy", &extras.providers.buy),
    ] {
        if !providers.is_empty() {
            let names: Vec<&str> = providers.iter().map(|p| p.provider_name.as_str()).collect();
            println!("  {label}: {}", names.join(", "));
        }
    }

    Ok(())
}
