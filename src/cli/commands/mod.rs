mod browse;
mod movie;
mod search;
mod trending;

pub use browse::cmd_browse;
pub use movie::cmd_movie_info;
pub use search::{cmd_discover, cmd_search_movies};
pub use trending::cmd_trending;

use crate::config::Config;
use crate::models::movie::Movie;

fn print_movie(config: &Config, movie: &Movie) {
    let year = movie
        .release_year()
        .map_or_else(|| "N/A".to_string(), |y| y.to_string());
    let rating = movie
        .vote_average
        .map_or_else(|| "N/A".to_string(), |r| format!("{r:.1}"));
    let lang = movie.original_language.as_deref().unwrap_or("?");

    println!("• {} ({})", movie.title, year);
    println!(
        "  Rating: {} | Lang: {} | ID: {}",
        rating, lang, movie.id
    );
    println!("  Poster: {}", config.poster_url(movie.poster_path.as_deref()));
}
