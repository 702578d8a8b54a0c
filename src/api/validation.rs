use super::ApiError;
use crate::domain::MovieId;

pub fn validate_movie_id(id: i64) -> Result<MovieId, ApiError> {
    let id = MovieId::new(id);
    if !id.is_valid() {
        return Err(ApiError::validation(format!(
            "Invalid movie ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

/// Resolves an optional trending limit against the configured default and cap.
pub fn validate_limit(limit: Option<u64>, default: u64, max: u64) -> Result<u64, ApiError> {
    let limit = limit.unwrap_or(default);
    if !(1..=max).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between 1 and {}",
            limit, max
        )));
    }
    Ok(limit)
}

pub fn validate_region(region: &str) -> Result<String, ApiError> {
    let region = region.trim();
    if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::validation(format!(
            "Invalid region: '{}'. Expected a two-letter country code",
            region
        )));
    }
    Ok(region.to_ascii_uppercase())
}
