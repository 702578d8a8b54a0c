pub mod movie;
pub mod search_counter;
