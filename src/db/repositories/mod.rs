pub mod search_counter;
