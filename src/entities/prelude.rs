pub use super::search_counters::Entity as SearchCounters;
