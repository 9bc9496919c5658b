pub mod parse_cache;

pub use parse_cache::{CacheEntry, ParseCache};
