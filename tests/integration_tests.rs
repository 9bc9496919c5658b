// Gateway file to expose integration tests from the integration/ subdirectory
// This file allows Rust's test runner to discover tests in subdirectories

mod common;

#[path = "integration/test_completion_flow.rs"]
mod test_completion_flow;

#[path = "integration/test_engine_events.rs"]
mod test_engine_events;

#[path = "integration/test_parse_cache.rs"]
mod test_parse_cache;

#[path = "integration/test_settings.rs"]
mod test_settings;
