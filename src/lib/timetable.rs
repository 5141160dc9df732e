//! Fetching, parsing and persisting the RGSU weekly class schedule.
pub mod config;
pub mod date_provider;
pub mod errors;
pub mod groups_getter;
pub mod helpers;
pub mod lesson_extractor;
pub mod models;
pub mod run_tool;
pub mod schedule_getter;
pub mod weekly;
