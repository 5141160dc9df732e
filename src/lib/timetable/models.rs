use std::path::PathBuf;

use clap::Parser;

pub mod lesson_model;

/// A model for describing ARGS of the tool.
/// Consists of:
/// 1. Path to config.json, that overrides endpoints and request parameters.
/// 2. Paths to the artifacts the display layer reads: group list, selected group, weekly schedule and its failure report.
/// 3. Optional group to select (it is persisted and used for this run).
/// 4. Flag to anchor the week on the local clock instead of the time service.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[arg(long, value_name = "FILE", default_value = "data/groups.json")]
    pub groups_json_path: PathBuf,
    #[arg(long, value_name = "FILE", default_value = "data/selected_group.json")]
    pub selected_group_json_path: PathBuf,
    #[arg(long, value_name = "FILE", default_value = "data/schedule.json")]
    pub schedule_json_path: PathBuf,
    #[arg(long, value_name = "FILE", default_value = "data/schedule_failures.json")]
    pub failures_json_path: PathBuf,
    #[arg(long, value_name = "GROUP")]
    pub group: Option<String>,
    #[arg(long)]
    pub local_clock: bool,
}
