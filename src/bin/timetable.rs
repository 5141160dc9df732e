use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use rgsu_timetable::timetable::{
    config::{build_http_client, load_config},
    date_provider::{ClockSource, LocalClock, TimeApiClock},
    models::Args,
    run_tool::run,
    schedule_getter::RgsuClient,
};

#[tokio::main]
async fn main() -> ExitCode {
    /* Setup logging */
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    /* Get all the required resources */
    let args = Args::parse();
    let config = match load_config(&args.config_json_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Could not read config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let http_client = match build_http_client(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Could not build http client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let clock = if args.local_clock || !config.use_time_api {
        ClockSource::Local(LocalClock)
    } else {
        ClockSource::TimeApi(TimeApiClock::new(
            http_client.clone(),
            &config.time_api_url,
            &config.time_zone,
        )
        .with_fallback_offset(config.fallback_offset()))
    };
    let rgsu = RgsuClient::new(http_client, config);

    /* Fetch and persist */
    match run(&clock, &rgsu, &rgsu, &args).await {
        Ok(summary) => {
            info!(
                "Done: {} groups, schedule for {}{}",
                summary.groups_count,
                summary.group.as_deref().unwrap_or("no group"),
                if summary.schedule_changed { " (changed)" } else { "" }
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
