use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::error;

use shotlist::{App, Config, VideoIntelligenceClient, CREDENTIAL_ENV, DEFAULT_BUCKETS};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("shotlist")
        .version("0.1.0")
        .about("Shot change detection and manual correction workflow for video")
        .arg(
            Arg::new("action")
                .help("What to do")
                .value_parser(["detect", "correct", "preview", "export", "verify"])
                .required(true),
        )
        .arg(
            Arg::new("uri")
                .long("uri")
                .value_name("URI")
                .help("Video locator, e.g. gs://bucket/video.mp4"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .value_name("MODEL")
                .help("Detection model (defaults to the configured model)"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Root directory for detection data"),
        )
        .arg(
            Arg::new("duration")
                .long("duration")
                .value_name("SECONDS")
                .help("Total video duration, required by export"),
        )
        .arg(
            Arg::new("buckets")
                .long("buckets")
                .value_name("NUM")
                .help("Number of time buckets for export")
                .default_value("100"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("verbose") {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter("debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter("info")
            .init();
    }

    let api_key = std::env::var(CREDENTIAL_ENV).unwrap_or_default();
    if api_key.trim().is_empty() {
        error!("{} not set", CREDENTIAL_ENV);
        return Err(anyhow!("{} not set", CREDENTIAL_ENV));
    }

    let mut config = Config::load().unwrap_or_else(|_| Config::default());
    if let Some(data_dir) = matches.get_one::<String>("data-dir") {
        config.output.data_dir = PathBuf::from(data_dir);
    }

    let action = matches.get_one::<String>("action").expect("required arg");
    let uri = matches.get_one::<String>("uri").map(|s| s.as_str());
    let model = matches.get_one::<String>("model").map(|s| s.as_str());

    let app = App::new(config.clone());

    match action.as_str() {
        "verify" => {
            println!("OK");
        }
        "detect" => {
            let uri = required_uri(uri)?;
            let annotator = VideoIntelligenceClient::new(config.detection.clone(), api_key);
            app.detect(&annotator, uri, model).await?;
        }
        "correct" => {
            let uri = required_uri(uri)?;
            app.correct(uri).await?;
        }
        "preview" => {
            let uri = required_uri(uri)?;
            app.preview(uri).await?;
        }
        "export" => {
            let uri = required_uri(uri)?;
            let duration: f64 = matches
                .get_one::<String>("duration")
                .ok_or_else(|| anyhow!("--duration is required for export"))?
                .parse()
                .map_err(|_| anyhow!("--duration must be a number of seconds"))?;
            let buckets: usize = matches
                .get_one::<String>("buckets")
                .map(|s| s.parse())
                .transpose()
                .map_err(|_| anyhow!("--buckets must be a positive integer"))?
                .unwrap_or(DEFAULT_BUCKETS);
            app.export(uri, duration, buckets).await?;
        }
        other => unreachable!("clap rejects unknown action {}", other),
    }

    Ok(())
}

fn required_uri(uri: Option<&str>) -> Result<&str> {
    match uri {
        Some(uri) if !uri.is_empty() => {
            url::Url::parse(uri).map_err(|e| anyhow!("--uri is not a valid locator: {}", e))?;
            Ok(uri)
        }
        _ => {
            error!("--uri to video is required");
            Err(anyhow!("--uri to video is required"))
        }
    }
}
