use std::process::ExitCode;

use chrono::Local;
use tapestry_archive::{info_time, process::Crawler, CrawlConfig, Error, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let start_time = Local::now();
    let config = CrawlConfig::from_env()?;

    match Crawler::new(config)?.run().await {
        Ok(report) => {
            info_time!(
                start_time,
                "Archived {} observations ({} images, {} videos).",
                report.pages,
                report.images,
                report.videos
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::SessionExpired) => {
            println!("ERROR: You appear to be logged out. Check cookie value.");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}
