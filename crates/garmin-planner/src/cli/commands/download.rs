//! Activity download command

use std::path::PathBuf;

use crate::client::{GarminClient, Session};
use crate::config::CredentialStore;
use crate::download::ActivityDownloader;
use crate::error::Result;

/// Download recent activities into a directory of JSON files
pub async fn download(weeks: u32, output_dir: String, profile: Option<String>) -> Result<()> {
    let store = CredentialStore::new(profile)?;
    let client = GarminClient::new("garmin.com");
    let session = Session::acquire(store, &client).await?;

    println!("Downloading activities from the last {} week(s)...", weeks);

    let downloader = ActivityDownloader::new(&client, session.token(), PathBuf::from(output_dir));
    let report = downloader.run(weeks).await;

    session.close()?;
    let report = report?;

    if report.total == 0 {
        println!("No activities found.");
        return Ok(());
    }

    println!(
        "\nDownloaded {}/{} activities to {}",
        report.downloaded,
        report.total,
        report.output_dir.display()
    );

    Ok(())
}
