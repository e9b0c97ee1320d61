//! Activity downloader
//!
//! Paginated fetch of recent activities, written as one JSON file per
//! activity plus an `activities_summary.json` index. Per-activity
//! failures are counted and skipped; they never abort the run.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use regex::Regex;
use serde_json::json;
use tracing::debug;

use crate::client::{GarminClient, SessionToken};
use crate::error::Result;
use crate::models::ActivitySummary;

/// Page size for the activity list endpoint
const PAGE_SIZE: u32 = 100;

pub struct ActivityDownloader<'a> {
    client: &'a GarminClient,
    token: &'a SessionToken,
    output_dir: PathBuf,
}

/// Statistics for one download run
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub total: usize,
    pub downloaded: usize,
    pub output_dir: PathBuf,
}

impl<'a> ActivityDownloader<'a> {
    pub fn new(client: &'a GarminClient, token: &'a SessionToken, output_dir: PathBuf) -> Self {
        Self {
            client,
            token,
            output_dir,
        }
    }

    /// Download all activities from the last `weeks` weeks
    pub async fn run(&self, weeks: u32) -> Result<DownloadReport> {
        std::fs::create_dir_all(&self.output_dir)?;

        let activities = self.list_activities(weeks).await?;
        let mut downloaded = 0;
        let mut index = Vec::with_capacity(activities.len());

        for activity in &activities {
            match self.download_one(activity).await {
                Ok(filename) => {
                    downloaded += 1;
                    println!("  ✓ Saved: {}", filename);
                    index.push(json!({
                        "activityId": activity.activity_id,
                        "name": activity.activity_name,
                        "type": activity.type_key(),
                        "startTimeLocal": activity.start_time_local,
                        "duration": activity.duration,
                        "distance": activity.distance,
                        "calories": activity.calories,
                    }));
                }
                Err(e) => {
                    println!("  ✗ Activity {}: {}", activity.activity_id, e);
                }
            }
        }

        self.write_summary_index(&index)?;

        Ok(DownloadReport {
            total: activities.len(),
            downloaded,
            output_dir: self.output_dir.clone(),
        })
    }

    /// Fetch the activity list for the date window, following pagination
    async fn list_activities(&self, weeks: u32) -> Result<Vec<ActivitySummary>> {
        let end = Utc::now().date_naive();
        let start = end - Duration::weeks(weeks as i64);

        let mut all = Vec::new();
        let mut offset = 0u32;
        loop {
            let path = format!(
                "/activitylist-service/activities/search/activities?startDate={}&endDate={}&limit={}&start={}",
                start, end, PAGE_SIZE, offset
            );
            let page: Vec<ActivitySummary> = self.client.get_json(self.token, &path).await?;
            let page_len = page.len();
            debug!(offset, page_len, "fetched activity page");
            all.extend(page);
            if page_len < PAGE_SIZE as usize {
                break;
            }
            offset += PAGE_SIZE;
        }
        Ok(all)
    }

    /// Fetch one activity's detail and write it to its own file
    async fn download_one(&self, activity: &ActivitySummary) -> Result<String> {
        let path = format!("/activity-service/activity/{}", activity.activity_id);
        let detail: serde_json::Value = self.client.get_json(self.token, &path).await?;

        let filename = format!(
            "{}_{}_{}.json",
            activity.datetime_slug(),
            sanitize_filename(&activity.type_key()),
            activity.activity_id
        );
        let file_path = self.output_dir.join(&filename);

        let record = json!({
            "metadata": {
                "activityId": activity.activity_id,
                "name": activity.activity_name,
                "type": activity.type_key(),
                "startTimeLocal": activity.start_time_local,
                "duration": activity.duration,
                "distance": activity.distance,
                "calories": activity.calories,
            },
            "garminData": detail,
        });
        std::fs::write(&file_path, serde_json::to_string_pretty(&record)?)?;
        Ok(filename)
    }

    fn write_summary_index(&self, index: &[serde_json::Value]) -> Result<()> {
        let summary = json!({
            "downloadInfo": {
                "totalActivities": index.len(),
                "downloadTimestamp": Utc::now().to_rfc3339(),
            },
            "activities": index,
        });
        let path = self.output_dir.join("activities_summary.json");
        std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        Ok(())
    }
}

/// Remove characters that are invalid in filenames
fn sanitize_filename(name: &str) -> String {
    let invalid = Regex::new(r#"[<>:"/\\|?*]+"#).expect("valid filename regex");
    let cleaned = invalid.replace_all(name, "_");
    let squeezed = Regex::new(r"_+")
        .expect("valid squeeze regex")
        .replace_all(&cleaned, "_")
        .to_string();
    squeezed.trim_matches(|c| c == '_' || c == ' ').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("trail_running"), "trail_running");
        assert_eq!(sanitize_filename("lap/swim: morning"), "lap_swim_ morning");
        assert_eq!(sanitize_filename("___x___"), "x");
    }
}
