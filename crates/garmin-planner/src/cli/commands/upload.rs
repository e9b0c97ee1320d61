//! Plan upload command
//!
//! Reads a plan file, compiles it into structured workouts, optionally
//! snapshots the structured set, and submits everything through the
//! upload orchestrator. Exit is non-zero when any workout fails to reach
//! a terminal non-failed state.

use chrono::{Local, NaiveDate};

use crate::client::{GarminClient, Session};
use crate::config::CredentialStore;
use crate::error::{PlannerError, Result};
use crate::plan::{self, PlanParser};
use crate::upload::{NoopSubmitter, UploadStatus, UploadSummary, Uploader};

pub struct UploadArgs {
    pub plan_file: String,
    pub weeks: u32,
    pub week_start: Option<String>,
    pub dry_run: bool,
    pub save_structured: Option<String>,
    pub max_retries: u32,
    pub profile: Option<String>,
}

pub async fn upload(args: UploadArgs) -> Result<()> {
    let plan_text = tokio::fs::read_to_string(&args.plan_file).await?;

    let week_start = match &args.week_start {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| PlannerError::InvalidDateFormat(s.clone()))?,
        None => Local::now().date_naive(),
    };

    println!("Parsing plan from {}", args.plan_file);
    let parsed = PlanParser::new(week_start, args.weeks).parse(&plan_text);
    if parsed.is_empty() {
        return Err(PlannerError::parse(
            "no day sections recognized in the plan file",
        ));
    }

    let compiled = plan::compile_plan(parsed);
    for note in &compiled.notes {
        println!("note: {}", note);
    }

    let workouts = compiled.workouts();
    println!(
        "Compiled {} workout(s) across {} day entr(ies)",
        workouts.len(),
        compiled.items.len()
    );

    if let Some(path) = &args.save_structured {
        let saved = plan::save_structured_workouts(path, &workouts)?;
        println!("Structured workouts saved to: {}", saved.display());
    }

    let summary = if args.dry_run {
        println!("Dry run: previewing without submitting");
        let uploader = Uploader::new(NoopSubmitter, args.max_retries);
        uploader.run(compiled.items, true).await
    } else {
        let store = CredentialStore::new(args.profile)?;
        let client = GarminClient::new("garmin.com");
        let session = Session::acquire(store, &client).await?;

        let summary = {
            let uploader =
                Uploader::new(client.workout_submitter(session.token()), args.max_retries);
            uploader.run(compiled.items, false).await
        };

        session.close()?;
        summary
    };

    print_summary(&summary);

    if summary.is_success() {
        Ok(())
    } else {
        Err(PlannerError::UploadIncomplete {
            failed: summary.failed,
            total: summary.total,
        })
    }
}

fn print_summary(summary: &UploadSummary) {
    println!();
    println!(
        "{:<12} {:<36} {:<10} {}",
        "Date", "Workout", "Status", "Detail"
    );
    println!("{}", "-".repeat(78));

    for result in &summary.results {
        let date = result
            .scheduled_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = match result.status {
            UploadStatus::Uploaded => "uploaded",
            UploadStatus::Previewed => "previewed",
            UploadStatus::Skipped => "skipped",
            UploadStatus::Failed => "FAILED",
        };
        let detail = match (&result.remote_id, &result.error) {
            (Some(id), _) => format!("id {}", id),
            (None, Some(err)) => err.clone(),
            (None, None) => String::new(),
        };
        println!(
            "{:<12} {:<36} {:<10} {}",
            date,
            truncate(&result.name, 36),
            status,
            detail
        );
    }

    println!();
    println!(
        "{} total: {} uploaded, {} previewed, {} skipped, {} failed",
        summary.total, summary.uploaded, summary.previewed, summary.skipped, summary.failed
    );
}

/// Truncate string to max length
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer workout name", 10), "a much ...");
    }
}
