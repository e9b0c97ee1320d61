//! Upload orchestrator
//!
//! Submits (or previews) each structured workout against the workout
//! service, strictly sequentially: the platform rate-limits per account,
//! so concurrent submissions would only risk throttling.
//!
//! Per-item state machine:
//!
//! ```text
//! PENDING -> PREVIEWED                  (dry run, terminal)
//! PENDING -> SUBMITTING -> SUBMITTED    (terminal)
//!            SUBMITTING -> FAILED       (terminal)
//! ```
//!
//! Transient errors retry with exponential backoff up to the configured
//! limit; permanent rejections fail only their own item; an
//! authentication failure aborts the remainder of the batch since no
//! further submission can succeed.

pub mod backoff;

pub use backoff::{Delay, NoDelay, RetryPolicy, TokioDelay};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::wire::WorkoutPayload;
use crate::models::workout::StructuredWorkout;
use crate::plan::PlanItem;

/// Collaborator contract: submit one wire-format workout, yielding the
/// remote id or a validation/transient/auth error.
#[allow(async_fn_in_trait)]
pub trait SubmitWorkout {
    async fn submit(&self, payload: &WorkoutPayload) -> Result<u64>;
}

/// Submitter for dry runs. Never invoked; previews short-circuit before
/// submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSubmitter;

impl SubmitWorkout for NoopSubmitter {
    async fn submit(&self, _payload: &WorkoutPayload) -> Result<u64> {
        Err(crate::error::PlannerError::permanent(
            "submission is disabled in dry-run mode",
        ))
    }
}

/// Terminal state of one upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded,
    Previewed,
    Skipped,
    Failed,
}

/// Outcome for one plan item. Created once per item; retries update the
/// in-flight attempt rather than producing additional results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    fn uploaded(workout: &StructuredWorkout, remote_id: u64) -> Self {
        Self {
            name: workout.name.clone(),
            scheduled_date: Some(workout.scheduled_date),
            status: UploadStatus::Uploaded,
            remote_id: Some(remote_id),
            error: None,
        }
    }

    fn previewed(workout: &StructuredWorkout) -> Self {
        Self {
            name: workout.name.clone(),
            scheduled_date: Some(workout.scheduled_date),
            status: UploadStatus::Previewed,
            remote_id: None,
            error: None,
        }
    }

    fn skipped(date: NaiveDate) -> Self {
        Self {
            name: format!("{} Rest", date),
            scheduled_date: Some(date),
            status: UploadStatus::Skipped,
            remote_id: None,
            error: None,
        }
    }

    fn failed(workout: &StructuredWorkout, error: String) -> Self {
        Self {
            name: workout.name.clone(),
            scheduled_date: Some(workout.scheduled_date),
            status: UploadStatus::Failed,
            remote_id: None,
            error: Some(error),
        }
    }

    fn invalid(label: String, reason: String) -> Self {
        Self {
            name: label,
            scheduled_date: None,
            status: UploadStatus::Failed,
            remote_id: None,
            error: Some(reason),
        }
    }
}

/// Aggregate outcome of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    pub total: usize,
    pub uploaded: usize,
    pub previewed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub results: Vec<UploadResult>,
}

impl UploadSummary {
    fn from_results(results: Vec<UploadResult>) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            uploaded: count(UploadStatus::Uploaded),
            previewed: count(UploadStatus::Previewed),
            skipped: count(UploadStatus::Skipped),
            failed: count(UploadStatus::Failed),
            results,
        }
    }

    /// Every item reached a non-failed terminal state
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Sequential upload orchestrator with per-item failure isolation
pub struct Uploader<S, D = TokioDelay> {
    submitter: S,
    delay: D,
    retry: RetryPolicy,
    max_retries: u32,
}

impl<S: SubmitWorkout> Uploader<S, TokioDelay> {
    pub fn new(submitter: S, max_retries: u32) -> Self {
        Self {
            submitter,
            delay: TokioDelay,
            retry: RetryPolicy::default(),
            max_retries,
        }
    }
}

impl<S: SubmitWorkout, D: Delay> Uploader<S, D> {
    /// Build an orchestrator with an injected delay (tests)
    pub fn with_delay(submitter: S, delay: D, retry: RetryPolicy, max_retries: u32) -> Self {
        Self {
            submitter,
            delay,
            retry,
            max_retries,
        }
    }

    /// Process the items independently and sequentially. One item's
    /// failure never prevents processing of the remainder; only an
    /// authentication failure aborts what's left.
    pub async fn run(&self, items: Vec<PlanItem>, dry_run: bool) -> UploadSummary {
        let mut results = Vec::with_capacity(items.len());
        let mut abort_reason: Option<String> = None;

        for item in items {
            let result = match item {
                PlanItem::Rest(date) => UploadResult::skipped(date),
                PlanItem::Invalid { label, reason } => UploadResult::invalid(label, reason),
                PlanItem::Workout(workout) => {
                    if let Some(reason) = &abort_reason {
                        UploadResult::failed(&workout, format!("batch aborted: {}", reason))
                    } else if dry_run {
                        UploadResult::previewed(&workout)
                    } else {
                        match self.submit_with_retry(&workout).await {
                            Ok(remote_id) => {
                                debug!(name = %workout.name, remote_id, "workout uploaded");
                                UploadResult::uploaded(&workout, remote_id)
                            }
                            Err(e) => {
                                if e.is_auth() {
                                    abort_reason = Some(e.to_string());
                                }
                                UploadResult::failed(&workout, e.to_string())
                            }
                        }
                    }
                }
            };
            results.push(result);
        }

        UploadSummary::from_results(results)
    }

    /// PENDING -> SUBMITTING, retrying transient errors with backoff.
    /// Submission is at-most-once per attempt; exhausted retries demote
    /// the error to a failed result in the caller.
    async fn submit_with_retry(&self, workout: &StructuredWorkout) -> Result<u64> {
        let payload = WorkoutPayload::from_workout(workout);
        let mut attempt: u32 = 0;
        loop {
            match self.submitter.submit(&payload).await {
                Ok(remote_id) => return Ok(remote_id),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let wait = self.retry.delay_for(attempt);
                    warn!(
                        name = %workout.name,
                        attempt = attempt + 1,
                        "transient submit error ({}), retrying in {:?}",
                        e,
                        wait
                    );
                    self.delay.sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::models::workout::{Dose, SegmentKind, Sport, Target, WorkoutSegment};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// What the scripted submitter should do for a given workout name
    #[derive(Debug, Clone, Copy)]
    enum Script {
        Ok(u64),
        Transient,
        Permanent,
        Auth,
        /// Fail transiently this many times, then succeed
        FlakyThenOk(u32, u64),
    }

    /// Test double recording every call
    struct ScriptedSubmitter {
        scripts: HashMap<String, Script>,
        calls: AtomicUsize,
        attempts: Mutex<HashMap<String, u32>>,
    }

    impl ScriptedSubmitter {
        fn new(scripts: Vec<(&str, Script)>) -> Self {
            Self {
                scripts: scripts
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                calls: AtomicUsize::new(0),
                attempts: Mutex::new(HashMap::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SubmitWorkout for ScriptedSubmitter {
        async fn submit(&self, payload: &WorkoutPayload) -> Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut attempts = self.attempts.lock().unwrap();
            let seen = attempts.entry(payload.workout_name.clone()).or_insert(0);
            *seen += 1;

            match self.scripts.get(&payload.workout_name).copied() {
                None => Ok(1000),
                Some(Script::Ok(id)) => Ok(id),
                Some(Script::Transient) => Err(PlannerError::transient("HTTP 503")),
                Some(Script::Permanent) => Err(PlannerError::permanent("HTTP 400: bad schema")),
                Some(Script::Auth) => Err(PlannerError::auth("session expired")),
                Some(Script::FlakyThenOk(failures, id)) => {
                    if *seen <= failures {
                        Err(PlannerError::transient("HTTP 502"))
                    } else {
                        Ok(id)
                    }
                }
            }
        }
    }

    fn workout(name: &str) -> StructuredWorkout {
        StructuredWorkout {
            name: name.to_string(),
            sport: Sport::Running,
            scheduled_date: chrono::NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
            segments: vec![WorkoutSegment::new(
                SegmentKind::Work,
                Dose::secs(1800),
                Target::zone(2),
            )],
            source_description: "45 min steady".to_string(),
        }
    }

    fn items(names: &[&str]) -> Vec<PlanItem> {
        names
            .iter()
            .map(|n| PlanItem::Workout(workout(n)))
            .collect()
    }

    fn uploader(submitter: ScriptedSubmitter) -> Uploader<ScriptedSubmitter, NoDelay> {
        Uploader::with_delay(submitter, NoDelay, RetryPolicy::default(), 3)
    }

    #[tokio::test]
    async fn test_all_succeed() {
        let up = uploader(ScriptedSubmitter::new(vec![("w1", Script::Ok(11))]));
        let summary = up.run(items(&["w1"]), false).await;

        assert_eq!(summary.total, 1);
        assert_eq!(summary.uploaded, 1);
        assert!(summary.is_success());
        assert_eq!(summary.results[0].remote_id, Some(11));
    }

    #[tokio::test]
    async fn test_permanent_failure_is_isolated() {
        // Five workouts, the third rejected permanently: the other four
        // still reach a non-failed terminal state.
        let up = uploader(ScriptedSubmitter::new(vec![("w3", Script::Permanent)]));
        let summary = up.run(items(&["w1", "w2", "w3", "w4", "w5"]), false).await;

        assert_eq!(summary.total, 5);
        assert_eq!(summary.uploaded, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[2].status, UploadStatus::Failed);
        assert!(summary.results[2].error.as_ref().unwrap().contains("400"));
        for i in [0, 1, 3, 4] {
            assert_eq!(summary.results[i].status, UploadStatus::Uploaded);
        }
        // No retry for permanent errors: exactly one call per item
        assert_eq!(up.submitter.calls(), 5);
    }

    #[tokio::test]
    async fn test_transient_error_retries_then_succeeds() {
        let up = uploader(ScriptedSubmitter::new(vec![(
            "w1",
            Script::FlakyThenOk(2, 77),
        )]));
        let summary = up.run(items(&["w1"]), false).await;

        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.results[0].remote_id, Some(77));
        assert_eq!(up.submitter.calls(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted_demotes_to_failed() {
        let up = uploader(ScriptedSubmitter::new(vec![("w1", Script::Transient)]));
        let summary = up.run(items(&["w1", "w2"]), false).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.uploaded, 1);
        // 1 initial + 3 retries for w1, then 1 for w2
        assert_eq!(up.submitter.calls(), 5);
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_remainder() {
        let up = uploader(ScriptedSubmitter::new(vec![("w2", Script::Auth)]));
        let summary = up.run(items(&["w1", "w2", "w3", "w4"]), false).await;

        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.results[1].status, UploadStatus::Failed);
        for i in [2, 3] {
            assert_eq!(summary.results[i].status, UploadStatus::Failed);
            assert!(summary.results[i]
                .error
                .as_ref()
                .unwrap()
                .starts_with("batch aborted"));
        }
        // w3/w4 never hit the submitter
        assert_eq!(up.submitter.calls(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_never_calls_submitter() {
        let up = uploader(ScriptedSubmitter::new(vec![]));
        let summary = up.run(items(&["w1", "w2", "w3"]), true).await;

        assert_eq!(summary.previewed, 3);
        assert_eq!(summary.uploaded, 0);
        assert!(summary.is_success());
        assert_eq!(up.submitter.calls(), 0);
        assert!(summary.results.iter().all(|r| r.remote_id.is_none()));
    }

    #[tokio::test]
    async fn test_rest_day_is_skipped_not_an_error() {
        let up = uploader(ScriptedSubmitter::new(vec![]));
        let mut batch = items(&["w1"]);
        batch.push(PlanItem::Rest(
            chrono::NaiveDate::from_ymd_opt(2025, 8, 6).unwrap(),
        ));
        let summary = up.run(batch, false).await;

        assert_eq!(summary.skipped, 1);
        assert!(summary.is_success());
        assert_eq!(summary.results[1].status, UploadStatus::Skipped);
    }

    #[tokio::test]
    async fn test_invalid_item_reaches_summary_without_submission() {
        let up = uploader(ScriptedSubmitter::new(vec![]));
        let batch = vec![
            PlanItem::Invalid {
                label: "2025-08-04".to_string(),
                reason: "day section contains no usable text".to_string(),
            },
            PlanItem::Workout(workout("w1")),
        ];
        let summary = up.run(batch, false).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.uploaded, 1);
        assert_eq!(up.submitter.calls(), 1);
    }
}
