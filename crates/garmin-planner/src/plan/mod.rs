//! Plan compiler pipeline
//!
//! plan text -> [`parser::PlanParser`] -> day entries ->
//! [`segments::SegmentCompiler`] -> segment lists -> [`builder::build`] ->
//! structured workouts. Per-day failures become [`PlanItem::Invalid`]
//! entries so they reach the upload summary without aborting the batch.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::workout::{DayPlan, StructuredWorkout};

pub mod builder;
pub mod parser;
pub mod segments;

pub use parser::{ParseFailure, ParsedPlan, PlanParser};
pub use segments::{Compiled, EffortSpec, SegmentCompiler, SportProfile};

/// One unit of work for the upload orchestrator
#[derive(Debug, Clone)]
pub enum PlanItem {
    Workout(StructuredWorkout),
    /// A rest day: skipped, never an error
    Rest(NaiveDate),
    /// A day that failed to parse or build; carried through so the
    /// summary can report it
    Invalid { label: String, reason: String },
}

/// Compilation output for a whole plan
#[derive(Debug, Default)]
pub struct CompiledPlan {
    pub items: Vec<PlanItem>,
    /// Non-fatal diagnostics (clamped durations and the like)
    pub notes: Vec<String>,
}

impl CompiledPlan {
    /// The built workouts, in schedule order
    pub fn workouts(&self) -> Vec<&StructuredWorkout> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PlanItem::Workout(w) => Some(w),
                _ => None,
            })
            .collect()
    }
}

/// Run the full parse -> compile -> build pipeline over a parsed plan.
/// Each day yields at most one workout; failures isolate to their day.
pub fn compile_plan(parsed: ParsedPlan) -> CompiledPlan {
    let compiler = SegmentCompiler::new();
    let mut out = CompiledPlan::default();

    for failure in parsed.failures {
        out.items.push(PlanItem::Invalid {
            label: failure.label,
            reason: failure.reason,
        });
    }

    for day in parsed.days {
        out.items.push(compile_day(&compiler, &day, &mut out.notes));
    }

    out
}

fn compile_day(compiler: &SegmentCompiler, day: &DayPlan, notes: &mut Vec<String>) -> PlanItem {
    if day.sport.is_rest() {
        return PlanItem::Rest(day.date);
    }

    let compiled = compiler.compile(day);
    notes.extend(compiled.notes);

    match builder::build(day, compiled.segments) {
        Ok(workout) => PlanItem::Workout(workout),
        Err(e) => PlanItem::Invalid {
            label: format!("{} {}", day.date, day.sport.display_name()),
            reason: e.to_string(),
        },
    }
}

/// Save the structured workout set to a JSON snapshot for inspection.
/// Returns the resolved path; a `.json` extension is appended when
/// missing.
pub fn save_structured_workouts(
    path: impl AsRef<Path>,
    workouts: &[&StructuredWorkout],
) -> Result<PathBuf> {
    let mut path = path.as_ref().to_path_buf();
    if path.extension().is_none() {
        path.set_extension("json");
    }
    let json = serde_json::to_string_pretty(workouts)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Reload a snapshot written by [`save_structured_workouts`]
pub fn load_structured_workouts(path: impl AsRef<Path>) -> Result<Vec<StructuredWorkout>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
