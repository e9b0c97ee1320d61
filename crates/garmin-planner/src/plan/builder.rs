//! Workout builder
//!
//! Assembles compiled segments plus the day's date and sport into a named,
//! validated [`StructuredWorkout`]. The workout type is classified from
//! the segment shape and the name follows the fixed
//! `YYYY-MM-DD <Sport> <type>` pattern.

use crate::error::{PlannerError, Result};
use crate::models::workout::{DayPlan, SegmentKind, Sport, StructuredWorkout, WorkoutSegment};

/// Classify the workout type from the segment shape
fn classify_type(sport: Sport, segments: &[WorkoutSegment]) -> &'static str {
    if sport == Sport::Strength {
        return "strength";
    }
    let work_count = segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Work)
        .count();
    if work_count >= 2 {
        "intervals"
    } else if segments.len() == 1 && segments[0].target.zone_number() == Some(1) {
        "recovery"
    } else {
        "endurance"
    }
}

/// Build a structured workout, or fail with a `BuildError` tagged with the
/// offending day. Rest days never reach the builder.
pub fn build(plan: &DayPlan, segments: Vec<WorkoutSegment>) -> Result<StructuredWorkout> {
    if segments.is_empty() {
        return Err(PlannerError::build(plan.date, "workout has no segments"));
    }

    let workout = StructuredWorkout {
        name: format!(
            "{} {} {}",
            plan.date.format("%Y-%m-%d"),
            plan.sport.display_name(),
            classify_type(plan.sport, &segments)
        ),
        sport: plan.sport,
        scheduled_date: plan.date,
        segments,
        source_description: plan.description.clone(),
    };

    if workout.total_duration_secs() == 0 {
        return Err(PlannerError::build(
            plan.date,
            "workout has no positive total duration",
        ));
    }

    Ok(workout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workout::{Dose, Target};
    use chrono::NaiveDate;

    fn day(sport: Sport) -> DayPlan {
        DayPlan::new(
            NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            sport,
            "6 x 3min @ Zone4 w/ 2min recovery",
        )
    }

    fn interval_segments() -> Vec<WorkoutSegment> {
        let mut segments = vec![WorkoutSegment::new(
            SegmentKind::Warmup,
            Dose::secs(600),
            Target::zone(2),
        )];
        for rep in 1..=6 {
            segments.push(
                WorkoutSegment::new(SegmentKind::Work, Dose::secs(180), Target::zone(4))
                    .with_repeat(rep),
            );
            if rep < 6 {
                segments.push(
                    WorkoutSegment::new(SegmentKind::Recovery, Dose::secs(120), Target::zone(2))
                        .with_repeat(rep),
                );
            }
        }
        segments.push(WorkoutSegment::new(
            SegmentKind::Cooldown,
            Dose::secs(600),
            Target::zone(1),
        ));
        segments
    }

    #[test]
    fn test_interval_workout_name() {
        let workout = build(&day(Sport::Cycling), interval_segments()).unwrap();
        assert_eq!(workout.name, "2025-08-05 Cycling intervals");
    }

    #[test]
    fn test_name_matches_fixed_pattern() {
        let workout = build(&day(Sport::Cycling), interval_segments()).unwrap();
        let re = regex::Regex::new(r"^\d{4}-\d{2}-\d{2} [A-Z][A-Za-z ]* [a-z]+$").unwrap();
        assert!(re.is_match(&workout.name), "bad name: {}", workout.name);
    }

    #[test]
    fn test_single_low_zone_segment_is_recovery() {
        let segments = vec![WorkoutSegment::new(
            SegmentKind::Work,
            Dose::secs(1800),
            Target::zone(1),
        )];
        let workout = build(&day(Sport::Running), segments).unwrap();
        assert_eq!(workout.name, "2025-08-05 Running recovery");
    }

    #[test]
    fn test_single_moderate_segment_is_endurance() {
        let segments = vec![WorkoutSegment::new(
            SegmentKind::Work,
            Dose::secs(2700),
            Target::zone(2),
        )];
        let workout = build(&day(Sport::Running), segments).unwrap();
        assert_eq!(workout.name, "2025-08-05 Running endurance");
    }

    #[test]
    fn test_strength_label() {
        let segments = vec![WorkoutSegment::new(
            SegmentKind::Work,
            Dose::secs(2400),
            Target::zone(2),
        )];
        let workout = build(&day(Sport::Strength), segments).unwrap();
        assert_eq!(workout.name, "2025-08-05 Strength strength");
    }

    #[test]
    fn test_empty_segments_fail() {
        let err = build(&day(Sport::Cycling), Vec::new()).unwrap_err();
        match err {
            PlannerError::Build { date, message } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
                assert!(message.contains("no segments"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_duration_fails() {
        // A distance dose with no pace target has no estimable duration
        let segments = vec![WorkoutSegment::new(
            SegmentKind::Work,
            Dose::meters(5000),
            Target::zone(2),
        )];
        let err = build(&day(Sport::Running), segments).unwrap_err();
        assert!(matches!(err, PlannerError::Build { .. }));
    }
}
