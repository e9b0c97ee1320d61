//! Domain models for the plan compiler
//!
//! A plan file is parsed into [`DayPlan`] entries, each of which compiles
//! into an ordered list of [`WorkoutSegment`]s and finally a
//! [`StructuredWorkout`] ready for the workout-service endpoint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sport category for a planned day.
///
/// Unknown sport tags normalize to `Other` rather than failing the parse;
/// `Rest` marks a day with no schedulable workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Running,
    Cycling,
    IndoorCycling,
    Swimming,
    Strength,
    Yoga,
    Rest,
    Other,
}

impl Sport {
    /// Normalize a free-text sport tag. Never rejects: anything
    /// unrecognized maps to `Other`.
    pub fn normalize(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "run" | "running" | "jog" | "jogging" | "trail run" => Self::Running,
            "bike" | "cycling" | "cycle" | "ride" | "road ride" => Self::Cycling,
            "indoor cycling" | "indoor bike" | "spin" | "trainer" | "turbo" => {
                Self::IndoorCycling
            }
            "swim" | "swimming" | "pool swim" | "open water swim" => Self::Swimming,
            "strength" | "strength training" | "weights" | "gym" | "lifting" => Self::Strength,
            "yoga" | "mobility" | "stretching" => Self::Yoga,
            "rest" | "rest day" | "off" | "day off" => Self::Rest,
            _ => Self::Other,
        }
    }

    /// Whether this tag was recognized as a concrete sport. Used by the
    /// parser to decide if a line starts a new workout entry.
    pub fn is_recognized(tag: &str) -> bool {
        !matches!(Self::normalize(tag), Self::Other)
    }

    pub fn is_rest(self) -> bool {
        matches!(self, Self::Rest)
    }

    /// Display name used in workout titles, e.g. "Indoor Cycling"
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
            Self::IndoorCycling => "Indoor Cycling",
            Self::Swimming => "Swimming",
            Self::Strength => "Strength",
            Self::Yoga => "Yoga",
            Self::Rest => "Rest",
            Self::Other => "Workout",
        }
    }

    /// Garmin Connect sport type id/key pair
    pub fn sport_type(self) -> (u16, &'static str) {
        match self {
            Self::Running => (1, "running"),
            Self::Cycling => (2, "cycling"),
            Self::IndoorCycling => (25, "indoor_cycling"),
            Self::Swimming => (4, "swimming"),
            Self::Strength => (13, "strength_training"),
            Self::Yoga => (43, "yoga"),
            // Rest days are never uploaded; map to the generic bucket so
            // serialization stays total.
            Self::Rest | Self::Other => (9, "other"),
        }
    }
}

/// One actionable (or rest) day extracted from the plan text.
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub sport: Sport,
    pub description: String,
}

impl DayPlan {
    pub fn new(date: NaiveDate, sport: Sport, description: impl Into<String>) -> Self {
        Self {
            date,
            sport,
            description: description.into(),
        }
    }
}

/// Position of a segment within the workout shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Warmup,
    Work,
    Recovery,
    Cooldown,
    Rest,
}

/// Effort extent: a duration in whole seconds or a distance in meters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dose {
    Time { secs: u32 },
    Distance { meters: u32 },
}

impl Dose {
    pub fn secs(secs: u32) -> Self {
        Self::Time { secs }
    }

    pub fn meters(meters: u32) -> Self {
        Self::Distance { meters }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Self::Time { secs } => secs == 0,
            Self::Distance { meters } => meters == 0,
        }
    }
}

/// Intensity target: a coarse effort zone (1 easiest, 5 hardest) or a pace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Zone { zone: u8 },
    Pace { seconds_per_km: u32 },
}

impl Target {
    pub fn zone(zone: u8) -> Self {
        Self::Zone { zone }
    }

    /// The zone number when this is a zone target
    pub fn zone_number(self) -> Option<u8> {
        match self {
            Self::Zone { zone } => Some(zone),
            Self::Pace { .. } => None,
        }
    }
}

/// An atomic portion of a workout, ordered within its parent.
///
/// `repeat_index` is set for work/recovery segments that came out of an
/// interval repeat (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSegment {
    pub kind: SegmentKind,
    pub dose: Dose,
    pub target: Target,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub repeat_index: Option<u32>,
}

impl WorkoutSegment {
    pub fn new(kind: SegmentKind, dose: Dose, target: Target) -> Self {
        Self {
            kind,
            dose,
            target,
            repeat_index: None,
        }
    }

    pub fn with_repeat(mut self, index: u32) -> Self {
        self.repeat_index = Some(index);
        self
    }

    /// Estimated duration in seconds. Distance doses are estimated from a
    /// pace target when one is present, otherwise they contribute nothing.
    pub fn estimated_secs(&self) -> u32 {
        match (self.dose, self.target) {
            (Dose::Time { secs }, _) => secs,
            (Dose::Distance { meters }, Target::Pace { seconds_per_km }) => {
                ((meters as u64 * seconds_per_km as u64) / 1000) as u32
            }
            (Dose::Distance { .. }, _) => 0,
        }
    }
}

/// Platform-ready workout: a named, dated, ordered segment list.
/// Immutable after build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredWorkout {
    pub name: String,
    pub sport: Sport,
    pub scheduled_date: NaiveDate,
    pub segments: Vec<WorkoutSegment>,
    /// The plan text this workout was compiled from, kept for the
    /// uploaded description and for inspection.
    pub source_description: String,
}

impl StructuredWorkout {
    /// Total estimated duration across all segments
    pub fn total_duration_secs(&self) -> u32 {
        self.segments.iter().map(WorkoutSegment::estimated_secs).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_normalize() {
        assert_eq!(Sport::normalize("Running"), Sport::Running);
        assert_eq!(Sport::normalize("  bike "), Sport::Cycling);
        assert_eq!(Sport::normalize("Indoor Cycling"), Sport::IndoorCycling);
        assert_eq!(Sport::normalize("REST"), Sport::Rest);
        assert_eq!(Sport::normalize("underwater basket weaving"), Sport::Other);
    }

    #[test]
    fn test_sport_type_mapping() {
        assert_eq!(Sport::Running.sport_type(), (1, "running"));
        assert_eq!(Sport::IndoorCycling.sport_type(), (25, "indoor_cycling"));
        assert_eq!(Sport::Other.sport_type(), (9, "other"));
    }

    #[test]
    fn test_estimated_secs_from_pace() {
        let seg = WorkoutSegment::new(
            SegmentKind::Work,
            Dose::meters(400),
            Target::Pace {
                seconds_per_km: 270,
            },
        );
        assert_eq!(seg.estimated_secs(), 108);
    }

    #[test]
    fn test_estimated_secs_distance_without_pace() {
        let seg = WorkoutSegment::new(SegmentKind::Work, Dose::meters(400), Target::zone(4));
        assert_eq!(seg.estimated_secs(), 0);
    }

    #[test]
    fn test_segment_serde_round_trip() {
        let seg = WorkoutSegment::new(SegmentKind::Work, Dose::secs(180), Target::zone(4))
            .with_repeat(3);
        let json = serde_json::to_string(&seg).unwrap();
        let back: WorkoutSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(seg, back);
    }

    #[test]
    fn test_workout_total_duration() {
        let workout = StructuredWorkout {
            name: "2025-08-05 Cycling intervals".to_string(),
            sport: Sport::Cycling,
            scheduled_date: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            segments: vec![
                WorkoutSegment::new(SegmentKind::Warmup, Dose::secs(600), Target::zone(2)),
                WorkoutSegment::new(SegmentKind::Work, Dose::secs(180), Target::zone(4)),
                WorkoutSegment::new(SegmentKind::Cooldown, Dose::secs(600), Target::zone(1)),
            ],
            source_description: "test".to_string(),
        };
        assert_eq!(workout.total_duration_secs(), 1380);
    }
}
