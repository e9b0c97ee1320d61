//! Wire format for the Garmin Connect workout service
//!
//! These structures mirror the JSON schema accepted by
//! `POST /workout-service/workout`: a workout wraps one segment per sport,
//! and each segment carries an ordered list of executable steps with a
//! time/distance end condition and a heart-rate-zone or pace target.

use serde::{Deserialize, Serialize};

use crate::models::workout::{Dose, SegmentKind, StructuredWorkout, Target, WorkoutSegment};

const EXECUTABLE_STEP: &str = "ExecutableStepDTO";
const GARMIN_DESCRIPTION_LIMIT: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPayload {
    pub workout_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sport_type: SportTypeDto,
    pub estimated_duration_in_secs: u32,
    pub workout_segments: Vec<WorkoutSegmentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportTypeDto {
    pub sport_type_id: u16,
    pub sport_type_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSegmentDto {
    pub segment_order: u32,
    pub sport_type: SportTypeDto,
    pub workout_steps: Vec<WorkoutStepDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStepDto {
    #[serde(rename = "type")]
    pub step_class: String,
    pub step_order: u32,
    pub step_type: StepTypeDto,
    pub end_condition: EndConditionDto,
    pub end_condition_value: f64,
    pub target_type: TargetTypeDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_number: Option<u8>,
    /// Target speed in m/s for pace targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value_one: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTypeDto {
    pub step_type_id: u16,
    pub step_type_key: String,
    pub display_order: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndConditionDto {
    pub condition_type_id: u16,
    pub condition_type_key: String,
    pub display_order: u16,
    pub displayable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetTypeDto {
    pub workout_target_type_id: u16,
    pub workout_target_type_key: String,
    pub display_order: u16,
}

/// Response from the workout creation endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCreated {
    pub workout_id: u64,
    #[serde(default)]
    pub workout_name: Option<String>,
}

impl SportTypeDto {
    fn from_sport(sport: crate::models::workout::Sport) -> Self {
        let (sport_type_id, key) = sport.sport_type();
        Self {
            sport_type_id,
            sport_type_key: key.to_string(),
        }
    }
}

impl StepTypeDto {
    fn from_kind(kind: SegmentKind) -> Self {
        let (step_type_id, step_type_key) = match kind {
            SegmentKind::Warmup => (1, "warmup"),
            SegmentKind::Cooldown => (2, "cooldown"),
            SegmentKind::Work => (3, "interval"),
            SegmentKind::Recovery => (4, "recovery"),
            SegmentKind::Rest => (5, "rest"),
        };
        Self {
            step_type_id,
            step_type_key: step_type_key.to_string(),
            display_order: step_type_id,
        }
    }
}

impl EndConditionDto {
    fn time() -> Self {
        Self {
            condition_type_id: 2,
            condition_type_key: "time".to_string(),
            display_order: 2,
            displayable: true,
        }
    }

    fn distance() -> Self {
        Self {
            condition_type_id: 3,
            condition_type_key: "distance".to_string(),
            display_order: 3,
            displayable: true,
        }
    }
}

impl TargetTypeDto {
    fn heart_rate_zone() -> Self {
        Self {
            workout_target_type_id: 4,
            workout_target_type_key: "heart.rate.zone".to_string(),
            display_order: 4,
        }
    }

    fn pace_zone() -> Self {
        Self {
            workout_target_type_id: 6,
            workout_target_type_key: "pace.zone".to_string(),
            display_order: 6,
        }
    }
}

impl WorkoutStepDto {
    fn from_segment(order: u32, segment: &WorkoutSegment) -> Self {
        let (end_condition, end_condition_value) = match segment.dose {
            Dose::Time { secs } => (EndConditionDto::time(), secs as f64),
            Dose::Distance { meters } => (EndConditionDto::distance(), meters as f64),
        };
        let (target_type, zone_number, target_value_one) = match segment.target {
            Target::Zone { zone } => (TargetTypeDto::heart_rate_zone(), Some(zone), None),
            Target::Pace { seconds_per_km } => (
                TargetTypeDto::pace_zone(),
                None,
                Some(1000.0 / seconds_per_km as f64),
            ),
        };

        Self {
            step_class: EXECUTABLE_STEP.to_string(),
            step_order: order,
            step_type: StepTypeDto::from_kind(segment.kind),
            end_condition,
            end_condition_value,
            target_type,
            zone_number,
            target_value_one,
        }
    }
}

impl WorkoutPayload {
    /// Convert a structured workout into the workout-service schema
    pub fn from_workout(workout: &StructuredWorkout) -> Self {
        let sport_type = SportTypeDto::from_sport(workout.sport);
        let steps = workout
            .segments
            .iter()
            .enumerate()
            .map(|(i, seg)| WorkoutStepDto::from_segment(i as u32 + 1, seg))
            .collect();

        let description = if workout.source_description.is_empty() {
            None
        } else {
            let mut text = workout.source_description.clone();
            if text.len() > GARMIN_DESCRIPTION_LIMIT {
                // Truncate on a char boundary; the service rejects longer
                // descriptions outright.
                let cut = text
                    .char_indices()
                    .take_while(|(i, _)| *i < GARMIN_DESCRIPTION_LIMIT)
                    .last()
                    .map(|(i, c)| i + c.len_utf8())
                    .unwrap_or(0);
                text.truncate(cut);
            }
            Some(text)
        };

        Self {
            workout_name: workout.name.clone(),
            description,
            sport_type: sport_type.clone(),
            estimated_duration_in_secs: workout.total_duration_secs(),
            workout_segments: vec![WorkoutSegmentDto {
                segment_order: 1,
                sport_type,
                workout_steps: steps,
            }],
        }
    }
}
