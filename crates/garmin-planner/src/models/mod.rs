pub mod activity;
pub mod wire;
pub mod workout;

pub use activity::{ActivitySummary, ActivityType};
pub use wire::{WorkoutCreated, WorkoutPayload};
pub use workout::{
    DayPlan, Dose, SegmentKind, Sport, StructuredWorkout, Target, WorkoutSegment,
};
