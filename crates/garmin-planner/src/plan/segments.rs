//! Segment compiler
//!
//! Turns one day's free-text description into an ordered segment list.
//! Detection runs as a typed classifier first ([`SegmentCompiler::classify`]
//! producing an [`EffortSpec`]), so each grammar rule is unit-testable on
//! its own; segment emission is a pure function of the classified spec and
//! the sport's defaults.
//!
//! Interval days emit warmup, N work segments, recovery segments
//! interleaved *between* work segments (N-1 of them; the final rest before
//! cooldown is implied by the cooldown itself), and a cooldown. Continuous
//! days emit a single effort spanning the stated or sport-default
//! duration.

use regex::Regex;
use tracing::debug;

use crate::models::workout::{DayPlan, Dose, SegmentKind, Sport, Target, WorkoutSegment};

/// Warmup and recovery sit just above the easiest effort
const WARMUP_ZONE: u8 = 2;
const RECOVERY_ZONE: u8 = 2;
const COOLDOWN_ZONE: u8 = 1;
/// Work target when an interval pattern names no zone or pace
const DEFAULT_WORK_ZONE: u8 = 4;

/// Per-sport compilation defaults, centralized so policy lives in one
/// table rather than scattered conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SportProfile {
    /// Total duration of a continuous effort when the text names none
    pub default_total_secs: u32,
    pub warmup_secs: u32,
    pub cooldown_secs: u32,
    /// Zone of a continuous effort when the text names none
    pub default_zone: u8,
}

impl SportProfile {
    pub fn for_sport(sport: Sport) -> Self {
        match sport {
            Sport::Running => Self {
                default_total_secs: 1800,
                warmup_secs: 600,
                cooldown_secs: 600,
                default_zone: 2,
            },
            Sport::Cycling | Sport::IndoorCycling => Self {
                default_total_secs: 2700,
                warmup_secs: 600,
                cooldown_secs: 600,
                default_zone: 2,
            },
            Sport::Swimming => Self {
                default_total_secs: 1800,
                warmup_secs: 600,
                cooldown_secs: 600,
                default_zone: 2,
            },
            Sport::Strength => Self {
                default_total_secs: 2400,
                warmup_secs: 300,
                cooldown_secs: 300,
                default_zone: 2,
            },
            Sport::Yoga => Self {
                default_total_secs: 1800,
                warmup_secs: 300,
                cooldown_secs: 300,
                default_zone: 1,
            },
            Sport::Rest | Sport::Other => Self {
                default_total_secs: 1800,
                warmup_secs: 600,
                cooldown_secs: 600,
                default_zone: 2,
            },
        }
    }
}

/// Typed result of the grammar classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffortSpec {
    Intervals {
        reps: u32,
        work: Dose,
        target: Target,
        recovery: Option<Dose>,
    },
    Continuous {
        dose: Option<Dose>,
        target: Option<Target>,
    },
}

/// Compilation output: the segment list plus non-fatal diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub segments: Vec<WorkoutSegment>,
    pub notes: Vec<String>,
}

pub struct SegmentCompiler {
    interval_re: Regex,
    recovery_re: Regex,
    pace_re: Regex,
    zone_re: Regex,
    duration_re: Regex,
    distance_re: Regex,
}

impl Default for SegmentCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentCompiler {
    pub fn new() -> Self {
        Self {
            interval_re: Regex::new(
                r"(?i)\b(\d{1,2})\s*[x×]\s*(\d+(?:\.\d+)?)\s*(min(?:ute)?s?|sec(?:ond)?s?|km|meters?|m)\b",
            )
            .expect("valid interval regex"),
            recovery_re: Regex::new(
                r"(?i)\b(\d+(?:\.\d+)?)\s*(min(?:ute)?s?|sec(?:ond)?s?)\s*(?:recovery|rest|easy|jog|float)",
            )
            .expect("valid recovery regex"),
            pace_re: Regex::new(r"(?i)\b(\d{1,2}):([0-5]\d)\s*(?:/|per\s+)\s*km\b")
                .expect("valid pace regex"),
            zone_re: Regex::new(r"(?i)\bz(?:one)?\s*([1-5])\b").expect("valid zone regex"),
            duration_re: Regex::new(
                r"(?i)\b(\d+(?:\.\d+)?)\s*(hours?|hrs?|hr|h|min(?:ute)?s?|sec(?:ond)?s?)\b",
            )
            .expect("valid duration regex"),
            distance_re: Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*km\b").expect("valid distance regex"),
        }
    }

    /// Classify a description as an interval or continuous effort.
    /// Deterministic; never fails — unparseable text falls back to a
    /// continuous effort with everything defaulted.
    pub fn classify(&self, description: &str) -> EffortSpec {
        if let Some(caps) = self.interval_re.captures(description) {
            let reps = caps[1].parse().unwrap_or(0);
            let work = dose_from(&caps[2], &caps[3]);
            let target = self
                .pace_target(description)
                .or_else(|| self.zone_target(description))
                .unwrap_or(Target::zone(DEFAULT_WORK_ZONE));
            let recovery = self
                .recovery_re
                .captures(description)
                .map(|c| dose_from(&c[1], &c[2]));

            return EffortSpec::Intervals {
                reps,
                work,
                target,
                recovery,
            };
        }

        let dose = self
            .duration_re
            .captures(description)
            .map(|c| dose_from(&c[1], &c[2]))
            .or_else(|| {
                self.distance_re
                    .captures(description)
                    .map(|c| dose_from(&c[1], "km"))
            });
        let target = self
            .pace_target(description)
            .or_else(|| self.zone_target(description))
            .or_else(|| keyword_zone(description));

        EffortSpec::Continuous { dose, target }
    }

    fn pace_target(&self, text: &str) -> Option<Target> {
        self.pace_re.captures(text).map(|c| {
            let minutes: u32 = c[1].parse().unwrap_or(0);
            let seconds: u32 = c[2].parse().unwrap_or(0);
            Target::Pace {
                seconds_per_km: minutes * 60 + seconds,
            }
        })
    }

    fn zone_target(&self, text: &str) -> Option<Target> {
        self.zone_re
            .captures(text)
            .and_then(|c| c[1].parse().ok())
            .map(Target::zone)
    }

    /// Compile one day into its segment sequence. Rest days compile to an
    /// empty sequence. Non-positive parsed values clamp to the sport
    /// default and are reported as non-fatal notes.
    pub fn compile(&self, plan: &DayPlan) -> Compiled {
        let mut notes = Vec::new();

        if plan.sport.is_rest() {
            return Compiled {
                segments: Vec::new(),
                notes,
            };
        }

        let profile = SportProfile::for_sport(plan.sport);
        let spec = self.classify(&plan.description);
        debug!(date = %plan.date, ?spec, "classified day");

        let segments = match spec {
            EffortSpec::Intervals {
                reps,
                work,
                target,
                recovery,
            } => {
                let reps = if reps == 0 {
                    notes.push(format!(
                        "{}: non-positive repeat count, using a single repeat",
                        plan.date
                    ));
                    1
                } else {
                    reps
                };
                let work = self.clamp_dose(work, profile.default_total_secs, plan, &mut notes);
                let recovery_dose = match recovery {
                    Some(dose) if dose.is_zero() => {
                        notes.push(format!(
                            "{}: non-positive recovery duration, matching the work interval",
                            plan.date
                        ));
                        work
                    }
                    Some(dose) => dose,
                    // No recovery clause: recoveries mirror the work dose
                    None => work,
                };

                let mut segments = Vec::with_capacity(2 * reps as usize + 1);
                segments.push(WorkoutSegment::new(
                    SegmentKind::Warmup,
                    Dose::secs(profile.warmup_secs),
                    Target::zone(WARMUP_ZONE),
                ));
                for rep in 1..=reps {
                    segments.push(
                        WorkoutSegment::new(SegmentKind::Work, work, target).with_repeat(rep),
                    );
                    if rep < reps {
                        segments.push(
                            WorkoutSegment::new(
                                SegmentKind::Recovery,
                                recovery_dose,
                                Target::zone(RECOVERY_ZONE),
                            )
                            .with_repeat(rep),
                        );
                    }
                }
                segments.push(WorkoutSegment::new(
                    SegmentKind::Cooldown,
                    Dose::secs(profile.cooldown_secs),
                    Target::zone(COOLDOWN_ZONE),
                ));
                segments
            }
            EffortSpec::Continuous { dose, target } => {
                let dose = match dose {
                    Some(dose) => self.clamp_dose(dose, profile.default_total_secs, plan, &mut notes),
                    None => Dose::secs(profile.default_total_secs),
                };
                let target = target.unwrap_or(Target::zone(profile.default_zone));
                vec![WorkoutSegment::new(SegmentKind::Work, dose, target)]
            }
        };

        Compiled { segments, notes }
    }

    fn clamp_dose(
        &self,
        dose: Dose,
        default_secs: u32,
        plan: &DayPlan,
        notes: &mut Vec<String>,
    ) -> Dose {
        if dose.is_zero() {
            notes.push(format!(
                "{}: non-positive duration, clamped to the {} default",
                plan.date,
                plan.sport.display_name()
            ));
            Dose::secs(default_secs)
        } else {
            dose
        }
    }
}

fn dose_from(value: &str, unit: &str) -> Dose {
    let value: f64 = value.parse().unwrap_or(0.0);
    match unit.to_lowercase().as_str() {
        u if u.starts_with("min") => Dose::secs((value * 60.0).round() as u32),
        u if u.starts_with("sec") => Dose::secs(value.round() as u32),
        u if u.starts_with('h') => Dose::secs((value * 3600.0).round() as u32),
        "km" => Dose::meters((value * 1000.0).round() as u32),
        _ => Dose::meters(value.round() as u32),
    }
}

/// Qualitative effort keywords, strongest first
fn keyword_zone(text: &str) -> Option<Target> {
    let text = text.to_lowercase();
    let table: [(&[&str], u8); 5] = [
        (&["max", "sprint", "vo2", "all-out"], 5),
        (&["hard", "threshold"], 4),
        (&["moderate", "tempo"], 3),
        (&["steady", "endurance", "long"], 2),
        (&["easy", "recovery"], 1),
    ];
    for (words, zone) in table {
        if words.iter().any(|w| text.contains(w)) {
            return Some(Target::zone(zone));
        }
    }
    None
}
