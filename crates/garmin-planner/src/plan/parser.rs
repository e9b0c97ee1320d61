//! Plan text parser
//!
//! Splits AI-generated plan text into per-day [`DayPlan`] entries. Two
//! day-header shapes are recognized:
//!
//! - inline entries: `2025-08-05 Cycling: 6 x 3min @ Zone4 w/ 2min recovery`
//! - prose headers: `**Monday, August 4th:**` with the workout text on the
//!   following lines
//!
//! A header without an explicit date gets one inferred from the week start
//! plus the weekday name; a weekday that was already consumed rolls into
//! the following week. Several workouts under one header split into
//! separate entries. Unknown sport tags normalize to a generic category
//! instead of failing; only a day section with no usable text (and not
//! marked rest) is reported as a failure.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;
use tracing::{debug, warn};

use crate::models::workout::{DayPlan, Sport};

/// A day section that could not be turned into a `DayPlan`. Failures are
/// per-day; they never abort the surrounding parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Date or header text identifying the section
    pub label: String,
    pub reason: String,
}

/// Outcome of parsing one plan file
#[derive(Debug, Default)]
pub struct ParsedPlan {
    pub days: Vec<DayPlan>,
    pub failures: Vec<ParseFailure>,
}

impl ParsedPlan {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.failures.is_empty()
    }
}

/// Prose section being accumulated while scanning lines
struct Section {
    label: String,
    date: Option<NaiveDate>,
    weekday: Option<Weekday>,
    body: Vec<String>,
}

pub struct PlanParser {
    week_start: NaiveDate,
    weeks: u32,
    inline_re: Regex,
    header_re: Regex,
    entry_re: Regex,
    rest_re: Regex,
    ordinal_re: Regex,
}

impl PlanParser {
    pub fn new(week_start: NaiveDate, weeks: u32) -> Self {
        Self {
            week_start,
            weeks: weeks.max(1),
            inline_re: Regex::new(
                r"^\s*(?:[-*•]\s*)?(?:\*\*)?(\d{4}-\d{2}-\d{2})(?:\*\*)?\s+(\S.*)$",
            )
            .expect("valid inline regex"),
            header_re: Regex::new(
                r"(?i)^\*{0,2}\s*(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\s*,?\s*((?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)\s+\d{1,2}(?:st|nd|rd|th)?)?\s*\*{0,2}\s*(?::\s*(.*?))?\s*\*{0,2}\s*$",
            )
            .expect("valid header regex"),
            entry_re: Regex::new(
                r"^\s*(?:[-*•]\s*)?\*{0,2}([A-Za-z][A-Za-z ]{1,24}?)\*{0,2}\s*(?:\(([^)]*)\))?\s*:\s*(.*)$",
            )
            .expect("valid entry regex"),
            rest_re: Regex::new(r"(?i)^\W*(?:rest day|rest|day off)\b|^\s*off\W*$")
                .expect("valid rest regex"),
            ordinal_re: Regex::new(r"(?i)(\d+)(st|nd|rd|th)\b").expect("valid ordinal regex"),
        }
    }

    /// Parse plan text into day entries. Per-day problems land in
    /// `failures`; the rest of the plan is unaffected.
    pub fn parse(&self, text: &str) -> ParsedPlan {
        let mut plan = ParsedPlan::default();
        // Last resolved date, used to roll repeated weekday names forward
        let mut cursor: Option<NaiveDate> = None;
        let mut section: Option<Section> = None;

        for line in text.lines() {
            if let Some(caps) = self.inline_re.captures(line) {
                self.finish_section(section.take(), &mut cursor, &mut plan);

                let date_str = &caps[1];
                match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                    Ok(date) => {
                        self.push_inline(date, caps[2].trim(), &mut plan);
                        cursor = Some(cursor.map_or(date, |c| c.max(date)));
                    }
                    Err(_) => plan.failures.push(ParseFailure {
                        label: date_str.to_string(),
                        reason: "unparseable date in day header".to_string(),
                    }),
                }
                continue;
            }

            if let Some(caps) = self.header_re.captures(line) {
                self.finish_section(section.take(), &mut cursor, &mut plan);

                let weekday = parse_weekday(&caps[1]);
                let date = caps
                    .get(2)
                    .and_then(|m| self.parse_month_day(m.as_str()));
                let mut body = Vec::new();
                if let Some(trailing) = caps.get(3) {
                    if !trailing.as_str().trim().is_empty() {
                        body.push(trailing.as_str().trim().to_string());
                    }
                }
                section = Some(Section {
                    label: line.trim().trim_matches('*').trim().to_string(),
                    date,
                    weekday,
                    body,
                });
                continue;
            }

            if let Some(sec) = section.as_mut() {
                if !line.trim().is_empty() {
                    sec.body.push(line.trim().to_string());
                }
            }
            // Lines outside any day section (titles, notes) are ignored
        }

        self.finish_section(section.take(), &mut cursor, &mut plan);
        debug!(
            days = plan.days.len(),
            failures = plan.failures.len(),
            "parsed plan"
        );
        plan
    }

    /// Turn an inline entry's remainder ("Cycling: 6 x 3min ..." or
    /// "Rest") into day plans
    fn push_inline(&self, date: NaiveDate, remainder: &str, plan: &mut ParsedPlan) {
        if let Some((tag, desc)) = remainder.split_once(':') {
            let sport = Sport::normalize(tag);
            let desc = desc.trim();
            if sport.is_rest() || self.rest_re.is_match(desc) && desc.len() < 24 {
                plan.days.push(DayPlan::new(date, Sport::Rest, desc));
                return;
            }
            if desc.is_empty() {
                plan.failures.push(ParseFailure {
                    label: date.to_string(),
                    reason: "day section contains no usable text".to_string(),
                });
                return;
            }
            let sport = if matches!(sport, Sport::Other) && tag.split_whitespace().count() > 3 {
                // The text before the colon was prose, not a tag
                detect_sport(remainder)
            } else {
                sport
            };
            plan.days.push(DayPlan::new(date, sport, desc));
            return;
        }

        // No colon: either a bare rest marker or free prose
        if self.rest_re.is_match(remainder) {
            plan.days.push(DayPlan::new(date, Sport::Rest, remainder));
        } else if Sport::is_recognized(remainder) {
            // A bare sport tag with nothing to compile from
            plan.failures.push(ParseFailure {
                label: date.to_string(),
                reason: "day section contains no usable text".to_string(),
            });
        } else {
            plan.days
                .push(DayPlan::new(date, detect_sport(remainder), remainder));
        }
    }

    /// Resolve a finished prose section into day plans
    fn finish_section(
        &self,
        section: Option<Section>,
        cursor: &mut Option<NaiveDate>,
        plan: &mut ParsedPlan,
    ) {
        let Some(section) = section else { return };

        let date = match (section.date, section.weekday) {
            (Some(date), _) => date,
            (None, Some(weekday)) => self.resolve_weekday(weekday, *cursor),
            (None, None) => {
                plan.failures.push(ParseFailure {
                    label: section.label,
                    reason: "day header has neither date nor weekday".to_string(),
                });
                return;
            }
        };
        *cursor = Some(cursor.map_or(date, |c| c.max(date)));

        let body = section.body.join("\n");
        if body.trim().is_empty() {
            plan.failures.push(ParseFailure {
                label: section.label,
                reason: "day section contains no usable text".to_string(),
            });
            return;
        }

        if self.rest_re.is_match(body.trim()) {
            plan.days.push(DayPlan::new(date, Sport::Rest, body.trim()));
            return;
        }

        // Split the body into one entry per sport-tagged line; lines
        // without a tag attach to the entry above them.
        let mut entries: Vec<(Sport, String)> = Vec::new();
        let mut untagged: Vec<String> = Vec::new();
        for line in &section.body {
            if let Some(caps) = self.entry_re.captures(line) {
                let tag = caps[1].trim();
                if Sport::is_recognized(tag) {
                    let sport = Sport::normalize(tag);
                    let mut desc = String::new();
                    if let Some(paren) = caps.get(2) {
                        desc.push_str(paren.as_str().trim());
                    }
                    let rest = caps[3].trim();
                    if !rest.is_empty() {
                        if !desc.is_empty() {
                            desc.push(' ');
                        }
                        desc.push_str(rest);
                    }
                    entries.push((sport, desc));
                    continue;
                }
            }
            match entries.last_mut() {
                Some((_, desc)) => {
                    desc.push(' ');
                    desc.push_str(line);
                }
                None => untagged.push(line.clone()),
            }
        }

        if entries.is_empty() {
            let desc = untagged.join(" ");
            plan.days.push(DayPlan::new(date, detect_sport(&desc), desc));
            return;
        }

        for (sport, desc) in entries {
            if sport.is_rest() {
                plan.days.push(DayPlan::new(date, Sport::Rest, desc));
            } else if desc.trim().is_empty() {
                plan.failures.push(ParseFailure {
                    label: format!("{} {}", date, sport.display_name()),
                    reason: "workout entry contains no usable text".to_string(),
                });
            } else {
                plan.days.push(DayPlan::new(date, sport, desc));
            }
        }
    }

    /// Next occurrence of `weekday` on or after the week start, strictly
    /// after the last resolved date so repeated weekday names advance
    /// week by week
    fn resolve_weekday(&self, weekday: Weekday, cursor: Option<NaiveDate>) -> NaiveDate {
        let offset = (weekday.num_days_from_monday() as i64
            - self.week_start.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);
        let mut date = self.week_start + Duration::days(offset);
        if let Some(cursor) = cursor {
            while date <= cursor {
                date += Duration::days(7);
            }
        }
        if date >= self.week_start + Duration::days(self.weeks as i64 * 7) {
            warn!(
                "inferred date {} falls outside the {}-week plan window",
                date, self.weeks
            );
        }
        date
    }

    /// Parse "August 4th" / "Aug 4" using the week start's year
    fn parse_month_day(&self, text: &str) -> Option<NaiveDate> {
        let cleaned = self.ordinal_re.replace_all(text, "$1");
        let candidate = format!("{} {}", cleaned.trim(), self.week_start.year());
        for fmt in ["%B %d %Y", "%b %d %Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(&candidate, fmt) {
                return Some(date);
            }
        }
        None
    }
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Best-effort sport detection from free prose when no explicit tag is
/// present. Checks the more specific phrases first.
fn detect_sport(text: &str) -> Sport {
    let text = text.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if contains_any(&["indoor cycling", "spin", "trainer", "turbo"]) {
        Sport::IndoorCycling
    } else if contains_any(&["bike", "cycling", "cycle", "ride"]) {
        Sport::Cycling
    } else if contains_any(&["swim", "pool"]) {
        Sport::Swimming
    } else if contains_any(&["strength", "weights", "gym", "lift"]) {
        Sport::Strength
    } else if contains_any(&["yoga", "mobility", "stretch"]) {
        Sport::Yoga
    } else if contains_any(&["run", "jog"]) {
        Sport::Running
    } else {
        Sport::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> PlanParser {
        // 2025-08-04 is a Monday
        PlanParser::new(NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(), 2)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inline_entry() {
        let plan = parser().parse("2025-08-05 Cycling: 6 x 3min @ Zone4 w/ 2min recovery\n");
        assert_eq!(plan.days.len(), 1);
        assert!(plan.failures.is_empty());

        let day = &plan.days[0];
        assert_eq!(day.date, date(2025, 8, 5));
        assert_eq!(day.sport, Sport::Cycling);
        assert_eq!(day.description, "6 x 3min @ Zone4 w/ 2min recovery");
    }

    #[test]
    fn test_inline_rest_day() {
        let plan = parser().parse("2025-08-06 Rest\n");
        assert_eq!(plan.days.len(), 1);
        assert!(plan.failures.is_empty());
        assert_eq!(plan.days[0].sport, Sport::Rest);
    }

    #[test]
    fn test_section_count_matches_day_count() {
        let text = "\
2025-08-04 Running: 45 min easy
2025-08-05 Cycling: 6 x 3min @ Zone4 w/ 2min recovery
2025-08-06 Rest
2025-08-07 Swimming: 30 min moderate
";
        let plan = parser().parse(text);
        assert_eq!(plan.days.len(), 4);
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn test_prose_header_with_explicit_date() {
        let text = "\
**Monday, August 4th:**
Running (45 minutes): easy pace, focus on cadence
";
        let plan = parser().parse(text);
        assert_eq!(plan.days.len(), 1);
        let day = &plan.days[0];
        assert_eq!(day.date, date(2025, 8, 4));
        assert_eq!(day.sport, Sport::Running);
        assert!(day.description.contains("45 minutes"));
        assert!(day.description.contains("easy pace"));
    }

    #[test]
    fn test_weekday_inferred_from_week_start() {
        let text = "\
Tuesday:
30 min easy run
";
        let plan = parser().parse(text);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].date, date(2025, 8, 5));
        assert_eq!(plan.days[0].sport, Sport::Running);
    }

    #[test]
    fn test_repeated_weekday_rolls_into_next_week() {
        let text = "\
Wednesday:
45 min easy ride

Wednesday:
60 min moderate ride
";
        let plan = parser().parse(text);
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].date, date(2025, 8, 6));
        assert_eq!(plan.days[1].date, date(2025, 8, 13));
    }

    #[test]
    fn test_multiple_workouts_under_one_header() {
        let text = "\
**Thursday:**
Running (40 minutes): tempo, 3 x 8min @ Zone 3
Strength (30 minutes): core and hips
";
        let plan = parser().parse(text);
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].sport, Sport::Running);
        assert_eq!(plan.days[1].sport, Sport::Strength);
        assert_eq!(plan.days[0].date, plan.days[1].date);
    }

    #[test]
    fn test_unknown_sport_normalizes_to_other() {
        let plan = parser().parse("2025-08-07 Pickleball: 60 min moderate\n");
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].sport, Sport::Other);
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn test_prose_rest_day() {
        let text = "\
Friday:
Rest day - light stretching optional
";
        let plan = parser().parse(text);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].sport, Sport::Rest);
    }

    #[test]
    fn test_empty_section_is_a_failure_not_an_abort() {
        let text = "\
2025-08-04 Cycling
2025-08-05 Running: 40 min easy
";
        let plan = parser().parse(text);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.failures.len(), 1);
        assert_eq!(plan.failures[0].label, "2025-08-04");
        assert!(plan.failures[0].reason.contains("no usable text"));
    }

    #[test]
    fn test_preamble_lines_are_ignored() {
        let text = "\
# Two-Week Base Block
Focus on aerobic volume this block.

2025-08-04 Running: 45 min easy
";
        let plan = parser().parse(text);
        assert_eq!(plan.days.len(), 1);
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn test_header_with_trailing_rest() {
        let plan = parser().parse("Monday: Rest\n");
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].sport, Sport::Rest);
        assert_eq!(plan.days[0].date, date(2025, 8, 4));
    }
}
