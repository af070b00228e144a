//! Teacher preferences derived from raw constraint tokens.
//!
//! A token is one of:
//! - `Day`: the teacher prefers to teach on that day,
//! - `!Day`: the teacher would rather not teach on that day,
//! - `!a-b`: the teacher would rather not teach between hours `a` and `b`.
//!
//! A disliked range covers the atomic intervals of [`ATOMIC_INTERVAL_LEN`]
//! hours that start inside it on its own step, so `!8-12` matches both
//! `8-10` and `10-12`. Ranges are only matched against the problem's
//! intervals, never expanded. The index is built once per run and only read afterwards.

use log::warn;

use crate::data::Interval;
use crate::error::ModelError;
use crate::problem::{DayId, IntervalId, Problem, TeacherId};

/// Length, in hours, of one schedulable interval.
pub const ATOMIC_INTERVAL_LEN: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayPreference {
    #[default]
    Neutral,
    Preferred,
    Disliked,
}

#[derive(Debug, Clone, Default)]
pub struct TeacherPreferences {
    days: Vec<DayPreference>,
    /// Raw `!a-b` ranges, in token order.
    disliked_ranges: Vec<Interval>,
    /// `disliked_ranges` resolved against the problem's interval axis.
    avoided: Vec<bool>,
}

impl TeacherPreferences {
    pub fn day(&self, day: DayId) -> DayPreference {
        self.days.get(day).copied().unwrap_or_default()
    }

    pub fn disliked_ranges(&self) -> &[Interval] {
        &self.disliked_ranges
    }
}

#[derive(Debug, Clone)]
pub struct PreferenceIndex {
    teachers: Vec<TeacherPreferences>,
}

impl PreferenceIndex {
    pub fn build(problem: &Problem) -> Result<Self, ModelError> {
        let teachers = problem
            .teachers()
            .iter()
            .map(|teacher| {
                let mut prefs = TeacherPreferences {
                    days: vec![DayPreference::Neutral; problem.days().len()],
                    ..TeacherPreferences::default()
                };
                for token in &teacher.constraints {
                    apply_token(problem, &teacher.name, token, &mut prefs)?;
                }
                prefs.avoided = problem
                    .intervals()
                    .iter()
                    .map(|&interval| {
                        prefs
                            .disliked_ranges
                            .iter()
                            .any(|&range| range_covers(range, interval))
                    })
                    .collect();
                Ok::<_, ModelError>(prefs)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        Ok(Self { teachers })
    }

    pub fn teacher(&self, teacher: TeacherId) -> &TeacherPreferences {
        &self.teachers[teacher]
    }

    pub fn prefers_day(&self, teacher: TeacherId, day: DayId) -> bool {
        self.teachers[teacher].day(day) == DayPreference::Preferred
    }

    pub fn dislikes_day(&self, teacher: TeacherId, day: DayId) -> bool {
        self.teachers[teacher].day(day) == DayPreference::Disliked
    }

    pub fn dislikes_interval(&self, teacher: TeacherId, interval: IntervalId) -> bool {
        self.teachers[teacher]
            .avoided
            .get(interval)
            .copied()
            .unwrap_or(false)
    }

    /// Soft violations `teacher` would cause by teaching at (`day`, `interval`).
    #[inline]
    pub fn penalty(&self, teacher: TeacherId, day: DayId, interval: IntervalId) -> u32 {
        u32::from(self.dislikes_day(teacher, day)) + u32::from(self.dislikes_interval(teacher, interval))
    }
}

fn apply_token(
    problem: &Problem,
    teacher: &str,
    token: &str,
    prefs: &mut TeacherPreferences,
) -> Result<(), ModelError> {
    let token = token.trim();
    let Some(negated) = token.strip_prefix('!') else {
        match problem.day_id(token) {
            Some(day) => prefs.days[day] = DayPreference::Preferred,
            None => warn!("ignoring constraint '{token}' of teacher '{teacher}'"),
        }
        return Ok(());
    };

    if let Some(day) = problem.day_id(negated) {
        prefs.days[day] = DayPreference::Disliked;
    } else if negated.contains('-') {
        let (start, end) =
            Interval::parse_bounds(negated).map_err(|_| ModelError::InvalidTimeRange {
                teacher: teacher.to_string(),
                token: token.to_string(),
            })?;
        prefs.disliked_ranges.push(Interval::new(start, end));
    } else {
        warn!("ignoring constraint '{token}' of teacher '{teacher}'");
    }
    Ok(())
}

/// Whether `interval` is one of the atomic intervals `range` covers.
///
/// The range itself always matches; otherwise `interval` must be atomic
/// and start inside the range on a multiple of the atomic length. A
/// reversed or empty range covers nothing.
fn range_covers(range: Interval, interval: Interval) -> bool {
    if interval == range {
        return true;
    }
    interval.start.checked_add(ATOMIC_INTERVAL_LEN) == Some(interval.end)
        && range.start <= interval.start
        && interval.start < range.end
        && (interval.start - range.start) % ATOMIC_INTERVAL_LEN == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::fixtures::InputBuilder;

    fn problem_with(constraints: &[&str]) -> Problem {
        let input = InputBuilder::new(&["Mon", "Tue", "Wed"], &[(8, 10), (10, 12), (12, 14)])
            .classroom("R1", 30, &["Math"])
            .subject("Math", 30)
            .teacher("Ana", &["Math"], constraints)
            .build();
        Problem::from_input(&input).unwrap()
    }

    #[test]
    fn test_day_tokens() {
        let problem = problem_with(&["Mon", "!Tue"]);
        let prefs = PreferenceIndex::build(&problem).unwrap();
        assert!(prefs.prefers_day(0, 0));
        assert!(prefs.dislikes_day(0, 1));
        assert_eq!(prefs.teacher(0).day(2), DayPreference::Neutral);
    }

    #[test]
    fn test_later_token_overrides_day() {
        let problem = problem_with(&["Mon", "!Mon"]);
        let prefs = PreferenceIndex::build(&problem).unwrap();
        assert!(prefs.dislikes_day(0, 0));
        assert!(!prefs.prefers_day(0, 0));
    }

    #[test]
    fn test_wide_range_covers_atomic_intervals() {
        let problem = problem_with(&["!8-12"]);
        let prefs = PreferenceIndex::build(&problem).unwrap();
        assert_eq!(prefs.teacher(0).disliked_ranges(), &[Interval::new(8, 12)]);
        assert!(prefs.dislikes_interval(0, 0));
        assert!(prefs.dislikes_interval(0, 1));
        assert!(!prefs.dislikes_interval(0, 2));
    }

    #[test]
    fn test_atomic_range_is_kept() {
        let problem = problem_with(&["!12-14"]);
        let prefs = PreferenceIndex::build(&problem).unwrap();
        assert_eq!(prefs.teacher(0).disliked_ranges().len(), 1);
        assert!(!prefs.dislikes_interval(0, 0));
        assert!(!prefs.dislikes_interval(0, 1));
        assert!(prefs.dislikes_interval(0, 2));
    }

    #[test]
    fn test_penalty_adds_day_and_interval() {
        let problem = problem_with(&["!Wed", "!12-14"]);
        let prefs = PreferenceIndex::build(&problem).unwrap();
        assert_eq!(prefs.penalty(0, 2, 2), 2);
        assert_eq!(prefs.penalty(0, 2, 0), 1);
        assert_eq!(prefs.penalty(0, 0, 0), 0);
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let problem = problem_with(&["Sunday", "!Sunday", "8-10"]);
        let prefs = PreferenceIndex::build(&problem).unwrap();
        assert_eq!(prefs.penalty(0, 0, 0), 0);
    }

    #[test]
    fn test_malformed_range_is_an_error() {
        let problem = problem_with(&["!8-noon"]);
        assert!(matches!(
            PreferenceIndex::build(&problem),
            Err(ModelError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn test_reversed_range_covers_nothing() {
        assert!(!range_covers(Interval::new(12, 8), Interval::new(8, 10)));
        assert!(!range_covers(Interval::new(10, 10), Interval::new(10, 12)));
    }

    #[test]
    fn test_range_steps_from_its_own_start() {
        let range = Interval::new(9, 13);
        assert!(range_covers(range, Interval::new(9, 11)));
        assert!(range_covers(range, Interval::new(11, 13)));
        assert!(!range_covers(range, Interval::new(10, 12)));
        assert!(!range_covers(range, Interval::new(13, 15)));
        // Non-atomic intervals only match the exact range.
        assert!(!range_covers(range, Interval::new(9, 12)));
        assert!(range_covers(range, range));
    }

    #[test]
    fn test_range_at_the_top_of_the_hour_axis() {
        let problem = problem_with(&["!4294967294-4294967295"]);
        let prefs = PreferenceIndex::build(&problem).unwrap();
        assert_eq!(prefs.penalty(0, 0, 0), 0);
        assert!(!range_covers(
            Interval::new(4_294_967_294, 4_294_967_295),
            Interval::new(4_294_967_295, u32::MAX)
        ));
    }

    #[test]
    fn test_huge_range_is_resolved_against_the_axis() {
        let problem = problem_with(&["!0-4000000000"]);
        let prefs = PreferenceIndex::build(&problem).unwrap();
        assert!(prefs.dislikes_interval(0, 0));
        assert!(prefs.dislikes_interval(0, 1));
        assert!(prefs.dislikes_interval(0, 2));
        assert_eq!(prefs.teacher(0).disliked_ranges(), &[Interval::new(0, 4_000_000_000)]);
    }
}
