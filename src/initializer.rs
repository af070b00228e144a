//! Randomized greedy construction of local search starting points.
//!
//! Subjects are taken in random order. For each one, random (day, interval)
//! pairs are drawn and the lesson goes into a random free certified
//! classroom with a random qualified, free teacher under the load limit,
//! until the subject is covered or `subject_attempts` draws in a row fail.
//! The whole build is repeated until it satisfies every hard constraint or
//! the attempts run out, in which case the last grid is kept.

use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::constraints::hard_violations;
use crate::grid::{Lesson, ScheduleGrid, Slot};
use crate::preferences::PreferenceIndex;
use crate::problem::{ClassroomId, Problem, SubjectId, TeacherId};
use crate::state::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializerLimits {
    /// Full builds tried before settling for the last one.
    pub attempts: usize,
    /// Consecutive failed draws before a subject is abandoned.
    pub subject_attempts: usize,
}

impl Default for InitializerLimits {
    fn default() -> Self {
        Self {
            attempts: 50,
            subject_attempts: 20,
        }
    }
}

pub fn construct_state<R: Rng + ?Sized>(
    problem: &Problem,
    preferences: &PreferenceIndex,
    limits: InitializerLimits,
    rng: &mut R,
) -> State {
    let mut grid = ScheduleGrid::for_problem(problem);
    for attempt in 1..=limits.attempts.max(1) {
        grid = build_grid(problem, limits.subject_attempts, rng);
        let hard = hard_violations(&grid, problem);
        if hard == 0 {
            debug!("constructed a feasible grid on attempt {attempt}");
            break;
        }
        debug!("construction attempt {attempt} left {hard} hard violations");
    }
    State::from_grid(grid, problem, preferences)
}

fn build_grid<R: Rng + ?Sized>(problem: &Problem, subject_attempts: usize, rng: &mut R) -> ScheduleGrid {
    let days = problem.days().len();
    let intervals = problem.intervals().len();
    let mut grid = ScheduleGrid::for_problem(problem);
    let mut busy = vec![vec![false; days * intervals]; problem.teachers().len()];
    let mut loads = vec![0u32; problem.teachers().len()];
    let mut remaining: Vec<SubjectId> = (0..problem.subjects().len()).collect();

    while !remaining.is_empty() {
        let subject = remaining.swap_remove(rng.random_range(0..remaining.len()));
        let required = problem.subject(subject).required;
        let mut covered = 0;
        let mut failures = 0;

        while covered < required && failures < subject_attempts {
            let day = rng.random_range(0..days);
            let interval = rng.random_range(0..intervals);
            let time = day * intervals + interval;

            let rooms: Vec<ClassroomId> = (0..problem.classrooms().len())
                .filter(|&c| {
                    problem.classroom(c).certifies(subject)
                        && grid.is_empty_at(Slot::new(day, interval, c))
                })
                .collect();
            let Some(&classroom) = rooms.choose(rng) else {
                failures += 1;
                continue;
            };

            let teachers: Vec<TeacherId> = (0..problem.teachers().len())
                .filter(|&t| {
                    problem.teacher(t).is_qualified(subject)
                        && loads[t] < problem.max_teacher_load()
                        && !busy[t][time]
                })
                .collect();
            let Some(&teacher) = teachers.choose(rng) else {
                failures += 1;
                continue;
            };

            grid.set(Slot::new(day, interval, classroom), Some(Lesson::new(teacher, subject)));
            busy[teacher][time] = true;
            loads[teacher] += 1;
            covered = covered.saturating_add(problem.classroom(classroom).capacity);
            failures = 0;
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::fixtures::InputBuilder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_builds_a_feasible_grid() {
        let input = InputBuilder::new(&["Mon", "Tue", "Wed"], &[(8, 10), (10, 12)])
            .classroom("R1", 30, &["Math", "Art"])
            .classroom("R2", 20, &["Art", "Bio"])
            .subject("Math", 60)
            .subject("Art", 40)
            .subject("Bio", 20)
            .teacher("Ana", &["Math", "Bio"], &["!Mon"])
            .teacher("Bob", &["Art", "Math"], &[])
            .build();
        let problem = Problem::from_input(&input).unwrap();
        let prefs = PreferenceIndex::build(&problem).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let state = construct_state(&problem, &prefs, InitializerLimits::default(), &mut rng);
        assert_eq!(hard_violations(state.grid(), &problem), 0);
        assert_eq!(state.conflicts(), state.recount(&problem, &prefs));
        for teacher in 0..problem.teachers().len() {
            assert!(state.load(teacher) <= problem.max_teacher_load());
        }
    }

    #[test]
    fn test_respects_the_load_limit() {
        let input = InputBuilder::new(&["Mon", "Tue", "Wed", "Thu", "Fri"], &[(8, 10), (10, 12)])
            .classroom("R1", 10, &["Math"])
            .subject("Math", 100)
            .teacher("Ana", &["Math"], &[])
            .build();
        let problem = Problem::from_input(&input).unwrap();
        let prefs = PreferenceIndex::build(&problem).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let limits = InitializerLimits {
            attempts: 3,
            subject_attempts: 20,
        };
        let state = construct_state(&problem, &prefs, limits, &mut rng);
        assert!(state.load(0) <= 7);
        // Ten slots of capacity 10 would be needed but only seven are allowed.
        assert_eq!(hard_violations(state.grid(), &problem), 1);
    }

    #[test]
    fn test_degenerate_input_gives_empty_grid() {
        let input = InputBuilder::new(&["Mon"], &[(8, 10)])
            .classroom("R1", 30, &[])
            .subject("Math", 30)
            .teacher("Ana", &["Math"], &[])
            .build();
        let problem = Problem::from_input(&input).unwrap();
        let prefs = PreferenceIndex::build(&problem).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let state = construct_state(&problem, &prefs, InitializerLimits::default(), &mut rng);
        assert_eq!(state.grid().occupied_count(), 0);
        assert_eq!(state.conflicts(), 1);
    }
}
