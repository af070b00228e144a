use crate::astar::{astar, heuristic};
use crate::config::SolverConfig;
use crate::constraints::{hard_violations, soft_violations, violations};
use crate::data::{
    LessonView, RunStats, ScheduleView, Strategy, Termination, TimetableInput, TimetableOutput,
};
use crate::error::ModelError;
use crate::grid::{ScheduleGrid, Slot};
use crate::hill_climbing::random_restart_hill_climbing;
use crate::initializer::{InitializerLimits, construct_state};
use crate::preferences::PreferenceIndex;
use crate::problem::Problem;
use crate::state::State;
use indexmap::IndexMap;
use log::info;
use std::time::Instant;

/// Solves the timetabling problem with the chosen strategy.
///
/// Only malformed input is an error. A run that ends with conflicts left is
/// a normal result whose `termination` says why the search stopped.
pub fn solve(
    input: &TimetableInput,
    strategy: Strategy,
    config: &SolverConfig,
) -> Result<TimetableOutput, ModelError> {
    let start_time = Instant::now();
    let problem = Problem::from_input(input)?.with_max_teacher_load(config.max_teacher_load);
    let preferences = PreferenceIndex::build(&problem)?;

    info!(
        "Solving with {strategy}: {} days, {} intervals, {} classrooms, {} subjects, {} teachers",
        problem.days().len(),
        problem.intervals().len(),
        problem.classrooms().len(),
        problem.subjects().len(),
        problem.teachers().len()
    );

    let (state, termination, mut stats) = match strategy {
        Strategy::AStar => {
            let outcome = astar(
                State::empty(&problem, &preferences),
                &problem,
                &preferences,
                config.time_limit(),
                |s| heuristic(s, &problem),
            );
            let stats = RunStats {
                states_generated: outcome.states_generated,
                iterations: outcome.expanded,
                ..RunStats::default()
            };
            (outcome.state, outcome.termination, stats)
        }
        Strategy::HillClimbing => {
            let mut rng = config.rng();
            let limits = InitializerLimits {
                attempts: config.init_attempts,
                subject_attempts: config.subject_attempts,
            };
            let initial = construct_state(&problem, &preferences, limits, &mut rng);
            let outcome =
                random_restart_hill_climbing(initial, &problem, &preferences, config, &mut rng);
            let termination = if outcome.is_goal {
                Termination::GoalReached
            } else {
                Termination::RestartsExhausted
            };
            let stats = RunStats {
                states_generated: outcome.states_generated,
                iterations: outcome.iterations,
                restarts: outcome.restarts,
                initial_conflicts: Some(outcome.initial_conflicts),
                ..RunStats::default()
            };
            (outcome.state, termination, stats)
        }
    };
    stats.elapsed_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "Finished in {:.2?}: {termination}, {} conflicts",
        start_time.elapsed(),
        state.conflicts()
    );

    Ok(TimetableOutput {
        strategy,
        termination,
        conflicts: state.conflicts(),
        hard_violations: hard_violations(state.grid(), &problem),
        soft_violations: soft_violations(state.grid(), &preferences),
        schedule: schedule_view(state.grid(), &problem),
        violations: violations(state.grid(), &problem, &preferences),
        stats,
    })
}

/// Names every slot of the grid, in input order.
fn schedule_view(grid: &ScheduleGrid, problem: &Problem) -> ScheduleView {
    let mut view: ScheduleView = IndexMap::new();
    for (day_id, day) in problem.days().iter().enumerate() {
        let intervals = view.entry(day.clone()).or_default();
        for (interval_id, interval) in problem.intervals().iter().enumerate() {
            let rooms = intervals.entry(interval.to_string()).or_default();
            for (room_id, room) in problem.classrooms().iter().enumerate() {
                let lesson = grid.get(Slot::new(day_id, interval_id, room_id)).map(|l| LessonView {
                    teacher: problem.teacher(l.teacher).name.clone(),
                    subject: problem.subject(l.subject).name.clone(),
                });
                rooms.insert(room.name.clone(), lesson);
            }
        }
    }
    view
}
