//! Steepest-descent hill climbing with random restarts.
//!
//! A pass repeatedly moves to the best perturbation neighbor as long as it
//! strictly lowers the conflict count. When a pass stalls without reaching
//! a goal, the next one starts from a freshly constructed state; nothing is
//! carried over between passes except the best state seen so far.

use log::{debug, info};
use rand::Rng;

use crate::config::SolverConfig;
use crate::initializer::{InitializerLimits, construct_state};
use crate::perturbation::{NeighborhoodLimits, perturbation_successors};
use crate::preferences::PreferenceIndex;
use crate::problem::Problem;
use crate::state::State;

/// Result of a single hill climbing pass.
#[derive(Debug, Clone)]
pub struct ClimbOutcome {
    pub is_goal: bool,
    pub iterations: usize,
    pub states_generated: usize,
    pub state: State,
}

pub fn hill_climbing<R: Rng + ?Sized>(
    initial: &State,
    problem: &Problem,
    preferences: &PreferenceIndex,
    limits: NeighborhoodLimits,
    max_iterations: usize,
    rng: &mut R,
) -> ClimbOutcome {
    let mut state = initial.clone();
    let mut iterations = 0;
    let mut states_generated = 0;

    while iterations < max_iterations {
        iterations += 1;
        if state.is_goal() {
            break;
        }

        let neighbors = perturbation_successors(&state, problem, preferences, limits, rng);
        states_generated += neighbors.len();

        // First neighbor wins ties.
        let best = neighbors.into_iter().reduce(|best, candidate| {
            if candidate.conflicts() < best.conflicts() {
                candidate
            } else {
                best
            }
        });
        match best {
            Some(best) if best.conflicts() < state.conflicts() => state = best,
            _ => break,
        }
    }

    ClimbOutcome {
        is_goal: state.is_goal(),
        iterations,
        states_generated,
        state,
    }
}

/// Result of a restarted hill climbing run.
#[derive(Debug, Clone)]
pub struct RestartOutcome {
    pub is_goal: bool,
    pub iterations: usize,
    pub states_generated: usize,
    pub restarts: usize,
    pub state: State,
    /// Conflicts of the state the first pass started from.
    pub initial_conflicts: u32,
}

pub fn random_restart_hill_climbing<R: Rng + ?Sized>(
    initial: State,
    problem: &Problem,
    preferences: &PreferenceIndex,
    config: &SolverConfig,
    rng: &mut R,
) -> RestartOutcome {
    let limits = NeighborhoodLimits {
        max_neighbors: config.max_neighbors,
        max_sampled_slots: config.max_sampled_slots,
    };
    let init_limits = InitializerLimits {
        attempts: config.init_attempts,
        subject_attempts: config.subject_attempts,
    };
    let initial_conflicts = initial.conflicts();
    let mut best = initial.clone();
    let mut current = initial;
    let mut iterations = 0;
    let mut states_generated = 0;
    let mut restarts = 0;

    info!(
        "hill climbing started from a state with {initial_conflicts} conflicts, up to {} passes",
        config.max_restarts
    );
    while restarts < config.max_restarts {
        restarts += 1;
        let pass = hill_climbing(
            &current,
            problem,
            preferences,
            limits,
            config.max_iterations,
            rng,
        );
        iterations += pass.iterations;
        states_generated += pass.states_generated;
        debug!(
            "pass {restarts}: {} -> {} conflicts in {} iterations",
            current.conflicts(),
            pass.state.conflicts(),
            pass.iterations
        );

        if pass.is_goal {
            info!("hill climbing reached a goal on pass {restarts}");
            return RestartOutcome {
                is_goal: true,
                iterations,
                states_generated,
                restarts,
                state: pass.state,
                initial_conflicts,
            };
        }
        if pass.state.conflicts() < best.conflicts() {
            best = pass.state;
        }
        current = construct_state(problem, preferences, init_limits, rng);
    }

    info!(
        "hill climbing used all {restarts} passes, best state has {} conflicts",
        best.conflicts()
    );
    RestartOutcome {
        is_goal: false,
        iterations,
        states_generated,
        restarts,
        state: best,
        initial_conflicts,
    }
}
