//! A* search over construction successors.
//!
//! Each placement costs 1, so `g` is the number of lessons placed since the
//! root. The default heuristic is inadmissible: it adds the
//! product of uncovered subjects and empty slots to the conflict count,
//! which pushes the search toward full coverage quickly at the price of
//! optimality.
//!
//! The search is time boxed. Running out of time or out of frontier is an
//! ordinary outcome reported through [`Termination`], not an error.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::construction::construction_successors;
use crate::data::Termination;
use crate::preferences::PreferenceIndex;
use crate::problem::Problem;
use crate::state::State;

/// `conflicts + uncovered subjects * empty slots`.
pub fn heuristic(state: &State, problem: &Problem) -> u32 {
    let uncovered = u32::try_from(state.uncovered_subjects(problem).len()).unwrap_or(u32::MAX);
    let empty = u32::try_from(state.empty_slots()).unwrap_or(u32::MAX);
    state.conflicts().saturating_add(uncovered.saturating_mul(empty))
}

/// Result of an A* run.
#[derive(Debug, Clone)]
pub struct AStarOutcome {
    pub state: State,
    pub termination: Termination,
    /// Distinct successor states recorded in the cost table (root excluded).
    pub states_generated: usize,
    /// Nodes popped from the frontier.
    pub expanded: usize,
}

/// Frontier entry ordered so that `BinaryHeap` pops the lowest `f` first,
/// then the lowest `h`, then the oldest entry.
struct FrontierNode {
    f: u32,
    h: u32,
    seq: u64,
    g: u32,
    state: State,
}

impl PartialEq for FrontierNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierNode {}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.f, other.h, other.seq).cmp(&(self.f, self.h, self.seq))
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best known path cost per distinct grid.
#[derive(Debug, Default)]
pub(crate) struct CostTable {
    best: HashMap<State, u32>,
}

impl CostTable {
    /// Records `g` for `state` if it is new or strictly cheaper than the
    /// recorded cost. Returns whether it was recorded.
    pub(crate) fn offer(&mut self, state: &State, g: u32) -> bool {
        match self.best.entry(state.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(g);
                true
            }
            Entry::Occupied(mut entry) if g < *entry.get() => {
                entry.insert(g);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub(crate) fn get(&self, state: &State) -> Option<u32> {
        self.best.get(state).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.best.len()
    }
}

pub fn astar(
    start: State,
    problem: &Problem,
    preferences: &PreferenceIndex,
    time_limit: Duration,
    h: impl Fn(&State) -> u32,
) -> AStarOutcome {
    let started = Instant::now();
    let mut costs = CostTable::default();
    let mut frontier = BinaryHeap::new();
    let mut seq = 0u64;

    costs.offer(&start, 0);
    let start_h = h(&start);
    frontier.push(FrontierNode {
        f: start_h,
        h: start_h,
        seq,
        g: 0,
        state: start.clone(),
    });

    let mut last = start;
    let mut best: Option<State> = None;
    let mut expanded = 0usize;

    info!("A* started with a budget of {:?}", time_limit);
    while let Some(node) = frontier.pop() {
        // A cheaper path to this grid was queued after this entry.
        if costs.get(&node.state).is_some_and(|g| g < node.g) {
            continue;
        }
        expanded += 1;
        if best.as_ref().is_none_or(|b| node.state.conflicts() < b.conflicts()) {
            best = Some(node.state.clone());
        }
        last = node.state;

        if last.is_goal() {
            info!("A* reached a goal after {expanded} expansions");
            return AStarOutcome {
                state: last,
                termination: Termination::GoalReached,
                states_generated: costs.len() - 1,
                expanded,
            };
        }
        if started.elapsed() > time_limit {
            let state = best.unwrap_or(last);
            info!(
                "A* ran out of time after {expanded} expansions, best state has {} conflicts",
                state.conflicts()
            );
            return AStarOutcome {
                state,
                termination: Termination::TimeLimit,
                states_generated: costs.len() - 1,
                expanded,
            };
        }

        let child_g = node.g + 1;
        for child in construction_successors(&last, problem, preferences) {
            if costs.offer(&child, child_g) {
                let child_h = h(&child);
                seq += 1;
                frontier.push(FrontierNode {
                    f: child_g.saturating_add(child_h),
                    h: child_h,
                    seq,
                    g: child_g,
                    state: child,
                });
            }
        }
        if expanded % 10_000 == 0 {
            debug!(
                "A* expanded {expanded} nodes, frontier {}, discovered {}",
                frontier.len(),
                costs.len()
            );
        }
    }

    info!(
        "A* frontier exhausted after {expanded} expansions, last state has {} conflicts",
        last.conflicts()
    );
    AStarOutcome {
        state: last,
        termination: Termination::FrontierExhausted,
        states_generated: costs.len() - 1,
        expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Lesson, Slot};
    use crate::problem::fixtures::InputBuilder;

    fn build(input: crate::data::TimetableInput) -> (Problem, PreferenceIndex) {
        let problem = Problem::from_input(&input).unwrap();
        let prefs = PreferenceIndex::build(&problem).unwrap();
        (problem, prefs)
    }

    fn run(problem: &Problem, prefs: &PreferenceIndex) -> AStarOutcome {
        astar(
            State::empty(problem, prefs),
            problem,
            prefs,
            Duration::from_secs(240),
            |s| heuristic(s, problem),
        )
    }

    #[test]
    fn test_single_slot_goal() {
        let (problem, prefs) = build(
            InputBuilder::new(&["Mon"], &[(8, 10)])
                .classroom("R1", 30, &["Math"])
                .subject("Math", 30)
                .teacher("Ana", &["Math"], &[])
                .build(),
        );
        let outcome = run(&problem, &prefs);

        assert_eq!(outcome.termination, Termination::GoalReached);
        assert_eq!(outcome.state.conflicts(), 0);
        assert_eq!(outcome.state.grid().occupied_count(), 1);
        assert_eq!(
            outcome.state.grid().get(Slot::new(0, 0, 0)),
            Some(Lesson::new(0, 0))
        );
        assert_eq!(outcome.states_generated, 1);
    }

    #[test]
    fn test_single_teacher_cannot_cover_two_rooms_at_once() {
        let (problem, prefs) = build(
            InputBuilder::new(&["Mon"], &[(8, 10)])
                .classroom("R1", 30, &["Math"])
                .classroom("R2", 30, &["Physics"])
                .subject("Math", 30)
                .subject("Physics", 30)
                .teacher("Ana", &["Math", "Physics"], &[])
                .build(),
        );
        let outcome = run(&problem, &prefs);

        assert_eq!(outcome.termination, Termination::FrontierExhausted);
        assert_eq!(outcome.state.conflicts(), 1);
        assert_eq!(outcome.state.grid().occupied_count(), 1);
    }

    #[test]
    fn test_stops_at_goal_with_preferences() {
        let (problem, prefs) = build(
            InputBuilder::new(&["Mon", "Tue"], &[(8, 10), (10, 12)])
                .classroom("R1", 30, &["Math", "Art"])
                .classroom("R2", 20, &["Art"])
                .subject("Math", 60)
                .subject("Art", 20)
                .teacher("Ana", &["Math"], &["!Mon"])
                .teacher("Bob", &["Art", "Math"], &["!8-10"])
                .build(),
        );
        let outcome = run(&problem, &prefs);

        assert!(outcome.termination.is_goal());
        assert_eq!(outcome.state.recount(&problem, &prefs), 0);
        assert!(outcome.expanded >= 3);
    }

    #[test]
    fn test_degenerate_input_stalls_without_error() {
        let (problem, prefs) = build(
            InputBuilder::new(&["Mon"], &[(8, 10)])
                .classroom("R1", 30, &["Math"])
                .subject("Math", 30)
                .teacher("Ana", &[], &[])
                .build(),
        );
        let outcome = run(&problem, &prefs);

        assert_eq!(outcome.termination, Termination::FrontierExhausted);
        assert_eq!(outcome.states_generated, 0);
        assert_eq!(outcome.state.conflicts(), 1);
    }

    #[test]
    fn test_zero_budget_returns_best_extracted() {
        let (problem, prefs) = build(
            InputBuilder::new(&["Mon", "Tue"], &[(8, 10)])
                .classroom("R1", 30, &["Math"])
                .subject("Math", 60)
                .teacher("Ana", &["Math"], &[])
                .build(),
        );
        let outcome = astar(
            State::empty(&problem, &prefs),
            &problem,
            &prefs,
            Duration::ZERO,
            |s| heuristic(s, &problem),
        );
        // A coarse clock may still read zero at the first poll.
        if outcome.termination == Termination::TimeLimit {
            assert_eq!(outcome.expanded, 1);
            assert_eq!(outcome.state.conflicts(), 1);
        } else {
            assert_eq!(outcome.termination, Termination::GoalReached);
        }
    }

    #[test]
    fn test_cost_table_keeps_the_cheapest_path() {
        let (problem, prefs) = build(
            InputBuilder::new(&["Mon"], &[(8, 10)])
                .classroom("R1", 30, &["Math"])
                .subject("Math", 30)
                .teacher("Ana", &["Math"], &[])
                .build(),
        );
        let state = State::empty(&problem, &prefs);
        let same_grid = State::from_grid(state.grid().clone(), &problem, &prefs);
        let mut costs = CostTable::default();

        assert!(costs.offer(&state, 3));
        assert!(!costs.offer(&same_grid, 5));
        assert!(!costs.offer(&same_grid, 3));
        assert_eq!(costs.get(&state), Some(3));
        assert!(costs.offer(&same_grid, 2));
        assert_eq!(costs.get(&state), Some(2));
        assert_eq!(costs.len(), 1);
    }

    #[test]
    fn test_heuristic_saturates() {
        let (problem, prefs) = build(
            InputBuilder::new(&["Mon"], &[(8, 10)])
                .classroom("R1", 30, &["Math"])
                .subject("Math", 30)
                .teacher("Ana", &["Math"], &[])
                .build(),
        );
        let state = State::empty(&problem, &prefs);
        let h = |s: &State| heuristic(s, &problem).saturating_add(u32::MAX);
        assert_eq!(h(&state), u32::MAX);

        let outcome = astar(state, &problem, &prefs, Duration::from_secs(240), h);
        assert!(outcome.termination.is_goal());
    }

    #[test]
    fn test_heuristic_overestimates_uncovered_work() {
        let (problem, prefs) = build(
            InputBuilder::new(&["Mon", "Tue"], &[(8, 10)])
                .classroom("R1", 30, &["Math"])
                .subject("Math", 30)
                .teacher("Ana", &["Math"], &[])
                .build(),
        );
        let state = State::empty(&problem, &prefs);
        assert_eq!(heuristic(&state, &problem), 1 + 2);
    }
}
