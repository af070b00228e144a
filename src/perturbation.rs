//! Perturbation successors for the local search.
//!
//! An occupied slot is sampled at random and its lesson is either
//! relocated to an empty slot or swapped with another teacher's lesson.
//! Both moves stay between classrooms of equal capacity certified for the
//! moved subjects, so hard constraints and coverage never change; a move is
//! kept only when it strictly lowers the teachers' soft penalty.

use indexmap::IndexSet;
use log::trace;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::grid::{Lesson, Slot};
use crate::preferences::PreferenceIndex;
use crate::problem::Problem;
use crate::state::State;

/// Bounds of one perturbation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborhoodLimits {
    /// Stop once this many distinct children were found.
    pub max_neighbors: usize,
    /// Stop after sampling this many occupied slots.
    pub max_sampled_slots: usize,
}

impl Default for NeighborhoodLimits {
    fn default() -> Self {
        Self {
            max_neighbors: 10,
            max_sampled_slots: 60,
        }
    }
}

pub fn perturbation_successors<R: Rng + ?Sized>(
    state: &State,
    problem: &Problem,
    preferences: &PreferenceIndex,
    limits: NeighborhoodLimits,
    rng: &mut R,
) -> Vec<State> {
    let occupied: Vec<(Slot, Lesson)> = state.grid().lessons().collect();
    let mut children = IndexSet::new();
    let mut sampled = 0;

    while children.len() < limits.max_neighbors && sampled < limits.max_sampled_slots {
        let Some(&(source, lesson)) = occupied.choose(rng) else {
            break;
        };
        sampled += 1;
        moves_from(state, problem, preferences, source, lesson, limits.max_neighbors, &mut children);
    }
    trace!("sampled {sampled} slots, kept {} neighbors", children.len());
    children.into_iter().collect()
}

fn moves_from(
    state: &State,
    problem: &Problem,
    preferences: &PreferenceIndex,
    source: Slot,
    lesson: Lesson,
    cap: usize,
    children: &mut IndexSet<State>,
) {
    let teacher = lesson.teacher;
    let source_room = problem.classroom(source.classroom);
    let source_penalty = preferences.penalty(teacher, source.day, source.interval);

    for slot in state.grid().slots() {
        if children.len() >= cap {
            return;
        }
        let room = problem.classroom(slot.classroom);
        if slot == source
            || state.is_busy(teacher, slot.day, slot.interval)
            || !room.certifies(lesson.subject)
            || room.capacity != source_room.capacity
        {
            continue;
        }
        let target_penalty = preferences.penalty(teacher, slot.day, slot.interval);

        match state.grid().get(slot) {
            None => {
                if source_penalty > target_penalty {
                    let conflicts = state.conflicts() - (source_penalty - target_penalty);
                    children.insert(state.relocate(source, slot, conflicts));
                }
            }
            Some(other) => {
                if other.teacher == teacher
                    || state.is_busy(other.teacher, source.day, source.interval)
                    || !source_room.certifies(other.subject)
                {
                    continue;
                }
                let before = source_penalty + preferences.penalty(other.teacher, slot.day, slot.interval);
                let after = target_penalty + preferences.penalty(other.teacher, source.day, source.interval);
                if before > after {
                    let conflicts = state.conflicts() - (before - after);
                    children.insert(state.swap(source, slot, conflicts));
                }
            }
        }
    }
}
