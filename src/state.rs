//! Search state: a schedule grid plus the indices derived from it.
//!
//! A `State` is never changed after it is built. Transitions return a new
//! state that shares unchanged grid rows and teacher rows with its parent.
//! Equality and hashing only look at the grid.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::constraints;
use crate::grid::{Lesson, ScheduleGrid, Slot};
use crate::preferences::PreferenceIndex;
use crate::problem::{DayId, IntervalId, Problem, SubjectId, TeacherId};

#[derive(Debug, Clone)]
pub struct State {
    grid: ScheduleGrid,
    /// Per teacher, one flag per (day, interval): teaching at that time.
    busy: Vec<Arc<Vec<bool>>>,
    loads: Vec<u32>,
    /// Seats given to each subject so far.
    coverage: Vec<u64>,
    intervals: usize,
    conflicts: u32,
}

impl State {
    /// The empty timetable, starting point of the graph search.
    pub fn empty(problem: &Problem, preferences: &PreferenceIndex) -> Self {
        Self::from_grid(ScheduleGrid::for_problem(problem), problem, preferences)
    }

    /// Derives every index and the conflict count from an arbitrary grid.
    pub fn from_grid(grid: ScheduleGrid, problem: &Problem, preferences: &PreferenceIndex) -> Self {
        let intervals = problem.intervals().len();
        let mut busy = vec![vec![false; problem.days().len() * intervals]; problem.teachers().len()];
        let mut coverage = vec![0u64; problem.subjects().len()];
        for (slot, lesson) in grid.lessons() {
            busy[lesson.teacher][slot.day * intervals + slot.interval] = true;
            coverage[lesson.subject] += u64::from(problem.classroom(slot.classroom).capacity);
        }
        let loads = busy
            .iter()
            .map(|row| row.iter().filter(|&&b| b).count() as u32)
            .collect();
        let conflicts = constraints::total_conflicts(&grid, problem, preferences);
        Self {
            grid,
            busy: busy.into_iter().map(Arc::new).collect(),
            loads,
            coverage,
            intervals,
            conflicts,
        }
    }

    pub fn grid(&self) -> &ScheduleGrid {
        &self.grid
    }

    /// Cached hard + soft violation count.
    pub fn conflicts(&self) -> u32 {
        self.conflicts
    }

    pub fn is_goal(&self) -> bool {
        self.conflicts == 0
    }

    pub fn load(&self, teacher: TeacherId) -> u32 {
        self.loads[teacher]
    }

    pub fn is_busy(&self, teacher: TeacherId, day: DayId, interval: IntervalId) -> bool {
        self.busy[teacher][day * self.intervals + interval]
    }

    pub fn coverage(&self, subject: SubjectId) -> u64 {
        self.coverage[subject]
    }

    /// Subjects still short of their requirement with the missing capacity,
    /// largest gap first; equal gaps keep input order.
    pub fn uncovered_subjects(&self, problem: &Problem) -> Vec<(SubjectId, u32)> {
        let mut uncovered: Vec<(SubjectId, u32)> = problem
            .subjects()
            .iter()
            .enumerate()
            .filter_map(|(id, subject)| {
                let missing = u64::from(subject.required).saturating_sub(self.coverage[id]);
                // Never above `required`, so it fits back into u32.
                let missing = u32::try_from(missing).unwrap_or(u32::MAX);
                (missing > 0).then_some((id, missing))
            })
            .collect();
        uncovered.sort_by(|a, b| b.1.cmp(&a.1));
        uncovered
    }

    pub fn empty_slots(&self) -> usize {
        self.grid.empty_count()
    }

    /// Full evaluation of the grid, ignoring the cached count.
    pub fn recount(&self, problem: &Problem, preferences: &PreferenceIndex) -> u32 {
        constraints::total_conflicts(&self.grid, problem, preferences)
    }

    fn set_busy(&mut self, teacher: TeacherId, day: DayId, interval: IntervalId, value: bool) {
        Arc::make_mut(&mut self.busy[teacher])[day * self.intervals + interval] = value;
    }

    /// Child with `lesson` placed into the empty `slot`.
    pub(crate) fn place(&self, problem: &Problem, slot: Slot, lesson: Lesson, conflicts: u32) -> Self {
        let mut child = self.clone();
        child.grid.set(slot, Some(lesson));
        child.set_busy(lesson.teacher, slot.day, slot.interval, true);
        child.loads[lesson.teacher] += 1;
        child.coverage[lesson.subject] += u64::from(problem.classroom(slot.classroom).capacity);
        child.conflicts = conflicts;
        child
    }

    /// Child with the lesson at `from` moved into the empty slot `to`.
    ///
    /// Both classrooms must have the same capacity; coverage is not touched.
    pub(crate) fn relocate(&self, from: Slot, to: Slot, conflicts: u32) -> Self {
        let mut child = self.clone();
        if let Some(lesson) = child.grid.set(from, None) {
            child.grid.set(to, Some(lesson));
            child.set_busy(lesson.teacher, from.day, from.interval, false);
            child.set_busy(lesson.teacher, to.day, to.interval, true);
        }
        child.conflicts = conflicts;
        child
    }

    /// Child with the lessons at `a` and `b` exchanged (same capacity rule as `relocate`).
    pub(crate) fn swap(&self, a: Slot, b: Slot, conflicts: u32) -> Self {
        let mut child = self.clone();
        let first = child.grid.get(a);
        let second = child.grid.set(b, first);
        child.grid.set(a, second);
        if let (Some(first), Some(second)) = (first, second) {
            child.set_busy(first.teacher, a.day, a.interval, false);
            child.set_busy(second.teacher, b.day, b.interval, false);
            child.set_busy(first.teacher, b.day, b.interval, true);
            child.set_busy(second.teacher, a.day, a.interval, true);
        }
        child.conflicts = conflicts;
        child
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.grid.hash(state);
    }
}
