//! The schedule grid: day -> interval -> classroom -> optional lesson.
//!
//! Storage is one row per (day, interval), each row holding one cell per
//! classroom. Rows sit behind `Arc`, so cloning a grid copies only the row
//! pointers and a write copies only the row it touches; every child state
//! shares all untouched rows with its parent.
//!
//! The grid also keeps an order-independent fingerprint of its content,
//! updated on every write. `Hash` uses the fingerprint, `Eq` still compares
//! every cell, so two grids are equal iff all of their slots match.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use itertools::iproduct;

use crate::problem::{ClassroomId, DayId, IntervalId, Problem, SubjectId, TeacherId};

/// A (teacher, subject) pair occupying a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lesson {
    pub teacher: TeacherId,
    pub subject: SubjectId,
}

impl Lesson {
    pub fn new(teacher: TeacherId, subject: SubjectId) -> Self {
        Self { teacher, subject }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub day: DayId,
    pub interval: IntervalId,
    pub classroom: ClassroomId,
}

impl Slot {
    pub fn new(day: DayId, interval: IntervalId, classroom: ClassroomId) -> Self {
        Self {
            day,
            interval,
            classroom,
        }
    }
}

type Row = Arc<Vec<Option<Lesson>>>;

#[derive(Debug, Clone)]
pub struct ScheduleGrid {
    days: usize,
    intervals: usize,
    classrooms: usize,
    rows: Vec<Row>,
    occupied: usize,
    fingerprint: u64,
}

impl ScheduleGrid {
    pub fn new(days: usize, intervals: usize, classrooms: usize) -> Self {
        let empty_row: Row = Arc::new(vec![None; classrooms]);
        Self {
            days,
            intervals,
            classrooms,
            rows: vec![empty_row; days * intervals],
            occupied: 0,
            fingerprint: 0,
        }
    }

    pub fn for_problem(problem: &Problem) -> Self {
        Self::new(
            problem.days().len(),
            problem.intervals().len(),
            problem.classrooms().len(),
        )
    }

    #[inline]
    fn row_index(&self, day: DayId, interval: IntervalId) -> usize {
        day * self.intervals + interval
    }

    #[inline]
    pub fn get(&self, slot: Slot) -> Option<Lesson> {
        self.rows[self.row_index(slot.day, slot.interval)][slot.classroom]
    }

    pub fn is_empty_at(&self, slot: Slot) -> bool {
        self.get(slot).is_none()
    }

    /// All classroom cells of one (day, interval).
    pub fn row(&self, day: DayId, interval: IntervalId) -> &[Option<Lesson>] {
        &self.rows[self.row_index(day, interval)]
    }

    /// Writes a cell, returning its previous content.
    pub fn set(&mut self, slot: Slot, lesson: Option<Lesson>) -> Option<Lesson> {
        let index = self.row_index(slot.day, slot.interval);
        let flat = index * self.classrooms + slot.classroom;
        let row = Arc::make_mut(&mut self.rows[index]);
        let previous = std::mem::replace(&mut row[slot.classroom], lesson);
        if let Some(old) = previous {
            self.fingerprint = self.fingerprint.wrapping_sub(cell_hash(flat, old));
            self.occupied -= 1;
        }
        if let Some(new) = lesson {
            self.fingerprint = self.fingerprint.wrapping_add(cell_hash(flat, new));
            self.occupied += 1;
        }
        previous
    }

    /// Every slot in grid order: day, then interval, then classroom.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + use<> {
        iproduct!(0..self.days, 0..self.intervals, 0..self.classrooms)
            .map(|(day, interval, classroom)| Slot::new(day, interval, classroom))
    }

    /// Occupied slots in grid order.
    pub fn lessons(&self) -> impl Iterator<Item = (Slot, Lesson)> + '_ {
        self.slots()
            .filter_map(move |slot| self.get(slot).map(|lesson| (slot, lesson)))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn empty_count(&self) -> usize {
        self.rows.len() * self.classrooms - self.occupied
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl PartialEq for ScheduleGrid {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
            && self.occupied == other.occupied
            && self.classrooms == other.classrooms
            && self.rows.len() == other.rows.len()
            && self
                .rows
                .iter()
                .zip(&other.rows)
                .all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
    }
}

impl Eq for ScheduleGrid {}

impl Hash for ScheduleGrid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

/// splitmix64 finalizer.
#[inline]
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[inline]
fn cell_hash(flat: usize, lesson: Lesson) -> u64 {
    mix((flat as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ mix(lesson.teacher as u64).rotate_left(17)
        ^ mix((lesson.subject as u64) ^ 0xa5a5_a5a5))
}
