//! Constraint evaluation.
//!
//! Hard constraints:
//! - a teacher teaches at most one class per (day, interval),
//! - a classroom only hosts subjects it is certified for,
//! - a teacher only teaches subjects they are qualified for,
//! - every subject gets its required aggregate capacity,
//! - a teacher holds at most `max_teacher_load` intervals per week.
//!
//! Soft constraints are the teacher's disliked days and intervals.
//!
//! All functions here are pure: they read the grid and the problem and
//! nothing else.

use crate::data::{Violation, ViolationKind};
use crate::grid::{ScheduleGrid, Slot};
use crate::preferences::PreferenceIndex;
use crate::problem::{Problem, SubjectId, TeacherId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HardViolation {
    DoubleBooking(Slot, TeacherId),
    UncertifiedClassroom(Slot, SubjectId),
    UnqualifiedTeacher(Slot, TeacherId, SubjectId),
    UnderCoverage { subject: SubjectId, covered: u64 },
    Overload { teacher: TeacherId, load: u32 },
}

fn visit_hard(grid: &ScheduleGrid, problem: &Problem, mut visit: impl FnMut(HardViolation)) {
    let mut coverage = vec![0u64; problem.subjects().len()];
    let mut loads = vec![0u32; problem.teachers().len()];
    let mut teaching_now = vec![false; problem.teachers().len()];

    for day in 0..problem.days().len() {
        for interval in 0..problem.intervals().len() {
            for (classroom, cell) in grid.row(day, interval).iter().enumerate() {
                let Some(lesson) = cell else { continue };
                let slot = Slot::new(day, interval, classroom);
                let room = problem.classroom(classroom);
                coverage[lesson.subject] += u64::from(room.capacity);
                loads[lesson.teacher] += 1;

                if teaching_now[lesson.teacher] {
                    visit(HardViolation::DoubleBooking(slot, lesson.teacher));
                } else {
                    teaching_now[lesson.teacher] = true;
                }
                if !room.certifies(lesson.subject) {
                    visit(HardViolation::UncertifiedClassroom(slot, lesson.subject));
                }
                if !problem.teacher(lesson.teacher).is_qualified(lesson.subject) {
                    visit(HardViolation::UnqualifiedTeacher(
                        slot,
                        lesson.teacher,
                        lesson.subject,
                    ));
                }
            }
            for lesson in grid.row(day, interval).iter().flatten() {
                teaching_now[lesson.teacher] = false;
            }
        }
    }

    for (subject, covered) in coverage.into_iter().enumerate() {
        if covered < u64::from(problem.subject(subject).required) {
            visit(HardViolation::UnderCoverage { subject, covered });
        }
    }
    for (teacher, load) in loads.into_iter().enumerate() {
        if load > problem.max_teacher_load() {
            visit(HardViolation::Overload { teacher, load });
        }
    }
}

pub fn hard_violations(grid: &ScheduleGrid, problem: &Problem) -> u32 {
    let mut count = 0;
    visit_hard(grid, problem, |_| count += 1);
    count
}

pub fn soft_violations(grid: &ScheduleGrid, preferences: &PreferenceIndex) -> u32 {
    grid.lessons()
        .map(|(slot, lesson)| preferences.penalty(lesson.teacher, slot.day, slot.interval))
        .sum()
}

pub fn total_conflicts(grid: &ScheduleGrid, problem: &Problem, preferences: &PreferenceIndex) -> u32 {
    hard_violations(grid, problem) + soft_violations(grid, preferences)
}

/// Lists every counted violation; the list length equals [`total_conflicts`].
pub fn violations(
    grid: &ScheduleGrid,
    problem: &Problem,
    preferences: &PreferenceIndex,
) -> Vec<Violation> {
    let at = |slot: Slot| {
        format!(
            "{} {} in {}",
            problem.days()[slot.day],
            problem.intervals()[slot.interval],
            problem.classroom(slot.classroom).name
        )
    };

    let mut found = Vec::new();
    visit_hard(grid, problem, |violation| {
        let (kind, description) = match violation {
            HardViolation::DoubleBooking(slot, teacher) => (
                ViolationKind::DoubleBooking,
                format!(
                    "{} already teaches elsewhere at {}",
                    problem.teacher(teacher).name,
                    at(slot)
                ),
            ),
            HardViolation::UncertifiedClassroom(slot, subject) => (
                ViolationKind::UncertifiedClassroom,
                format!("{} is not certified at {}", problem.subject(subject).name, at(slot)),
            ),
            HardViolation::UnqualifiedTeacher(slot, teacher, subject) => (
                ViolationKind::UnqualifiedTeacher,
                format!(
                    "{} cannot teach {} at {}",
                    problem.teacher(teacher).name,
                    problem.subject(subject).name,
                    at(slot)
                ),
            ),
            HardViolation::UnderCoverage { subject, covered } => {
                let subject = problem.subject(subject);
                (
                    ViolationKind::UnderCoverage,
                    format!(
                        "{} covers {covered} of {} required seats",
                        subject.name, subject.required
                    ),
                )
            }
            HardViolation::Overload { teacher, load } => (
                ViolationKind::TeacherOverload,
                format!(
                    "{} teaches {load} intervals, more than {}",
                    problem.teacher(teacher).name,
                    problem.max_teacher_load()
                ),
            ),
        };
        found.push(Violation { kind, description });
    });

    for (slot, lesson) in grid.lessons() {
        let teacher = &problem.teacher(lesson.teacher).name;
        if preferences.dislikes_day(lesson.teacher, slot.day) {
            found.push(Violation {
                kind: ViolationKind::DislikedDay,
                description: format!("{teacher} prefers not to teach on {}", problem.days()[slot.day]),
            });
        }
        if preferences.dislikes_interval(lesson.teacher, slot.interval) {
            found.push(Violation {
                kind: ViolationKind::DislikedInterval,
                description: format!(
                    "{teacher} prefers not to teach during {}",
                    problem.intervals()[slot.interval]
                ),
            });
        }
    }
    found
}
