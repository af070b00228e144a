//! Index-based view of a timetable input.
//!
//! Names are interned once into dense ids so the search works on small
//! `Copy` values; the names come back only when a report is built.

use std::collections::HashSet;

use log::warn;

use crate::data::{Interval, TimetableInput};
use crate::error::ModelError;

pub type DayId = usize;
pub type IntervalId = usize;
pub type ClassroomId = usize;
pub type SubjectId = usize;
pub type TeacherId = usize;

/// Weekly teaching intervals a teacher may hold before it counts as a violation.
pub const DEFAULT_MAX_TEACHER_LOAD: u32 = 7;

#[derive(Debug, Clone)]
pub struct Classroom {
    pub name: String,
    pub capacity: u32,
    certified: Vec<bool>,
}

impl Classroom {
    pub fn certifies(&self, subject: SubjectId) -> bool {
        self.certified.get(subject).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct Subject {
    pub name: String,
    /// Aggregate classroom capacity the subject must be given.
    pub required: u32,
}

#[derive(Debug, Clone)]
pub struct Teacher {
    pub name: String,
    qualified: Vec<bool>,
    /// Raw preference tokens, in input order.
    pub constraints: Vec<String>,
}

impl Teacher {
    pub fn is_qualified(&self, subject: SubjectId) -> bool {
        self.qualified.get(subject).copied().unwrap_or(false)
    }
}

/// Immutable problem definition shared by every state of a run.
#[derive(Debug, Clone)]
pub struct Problem {
    days: Vec<String>,
    intervals: Vec<Interval>,
    classrooms: Vec<Classroom>,
    subjects: Vec<Subject>,
    teachers: Vec<Teacher>,
    max_teacher_load: u32,
}

impl Problem {
    pub fn from_input(input: &TimetableInput) -> Result<Self, ModelError> {
        if input.days.is_empty() {
            return Err(ModelError::EmptyAxis("days"));
        }
        if input.intervals.is_empty() {
            return Err(ModelError::EmptyAxis("intervals"));
        }
        let mut seen_days = HashSet::new();
        for day in &input.days {
            if !seen_days.insert(day.as_str()) {
                return Err(ModelError::DuplicateDay(day.clone()));
            }
        }
        let mut seen_intervals = HashSet::new();
        for interval in &input.intervals {
            if !seen_intervals.insert(*interval) {
                return Err(ModelError::DuplicateInterval(interval.to_string()));
            }
        }

        let subjects: Vec<Subject> = input
            .subjects
            .iter()
            .map(|(name, required)| Subject {
                name: name.clone(),
                required: *required,
            })
            .collect();
        let subject_flags = |owner: &str, names: &[String]| -> Vec<bool> {
            let mut flags = vec![false; input.subjects.len()];
            for name in names {
                match input.subjects.get_index_of(name) {
                    Some(id) => flags[id] = true,
                    None => warn!("'{owner}' references unknown subject '{name}', ignoring it"),
                }
            }
            flags
        };

        let classrooms = input
            .classrooms
            .iter()
            .map(|(name, spec)| Classroom {
                name: name.clone(),
                capacity: spec.capacity,
                certified: subject_flags(name, &spec.subjects),
            })
            .collect();
        let teachers = input
            .teachers
            .iter()
            .map(|(name, spec)| Teacher {
                name: name.clone(),
                qualified: subject_flags(name, &spec.subjects),
                constraints: spec.constraints.clone(),
            })
            .collect();

        Ok(Self {
            days: input.days.clone(),
            intervals: input.intervals.clone(),
            classrooms,
            subjects,
            teachers,
            max_teacher_load: DEFAULT_MAX_TEACHER_LOAD,
        })
    }

    pub fn with_max_teacher_load(mut self, max_teacher_load: u32) -> Self {
        self.max_teacher_load = max_teacher_load;
        self
    }

    pub fn max_teacher_load(&self) -> u32 {
        self.max_teacher_load
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn classrooms(&self) -> &[Classroom] {
        &self.classrooms
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn classroom(&self, id: ClassroomId) -> &Classroom {
        &self.classrooms[id]
    }

    pub fn subject(&self, id: SubjectId) -> &Subject {
        &self.subjects[id]
    }

    pub fn teacher(&self, id: TeacherId) -> &Teacher {
        &self.teachers[id]
    }

    pub fn day_id(&self, name: &str) -> Option<DayId> {
        self.days.iter().position(|day| day == name)
    }

    #[cfg(test)]
    pub(crate) fn subject_id(&self, name: &str) -> Option<SubjectId> {
        self.subjects.iter().position(|s| s.name == name)
    }

    #[cfg(test)]
    pub(crate) fn teacher_id(&self, name: &str) -> Option<TeacherId> {
        self.teachers.iter().position(|t| t.name == name)
    }
}
