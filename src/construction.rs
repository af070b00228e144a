//! Construction successors: every way to fill one more empty slot.
//!
//! Used by the graph search. For each empty slot in grid order, each
//! uncovered subject the classroom is certified for (largest coverage gap
//! first) and each qualified teacher that is free at that time and still
//! under the weekly load limit, one child is produced.

use log::trace;

use crate::grid::Lesson;
use crate::preferences::PreferenceIndex;
use crate::problem::Problem;
use crate::state::State;

pub fn construction_successors(
    state: &State,
    problem: &Problem,
    preferences: &PreferenceIndex,
) -> Vec<State> {
    let uncovered = state.uncovered_subjects(problem);
    if uncovered.is_empty() {
        return Vec::new();
    }

    let mut children = Vec::new();
    for slot in state.grid().slots() {
        if !state.grid().is_empty_at(slot) {
            continue;
        }
        let classroom = problem.classroom(slot.classroom);
        for &(subject, missing) in &uncovered {
            if !classroom.certifies(subject) {
                continue;
            }
            // The placement covers the subject once the room fills the gap.
            let covers = u32::from(classroom.capacity >= missing);
            for (teacher, profile) in problem.teachers().iter().enumerate() {
                if !profile.is_qualified(subject)
                    || state.load(teacher) >= problem.max_teacher_load()
                    || state.is_busy(teacher, slot.day, slot.interval)
                {
                    continue;
                }
                let conflicts = state.conflicts() + preferences.penalty(teacher, slot.day, slot.interval)
                    - covers;
                children.push(state.place(problem, slot, Lesson::new(teacher, subject), conflicts));
            }
        }
    }
    trace!("expanded state with {} conflicts into {} children", state.conflicts(), children.len());
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ScheduleGrid, Slot};
    use crate::problem::fixtures::InputBuilder;

    fn setup(constraints: &[&str]) -> (Problem, PreferenceIndex) {
        let input = InputBuilder::new(&["Mon"], &[(8, 10), (10, 12)])
            .classroom("R1", 30, &["Math", "Art"])
            .classroom("R2", 20, &["Art"])
            .subject("Math", 30)
            .subject("Art", 50)
            .teacher("Ana", &["Math", "Art"], constraints)
            .teacher("Bob", &["Art"], &[])
            .build();
        let problem = Problem::from_input(&input).unwrap();
        let prefs = PreferenceIndex::build(&problem).unwrap();
        (problem, prefs)
    }

    fn differing_slots(a: &State, b: &State) -> Vec<Slot> {
        a.grid()
            .slots()
            .filter(|&slot| a.grid().get(slot) != b.grid().get(slot))
            .collect()
    }

    #[test]
    fn test_children_differ_in_one_slot_and_one_load() {
        let (problem, prefs) = setup(&["!10-12"]);
        let root = State::empty(&problem, &prefs);
        let children = construction_successors(&root, &problem, &prefs);

        // R1 slots: Art (Ana, Bob) then Math (Ana); R2 slots: Art (Ana, Bob).
        assert_eq!(children.len(), 10);
        for child in &children {
            let changed = differing_slots(&root, child);
            assert_eq!(changed.len(), 1);
            let lesson = child.grid().get(changed[0]).unwrap();
            for teacher in 0..problem.teachers().len() {
                let expected = root.load(teacher) + u32::from(teacher == lesson.teacher);
                assert_eq!(child.load(teacher), expected);
            }
            assert!(child.is_busy(lesson.teacher, changed[0].day, changed[0].interval));
            assert_eq!(child.conflicts(), child.recount(&problem, &prefs));
        }
    }

    #[test]
    fn test_subjects_ranked_by_remaining_gap() {
        let (problem, prefs) = setup(&[]);
        let root = State::empty(&problem, &prefs);
        let children = construction_successors(&root, &problem, &prefs);
        let first = children[0].grid().get(Slot::new(0, 0, 0)).unwrap();
        let art = problem.subject_id("Art").unwrap();
        assert_eq!(first.subject, art);
        assert_eq!(first.teacher, problem.teacher_id("Ana").unwrap());
    }

    #[test]
    fn test_covering_placement_lowers_conflicts() {
        let (problem, prefs) = setup(&[]);
        let root = State::empty(&problem, &prefs);
        let math = problem.subject_id("Math").unwrap();
        let children = construction_successors(&root, &problem, &prefs);
        let math_child = children
            .iter()
            .find(|c| c.coverage(math) == 30)
            .unwrap();
        assert_eq!(math_child.conflicts(), root.conflicts() - 1);
    }

    #[test]
    fn test_teacher_at_load_limit_gets_nothing() {
        let (problem, prefs) = setup(&[]);
        let problem = problem.with_max_teacher_load(1);
        let mut grid = ScheduleGrid::for_problem(&problem);
        grid.set(Slot::new(0, 0, 1), Some(Lesson::new(1, 1)));
        let state = State::from_grid(grid, &problem, &prefs);

        let children = construction_successors(&state, &problem, &prefs);
        assert!(!children.is_empty());
        for child in children {
            assert!(child.load(1) <= 1);
            assert_eq!(child.load(1), 1);
        }
    }

    #[test]
    fn test_degenerate_input_yields_nothing() {
        let input = InputBuilder::new(&["Mon"], &[(8, 10)])
            .classroom("R1", 30, &[])
            .subject("Math", 30)
            .teacher("Ana", &["Math"], &[])
            .build();
        let problem = Problem::from_input(&input).unwrap();
        let prefs = PreferenceIndex::build(&problem).unwrap();
        let root = State::empty(&problem, &prefs);
        assert!(construction_successors(&root, &problem, &prefs).is_empty());
    }
}
