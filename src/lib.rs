//! Classroom timetabling by state-space search.
//!
//! A problem names days, time intervals, classrooms with capacities and
//! certified subjects, the capacity each subject must be given and the
//! teachers with their qualifications and preferences. Two strategies fill
//! the day x interval x classroom grid with (teacher, subject) lessons:
//! A* over one-placement-at-a-time construction, and restarted hill
//! climbing over relocations and swaps of an already built grid.
//!
//! [`solver::solve`] is the entry point used by the binary and the HTTP
//! server.

pub mod astar;
pub mod config;
pub mod constraints;
pub mod construction;
pub mod data;
pub mod error;
pub mod grid;
pub mod hill_climbing;
pub mod initializer;
pub mod perturbation;
pub mod preferences;
pub mod problem;
pub mod server;
pub mod solver;
pub mod state;
