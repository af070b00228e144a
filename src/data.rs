use crate::error::ModelError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A half-open `[start, end)` interval on the shared hour axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "IntervalRepr", into = "[u32; 2]")]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Splits `a-b`, `a,b` or `(a, b)` into its two bounds without checking their order.
    pub fn parse_bounds(text: &str) -> Result<(u32, u32), ModelError> {
        let invalid = || ModelError::InvalidInterval(text.to_string());
        let inner = text
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');
        let (start, end) = inner.split_once(['-', ',']).ok_or_else(invalid)?;
        let start = start.trim().parse::<u32>().map_err(|_| invalid())?;
        let end = end.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok((start, end))
    }
}

impl FromStr for Interval {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = Self::parse_bounds(s)?;
        if end <= start {
            return Err(ModelError::EmptyInterval(s.to_string()));
        }
        Ok(Self::new(start, end))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl From<Interval> for [u32; 2] {
    fn from(interval: Interval) -> Self {
        [interval.start, interval.end]
    }
}

/// Accepted spellings of an interval in input files.
#[derive(Deserialize)]
#[serde(untagged)]
enum IntervalRepr {
    Pair([u32; 2]),
    Text(String),
}

impl TryFrom<IntervalRepr> for Interval {
    type Error = ModelError;

    fn try_from(repr: IntervalRepr) -> Result<Self, Self::Error> {
        match repr {
            IntervalRepr::Pair([start, end]) if end > start => Ok(Self::new(start, end)),
            IntervalRepr::Pair([start, end]) => Err(ModelError::EmptyInterval(format!("{start}-{end}"))),
            IntervalRepr::Text(text) => text.parse(),
        }
    }
}

/// A classroom with its capacity and the subjects it is certified for.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassroomSpec {
    #[serde(alias = "Capacitate")]
    pub capacity: u32,
    #[serde(alias = "Materii")]
    pub subjects: Vec<String>,
}

/// A teacher with the subjects they can teach and their raw preference tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeacherSpec {
    #[serde(alias = "Materii")]
    pub subjects: Vec<String>,
    #[serde(default, alias = "Constrangeri")]
    pub constraints: Vec<String>,
}

/// The complete input of a timetabling run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimetableInput {
    #[serde(alias = "Zile")]
    pub days: Vec<String>,
    #[serde(alias = "Intervale")]
    pub intervals: Vec<Interval>,
    #[serde(alias = "Sali")]
    pub classrooms: IndexMap<String, ClassroomSpec>,
    /// Subject name to the aggregate classroom capacity it must be given.
    #[serde(alias = "Materii")]
    pub subjects: IndexMap<String, u32>,
    #[serde(alias = "Profesori")]
    pub teachers: IndexMap<String, TeacherSpec>,
}

impl TimetableInput {
    /// Reads a JSON or YAML input file, picking the format from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&text)?),
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&text)?),
            _ => Err(ModelError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Search strategy selectable from the command line or the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Strategy {
    #[serde(rename = "astar")]
    AStar,
    #[serde(rename = "hc")]
    HillClimbing,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "astar" => Ok(Strategy::AStar),
            "hc" => Ok(Strategy::HillClimbing),
            other => Err(format!("unknown algorithm '{other}'. Algorithms: astar, hc")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::AStar => write!(f, "astar"),
            Strategy::HillClimbing => write!(f, "hc"),
        }
    }
}

/// Why a search driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    /// A state without any conflict was reached.
    GoalReached,
    /// The A* wall-clock budget ran out.
    TimeLimit,
    /// The A* frontier emptied before a goal was found.
    FrontierExhausted,
    /// Every hill climbing restart ended without a goal.
    RestartsExhausted,
}

impl Termination {
    pub fn is_goal(self) -> bool {
        self == Termination::GoalReached
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Termination::GoalReached => "goal reached",
            Termination::TimeLimit => "time limit reached, conflicts remain",
            Termination::FrontierExhausted => "frontier exhausted, conflicts remain",
            Termination::RestartsExhausted => "restarts exhausted, conflicts remain",
        };
        f.write_str(text)
    }
}

/// Category of a counted constraint violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    DoubleBooking,
    UncertifiedClassroom,
    UnqualifiedTeacher,
    UnderCoverage,
    TeacherOverload,
    DislikedDay,
    DislikedInterval,
}

impl ViolationKind {
    pub fn is_hard(self) -> bool {
        !matches!(self, ViolationKind::DislikedDay | ViolationKind::DislikedInterval)
    }
}

/// One violation of the final timetable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub description: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = if self.kind.is_hard() { "hard" } else { "soft" };
        write!(f, "[{severity}] {}", self.description)
    }
}

/// A scheduled lesson as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonView {
    pub teacher: String,
    pub subject: String,
}

/// day -> interval -> classroom -> lesson, in input order.
pub type ScheduleView = IndexMap<String, IndexMap<String, IndexMap<String, Option<LessonView>>>>;

/// Counters collected during a run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub states_generated: usize,
    pub iterations: usize,
    pub restarts: usize,
    pub elapsed_ms: u64,
    /// Conflicts of the first constructed state (local search only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_conflicts: Option<u32>,
}

/// The final output of the solver.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOutput {
    pub strategy: Strategy,
    pub termination: Termination,
    pub conflicts: u32,
    pub hard_violations: u32,
    pub soft_violations: u32,
    pub schedule: ScheduleView,
    pub violations: Vec<Violation>,
    pub stats: RunStats,
}

impl fmt::Display for TimetableOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy: {}", self.strategy)?;
        writeln!(f, "Outcome: {}", self.termination)?;
        if let Some(initial) = self.stats.initial_conflicts {
            writeln!(f, "Initial state conflicts: {initial}")?;
        }
        writeln!(f, "Generated states: {}", self.stats.states_generated)?;
        writeln!(f, "Iterations: {}", self.stats.iterations)?;
        if self.strategy == Strategy::HillClimbing {
            writeln!(f, "Restarts: {}", self.stats.restarts)?;
        }
        writeln!(
            f,
            "Final state conflicts: {} (hard {}, soft {})",
            self.conflicts, self.hard_violations, self.soft_violations
        )?;
        writeln!(f, "Execution time: {:.3} seconds", self.stats.elapsed_ms as f64 / 1000.0)?;
        writeln!(f, "Result schedule:")?;
        for (day, intervals) in &self.schedule {
            writeln!(f, "{day}")?;
            for (interval, classrooms) in intervals {
                let cells: Vec<String> = classrooms
                    .iter()
                    .map(|(room, lesson)| match lesson {
                        Some(l) => format!("{room}: {} ({})", l.teacher, l.subject),
                        None => format!("{room}: -"),
                    })
                    .collect();
                writeln!(f, "  {interval:>7} | {}", cells.join(" | "))?;
            }
        }
        if !self.violations.is_empty() {
            writeln!(f, "Violations:")?;
            for violation in &self.violations {
                writeln!(f, "  {violation}")?;
            }
        }
        Ok(())
    }
}
