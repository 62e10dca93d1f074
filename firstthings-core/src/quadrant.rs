//! Eisenhower quadrant classification
//!
//! A task's quadrant is derived from its two flags and nothing else, so
//! every task sits in exactly one quadrant at all times.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::task::Task;

/// One of the four Eisenhower matrix buckets, numbered 1-4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quadrant {
    /// Urgent and important
    Do = 1,
    /// Important, not urgent
    Schedule = 2,
    /// Urgent, not important
    Delegate = 3,
    /// Neither
    Eliminate = 4,
}

impl Quadrant {
    /// All quadrants in display order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Do,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Eliminate,
    ];

    /// Classify from the urgent/important flags
    pub fn classify(urgent: bool, important: bool) -> Self {
        match (urgent, important) {
            (true, true) => Self::Do,
            (false, true) => Self::Schedule,
            (true, false) => Self::Delegate,
            (false, false) => Self::Eliminate,
        }
    }

    /// Canonical `(urgent, important)` pair for this quadrant
    pub fn flags(self) -> (bool, bool) {
        match self {
            Self::Do => (true, true),
            Self::Schedule => (false, true),
            Self::Delegate => (true, false),
            Self::Eliminate => (false, false),
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Zero-based index, handy for fixed-size tables
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Do),
            2 => Some(Self::Schedule),
            3 => Some(Self::Delegate),
            4 => Some(Self::Eliminate),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Do => "Urgent & Important",
            Self::Schedule => "Not Urgent & Important",
            Self::Delegate => "Urgent & Not Important",
            Self::Eliminate => "Not Urgent & Not Important",
        }
    }
}

impl TryFrom<u8> for Quadrant {
    type Error = CoreError;

    fn try_from(n: u8) -> Result<Self> {
        Self::from_number(n)
            .ok_or_else(|| CoreError::validation("quadrant", format!("{} is not in 1-4", n)))
    }
}

impl From<Quadrant> for u8 {
    fn from(q: Quadrant) -> Self {
        q.number()
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// Quadrant a task currently belongs to
pub fn quadrant_of(task: &Task) -> Quadrant {
    Quadrant::classify(task.urgent, task.important)
}

/// Move a task into `quadrant` by rewriting its flags.
///
/// Touches nothing else; callers refresh timestamps and persist.
pub fn apply_quadrant(task: &mut Task, quadrant: Quadrant) {
    let (urgent, important) = quadrant.flags();
    task.urgent = urgent;
    task.important = important;
}
