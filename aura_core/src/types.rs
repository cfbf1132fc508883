//! Core domain types for the Aura wellness tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Habits and their daily goals
//! - Mood journal entries
//! - View identifiers
//! - The application state snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Habit Types
// ============================================================================

/// A tracked daily quantity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HabitKind {
    Water,
    Sleep,
    Exercise,
}

impl HabitKind {
    pub const ALL: [HabitKind; 3] = [HabitKind::Water, HabitKind::Sleep, HabitKind::Exercise];

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitKind::Water => "water",
            HabitKind::Sleep => "sleep",
            HabitKind::Exercise => "exercise",
        }
    }

    /// Unit suffix shown next to the current value
    pub fn unit(&self) -> &'static str {
        match self {
            HabitKind::Water => "ml",
            HabitKind::Sleep => "h",
            HabitKind::Exercise => "min",
        }
    }
}

impl fmt::Display for HabitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "water" => Ok(HabitKind::Water),
            "sleep" => Ok(HabitKind::Sleep),
            "exercise" => Ok(HabitKind::Exercise),
            other => Err(crate::Error::InvalidInput(format!("unknown habit: {}", other))),
        }
    }
}

/// Current habit totals (water in ml, sleep in hours, exercise in minutes)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Habits {
    pub water: i64,
    pub sleep: f64,
    pub exercise: i64,
}

impl Habits {
    /// Current value of a habit as a float, for ratio math
    pub fn get(&self, kind: HabitKind) -> f64 {
        match kind {
            HabitKind::Water => self.water as f64,
            HabitKind::Sleep => self.sleep,
            HabitKind::Exercise => self.exercise as f64,
        }
    }
}

/// Daily targets, same shape as [`Habits`]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Goals {
    pub water: i64,
    pub sleep: f64,
    pub exercise: i64,
}

impl Goals {
    pub fn get(&self, kind: HabitKind) -> f64 {
        match kind {
            HabitKind::Water => self.water as f64,
            HabitKind::Sleep => self.sleep,
            HabitKind::Exercise => self.exercise as f64,
        }
    }
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            water: 2000,
            sleep: 8.0,
            exercise: 30,
        }
    }
}

// ============================================================================
// Mood Journal Types
// ============================================================================

/// Mood recorded with a journal entry
///
/// Serialized as its lowercase name. Names this version does not know are
/// kept verbatim in `Other` so snapshots written elsewhere stay loadable.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum Mood {
    Great,
    Good,
    Meh,
    Bad,
    #[default]
    Neutral,
    Other(String),
}

impl Mood {
    pub fn as_str(&self) -> &str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Meh => "meh",
            Mood::Bad => "bad",
            Mood::Neutral => "neutral",
            Mood::Other(name) => name,
        }
    }

    /// Glyph shown in the journal list
    pub fn glyph(&self) -> &'static str {
        match self {
            Mood::Great => "😄",
            Mood::Good => "🙂",
            Mood::Meh => "😐",
            Mood::Bad => "😫",
            Mood::Neutral | Mood::Other(_) => "😶",
        }
    }

    /// Score plotted on the mood chart, in [1, 4]
    pub fn score(&self) -> f64 {
        match self {
            Mood::Bad => 1.0,
            Mood::Meh => 2.0,
            Mood::Good => 3.0,
            Mood::Great => 4.0,
            Mood::Neutral | Mood::Other(_) => 2.5,
        }
    }
}

impl From<String> for Mood {
    fn from(s: String) -> Self {
        match s.as_str() {
            "great" => Mood::Great,
            "good" => Mood::Good,
            "meh" => Mood::Meh,
            "bad" => Mood::Bad,
            "neutral" => Mood::Neutral,
            _ => Mood::Other(s),
        }
    }
}

impl From<Mood> for String {
    fn from(mood: Mood) -> Self {
        match mood {
            Mood::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped mood/notes journal record. Never mutated once created.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub mood: Mood,
    pub notes: String,
}

// ============================================================================
// View and State Types
// ============================================================================

/// Screen the user is currently looking at
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    #[default]
    Home,
    Habits,
    Health,
    Mindfulness,
}

impl ViewId {
    pub const ALL: [ViewId; 4] = [
        ViewId::Home,
        ViewId::Habits,
        ViewId::Health,
        ViewId::Mindfulness,
    ];

    /// Parse a navigation target; unknown identifiers yield `None`
    pub fn parse(name: &str) -> Option<ViewId> {
        match name.trim().to_lowercase().as_str() {
            "home" => Some(ViewId::Home),
            "habits" => Some(ViewId::Habits),
            "health" => Some(ViewId::Health),
            "mindfulness" => Some(ViewId::Mindfulness),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Home => "home",
            ViewId::Habits => "habits",
            ViewId::Health => "health",
            ViewId::Mindfulness => "mindfulness",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The whole application state, persisted as one snapshot
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct AppState {
    pub habits: Habits,
    pub goals: Goals,
    /// Newest first
    pub logs: Vec<LogEntry>,
    pub view: ViewId,
}
