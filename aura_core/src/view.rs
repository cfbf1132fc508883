//! View synchronizer: pure projections of [`AppState`] for each screen.
//!
//! Every mutation and every view switch re-runs the projection for the
//! active view and pushes it to the embedding UI through [`ViewSurface`].
//! The mood chart goes to a separate [`ChartSurface`] whose previous chart
//! is always torn down before a new one is drawn.

use crate::{AppState, HabitKind, LogEntry, ViewId};
use chrono::TimeZone;
use std::f64::consts::PI;
use std::fmt;

/// Number of journal entries plotted on the mood chart
pub const CHART_WINDOW: usize = 7;

/// Rendering target supplied by the embedding UI
pub trait ViewSurface {
    /// Swap the visible screen to `view`. Returns false when the surface
    /// has no template for it, in which case nothing is rendered.
    fn show(&mut self, view: ViewId) -> bool;

    /// Push freshly computed display values into the visible screen
    fn present(&mut self, projection: &Projection);
}

/// Chart renderer supplied by the embedding UI
pub trait ChartSurface {
    fn draw(&mut self, data: &ChartData);
    /// Release the chart drawn by the previous `draw`
    fn destroy(&mut self);
}

// ============================================================================
// Projections
// ============================================================================

/// Fraction of a goal reached, clamped to [0, 1]
///
/// A non-positive goal counts as met as soon as anything was recorded.
pub fn goal_ratio(current: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return if current > 0.0 { 1.0 } else { 0.0 };
    }
    (current / goal).clamp(0.0, 1.0)
}

/// Home screen: overall progress across the three habits
#[derive(Clone, Debug, PartialEq)]
pub struct HomeProjection {
    /// Equal-weight average of the clamped per-habit ratios, in [0, 1]
    pub average: f64,
    /// `average` as a rounded percentage
    pub percentage: u32,
}

impl HomeProjection {
    pub fn from_state(state: &AppState) -> Self {
        let total: f64 = HabitKind::ALL
            .iter()
            .map(|&kind| goal_ratio(state.habits.get(kind), state.goals.get(kind)))
            .sum();
        let average = total / HabitKind::ALL.len() as f64;

        Self {
            average,
            percentage: (average * 100.0).round() as u32,
        }
    }

    /// Stroke dash offset for a progress ring of the given radius
    pub fn ring_offset(&self, radius: f64) -> f64 {
        let circumference = radius * 2.0 * PI;
        circumference - self.average * circumference
    }

    pub fn label(&self) -> String {
        format!("{}% complete", self.percentage)
    }
}

/// One linear progress bar on the habits screen
#[derive(Clone, Debug, PartialEq)]
pub struct HabitBar {
    pub kind: HabitKind,
    /// Bar width in percent, [0, 100]
    pub percent: f64,
    /// Current value with its unit suffix, e.g. `500ml`
    pub label: String,
}

impl HabitBar {
    fn new(state: &AppState, kind: HabitKind) -> Self {
        let habits = &state.habits;
        let value = match kind {
            HabitKind::Water => habits.water.to_string(),
            HabitKind::Sleep => habits.sleep.to_string(),
            HabitKind::Exercise => habits.exercise.to_string(),
        };

        Self {
            kind,
            percent: goal_ratio(habits.get(kind), state.goals.get(kind)) * 100.0,
            label: format!("{}{}", value, kind.unit()),
        }
    }
}

/// Habits screen: one bar per habit
#[derive(Clone, Debug, PartialEq)]
pub struct HabitsProjection {
    pub water: HabitBar,
    pub sleep: HabitBar,
    pub exercise: HabitBar,
}

impl HabitsProjection {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            water: HabitBar::new(state, HabitKind::Water),
            sleep: HabitBar::new(state, HabitKind::Sleep),
            exercise: HabitBar::new(state, HabitKind::Exercise),
        }
    }

    pub fn bars(&self) -> [&HabitBar; 3] {
        [&self.water, &self.sleep, &self.exercise]
    }
}

/// One rendered journal entry
#[derive(Clone, Debug, PartialEq)]
pub struct LogLine {
    pub glyph: &'static str,
    /// Local time of day, `HH:MM`
    pub time: String,
    /// User text, verbatim
    pub notes: String,
}

impl LogLine {
    pub fn from_entry<Tz>(entry: &LogEntry, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            glyph: entry.mood.glyph(),
            time: entry.date.with_timezone(tz).format("%H:%M").to_string(),
            notes: entry.notes.clone(),
        }
    }

    /// HTML fragment for surfaces that insert raw markup
    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"log-item\"><div class=\"log-header\">\
             <span class=\"log-mood\">{}</span><span class=\"log-time\">{}</span>\
             </div><p class=\"log-text\">{}</p></div>",
            self.glyph,
            escape_html(&self.time),
            escape_html(&self.notes)
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Data handed to the chart surface
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ChartData {
    pub labels: Vec<String>,
    /// Mood scores in [1, 4]
    pub values: Vec<f64>,
}

impl ChartData {
    /// The newest [`CHART_WINDOW`] entries, oldest first
    pub fn from_logs<Tz>(logs: &[LogEntry], tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let recent: Vec<&LogEntry> = logs.iter().take(CHART_WINDOW).rev().collect();

        Self {
            labels: recent
                .iter()
                .map(|entry| entry.date.with_timezone(tz).format("%-d %b").to_string())
                .collect(),
            values: recent.iter().map(|entry| entry.mood.score()).collect(),
        }
    }
}

/// Display values for one screen
#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    Home(HomeProjection),
    Habits(HabitsProjection),
    Health { logs: Vec<LogLine>, chart: ChartData },
    Mindfulness,
}

impl Projection {
    pub fn view(&self) -> ViewId {
        match self {
            Projection::Home(_) => ViewId::Home,
            Projection::Habits(_) => ViewId::Habits,
            Projection::Health { .. } => ViewId::Health,
            Projection::Mindfulness => ViewId::Mindfulness,
        }
    }
}

/// Compute the projection for `view`
pub fn project<Tz>(state: &AppState, view: ViewId, tz: &Tz) -> Projection
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match view {
        ViewId::Home => Projection::Home(HomeProjection::from_state(state)),
        ViewId::Habits => Projection::Habits(HabitsProjection::from_state(state)),
        ViewId::Health => Projection::Health {
            logs: state
                .logs
                .iter()
                .map(|entry| LogLine::from_entry(entry, tz))
                .collect(),
            chart: ChartData::from_logs(&state.logs, tz),
        },
        ViewId::Mindfulness => Projection::Mindfulness,
    }
}

/// Greeting for the hour of day (0-23)
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 20 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}

// ============================================================================
// Synchronizer
// ============================================================================

/// Pushes projections of the active view to the UI surfaces
#[derive(Debug, Default)]
pub struct ViewSynchronizer {
    chart_live: bool,
}

impl ViewSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a chart has been drawn and not yet torn down
    pub fn chart_live(&self) -> bool {
        self.chart_live
    }

    /// Re-render the active view of `state`
    pub fn refresh<S, Tz>(&mut self, state: &AppState, surface: &mut S, tz: &Tz)
    where
        S: ViewSurface + ChartSurface,
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let projection = project(state, state.view, tz);
        tracing::trace!("Refreshing view {}", state.view);
        surface.present(&projection);

        if let Projection::Health { chart, .. } = &projection {
            self.draw_chart(surface, chart);
        }
    }

    fn draw_chart<S: ChartSurface>(&mut self, surface: &mut S, data: &ChartData) {
        if self.chart_live {
            surface.destroy();
        }
        surface.draw(data);
        self.chart_live = true;
    }
}
