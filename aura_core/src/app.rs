//! Application controller.
//!
//! [`App`] owns the state store, the view synchronizer and the embedding
//! front end. Every user action goes through one of its methods, which
//! mutate the state, persist the snapshot and re-render the active view.

use crate::view::{ChartSurface, ViewSurface, ViewSynchronizer};
use crate::{AppState, Error, HabitKind, LogEntry, Mood, Result, SnapshotMedium, StateStore, ViewId};
use chrono::{DateTime, Local, Utc};

/// Amount of water added by the quick-add button, in ml
pub const WATER_SERVING_ML: i64 = 250;

/// Question asked before wiping all data
pub const RESET_PROMPT: &str =
    "Do you want to reset your progress? All saved data will be lost.";

/// Request/response dialogs supplied by the embedding UI
pub trait Prompter {
    /// Ask a yes/no question; `true` means the user agreed
    fn confirm(&mut self, prompt: &str) -> bool;
    /// Show an informational message
    fn notify(&mut self, message: &str);
}

/// Input surface of the health journal
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HealthLogForm {
    /// Selected mood; `None` submits as neutral
    pub mood: Option<Mood>,
    pub notes: String,
}

impl HealthLogForm {
    pub fn new(mood: Option<Mood>, notes: impl Into<String>) -> Self {
        Self {
            mood,
            notes: notes.into(),
        }
    }

    /// Clear the selection and text
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The application: state, persistence and UI wiring in one owner
pub struct App<M, F>
where
    M: SnapshotMedium,
    F: Prompter + ViewSurface + ChartSurface,
{
    store: StateStore<M>,
    sync: ViewSynchronizer,
    frontend: F,
}

impl<M, F> App<M, F>
where
    M: SnapshotMedium,
    F: Prompter + ViewSurface + ChartSurface,
{
    pub fn new(medium: M, frontend: F) -> Self {
        Self {
            store: StateStore::new(medium),
            sync: ViewSynchronizer::new(),
            frontend,
        }
    }

    /// Load persisted state and open the home view
    ///
    /// A corrupt snapshot is logged and replaced by the default state;
    /// other persistence errors are returned.
    pub fn init(&mut self) -> Result<()> {
        match self.store.load() {
            Ok(_) => {}
            Err(Error::PersistenceCorrupt(reason)) => {
                tracing::warn!("Discarding corrupt snapshot: {}. Using defaults.", reason);
            }
            Err(e) => return Err(e),
        }

        self.render_view(ViewId::Home);
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &StateStore<M> {
        &self.store
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    /// Persist the snapshot and re-render the active view
    pub fn save(&mut self) -> Result<()> {
        self.store.persist()?;
        self.refresh();
        Ok(())
    }

    /// Re-render the active view without persisting
    pub fn refresh(&mut self) {
        self.sync
            .refresh(self.store.state(), &mut self.frontend, &Local);
    }

    /// Navigate to the view named `name`
    ///
    /// Unknown names and views the front end has no template for are
    /// ignored. Returns whether the switch happened.
    pub fn switch_view(&mut self, name: &str) -> bool {
        match ViewId::parse(name) {
            Some(view) => self.render_view(view),
            None => {
                tracing::debug!("Ignoring navigation to unknown view {:?}", name);
                false
            }
        }
    }

    fn render_view(&mut self, view: ViewId) -> bool {
        if !self.frontend.show(view) {
            tracing::debug!("No template for view {}, staying put", view);
            return false;
        }
        self.store.state_mut().view = view;
        self.refresh();
        true
    }

    /// Set sleep hours, or add a water/exercise delta (clamped at zero)
    pub fn update_habit(&mut self, kind: HabitKind, value: f64) -> Result<()> {
        self.store.apply_habit(kind, value)?;
        self.save()
    }

    /// Log one serving of water and tell the user about it
    pub fn add_water(&mut self) -> Result<()> {
        self.update_habit(HabitKind::Water, WATER_SERVING_ML as f64)?;
        self.frontend
            .notify(&format!("💧 Water logged (+{}ml)", WATER_SERVING_ML));
        Ok(())
    }

    /// Record a journal entry from `form`, then clear the form
    pub fn submit_health_log(&mut self, form: &mut HealthLogForm) -> Result<LogEntry> {
        self.submit_health_log_at(form, Utc::now())
    }

    /// [`App::submit_health_log`] with an explicit creation time
    pub fn submit_health_log_at(
        &mut self,
        form: &mut HealthLogForm,
        now: DateTime<Utc>,
    ) -> Result<LogEntry> {
        let mood = form.mood.clone().unwrap_or_default();
        if let Mood::Other(name) = &mood {
            return Err(Error::InvalidInput(format!(
                "unknown mood {:?}; expected great, good, meh, bad or neutral",
                name
            )));
        }

        let entry = self
            .store
            .prepend_log(mood, form.notes.clone(), now)?
            .clone();
        tracing::info!("Logged mood {} (entry {})", entry.mood, entry.id);

        self.save()?;
        form.reset();
        Ok(entry)
    }

    /// Wipe all data after the user confirms
    ///
    /// Declining leaves state and snapshot untouched. Returns whether the
    /// reset happened.
    pub fn reset(&mut self) -> Result<bool> {
        if !self.frontend.confirm(RESET_PROMPT) {
            tracing::debug!("Reset declined");
            return Ok(false);
        }

        self.store.clear()?;
        self.save()?;
        self.render_view(ViewId::Home);
        tracing::info!("Progress reset");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ChartData, Projection};
    use crate::{Goals, Habits, MemoryMedium, SNAPSHOT_KEY};
    use chrono::TimeZone;
    use std::collections::HashSet;

    /// Scripted front end that records everything pushed to it
    struct FakeFrontend {
        answer: bool,
        templates: HashSet<ViewId>,
        prompts: Vec<String>,
        notices: Vec<String>,
        presented: Vec<Projection>,
        chart_events: Vec<String>,
    }

    impl FakeFrontend {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                templates: ViewId::ALL.into_iter().collect(),
                prompts: Vec::new(),
                notices: Vec::new(),
                presented: Vec::new(),
                chart_events: Vec::new(),
            }
        }
    }

    impl Prompter for FakeFrontend {
        fn confirm(&mut self, prompt: &str) -> bool {
            self.prompts.push(prompt.to_string());
            self.answer
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    impl ViewSurface for FakeFrontend {
        fn show(&mut self, view: ViewId) -> bool {
            self.templates.contains(&view)
        }

        fn present(&mut self, projection: &Projection) {
            self.presented.push(projection.clone());
        }
    }

    impl ChartSurface for FakeFrontend {
        fn draw(&mut self, data: &ChartData) {
            self.chart_events.push(format!("draw {}", data.values.len()));
        }

        fn destroy(&mut self) {
            self.chart_events.push("destroy".into());
        }
    }

    fn app(answer: bool) -> App<MemoryMedium, FakeFrontend> {
        let mut app = App::new(MemoryMedium::new(), FakeFrontend::new(answer));
        app.init().unwrap();
        app
    }

    fn persisted(app: &App<MemoryMedium, FakeFrontend>) -> Option<AppState> {
        app.store()
            .medium()
            .get(SNAPSHOT_KEY)
            .map(|s| serde_json::from_str(s).unwrap())
    }

    #[test]
    fn test_init_without_snapshot_renders_home_defaults() {
        let app = app(true);
        assert_eq!(*app.state(), AppState::default());
        assert!(matches!(
            app.frontend().presented.last(),
            Some(Projection::Home(home)) if home.percentage == 0
        ));
    }

    #[test]
    fn test_init_recovers_from_corrupt_snapshot() {
        crate::logging::init_test();
        let medium = MemoryMedium::new().with_entry(SNAPSHOT_KEY, "{ invalid json }}}}");
        let mut app = App::new(medium, FakeFrontend::new(true));

        app.init().unwrap();
        assert_eq!(*app.state(), AppState::default());
    }

    #[test]
    fn test_init_always_opens_home() {
        let medium = MemoryMedium::new().with_entry(SNAPSHOT_KEY, r#"{"view":"health"}"#);
        let mut app = App::new(medium, FakeFrontend::new(true));
        app.init().unwrap();

        assert_eq!(app.state().view, ViewId::Home);
        assert!(matches!(
            app.frontend().presented.last(),
            Some(Projection::Home(_))
        ));

        app.add_water().unwrap();
        assert_eq!(persisted(&app).unwrap().view, ViewId::Home);
    }

    #[test]
    fn test_update_habit_persists_and_refreshes() {
        let mut app = app(true);
        let before = app.frontend().presented.len();

        app.update_habit(HabitKind::Water, 1000.0).unwrap();

        assert_eq!(app.state().habits.water, 1000);
        assert_eq!(persisted(&app).unwrap().habits.water, 1000);
        assert_eq!(app.frontend().presented.len(), before + 1);
        assert!(matches!(
            app.frontend().presented.last(),
            Some(Projection::Home(home)) if home.percentage == 17
        ));
    }

    #[test]
    fn test_add_water_twice_then_clamp() {
        let mut app = app(true);
        app.add_water().unwrap();
        app.add_water().unwrap();
        assert_eq!(app.state().habits.water, 500);
        assert_eq!(app.frontend().notices.len(), 2);
        assert!(app.frontend().notices[0].contains("+250ml"));

        app.update_habit(HabitKind::Water, -1000.0).unwrap();
        assert_eq!(app.state().habits.water, 0);
    }

    #[test]
    fn test_submit_health_log_prepends_and_resets_form() {
        let mut app = app(true);
        let earlier = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap();

        let mut form = HealthLogForm::new(Some(Mood::Bad), "headache");
        app.submit_health_log_at(&mut form, earlier).unwrap();

        let mut form = HealthLogForm::new(Some(Mood::Good), "felt fine");
        let entry = app.submit_health_log_at(&mut form, later).unwrap();

        assert_eq!(form, HealthLogForm::default());
        assert_eq!(entry.mood, Mood::Good);
        assert_eq!(entry.notes, "felt fine");
        assert_eq!(entry.id, later.timestamp_millis());

        let logs = &app.state().logs;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0], entry);
        assert_eq!(logs[1].notes, "headache");
        assert_eq!(persisted(&app).unwrap().logs.len(), 2);
    }

    #[test]
    fn test_submit_without_mood_is_neutral() {
        let mut app = app(true);
        let mut form = HealthLogForm::new(None, "");
        let entry = app.submit_health_log(&mut form).unwrap();
        assert_eq!(entry.mood, Mood::Neutral);
        assert_eq!(entry.notes, "");
    }

    #[test]
    fn test_submit_rejects_unknown_mood() {
        let mut app = app(true);
        let mut form = HealthLogForm::new(Some(Mood::from("happy".to_string())), "x");

        let result = app.submit_health_log(&mut form);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(app.state().logs.is_empty());
        assert!(persisted(&app).is_none());
        // Input is kept so the user can correct it
        assert_eq!(form.notes, "x");
    }

    #[test]
    fn test_switch_view_unknown_is_noop() {
        let mut app = app(true);
        let before = app.frontend().presented.len();

        assert!(!app.switch_view("settings"));
        assert_eq!(app.state().view, ViewId::Home);
        assert_eq!(app.frontend().presented.len(), before);
    }

    #[test]
    fn test_switch_view_without_template_is_noop() {
        let mut app = app(true);
        app.frontend_mut().templates.remove(&ViewId::Mindfulness);

        assert!(!app.switch_view("mindfulness"));
        assert_eq!(app.state().view, ViewId::Home);
    }

    #[test]
    fn test_switch_to_health_draws_chart_and_redraws_cleanly() {
        let mut app = app(true);
        assert!(app.switch_view("health"));
        let mut form = HealthLogForm::new(Some(Mood::Great), "");
        app.submit_health_log(&mut form).unwrap();

        assert_eq!(app.state().view, ViewId::Health);
        assert_eq!(
            app.frontend().chart_events,
            vec!["draw 0", "destroy", "draw 1"]
        );
    }

    #[test]
    fn test_reset_confirmed_restores_defaults() {
        let mut app = app(true);
        app.add_water().unwrap();
        app.update_habit(HabitKind::Sleep, 7.5).unwrap();
        app.switch_view("habits");
        let mut form = HealthLogForm::new(Some(Mood::Meh), "tired");
        app.submit_health_log(&mut form).unwrap();

        assert!(app.reset().unwrap());

        let state = app.state();
        assert_eq!(state.habits, Habits::default());
        assert_eq!(state.goals, Goals { water: 2000, sleep: 8.0, exercise: 30 });
        assert!(state.logs.is_empty());
        assert_eq!(state.view, ViewId::Home);
        assert_eq!(persisted(&app), Some(AppState::default()));
        assert_eq!(app.frontend().prompts, vec![RESET_PROMPT.to_string()]);
    }

    #[test]
    fn test_reset_declined_changes_nothing() {
        let mut app = app(false);
        app.add_water().unwrap();
        let mut form = HealthLogForm::new(Some(Mood::Meh), "tired");
        app.submit_health_log(&mut form).unwrap();

        let state_before = app.state().clone();
        let snapshot_before = app.store().medium().get(SNAPSHOT_KEY).map(str::to_string);
        let renders_before = app.frontend().presented.len();

        assert!(!app.reset().unwrap());

        assert_eq!(*app.state(), state_before);
        assert_eq!(
            app.store().medium().get(SNAPSHOT_KEY).map(str::to_string),
            snapshot_before
        );
        assert_eq!(app.frontend().presented.len(), renders_before);
    }
}
