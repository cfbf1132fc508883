#![forbid(unsafe_code)]

//! Core state and projection logic for the Aura wellness tracker.
//!
//! This crate provides:
//! - Domain types (habits, goals, mood journal, views)
//! - Snapshot persistence (file and in-memory media)
//! - State store and view synchronizer
//! - Breathing cycle controller with an injectable scheduler
//! - Offline asset cache and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod snapshot;
pub mod store;
pub mod view;
pub mod app;
pub mod breathing;
pub mod offline;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use snapshot::{FileMedium, MemoryMedium, SnapshotMedium, SNAPSHOT_KEY};
pub use store::StateStore;
pub use view::{
    ChartData, ChartSurface, HabitBar, HabitsProjection, HomeProjection, LogLine, Projection,
    ViewSurface, ViewSynchronizer,
};
pub use app::{App, HealthLogForm, Prompter, RESET_PROMPT};
pub use breathing::{BreathEvent, BreathPhase, BreathingController, Scheduler, TimerHandle, TimerQueue};
pub use offline::{DirOrigin, OfflineCache, Origin};
pub use export::export_logs_csv;
