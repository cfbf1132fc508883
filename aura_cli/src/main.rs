use aura_core::view::{greeting, CHART_WINDOW};
use aura_core::*;
use chrono::Timelike;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "aura")]
#[command(about = "Personal wellness tracker: habits, mood journal and breathing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's overall progress (default)
    Status,

    /// Show progress bars for each habit
    Habits,

    /// Show the mood journal and chart
    Health,

    /// Show any screen by name (home, habits, health, mindfulness)
    View { name: String },

    /// Log one glass of water (+250ml)
    Water,

    /// Update a habit: adds to water/exercise, sets sleep hours
    Habit {
        /// water, sleep or exercise
        kind: HabitKind,

        /// Delta (water ml, exercise minutes) or hours slept
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Add a mood journal entry
    Log {
        /// great, good, meh, bad or neutral (default)
        #[arg(long)]
        mood: Option<String>,

        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Wipe all progress and journal entries
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Run the guided breathing exercise
    Breathe {
        /// Number of inhale/exhale cycles
        #[arg(long, default_value_t = 3)]
        cycles: u32,

        /// Override the cycle length from the config file
        #[arg(long)]
        period_ms: Option<u64>,
    },

    /// Export the mood journal to CSV
    Export { path: PathBuf },
}

fn main() -> Result<()> {
    // Views go to stdout; keep log noise to warnings unless RUST_LOG says otherwise
    aura_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => cmd_show(data_dir, ViewId::Home.as_str()),
        Commands::Habits => cmd_show(data_dir, ViewId::Habits.as_str()),
        Commands::Health => cmd_show(data_dir, ViewId::Health.as_str()),
        Commands::View { name } => cmd_show(data_dir, &name),
        Commands::Water => {
            let mut app = open_app(data_dir, false)?;
            app.add_water()
        }
        Commands::Habit { kind, value } => {
            let mut app = open_app(data_dir, false)?;
            app.update_habit(kind, value)
        }
        Commands::Log { mood, notes } => cmd_log(data_dir, mood, notes),
        Commands::Reset { yes } => cmd_reset(data_dir, yes),
        Commands::Breathe { cycles, period_ms } => {
            let period = period_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.breathing.period());
            cmd_breathe(cycles, period)
        }
        Commands::Export { path } => cmd_export(data_dir, path),
    }
}

/// Build the app over the data directory and load the snapshot without
/// printing the stored view
fn open_app(data_dir: PathBuf, assume_yes: bool) -> Result<App<FileMedium, Terminal>> {
    let mut app = App::new(FileMedium::new(data_dir), Terminal::new(assume_yes));
    app.frontend_mut().muted = true;
    app.init()?;
    app.frontend_mut().muted = false;
    Ok(app)
}

fn cmd_show(data_dir: PathBuf, name: &str) -> Result<()> {
    let mut app = open_app(data_dir, false)?;

    if ViewId::parse(name) == Some(ViewId::Home) {
        println!("\n  {}!", greeting(chrono::Local::now().hour()));
    }

    if !app.switch_view(name) {
        eprintln!("Unknown view: {}. Try home, habits, health or mindfulness.", name);
    }
    Ok(())
}

fn cmd_log(data_dir: PathBuf, mood: Option<String>, notes: String) -> Result<()> {
    let mut app = open_app(data_dir, false)?;

    let mut form = HealthLogForm::new(mood.map(|m| Mood::from(m.trim().to_lowercase())), notes);
    let entry = app.submit_health_log(&mut form)?;

    println!("\n✓ Journal entry logged ({} {})", entry.mood.glyph(), entry.mood);
    Ok(())
}

fn cmd_reset(data_dir: PathBuf, yes: bool) -> Result<()> {
    let mut app = open_app(data_dir, yes)?;

    if app.reset()? {
        println!("\n✓ Progress reset");
    } else {
        println!("\nReset cancelled - nothing changed.");
    }
    Ok(())
}

fn cmd_breathe(cycles: u32, period: Duration) -> Result<()> {
    if period < Duration::from_millis(2) {
        return Err(Error::InvalidInput("breathing period must be at least 2ms".into()));
    }

    let mut queue = TimerQueue::new();
    let mut controller = BreathingController::new(period);
    let total = period
        .checked_mul(cycles)
        .ok_or_else(|| Error::InvalidInput("breathing session is too long".into()))?;
    let started = Instant::now();

    println!("\n  Breathe with the prompts ({} cycles)\n", cycles);
    print_phase(controller.toggle(&mut queue), queue.now());

    // Single-threaded event loop: sleep until the next timer, then dispatch it
    while let Some(due) = queue.next_due().filter(|&due| due < total) {
        sleep_until(started + due);
        let step = due.saturating_sub(queue.now());
        queue.advance(step, |q, event| {
            if let Some(phase) = controller.handle(event, q) {
                print_phase(phase, q.now());
            }
        });
    }

    sleep_until(started + total);
    controller.toggle(&mut queue);
    println!("\n✓ Done - {} ({})", controller.phase(), controller.button_label());
    Ok(())
}

fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        std::thread::sleep(deadline - now);
    }
}

fn print_phase(phase: BreathPhase, at: Duration) {
    let circle = if phase.expanded() { "( O )" } else { " (o) " };
    println!("  {:>6.1}s  {}  {}", at.as_secs_f64(), circle, phase.prompt());
}

fn cmd_export(data_dir: PathBuf, path: PathBuf) -> Result<()> {
    let app = open_app(data_dir, false)?;
    let count = export_logs_csv(&app.state().logs, &path)?;
    println!("✓ Exported {} journal entries", count);
    println!("  CSV: {}", path.display());
    Ok(())
}

// ============================================================================
// Terminal front end
// ============================================================================

const BAR_WIDTH: usize = 20;

/// Renders every screen as text and asks questions on stdin
struct Terminal {
    assume_yes: bool,
    muted: bool,
}

impl Terminal {
    fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            muted: false,
        }
    }
}

impl Prompter for Terminal {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(_) => matches!(input.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn notify(&mut self, message: &str) {
        println!("\n{}", message);
    }
}

impl ViewSurface for Terminal {
    fn show(&mut self, _view: ViewId) -> bool {
        // Every built-in screen has a text layout
        true
    }

    fn present(&mut self, projection: &Projection) {
        if self.muted {
            return;
        }

        match projection {
            Projection::Home(home) => {
                print_header("TODAY");
                println!("  {}", bar(home.average * 100.0));
                println!("  {}", home.label());
            }
            Projection::Habits(habits) => {
                print_header("HABITS");
                for habit in habits.bars() {
                    println!(
                        "  {:<9} {:>8}  {} {:>3.0}%",
                        habit.kind.as_str(),
                        habit.label,
                        bar(habit.percent),
                        habit.percent
                    );
                }
            }
            Projection::Health { logs, .. } => {
                print_header("JOURNAL");
                if logs.is_empty() {
                    println!("  No entries yet. Add one with `aura log`.");
                }
                for line in logs {
                    println!("  {}  {}  {}", line.glyph, line.time, line.notes);
                }
            }
            Projection::Mindfulness => {
                print_header("MINDFULNESS");
                println!("  {}", BreathPhase::Ready.prompt());
                println!("  Run `aura breathe` to start a guided session.");
            }
        }
        println!();
    }
}

impl ChartSurface for Terminal {
    fn draw(&mut self, data: &ChartData) {
        if self.muted || data.values.is_empty() {
            return;
        }

        println!("  Mood, last {} entries", CHART_WINDOW);
        for (label, value) in data.labels.iter().zip(&data.values) {
            let filled = (value * 4.0).round() as usize;
            println!("  {:>6}  {:<16} {}", label, "█".repeat(filled), value);
        }
        println!();
    }

    fn destroy(&mut self) {
        // Nothing retained between draws
    }
}

fn print_header(title: &str) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", title);
    println!("╰─────────────────────────────────────────╯");
}

fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
