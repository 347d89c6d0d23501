mod app;
mod event;
mod logging;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use rust_embed::Embed;
use tracing::{info, warn};

use lingodrill::config::Config;
use lingodrill::exercise::unit::Lesson;
use lingodrill::store::json_store::JsonStore;

use app::App;
use event::{AppEvent, EventHandler};

#[derive(Embed)]
#[folder = "assets/lessons/"]
struct LessonAssets;

#[derive(Parser)]
#[command(
    name = "lingodrill",
    version,
    about = "Terminal drills: translate sentences, fill blanks, match pairs"
)]
struct Cli {
    #[arg(short, long, help = "Lesson file (JSON); plays the built-in demo when omitted")]
    lesson: Option<PathBuf>,

    #[arg(short, long, help = "Seed for option and card shuffling")]
    seed: Option<u64>,

    #[arg(long, help = "Log filter, e.g. debug or lingodrill=trace")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!("Ignoring unreadable config: {err:#}");
        Config::default()
    });
    if !Config::config_path().exists() {
        if let Err(err) = config.save() {
            eprintln!("Could not write default config: {err:#}");
        }
    }
    if let Some(seed) = cli.seed {
        config.shuffle_seed = Some(seed);
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            eprintln!("Progress will not be saved: {err:#}");
            None
        }
    };
    let log_dir = store
        .as_ref()
        .map_or_else(|| PathBuf::from("."), |s| s.base_dir().join("logs"));
    let _log_guard = logging::init_tracing(&config.log_level, &log_dir)?;

    let lesson = match cli.lesson.as_deref() {
        Some(path) => load_lesson(path)?,
        None => demo_lesson()?,
    };
    info!(title = %lesson.title, units = lesson.units.len(), "lesson loaded");

    let mut app = App::new(lesson, config, store, Instant::now());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => app.handle_key(key, Instant::now()),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn load_lesson(path: &Path) -> Result<Lesson> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading lesson {}", path.display()))?;
    let lesson = Lesson::from_json(&content)
        .with_context(|| format!("parsing lesson {}", path.display()))?;
    report_invalid_units(&lesson);
    Ok(lesson)
}

fn demo_lesson() -> Result<Lesson> {
    let file = LessonAssets::get("demo.json").context("built-in demo lesson is missing")?;
    let content = std::str::from_utf8(file.data.as_ref()).context("demo lesson is not UTF-8")?;
    Lesson::from_json(content).context("parsing built-in demo lesson")
}

/// Malformed units still play (they degrade to something completable), but
/// the author should hear about them.
fn report_invalid_units(lesson: &Lesson) {
    for (index, unit) in lesson.units.iter().enumerate() {
        if let Err(err) = unit.validate() {
            warn!(index, kind = unit.kind().as_str(), error = %err, "invalid unit");
        }
    }
}
