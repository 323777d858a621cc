// ============================================================================
// DAILY NUDGE - Daily micro-actions, prompts and stories in the terminal
// ============================================================================
//
// MODULE STRUCTURE:
// 1. content      - Monthly content document, loading and size limits
// 2. theme        - Theme normalization and Explore filters
// 3. schedule     - Time-of-day slot and day selection
// 4. actions      - Shuffled action index and Explore grid selection
// 5. stories      - Deduplicated story cards
// 6. today        - The Today panel view model
// 7. canvas       - Drawing surface, text measuring and SVG encoding
// 8. share        - Share-card layout and the share target
// 9. app          - Application state and view panels
// 10. events      - Keyboard and mouse handling
// 11. ui          - Rendering (drawing)
// 12. cli/logging - Command line and file logging
//
// Each section is clearly marked with section headers for easy navigation.
// ============================================================================

mod actions;
mod app;
mod canvas;
mod cli;
mod content;
mod events;
mod logging;
mod schedule;
mod share;
mod stories;
mod theme;
mod today;
mod ui;

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::actions::ActionIndex;
use crate::app::App;
use crate::cli::{Cli, Command};
use crate::content::{Content, FileSource, load_content};
use crate::schedule::{Slot, select_day};
use crate::share::{CardIndex, ShareTarget, SystemShare, build_payload, default_share_dir, write_payload};
use crate::stories::collect_stories;
use crate::theme::{Theme, display_label_for_key};
use crate::today::TodayView;

fn main() {
    let cli = Cli::parse();

    match cli.log_dir.clone().or_else(logging::default_log_dir) {
        Some(dir) => {
            if let Err(err) = logging::init_logging(cli.log_level.as_str(), &dir) {
                eprintln!("warning: logging disabled: {err}");
            }
        }
        None => eprintln!("warning: logging disabled: no data directory"),
    }

    if let Err(err) = run(cli) {
        log::error!(
            "event=app_exit status=error error={}",
            logging::single_line(&format!("{err:#}"), 240)
        );
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let now = cli.at.unwrap_or_else(|| Local::now().naive_local());

    match cli.command {
        Some(Command::Share { card, ref output }) => share_headless(&cli, now, card, output.clone()),
        Some(Command::Check) => check(&cli, now),
        None => run_tui(&cli, now),
    }
}

// ============================================================================
// MAIN LOOP - terminal UI initialization and event loop
// ============================================================================

fn run_tui(cli: &Cli, now: NaiveDateTime) -> Result<()> {
    let share = SystemShare::detect(cli.share_dir.clone(), cli.no_share)
        .map(|target| Box::new(target) as Box<dyn ShareTarget>);
    let mut app = App::new(share);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, event::EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, cli, now);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        event::DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    res
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cli: &Cli,
    now: NaiveDateTime,
) -> Result<()> {
    // One frame in the loading state before the file is read.
    terminal.draw(|frame| ui::draw(frame, app))?;
    let source = FileSource::new(cli.content.clone());
    app.apply_load(load_content(&source), now, &mut rand::thread_rng());
    if let Some(filter) = cli.filter {
        app.set_filter(filter);
    }

    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if events::handle_key(app, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => events::handle_mouse(app, mouse),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    log::info!("event=app_exit status=ok");
    Ok(())
}

// ============================================================================
// SUBCOMMANDS
// ============================================================================

fn load(cli: &Cli) -> Result<Content> {
    let source = FileSource::new(cli.content.clone());
    load_content(&source).with_context(|| {
        format!(
            "could not load {}; run python generate_content.py first",
            source.path().display()
        )
    })
}

fn share_headless(cli: &Cli, now: NaiveDateTime, card: u8, output: Option<PathBuf>) -> Result<()> {
    let card = CardIndex::from_number(card).ok_or_else(|| anyhow!("card must be 1, 2 or 3"))?;
    let content = load(cli)?;
    let view = TodayView::build(&content, now).ok_or_else(|| anyhow!("content has no days"))?;
    let payload = build_payload(&view, card)?;

    let path = match output {
        Some(path) => {
            fs::write(&path, &payload.bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            path
        }
        None => {
            let dir = cli
                .share_dir
                .clone()
                .or_else(default_share_dir)
                .ok_or_else(|| anyhow!("no share directory; pass --output or --share-dir"))?;
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            write_payload(&dir, &payload)?
        }
    };

    log::info!(
        "event=share status=ok mode=headless card={} path={}",
        card.number(),
        path.display()
    );
    println!("{}", path.display());
    Ok(())
}

fn check(cli: &Cli, now: NaiveDateTime) -> Result<()> {
    let content = load(cli)?;
    if content.days.is_empty() {
        bail!("{} contains no days", cli.content.display());
    }
    print!("{}", summarize(&content, now));
    Ok(())
}

fn summarize(content: &Content, now: NaiveDateTime) -> String {
    let mut out = String::new();
    let slot = Slot::at(now);
    let _ = writeln!(out, "days: {}", content.days.len());
    match select_day(&content.days, now.date()) {
        Some(day) => {
            let _ = writeln!(out, "today: {} (day {}, {})", day.date, day.day, day.theme);
        }
        None => {
            let _ = writeln!(out, "today: none");
        }
    }
    let _ = writeln!(out, "slot: {}", slot.label());

    let shareable: Vec<String> = match TodayView::build(content, now) {
        Some(view) => CardIndex::ALL
            .into_iter()
            .filter(|card| build_payload(&view, *card).is_ok())
            .map(|card| card.number().to_string())
            .collect(),
        None => Vec::new(),
    };
    let _ = writeln!(out, "shareable cards: {}", shareable.join(" "));

    let index = ActionIndex::build(content, &mut rand::thread_rng());
    let _ = writeln!(out, "actions: {}", index.len());
    for theme in Theme::ALL {
        let key = theme.key();
        let _ = writeln!(
            out,
            "  {key} ({}): {}",
            display_label_for_key(key),
            index.count_for(theme)
        );
    }
    let _ = writeln!(out, "stories: {}", collect_stories(content).len());
    out
}
