//! Hero Example - Typewriter headline and terminal word cycler
//!
//! Renders the hero headline and the terminal word panel in the terminal,
//! driving both cyclers from one real-time scheduler loop. The terminal panel
//! fades in once it is "revealed", one second after start.
//!
//! Run with: cargo run --example hero -- --seconds 20
//! Press q or Esc to quit.

use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, ClearType},
};
use tracing_subscriber::EnvFilter;

use spark_typewriter::{
    ElementId, EventSource, IntersectionEntry, RevealTracker, Scheduler, SiteConfig, TextCycler,
};

/// Upper bound on how long the loop sleeps between redraws.
const FRAME: Duration = Duration::from_millis(16);

const TERMINAL_PANEL: ElementId = ElementId::new(1);

#[derive(Parser, Debug)]
#[command(about = "Typewriter hero demo")]
struct Args {
    /// Page config (TOML). Portfolio defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit after this many seconds.
    #[arg(long, default_value_t = 30)]
    seconds: u64,
}

struct Page {
    hero: TextCycler,
    words: TextCycler,
    panel: RevealTracker,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SiteConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SiteConfig::default(),
    };

    let scheduler = Scheduler::new();
    let viewport = EventSource::<IntersectionEntry>::new();
    let page = Page {
        hero: config.hero.start(&scheduler)?,
        words: config.terminal.start(&scheduler)?,
        panel: RevealTracker::observe(&viewport, Some(TERMINAL_PANEL), config.reveal_threshold)?,
    };

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = run(&mut stdout, &scheduler, &viewport, &page, Duration::from_secs(args.seconds));

    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(
    stdout: &mut Stdout,
    scheduler: &Scheduler,
    viewport: &EventSource<IntersectionEntry>,
    page: &Page,
    limit: Duration,
) -> anyhow::Result<()> {
    let start = Instant::now();

    loop {
        let now = start.elapsed();
        if now >= limit {
            return Ok(());
        }

        scheduler.advance_to(now);
        if now >= Duration::from_secs(1) && !page.panel.has_been_seen() {
            viewport.emit(&IntersectionEntry::new(TERMINAL_PANEL, 1.0));
        }
        draw(stdout, page)?;

        let wait = scheduler
            .next_deadline()
            .map_or(FRAME, |deadline| deadline.saturating_sub(now))
            .min(FRAME);
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    return Ok(());
                }
            }
        }
    }
}

fn caret(visible: bool) -> &'static str {
    if visible { "▌" } else { " " }
}

fn draw(stdout: &mut Stdout, page: &Page) -> io::Result<()> {
    queue!(
        stdout,
        terminal::Clear(ClearType::All),
        cursor::MoveTo(2, 1),
        SetAttribute(Attribute::Bold),
        Print(page.hero.display_text()),
        Print(caret(page.hero.cursor_visible())),
        SetAttribute(Attribute::Reset),
    )?;

    if page.panel.has_been_seen() {
        queue!(
            stdout,
            cursor::MoveTo(2, 4),
            SetAttribute(Attribute::Dim),
            Print("united we "),
            SetAttribute(Attribute::Reset),
            Print(page.words.display_text()),
            Print(caret(page.words.cursor_visible())),
        )?;
    }

    queue!(stdout, cursor::MoveTo(2, 7), Print("q to quit"))?;
    stdout.flush()
}
