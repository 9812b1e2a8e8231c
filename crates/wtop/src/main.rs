mod theme;
mod ui;
mod weka;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wtop_core::{run_cycle, App, ClusterSource, GroupMode, InputEvent, RefreshSchedule, Ticker};

#[derive(Parser, Debug)]
#[command(name = "wtop", about = "Live per-host performance view of a WEKA cluster")]
struct Args {
    /// Path to the weka client binary.
    #[arg(long, env = "WTOP_WEKA_BIN", default_value = "weka")]
    weka_bin: String,
    /// Initial refresh interval in seconds (0.5 to 10).
    #[arg(long, default_value_t = 1.0)]
    refresh: f64,
    /// Seconds to wait for each weka call.
    #[arg(long, default_value_t = 5)]
    timeout: u64,
    #[arg(long, value_enum, default_value_t = ModeArg::Client)]
    mode: ModeArg,
    #[arg(long, env = "WTOP_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Client,
    Backend,
}

impl From<ModeArg> for GroupMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Client => GroupMode::Client,
            ModeArg::Backend => GroupMode::Backend,
        }
    }
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("wtop: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    init_logging(args.log_file.as_deref())?;
    let source = weka::WekaCli::new(args.weka_bin, Duration::from_secs(args.timeout.max(1)));
    let mut app = App::new(args.mode.into(), RefreshSchedule::new(args.refresh));
    info!(
        mode = %app.mode,
        refresh = app.schedule.rate(),
        timeout = args.timeout,
        "starting wtop"
    );

    let mut terminal = setup_terminal().context("failed to initialise terminal")?;
    let result = run_app(&mut terminal, &mut app, &source);
    restore_terminal(&mut terminal).context("failed to restore terminal")?;
    result
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app<S: ClusterSource>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    source: &S,
) -> Result<()> {
    let input_poll = Duration::from_millis(100);
    let mut ticker = Ticker::new();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        let wait = ticker.until_due(Instant::now()).min(input_poll);
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    if let Some(input) = translate_key(key) {
                        app.handle_input(input);
                    }
                }
            }
        }

        if app.should_quit() {
            break;
        }

        if app.take_refresh_request() {
            ticker.expedite();
        }
        if ticker.is_due(Instant::now()) {
            run_cycle(app, source);
            ticker.schedule(Instant::now(), app.schedule.interval());
        }
    }

    Ok(())
}

fn translate_key(key: KeyEvent) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputEvent::Interrupt);
    }
    match key.code {
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        KeyCode::Enter => Some(InputEvent::Enter),
        KeyCode::Esc => Some(InputEvent::Escape),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Up => Some(InputEvent::Up),
        KeyCode::Down => Some(InputEvent::Down),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_interrupts() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(key), Some(InputEvent::Interrupt));
        let plain = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(translate_key(plain), Some(InputEvent::Char('c')));
    }

    #[test]
    fn navigation_keys_translate() {
        let cases = [
            (KeyCode::Enter, Some(InputEvent::Enter)),
            (KeyCode::Esc, Some(InputEvent::Escape)),
            (KeyCode::Backspace, Some(InputEvent::Backspace)),
            (KeyCode::Up, Some(InputEvent::Up)),
            (KeyCode::Down, Some(InputEvent::Down)),
            (KeyCode::Tab, None),
        ];
        for (code, expected) in cases {
            assert_eq!(translate_key(KeyEvent::new(code, KeyModifiers::NONE)), expected);
        }
    }

    #[test]
    fn args_parse_mode_and_refresh() {
        let args = Args::try_parse_from(["wtop", "--mode", "backend", "--refresh", "2.5"])
            .expect("args");
        assert_eq!(GroupMode::from(args.mode), GroupMode::Backend);
        assert_eq!(args.refresh, 2.5);
        assert_eq!(args.timeout, 5);
        assert!(Args::try_parse_from(["wtop", "--mode", "hybrid"]).is_err());
    }
}
