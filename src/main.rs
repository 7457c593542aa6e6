mod backdrop;
mod config;
mod pump;
mod stopwatch;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use timer_core::TimerState;

use crate::backdrop::Backdrop;
use crate::config::{AppConfig, PanelStyle};
use crate::pump::DeadlinePump;
use crate::stopwatch::{LapLog, Stopwatch, TimeLabel};
use crate::ui::{Button, PanelLayout, StopwatchView};

const APP_NAME: &str = "Stopwatch";

// Wait used when no tick is pending; only input can change anything then.
const IDLE_POLL: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Action {
    ToggleRun,
    Reset,
    Lap,
    ScrollUp,
    ScrollDown,
    Quit,
}

impl Action {
    fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::ToggleRun),
            KeyCode::Char('l') => Some(Action::Lap),
            KeyCode::Char('r') => Some(Action::Reset),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }

    fn from_button(button: Button) -> Self {
        match button {
            Button::StartStop => Action::ToggleRun,
            Button::Reset => Action::Reset,
            Button::Lap => Action::Lap,
        }
    }
}

struct StopwatchApp {
    stopwatch: Stopwatch,
    backdrop: Backdrop,
    style: PanelStyle,
    origin: Instant,
    layout: Option<PanelLayout>,
    should_quit: bool,
}

impl StopwatchApp {
    fn new(config: AppConfig, backdrop: Backdrop) -> Self {
        let stopwatch = Stopwatch::new(
            DeadlinePump::new(),
            TimeLabel::default(),
            LapLog::default(),
            config.tick_interval,
        );
        Self {
            stopwatch,
            backdrop,
            style: config.panel,
            origin: Instant::now(),
            layout: None,
            should_quit: false,
        }
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let view = StopwatchView {
            time: &self.stopwatch.display().text,
            running: self.stopwatch.engine().is_running(),
            laps: self.stopwatch.log(),
        };
        let backdrop = &mut self.backdrop;
        let style = &self.style;
        let mut layout = None;
        terminal.draw(|f| layout = Some(ui::draw_stopwatch(f, backdrop, style, &view)))?;
        self.layout = layout;
        Ok(())
    }

    fn handle_action(&mut self, action: Action) {
        let now = self.now();
        match action {
            Action::ToggleRun => {
                let was = self.stopwatch.engine().state();
                self.stopwatch.toggle(now);
                log::debug!(
                    "{:?} -> {:?} at {}",
                    was,
                    self.stopwatch.engine().state(),
                    self.stopwatch.last_rendered()
                );
            }
            Action::Reset => {
                self.stopwatch.reset();
                log::debug!("reset");
            }
            Action::Lap => match self.stopwatch.lap() {
                Some(lap) => log::info!("{}", lap),
                None => log::debug!("lap ignored while {:?}", self.stopwatch.engine().state()),
            },
            Action::ScrollUp => self.stopwatch.log_mut().scroll_up(),
            Action::ScrollDown => self.stopwatch.log_mut().scroll_down(),
            Action::Quit => {
                if self.stopwatch.engine().state() == TimerState::Running {
                    self.stopwatch.stop(now);
                }
                self.should_quit = true;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(action) = Action::from_key(key) {
            self.handle_action(action);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let hit = self
            .layout
            .as_ref()
            .and_then(|layout| layout.hit(mouse.column, mouse.row));
        if let Some(button) = hit {
            self.handle_action(Action::from_button(button));
        }
    }

    /// Delivers every tick whose deadline has passed.
    fn handle_pump(&mut self) {
        if self.stopwatch.scheduler().is_idle() {
            return;
        }
        let due = self.stopwatch.scheduler_mut().take_due(Instant::now());
        for handle in due {
            let now = self.now();
            self.stopwatch.on_tick(handle, now);
        }
    }

    fn poll_timeout(&self) -> Duration {
        self.stopwatch
            .scheduler()
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL)
    }
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut StopwatchApp) -> Result<()> {
    loop {
        app.draw(terminal)?;

        // Input first so that a stop or reset cancels a tick that is already due.
        if event::poll(app.poll_timeout())? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
        if app.should_quit {
            break;
        }
        app.handle_pump();
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Sends logs to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}: logging disabled, can't open {}: {}", APP_NAME, path.display(), e);
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<()> {
    let config = AppConfig::default();
    init_logging(&config.log_file);
    log::info!("{} PID is {}", APP_NAME, std::process::id());

    // One bounded attempt, before the UI takes over the terminal.
    let backdrop = Backdrop::fetch(&config.backdrop);
    if !backdrop.has_image() {
        log::info!("Using solid backdrop");
    }

    let mut app = StopwatchApp::new(config, backdrop);
    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    log::info!("{} exiting", APP_NAME);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> StopwatchApp {
        StopwatchApp::new(AppConfig::default(), Backdrop::solid(ratatui::style::Color::Black))
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::from_key(press(KeyCode::Enter)), Some(Action::ToggleRun));
        assert_eq!(Action::from_key(press(KeyCode::Char(' '))), Some(Action::ToggleRun));
        assert_eq!(Action::from_key(press(KeyCode::Char('l'))), Some(Action::Lap));
        assert_eq!(Action::from_key(press(KeyCode::Char('r'))), Some(Action::Reset));
        assert_eq!(Action::from_key(press(KeyCode::Up)), Some(Action::ScrollUp));
        assert_eq!(Action::from_key(press(KeyCode::Char('j'))), Some(Action::ScrollDown));
        assert_eq!(Action::from_key(press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            Action::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(Action::from_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(Action::from_key(release), None);
    }

    #[test]
    fn test_actions_drive_stopwatch() {
        let mut app = app();
        app.handle_action(Action::Lap);
        assert!(app.stopwatch.log().entries.is_empty());

        app.handle_action(Action::ToggleRun);
        assert!(app.stopwatch.engine().is_running());
        assert!(!app.stopwatch.scheduler().is_idle());

        app.handle_action(Action::Lap);
        assert_eq!(app.stopwatch.log().entries.len(), 1);

        app.handle_action(Action::ToggleRun);
        assert_eq!(app.stopwatch.engine().state(), TimerState::Paused);
        assert!(app.stopwatch.scheduler().is_idle());

        app.handle_action(Action::Reset);
        assert_eq!(app.stopwatch.display().text, "00:00:00.000");
        assert!(app.stopwatch.log().entries.is_empty());
    }

    #[test]
    fn test_no_tick_after_stop() {
        let mut app = app();
        app.handle_action(Action::ToggleRun);
        app.handle_action(Action::ToggleRun);
        let shown = app.stopwatch.display().text.clone();

        std::thread::sleep(Duration::from_millis(80));
        app.handle_pump();
        assert_eq!(app.stopwatch.display().text, shown);
    }

    #[test]
    fn test_pump_delivers_due_tick() {
        let mut app = app();
        app.handle_action(Action::ToggleRun);
        let before = app.stopwatch.pending_tick();

        std::thread::sleep(Duration::from_millis(80));
        app.handle_pump();
        assert!(app.stopwatch.pending_tick().is_some());
        assert_ne!(app.stopwatch.pending_tick(), before);
    }

    #[test]
    fn test_click_on_button() {
        let mut app = app();
        let layout = PanelLayout::new(ratatui::layout::Rect::new(0, 0, 60, 26), &app.style);
        app.layout = Some(layout);
        let (_, rect) = layout.buttons[0];
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: rect.x + 1,
            row: rect.y,
            modifiers: KeyModifiers::NONE,
        });
        assert!(app.stopwatch.engine().is_running());
    }

    #[test]
    fn test_quit_stops_running_timer() {
        let mut app = app();
        app.handle_action(Action::ToggleRun);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
        assert_eq!(app.stopwatch.engine().state(), TimerState::Paused);
    }
}
