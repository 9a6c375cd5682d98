//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::game::{Control, Game};
use crate::input::{Action, key_to_action};
use crate::render::{RenderError, Renderer, Scene};
use crate::session::Session;
use crate::theme::Theme;
use crate::ui::{self, LineFlash};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Frame interval while the line-clear flash is animating.
const FRAME_MS: u64 = 16;
/// Poll timeout when no tick is scheduled (stopped, paused, game over).
const IDLE_POLL_MS: u64 = 250;

/// Renderer backed by the real terminal. Repaints the whole scene on every redraw.
pub struct TerminalRenderer {
    terminal: DefaultTerminal,
    theme: Theme,
    flash: LineFlash,
}

impl TerminalRenderer {
    pub fn new(terminal: DefaultTerminal, theme: Theme) -> Self {
        Self {
            terminal,
            theme,
            flash: LineFlash::default(),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.flash.is_active()
    }
}

impl Renderer for TerminalRenderer {
    fn redraw(&mut self, scene: Scene<'_>) -> Result<(), RenderError> {
        let now = Instant::now();
        let Self {
            terminal,
            theme,
            flash,
        } = self;
        terminal.draw(|f| ui::draw(f, scene, theme, flash, now))?;
        Ok(())
    }

    fn game_over(&mut self, scene: Scene<'_>) -> Result<(), RenderError> {
        info!(score = scene.state.score, "showing game over");
        self.redraw(scene)
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    autostart: bool,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, autostart: bool) -> Self {
        Self {
            config,
            theme,
            autostart,
        }
    }

    pub fn run(self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                size,
            },
        };

        let game = Game::new(&self.config);
        let (need_w, need_h) = ui::required_terminal_size(game.board());
        let (cols, rows) = size()?;
        if cols < need_w || rows < need_h {
            warn!(cols, rows, need_w, need_h, "terminal smaller than the board");
        }

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let renderer = TerminalRenderer::new(terminal, self.theme);
        let mut session = Session::new(game, renderer);
        let result = run_loop(&mut session, self.autostart);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        if let Err(e) = &result {
            warn!(error = %e, "game loop ended with error");
        }
        result
    }
}

fn run_loop(session: &mut Session<TerminalRenderer>, autostart: bool) -> Result<()> {
    if autostart {
        session.control(Control::Start, Instant::now())?;
    } else {
        session.redraw()?;
    }

    loop {
        let now = Instant::now();
        session.poll(now)?;

        let animating = session.renderer().is_animating();
        if animating {
            session.redraw()?;
        }
        let mut timeout = session
            .time_until_tick(now)
            .unwrap_or(Duration::from_millis(IDLE_POLL_MS));
        if animating {
            timeout = timeout.min(Duration::from_millis(FRAME_MS));
        }

        if !event::poll(timeout)? {
            continue;
        }
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key_to_action(key) {
                    Action::Quit => {
                        info!(score = session.game().state().score, "quit");
                        return Ok(());
                    }
                    Action::Move(m) => {
                        let outcome = session.handle_move(m)?;
                        debug!(?m, ?outcome, "move");
                    }
                    Action::Control(c) => session.control(c, Instant::now())?,
                    Action::None => {}
                },
                Event::Resize(..) => session.redraw()?,
                _ => {}
            }
        }
    }
}
