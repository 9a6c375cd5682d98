//! Session: owns the game, the tick timer and the renderer, and applies ticks,
//! moves and control triggers one at a time.

use crate::game::{Control, Game, MoveOutcome, Status, TickOutcome};
use crate::piece::Move;
use crate::render::{RenderError, Renderer, Scene};
use crate::scheduler::TickTimer;
use std::time::{Duration, Instant};

pub struct Session<R: Renderer> {
    game: Game,
    renderer: R,
    timer: TickTimer,
}

impl<R: Renderer> Session<R> {
    pub fn new(game: Game, renderer: R) -> Self {
        Self {
            game,
            renderer,
            timer: TickTimer::idle(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn redraw(&mut self) -> Result<(), RenderError> {
        self.renderer.redraw(scene(&self.game, &[]))
    }

    /// Apply a start/pause/reset trigger and re-arm the timer to match.
    pub fn control(&mut self, control: Control, now: Instant) -> Result<(), RenderError> {
        let was_running = self.game.status() == Status::Running;
        self.game.control(control);
        let running = self.game.status() == Status::Running;
        if running != was_running {
            self.timer.follow(now, self.game.continuation());
        }
        self.redraw()
    }

    /// Player move. Redraws whether or not the move fit.
    pub fn handle_move(&mut self, m: Move) -> Result<MoveOutcome, RenderError> {
        if self.game.status() != Status::Running {
            return Ok(MoveOutcome::Ignored);
        }
        self.renderer.erase_piece(self.game.piece())?;
        let outcome = self.game.apply_move(m);
        self.redraw()?;
        Ok(outcome)
    }

    /// Run the tick if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Result<Option<TickOutcome>, RenderError> {
        if self.timer.fire(now) {
            self.step(now).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Run one tick now, regardless of the deadline, and schedule the next.
    pub fn step(&mut self, now: Instant) -> Result<TickOutcome, RenderError> {
        if self.game.status() == Status::Running {
            self.renderer.erase_piece(self.game.piece())?;
        }
        let step = self.game.tick();
        self.timer.follow(now, step.next);
        match &step.outcome {
            TickOutcome::Idle => {}
            TickOutcome::GameOver => self.renderer.game_over(scene(&self.game, &[]))?,
            TickOutcome::Fell => self.redraw()?,
            TickOutcome::Locked { cleared } => self.renderer.redraw(scene(&self.game, cleared))?,
        }
        Ok(step.outcome)
    }

    /// Wait until the next tick is due; None while nothing is scheduled.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.timer.time_until(now)
    }
}

fn scene<'a>(game: &'a Game, cleared: &'a [usize]) -> Scene<'a> {
    Scene {
        board: game.board(),
        piece: game.piece(),
        state: game.state(),
        bag_left: game.bag_remaining(),
        cleared,
    }
}
