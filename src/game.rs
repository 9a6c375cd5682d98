//! Game state: board, active piece, bag, score, speed ramp and run state.

use crate::GameConfig;
use crate::bag::Bag;
use crate::board::Board;
use crate::piece::{Move, Piece};
use crate::scheduler::Continuation;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Run state of the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Stopped,
    Running,
    Paused,
    /// Top row reached; only `Reset` leaves this state.
    Over,
}

/// External control triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    TogglePause,
    Reset,
}

/// Fall interval ramp: `max(floor, initial - steps * step)`, one step per `every_ms` of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedRamp {
    pub initial_ms: u64,
    pub step_ms: u64,
    pub floor_ms: u64,
    pub every_ms: u64,
}

impl SpeedRamp {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            initial_ms: config.initial_interval_ms,
            step_ms: config.interval_step_ms,
            floor_ms: config.min_interval_ms,
            every_ms: config.ramp_every_ms.max(1),
        }
    }

    /// Ramp steps earned after `elapsed_ms` of play.
    pub fn steps_at(&self, elapsed_ms: u64) -> u64 {
        elapsed_ms / self.every_ms
    }

    pub fn interval_after(&self, steps: u64) -> u64 {
        self.initial_ms
            .saturating_sub(steps.saturating_mul(self.step_ms))
            .max(self.floor_ms)
    }

    pub fn interval_at(&self, elapsed_ms: u64) -> u64 {
        self.interval_after(self.steps_at(elapsed_ms))
    }
}

/// Score, counters, run state and timing. Reset wholesale on `Control::Reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub score: u32,
    pub lines_cleared: u32,
    pub pieces_locked: u32,
    pub status: Status,
    /// Play time accumulated from tick intervals.
    pub elapsed_ms: u64,
    /// Current delay between ticks.
    pub interval_ms: u64,
}

impl GameState {
    pub fn new(ramp: &SpeedRamp) -> Self {
        Self {
            score: 0,
            lines_cleared: 0,
            pieces_locked: 0,
            status: Status::Stopped,
            elapsed_ms: 0,
            interval_ms: ramp.initial_ms,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Idle,
    /// The piece moved down one row.
    Fell,
    /// The piece locked and a new one spawned. Holds the cleared row indices.
    Locked { cleared: Vec<usize> },
    /// Top row was occupied; the loop stopped.
    GameOver,
}

/// Result of a tick plus what to schedule next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub outcome: TickOutcome,
    pub next: Continuation,
}

/// Result of a player move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not running; the piece was left alone.
    Ignored,
    /// The move collided and was reverted.
    Blocked,
    Moved,
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    piece: Piece,
    bag: Bag,
    state: GameState,
    ramp: SpeedRamp,
    line_award: u32,
}

impl Game {
    pub fn new(config: &GameConfig) -> Self {
        let ramp = SpeedRamp::from_config(config);
        let mut bag = Bag::new(config.seed);
        let piece = Piece::spawn(bag.draw());
        Self {
            board: Board::new(config.width, config.height),
            piece,
            bag,
            state: GameState::new(&ramp),
            ramp,
            line_award: config.line_award,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn bag_remaining(&self) -> usize {
        self.bag.remaining()
    }

    pub fn control(&mut self, control: Control) {
        match control {
            Control::Start => self.start(),
            Control::TogglePause => self.toggle_pause(),
            Control::Reset => self.reset(),
        }
    }

    /// Stopped or Paused -> Running.
    pub fn start(&mut self) {
        if matches!(self.state.status, Status::Stopped | Status::Paused) {
            self.state.status = Status::Running;
            info!(score = self.state.score, "game started");
        }
    }

    /// Running <-> Paused. No effect when stopped or over.
    pub fn toggle_pause(&mut self) {
        self.state.status = match self.state.status {
            Status::Running => Status::Paused,
            Status::Paused => Status::Running,
            Status::Stopped | Status::Over => return,
        };
        debug!(status = ?self.state.status, "pause toggled");
    }

    /// Back to Stopped with an empty board, fresh counters and a new piece.
    pub fn reset(&mut self) {
        self.board.clear();
        self.state = GameState::new(&self.ramp);
        self.piece = Piece::spawn(self.bag.draw());
        info!("game reset");
    }

    /// One gravity step. Checks game over first, then moves the piece down,
    /// locking it and clearing lines when it cannot fall.
    pub fn tick(&mut self) -> Step {
        if self.state.status != Status::Running {
            return Step {
                outcome: TickOutcome::Idle,
                next: Continuation::Halt,
            };
        }
        if self.board.is_game_over() {
            self.state.status = Status::Over;
            info!(score = self.state.score, lines = self.state.lines_cleared, "game over");
            return Step {
                outcome: TickOutcome::GameOver,
                next: Continuation::Halt,
            };
        }

        self.piece.move_down();
        let outcome = if self.board.collides(&self.piece) {
            self.piece.move_up();
            let cleared = self.lock_piece();
            TickOutcome::Locked { cleared }
        } else {
            TickOutcome::Fell
        };

        self.advance_clock();
        Step {
            outcome,
            next: Continuation::After(self.state.interval()),
        }
    }

    /// Lock, clear, score, spawn. The new piece is not checked for overlap;
    /// a blocked spawn shows up as game over on the next tick.
    fn lock_piece(&mut self) -> Vec<usize> {
        self.board.lock(&self.piece);
        self.state.pieces_locked += 1;
        let cleared = self.board.clear_lines();
        if !cleared.is_empty() {
            let n = cleared.len() as u32;
            self.state.lines_cleared = self.state.lines_cleared.saturating_add(n);
            let award = n.saturating_mul(self.line_award);
            self.state.score = self.state.score.saturating_add(award);
            debug!(rows = ?cleared, score = self.state.score, "lines cleared");
        }
        trace!(kind = ?self.piece.kind, x = self.piece.x, y = self.piece.y, "piece locked");
        self.piece = Piece::spawn(self.bag.draw());
        cleared
    }

    /// Add the interval just waited to the play clock and re-derive the interval.
    fn advance_clock(&mut self) {
        let before = self.state.interval_ms;
        self.state.elapsed_ms += before;
        self.state.interval_ms = self.ramp.interval_at(self.state.elapsed_ms);
        if self.state.interval_ms != before {
            debug!(from = before, to = self.state.interval_ms, "fall interval ramped");
        }
    }

    /// Propose the move, keep it if it fits, otherwise undo it.
    /// A blocked `Down` only reverts; locking is left to the tick.
    pub fn apply_move(&mut self, m: Move) -> MoveOutcome {
        if self.state.status != Status::Running {
            return MoveOutcome::Ignored;
        }
        self.piece.apply(m);
        if self.board.collides(&self.piece) {
            self.piece.revert(m);
            MoveOutcome::Blocked
        } else {
            MoveOutcome::Moved
        }
    }

    /// Continuation matching the current run state.
    pub fn continuation(&self) -> Continuation {
        match self.state.status {
            Status::Running => Continuation::After(self.state.interval()),
            _ => Continuation::Halt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::shapes::{BlockColor, ShapeKind};

    fn config() -> GameConfig {
        GameConfig {
            seed: 11,
            ..GameConfig::default()
        }
    }

    fn running(config: &GameConfig) -> Game {
        let mut game = Game::new(config);
        game.start();
        game
    }

    fn fill_row_except(board: &mut Board, y: usize, gaps: &[usize]) {
        for x in 0..board.width() {
            if !gaps.contains(&x) {
                board.set(x, y, Cell::Locked(BlockColor::Green));
            }
        }
    }

    #[test]
    fn ramp_formula_clamps_at_floor() {
        let ramp = SpeedRamp {
            initial_ms: 1000,
            step_ms: 10,
            floor_ms: 200,
            every_ms: 30_000,
        };
        for n in [0u64, 1, 5, 40, 79, 80, 81, 500, u64::MAX] {
            let expected = 1000u64.saturating_sub(n.saturating_mul(10)).max(200);
            assert_eq!(ramp.interval_after(n), expected, "n = {n}");
            assert!(ramp.interval_after(n) >= 200);
        }
        assert_eq!(ramp.interval_at(29_999), 1000);
        assert_eq!(ramp.interval_at(30_000), 990);
        assert_eq!(ramp.interval_at(90_000), 970);
    }

    #[test]
    fn ticks_ramp_interval_down_to_floor() {
        let config = GameConfig {
            ramp_every_ms: 1000,
            height: 2000,
            ..config()
        };
        let mut game = running(&config);
        let mut last = game.state().interval_ms;
        assert_eq!(last, 1000);
        for _ in 0..1500 {
            let step = game.tick();
            let now = game.state().interval_ms;
            assert!(now <= last);
            assert!(now >= config.min_interval_ms);
            assert_eq!(step.next, Continuation::After(Duration::from_millis(now)));
            assert_eq!(now, game.ramp.interval_at(game.state().elapsed_ms));
            last = now;
        }
        assert_eq!(last, config.min_interval_ms);
    }

    #[test]
    fn first_ramp_step_after_period() {
        let mut game = running(&config());
        for _ in 0..29 {
            game.tick();
        }
        assert_eq!(game.state().elapsed_ms, 29_000);
        assert_eq!(game.state().interval_ms, 1000);
        game.tick();
        assert_eq!(game.state().elapsed_ms, 30_000);
        assert_eq!(game.state().interval_ms, 990);
    }

    #[test]
    fn state_machine_transitions() {
        let mut game = Game::new(&config());
        assert_eq!(game.status(), Status::Stopped);
        game.toggle_pause();
        assert_eq!(game.status(), Status::Stopped);
        game.start();
        assert_eq!(game.status(), Status::Running);
        game.start();
        assert_eq!(game.status(), Status::Running);
        game.toggle_pause();
        assert_eq!(game.status(), Status::Paused);
        game.toggle_pause();
        assert_eq!(game.status(), Status::Running);
        game.toggle_pause();
        game.start();
        assert_eq!(game.status(), Status::Running);
        game.reset();
        assert_eq!(game.status(), Status::Stopped);
    }

    #[test]
    fn no_ticks_unless_running() {
        let mut game = Game::new(&config());
        let before = game.piece().clone();
        let step = game.tick();
        assert_eq!(step.outcome, TickOutcome::Idle);
        assert_eq!(step.next, Continuation::Halt);
        assert_eq!(game.piece(), &before);

        game.start();
        game.toggle_pause();
        assert_eq!(game.tick().outcome, TickOutcome::Idle);
        assert_eq!(game.piece(), &before);
        assert_eq!(game.state().elapsed_ms, 0);
    }

    #[test]
    fn moves_ignored_unless_running() {
        let mut game = Game::new(&config());
        assert_eq!(game.apply_move(Move::Left), MoveOutcome::Ignored);
        game.start();
        assert_eq!(game.apply_move(Move::Left), MoveOutcome::Moved);
        assert_eq!(game.piece().x, 2);
        game.toggle_pause();
        assert_eq!(game.apply_move(Move::Right), MoveOutcome::Ignored);
        assert_eq!(game.piece().x, 2);
    }

    #[test]
    fn blocked_moves_revert() {
        let mut game = running(&config());
        game.piece = Piece::at(ShapeKind::O, 0, 5);
        assert_eq!(game.apply_move(Move::Left), MoveOutcome::Blocked);
        assert_eq!(game.piece(), &Piece::at(ShapeKind::O, 0, 5));

        // I against the right wall cannot turn flat.
        game.piece = Piece::at(ShapeKind::I, 9, 5);
        assert_eq!(game.apply_move(Move::Rotate), MoveOutcome::Blocked);
        assert_eq!(game.piece(), &Piece::at(ShapeKind::I, 9, 5));

        game.piece = Piece::at(ShapeKind::I, 4, 16);
        assert_eq!(game.apply_move(Move::Down), MoveOutcome::Blocked);
        assert_eq!(game.piece().y, 16);
        assert_eq!(game.state().pieces_locked, 0);
    }

    #[test]
    fn rotate_moves_when_there_is_room() {
        let mut game = running(&config());
        game.piece = Piece::at(ShapeKind::I, 3, 5);
        assert_eq!(game.apply_move(Move::Rotate), MoveOutcome::Moved);
        assert_eq!(game.piece().shape.width(), 4);
    }

    #[test]
    fn piece_locks_exactly_at_floor() {
        let mut game = running(&config());
        game.piece = Piece::spawn(ShapeKind::I);
        assert_eq!((game.piece().x, game.piece().y), (3, 0));
        let rows = game.board().height() as i32;

        // An I is four tall, so it can fall until its top is at rows - 4.
        for expected_y in 1..=rows - 4 {
            assert_eq!(game.tick().outcome, TickOutcome::Fell);
            assert_eq!(game.piece().y, expected_y);
            assert!(!game.board().is_game_over());
        }
        let step = game.tick();
        assert_eq!(step.outcome, TickOutcome::Locked { cleared: vec![] });
        assert_eq!(game.state().pieces_locked, 1);
        for y in (rows - 4)..rows {
            assert_eq!(game.board().cell(3, y as usize), Cell::Locked(BlockColor::Cyan));
        }
        assert_eq!((game.piece().x, game.piece().y), (3, 0));
        assert!(!game.board().is_game_over());
    }

    #[test]
    fn game_over_only_after_top_row_fills() {
        let mut game = running(&config());
        let mut ticks = 0;
        loop {
            ticks += 1;
            assert!(ticks < 10_000, "stack never reached the top");
            let top_locked = game.board().is_game_over();
            let step = game.tick();
            if top_locked {
                assert_eq!(step.outcome, TickOutcome::GameOver);
                assert_eq!(step.next, Continuation::Halt);
                break;
            }
            assert_ne!(step.outcome, TickOutcome::GameOver);
        }
        assert_eq!(game.status(), Status::Over);
        assert!(game.board().rows().next().is_some_and(|r| r.iter().any(|c| c.is_locked())));

        // Over is terminal until reset.
        game.start();
        game.toggle_pause();
        assert_eq!(game.status(), Status::Over);
        assert_eq!(game.tick().outcome, TickOutcome::Idle);
        game.reset();
        assert_eq!(game.status(), Status::Stopped);
        assert!(!game.board().is_game_over());
    }

    #[test]
    fn completing_bottom_row_clears_it() {
        let mut game = running(&config());
        let bottom = game.board().height() - 1;
        fill_row_except(&mut game.board, bottom, &[0]);
        game.board.set(5, bottom - 1, Cell::Locked(BlockColor::Red));
        game.piece = Piece::at(ShapeKind::I, 0, 0);

        let outcome = loop {
            match game.tick().outcome {
                TickOutcome::Fell => {}
                other => break other,
            }
        };
        assert_eq!(outcome, TickOutcome::Locked { cleared: vec![bottom] });
        assert_eq!(game.state().score, 100);
        assert_eq!(game.state().lines_cleared, 1);
        assert!(game.board().rows().next().is_some_and(|r| r.iter().all(|c| *c == Cell::Empty)));
        // The block that sat on the cleared row moved down into it.
        assert_eq!(game.board().cell(5, bottom), Cell::Locked(BlockColor::Red));
        // Three remaining I cells shifted down with everything above.
        for y in bottom - 2..=bottom {
            assert_eq!(game.board().cell(0, y), Cell::Locked(BlockColor::Cyan));
        }
        assert_eq!(game.board().cell(0, bottom - 3), Cell::Empty);
    }

    #[test]
    fn multi_row_clear_scores_each_row_once() {
        let mut game = running(&config());
        let bottom = game.board().height() - 1;
        for y in bottom - 3..=bottom {
            fill_row_except(&mut game.board, y, &[9]);
        }
        game.piece = Piece::at(ShapeKind::I, 9, 0);
        let outcome = loop {
            match game.tick().outcome {
                TickOutcome::Fell => {}
                other => break other,
            }
        };
        let TickOutcome::Locked { cleared } = outcome else {
            panic!("expected lock, got {outcome:?}");
        };
        assert_eq!(cleared.len(), 4);
        assert_eq!(game.state().score, 400);
        assert_eq!(game.state().lines_cleared, 4);
        assert!(game.board().rows().flatten().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn huge_line_award_saturates_score() {
        let config = GameConfig {
            line_award: u32::MAX,
            ..config()
        };
        let mut game = running(&config);
        let bottom = game.board().height() - 1;
        for y in bottom - 1..=bottom {
            fill_row_except(&mut game.board, y, &[9]);
        }
        game.piece = Piece::at(ShapeKind::I, 9, 0);
        let outcome = loop {
            match game.tick().outcome {
                TickOutcome::Fell => {}
                other => break other,
            }
        };
        assert_eq!(outcome, TickOutcome::Locked { cleared: vec![bottom - 1, bottom] });
        assert_eq!(game.state().score, u32::MAX);
        assert_eq!(game.state().lines_cleared, 2);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut game = running(&config());
        let bottom = game.board().height() - 1;
        fill_row_except(&mut game.board, bottom, &[]);
        game.state.score = 700;
        for _ in 0..40 {
            game.tick();
        }
        game.reset();
        let fresh = GameState::new(&game.ramp);
        assert_eq!(game.state(), &fresh);
        assert!(game.board().rows().flatten().all(|c| *c == Cell::Empty));
        assert_eq!((game.piece().x, game.piece().y), (3, 0));
    }

    #[test]
    fn spawned_piece_is_not_checked_for_overlap() {
        let mut game = running(&config());
        // Stack reaching row 1 everywhere except the first column.
        for y in 1..game.board().height() {
            fill_row_except(&mut game.board, y, &[0]);
        }
        game.piece = Piece::at(ShapeKind::O, 0, -1);
        let step = game.tick();
        assert!(matches!(step.outcome, TickOutcome::Locked { .. }));
        assert_eq!(game.status(), Status::Running);
        assert!(game.board().collides(game.piece()));
        // Detected on the following tick through the top row.
        assert!(game.board().is_game_over());
        assert_eq!(game.tick().outcome, TickOutcome::GameOver);
    }
}
