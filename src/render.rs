//! Renderer capability injected into the session.

use crate::board::Board;
use crate::game::GameState;
use crate::piece::Piece;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("terminal io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub board: &'a Board,
    pub piece: &'a Piece,
    pub state: &'a GameState,
    /// Pieces left in the bag before the next refill.
    pub bag_left: usize,
    /// Rows removed by the step that produced this scene (pre-shift indices).
    pub cleared: &'a [usize],
}

/// Drawing surface the simulation reports to. It never reads game state back.
pub trait Renderer {
    /// Remove the piece's footprint before it moves. Surfaces that repaint the
    /// whole scene on every redraw can leave this as a no-op.
    fn erase_piece(&mut self, _piece: &Piece) -> Result<(), RenderError> {
        Ok(())
    }

    fn redraw(&mut self, scene: Scene<'_>) -> Result<(), RenderError>;

    /// Called once when the loop stops on a full top row.
    fn game_over(&mut self, scene: Scene<'_>) -> Result<(), RenderError> {
        self.redraw(scene)
    }
}
