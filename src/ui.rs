//! Layout and drawing: board, active piece, sidebar, overlays, line-clear flash.

use crate::bag::BAG_SIZE;
use crate::board::{Board, Cell};
use crate::game::Status;
use crate::render::Scene;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each board cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;

/// Duration of the white flash on cleared rows.
const LINE_CLEAR_FLASH_MS: u32 = 350;

/// Playfield size in terminal cells (border included) for a board.
fn playfield_size(board: &Board) -> (u16, u16) {
    (
        board.width() as u16 * CELL_WIDTH + 2,
        board.height() as u16 + 2,
    )
}

/// Smallest terminal that shows the whole game.
pub fn required_terminal_size(board: &Board) -> (u16, u16) {
    let (pw, ph) = playfield_size(board);
    (pw + SIDEBAR_WIDTH, ph)
}

/// Playfield and sidebar rects, centred in `area`.
fn game_layout(area: Rect, board: &Board) -> (Rect, Rect) {
    let (pw, ph) = playfield_size(board);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    (inner[0], inner[1])
}

/// Board cells inside the playfield border.
fn board_rect(playfield: Rect) -> Rect {
    Rect {
        x: playfield.x + 1,
        y: playfield.y + 1,
        width: playfield.width.saturating_sub(2),
        height: playfield.height.saturating_sub(2),
    }
}

/// Fade effect over recently cleared rows, kept across frames.
#[derive(Default)]
pub struct LineFlash {
    effect: Option<Effect>,
    last_processed: Option<Instant>,
}

impl LineFlash {
    pub fn is_active(&self) -> bool {
        self.effect.as_ref().is_some_and(|e| !e.done())
    }

    fn start(&mut self, rows: &[usize], board_rect: Rect) {
        let positions: HashSet<u16> = rows
            .iter()
            .map(|&y| board_rect.y + y as u16)
            .filter(|&y| y < board_rect.y + board_rect.height)
            .collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&pos.y)
        }));
        let effect = fx::fade_from(
            Color::White,
            Color::White,
            (LINE_CLEAR_FLASH_MS, Interpolation::Linear),
        )
        .with_filter(filter)
        .with_area(board_rect);
        self.effect = Some(effect);
        self.last_processed = None;
    }

    fn process(&mut self, frame: &mut Frame, board_rect: Rect, now: Instant) {
        let delta = self
            .last_processed
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        self.last_processed = Some(now);

        if let Some(effect) = &mut self.effect {
            frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
            if effect.done() {
                self.effect = None;
                self.last_processed = None;
            }
        }
    }
}

/// Draw one full frame for the scene.
pub fn draw(frame: &mut Frame, scene: Scene<'_>, theme: &Theme, flash: &mut LineFlash, now: Instant) {
    let area = frame.area();
    let (playfield, sidebar) = game_layout(area, scene.board);
    let cells = board_rect(playfield);

    draw_playfield(frame, scene, theme, playfield);
    draw_sidebar(frame, scene, theme, sidebar);

    if !scene.cleared.is_empty() {
        flash.start(scene.cleared, cells);
    }
    flash.process(frame, cells, now);

    match scene.state.status {
        Status::Running => {}
        Status::Stopped => draw_overlay(
            frame,
            theme,
            playfield,
            Span::styled(" Ready ", Style::default().fg(Color::Black).bg(Color::Green)),
            " S start    Q quit ",
        ),
        Status::Paused => draw_overlay(
            frame,
            theme,
            playfield,
            Span::styled(" Paused ", Style::default().fg(Color::Black).bg(Color::Yellow)),
            " P resume   R reset ",
        ),
        Status::Over => draw_game_over(frame, scene, theme, playfield),
    }
}

fn draw_playfield(frame: &mut Frame, scene: Scene<'_>, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" bagtris ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let piece_cells: HashSet<(i32, i32)> = scene.piece.cells().collect();
    let piece_color = theme.block_color(scene.piece.color());
    let empty_style = Style::default().fg(theme.div_line).bg(theme.bg);
    let buf = frame.buffer_mut();

    for (y, row) in scene.board.rows().enumerate() {
        let ry = inner.y + y as u16;
        if ry >= inner.y + inner.height {
            break;
        }
        for (x, cell) in row.iter().enumerate() {
            let rx = inner.x + x as u16 * CELL_WIDTH;
            if rx + CELL_WIDTH > inner.x + inner.width {
                break;
            }
            let (symbol, style) = if piece_cells.contains(&(x as i32, y as i32)) {
                ("██", Style::default().fg(piece_color).bg(theme.bg))
            } else {
                match cell {
                    Cell::Locked(c) => ("██", Style::default().fg(theme.block_color(*c)).bg(theme.bg)),
                    Cell::Empty => (" ·", empty_style),
                }
            };
            buf.set_string(rx, ry, symbol, style);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, scene: Scene<'_>, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let hint_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);
    let state = scene.state;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Stats
            Constraint::Length(1), // gap
            Constraint::Length(9), // Controls
        ])
        .split(area);

    let secs = state.elapsed_ms / 1000;
    let status = match state.status {
        Status::Stopped => "stopped",
        Status::Running => "running",
        Status::Paused => "paused",
        Status::Over => "game over",
    };
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let stats = vec![
        stat("Score:  ", state.score.to_string()),
        stat("Lines:  ", state.lines_cleared.to_string()),
        stat("Pieces: ", state.pieces_locked.to_string()),
        stat("Speed:  ", format!("{} ms", state.interval_ms)),
        stat("Time:   ", format!("{:02}:{:02}", secs / 60, secs % 60)),
        stat("Bag:    ", format!("{}/{}", scene.bag_left, BAG_SIZE)),
        stat("State:  ", status.to_string()),
    ];
    Paragraph::new(stats)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[0], frame.buffer_mut());

    let hints = [
        ("←/→ h/l", "move"),
        ("↑ k", "rotate"),
        ("↓ j", "step down"),
        ("S/Enter", "start"),
        ("P/Space", "pause"),
        ("R", "reset"),
        ("Q/Esc", "quit"),
    ];
    let lines: Vec<Line> = hints
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:<9}"), title_style),
                Span::styled(*what, hint_style),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[2], frame.buffer_mut());
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_overlay(frame: &mut Frame, theme: &Theme, area: Rect, title: Span<'static>, hint: &str) {
    let popup = centered_popup(area, 26, 5);
    let lines = vec![
        Line::from(""),
        Line::from(title),
        Line::from(""),
        Line::from(Span::styled(hint.to_string(), Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, scene: Scene<'_>, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 26, 8);
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", scene.state.score), fg.bold())),
        Line::from(Span::styled(format!(" Lines: {} ", scene.state.lines_cleared), fg)),
        Line::from(""),
        Line::from(Span::styled(" R reset    Q quit ", fg)),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" bagtris ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}
