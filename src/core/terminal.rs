/// Terminal presentation of the raster: half-block cells, two pixel rows per line
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::core::canvas::PixelCanvas;
use crate::core::color::Rgba;
use crate::core::surface::DrawingSurface;

const UPPER_HALF: &str = "▀";
const PAGE: Rgba = Rgba::rgb(255, 255, 255);

/// Transparent pixels show the page color, partial alpha is blended onto it
pub fn to_terminal_color(px: Rgba) -> Color {
    let blend = |c: u8, page: u8| -> u8 {
        let a = u16::from(px.a);
        ((u16::from(c) * a + u16::from(page) * (255 - a)) / 255) as u8
    };
    Color::Rgb(blend(px.r, PAGE.r), blend(px.g, PAGE.g), blend(px.b, PAGE.b))
}

/// Draws a [`PixelCanvas`] scaled to fit, keeping square pixels.
///
/// When the area is large enough the scale is an integer, so one-pixel grid
/// lines stay sharp.
pub struct CanvasView<'a> {
    canvas: &'a PixelCanvas,
}

impl<'a> CanvasView<'a> {
    pub fn new(canvas: &'a PixelCanvas) -> Self {
        Self { canvas }
    }

    fn scale(&self, area: Rect) -> f64 {
        let fit_x = f64::from(area.width) / f64::from(self.canvas.width().max(1));
        let fit_y = f64::from(area.height) * 2.0 / f64::from(self.canvas.height().max(1));
        let fit = fit_x.min(fit_y);
        if fit >= 1.0 {
            fit.floor()
        } else {
            fit
        }
    }
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let scale = self.scale(area);
        if scale <= 0.0 {
            return;
        }
        let cols = ((f64::from(self.canvas.width()) * scale) as u16).min(area.width);
        let rows = ((f64::from(self.canvas.height()) * scale / 2.0).ceil() as u16).min(area.height);
        let left = area.x + (area.width - cols) / 2;
        let top = area.y + (area.height - rows) / 2;

        let sample = |col: u16, pixel_row: u32| -> Rgba {
            let x = (f64::from(col) / scale) as u32;
            let y = (f64::from(pixel_row) / scale) as u32;
            self.canvas.pixel(x, y).unwrap_or(Rgba::TRANSPARENT)
        };

        for row in 0..rows {
            for col in 0..cols {
                let upper = sample(col, u32::from(row) * 2);
                let lower = sample(col, u32::from(row) * 2 + 1);
                if let Some(cell) = buf.cell_mut((left + col, top + row)) {
                    cell.set_symbol(UPPER_HALF)
                        .set_fg(to_terminal_color(upper))
                        .set_bg(to_terminal_color(lower));
                }
            }
        }
    }
}

/// Lay out the whole viewer screen: board, optional leaderboard, winner line,
/// and a footer carrying the connection status
pub fn draw_screen(
    frame: &mut Frame,
    canvas: &PixelCanvas,
    winner: &str,
    leaderboard: &[(String, i64)],
    connection: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Board
            Constraint::Length(3), // Winner
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    let board_area = if leaderboard.is_empty() {
        chunks[0]
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(chunks[0]);
        frame.render_widget(leaderboard_table(leaderboard), columns[1]);
        columns[0]
    };

    let board = Block::default().borders(Borders::ALL).title("Grid");
    let inner = board.inner(board_area);
    frame.render_widget(board, board_area);
    frame.render_widget(CanvasView::new(canvas), inner);

    let status = Paragraph::new(winner.to_string())
        .block(Block::default().borders(Borders::ALL).title("Winner"))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(status, chunks[1]);

    let footer = Paragraph::new(format!("q / Esc to quit | {connection}")).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

fn leaderboard_table(leaderboard: &[(String, i64)]) -> Table<'_> {
    let rows = leaderboard
        .iter()
        .map(|(name, score)| Row::new(vec![Cell::from(name.as_str()), Cell::from(score.to_string())]));
    Table::new(rows, [Constraint::Min(10), Constraint::Length(8)])
        .header(Row::new(vec!["Player", "Score"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title("Scores"))
}
