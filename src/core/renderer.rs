/// Paints game snapshots onto a drawing surface and keeps the winner line current
use tracing::{debug, warn};

use crate::core::error::RenderError;
use crate::core::state::GameState;
use crate::core::surface::{DrawingSurface, TextElement};

pub const DEFAULT_GRID: u32 = 20;

pub const GRID_LINE_STYLE: &str = "#ccc";
pub const WALL_STYLE: &str = "#888";
pub const GOAL_STYLE: &str = "black";
pub const NO_WINNER_TEXT: &str = "No winner yet...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Cells per side
    pub grid: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self { grid: DEFAULT_GRID }
    }
}

pub fn winner_text(state: &GameState) -> String {
    match state.winner() {
        Some(winner) => format!("🎉 Winner: {winner}"),
        None => NO_WINNER_TEXT.to_string(),
    }
}

/// Owns the surface and text element it draws into.
///
/// `tile_size` is fixed at construction from the surface width; later
/// snapshots never change it, even when they announce a different grid size.
pub struct Renderer<S, T> {
    surface: S,
    text: T,
    grid: u32,
    tile_size: f64,
    grid_mismatch_reported: bool,
}

impl<S: DrawingSurface, T: TextElement> Renderer<S, T> {
    pub fn new(surface: S, text: T, config: &RendererConfig) -> Result<Self, RenderError> {
        let width = surface.width();
        if config.grid == 0 || width < config.grid {
            return Err(RenderError::InvalidGeometry { grid: config.grid, width });
        }
        let tile_size = f64::from(width) / f64::from(config.grid);
        Ok(Self {
            surface,
            text,
            grid: config.grid,
            tile_size,
            grid_mismatch_reported: false,
        })
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    pub fn grid(&self) -> u32 {
        self.grid
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn text(&self) -> &T {
        &self.text
    }

    /// Redraw everything from scratch for this snapshot.
    ///
    /// Order: clear, grid lines, walls, goal, players. Players sharing a
    /// cell overwrite each other in payload order.
    pub fn render(&mut self, state: &GameState) {
        self.check_grid_size(state);

        let width = f64::from(self.surface.width());
        let height = f64::from(self.surface.height());
        let tile = self.tile_size;

        self.surface.clear_rect(0.0, 0.0, width, height);

        self.surface.set_stroke_style(GRID_LINE_STYLE);
        for i in 0..=self.grid {
            let offset = f64::from(i) * tile;

            self.surface.begin_path();
            self.surface.move_to(offset, 0.0);
            self.surface.line_to(offset, height);
            self.surface.stroke();

            self.surface.begin_path();
            self.surface.move_to(0.0, offset);
            self.surface.line_to(width, offset);
            self.surface.stroke();
        }

        if !state.blocked.is_empty() {
            self.surface.set_fill_style(WALL_STYLE);
            for wall in &state.blocked {
                self.fill_tile(wall.x, wall.y);
            }
        }

        self.surface.set_fill_style(GOAL_STYLE);
        self.fill_tile(state.goal.x, state.goal.y);

        for (_, player) in state.players.iter() {
            self.surface.set_fill_style(&player.color);
            self.fill_tile(player.x, player.y);
        }

        self.text.set_text_content(&winner_text(state));
        debug!(players = state.players.len(), winner = ?state.winner(), "rendered snapshot");
    }

    fn fill_tile(&mut self, x: i64, y: i64) {
        let tile = self.tile_size;
        self.surface.fill_rect(x as f64 * tile, y as f64 * tile, tile, tile);
    }

    fn check_grid_size(&mut self, state: &GameState) {
        if self.grid_mismatch_reported {
            return;
        }
        if let Some(server_grid) = state.grid_size.filter(|g| *g != self.grid) {
            warn!(server_grid, grid = self.grid, "server grid size differs from configured grid");
            self.grid_mismatch_reported = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canvas::PixelCanvas;
    use crate::core::color::Rgba;
    use crate::core::surface::StatusText;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear(f64, f64, f64, f64),
        Stroke(Vec<(f64, f64)>, String),
        Fill(f64, f64, f64, f64, String),
    }

    /// Records what the renderer asks for instead of rasterizing it
    struct RecordingSurface {
        width: u32,
        height: u32,
        stroke_style: String,
        fill_style: String,
        path: Vec<(f64, f64)>,
        calls: Vec<Call>,
    }

    impl RecordingSurface {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                stroke_style: String::new(),
                fill_style: String::new(),
                path: Vec::new(),
                calls: Vec::new(),
            }
        }

        fn fills(&self) -> Vec<(f64, f64, f64, f64, String)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Fill(x, y, w, h, s) => Some((*x, *y, *w, *h, s.clone())),
                    _ => None,
                })
                .collect()
        }

        fn strokes(&self) -> Vec<(Vec<(f64, f64)>, String)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Stroke(p, s) => Some((p.clone(), s.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    impl DrawingSurface for RecordingSurface {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
            self.calls.push(Call::Clear(x, y, w, h));
        }
        fn set_stroke_style(&mut self, style: &str) {
            self.stroke_style = style.to_string();
        }
        fn set_fill_style(&mut self, style: &str) {
            self.fill_style = style.to_string();
        }
        fn begin_path(&mut self) {
            self.path.clear();
        }
        fn move_to(&mut self, x: f64, y: f64) {
            self.path.push((x, y));
        }
        fn line_to(&mut self, x: f64, y: f64) {
            self.path.push((x, y));
        }
        fn stroke(&mut self) {
            self.calls.push(Call::Stroke(self.path.clone(), self.stroke_style.clone()));
        }
        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
            self.calls.push(Call::Fill(x, y, w, h, self.fill_style.clone()));
        }
    }

    fn state(json: &str) -> GameState {
        GameState::from_json(json).unwrap()
    }

    fn recording() -> Renderer<RecordingSurface, StatusText> {
        Renderer::new(RecordingSurface::new(400, 400), StatusText::new(), &RendererConfig::default()).unwrap()
    }

    fn raster(size: u32) -> Renderer<PixelCanvas, StatusText> {
        Renderer::new(PixelCanvas::new(size, size), StatusText::new(), &RendererConfig::default()).unwrap()
    }

    const SCENARIO_A: &str =
        r#"{"goal":{"x":5,"y":5},"players":{"A":{"x":0,"y":0,"color":"red"}},"winner":null}"#;
    const SCENARIO_B: &str =
        r#"{"goal":{"x":5,"y":5},"players":{"A":{"x":5,"y":5,"color":"red"}},"winner":"A"}"#;

    #[test]
    fn tile_size_comes_from_width() {
        assert_eq!(recording().tile_size(), 20.0);
        let r = Renderer::new(PixelCanvas::new(60, 60), StatusText::new(), &RendererConfig::default()).unwrap();
        assert_eq!(r.tile_size(), 3.0);
    }

    #[test]
    fn rejects_unusable_geometry() {
        let zero = Renderer::new(PixelCanvas::new(40, 40), StatusText::new(), &RendererConfig { grid: 0 });
        assert!(matches!(zero, Err(RenderError::InvalidGeometry { grid: 0, width: 40 })));
        let narrow = Renderer::new(PixelCanvas::new(10, 10), StatusText::new(), &RendererConfig::default());
        assert!(narrow.is_err());
    }

    #[test]
    fn clears_whole_surface_first() {
        let mut r = recording();
        r.render(&state(SCENARIO_A));
        assert_eq!(r.surface().calls[0], Call::Clear(0.0, 0.0, 400.0, 400.0));
    }

    #[test]
    fn draws_21_lines_each_way_alternating() {
        let mut r = recording();
        r.render(&state(SCENARIO_A));
        let strokes = r.surface().strokes();
        assert_eq!(strokes.len(), 42);
        for (i, pair) in strokes.chunks(2).enumerate() {
            let offset = i as f64 * 20.0;
            assert_eq!(pair[0].0, vec![(offset, 0.0), (offset, 400.0)]);
            assert_eq!(pair[1].0, vec![(0.0, offset), (400.0, offset)]);
            assert!(pair.iter().all(|(_, style)| style == GRID_LINE_STYLE));
        }
    }

    #[test]
    fn grid_is_independent_of_state() {
        let mut a = recording();
        a.render(&state(SCENARIO_A));
        let mut b = recording();
        b.render(&state(r#"{"goal":{"x":19,"y":0},"players":{},"winner":"x"}"#));
        assert_eq!(a.surface().strokes(), b.surface().strokes());
    }

    #[test]
    fn goal_then_players_in_order() {
        let mut r = recording();
        r.render(&state(
            r##"{"goal":{"x":5,"y":5},"players":{
                "B":{"x":1,"y":2,"color":"blue"},
                "A":{"x":3,"y":4,"color":"#00ff00"}},"winner":null}"##,
        ));
        assert_eq!(
            r.surface().fills(),
            vec![
                (100.0, 100.0, 20.0, 20.0, "black".to_string()),
                (20.0, 40.0, 20.0, 20.0, "blue".to_string()),
                (60.0, 80.0, 20.0, 20.0, "#00ff00".to_string()),
            ]
        );
    }

    #[test]
    fn walls_go_between_grid_and_goal() {
        let mut r = recording();
        r.render(&state(
            r#"{"goal":{"x":0,"y":0},"players":{},"blocked":[{"x":2,"y":3}],"winner":null}"#,
        ));
        let fills = r.surface().fills();
        assert_eq!(fills[0], (40.0, 60.0, 20.0, 20.0, WALL_STYLE.to_string()));
        assert_eq!(fills[1].4, GOAL_STYLE);
        let last_stroke = r.surface().calls.iter().rposition(|c| matches!(c, Call::Stroke(..))).unwrap();
        let first_fill = r.surface().calls.iter().position(|c| matches!(c, Call::Fill(..))).unwrap();
        assert!(last_stroke < first_fill);
    }

    #[test]
    fn winner_text_placeholder_and_winner() {
        let mut r = recording();
        r.render(&state(SCENARIO_A));
        assert_eq!(r.text().text_content(), NO_WINNER_TEXT);
        r.render(&state(SCENARIO_B));
        assert!(r.text().text_content().contains('A'));
        r.render(&state(r#"{"goal":{"x":0,"y":0},"players":{},"winner":""}"#));
        assert_eq!(r.text().text_content(), NO_WINNER_TEXT);
    }

    #[test]
    fn scenario_a_pixels() {
        let mut r = raster(400);
        r.render(&state(SCENARIO_A));
        let red = Rgba::rgb(255, 0, 0);
        // inside the top-left cell, off the grid lines
        assert_eq!(r.surface().pixel(10, 10), Some(red));
        assert_eq!(r.surface().pixel(110, 110), Some(Rgba::BLACK));
        assert_eq!(r.surface().pixel(30, 30), Some(Rgba::TRANSPARENT));
        assert_eq!(r.surface().pixel(20, 30), Some(Rgba::rgb(204, 204, 204)));
    }

    #[test]
    fn scenario_b_player_covers_goal() {
        let mut r = raster(400);
        r.render(&state(SCENARIO_B));
        assert_eq!(r.surface().pixel(110, 110), Some(Rgba::rgb(255, 0, 0)));
        assert!(r.text().text_content().contains('A'));
    }

    #[test]
    fn last_player_wins_shared_cell() {
        let mut r = raster(400);
        r.render(&state(
            r#"{"goal":{"x":9,"y":9},"players":{
                "first":{"x":2,"y":2,"color":"red"},
                "second":{"x":2,"y":2,"color":"blue"}},"winner":null}"#,
        ));
        assert_eq!(r.surface().pixel(50, 50), Some(Rgba::rgb(0, 0, 255)));
    }

    #[test]
    fn render_is_idempotent() {
        let snapshot = state(SCENARIO_B);
        let mut once = raster(400);
        once.render(&snapshot);
        let mut twice = raster(400);
        twice.render(&snapshot);
        twice.render(&snapshot);
        assert_eq!(once.surface().pixels(), twice.surface().pixels());
        assert_eq!(once.text(), twice.text());
    }

    #[test]
    fn previous_snapshot_leaves_no_trace() {
        let mut r = raster(400);
        r.render(&state(SCENARIO_A));
        r.render(&state(r#"{"goal":{"x":19,"y":19},"players":{},"winner":null}"#));
        assert_eq!(r.surface().pixel(10, 10), Some(Rgba::TRANSPARENT));
        assert_eq!(r.surface().pixel(110, 110), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn out_of_range_tiles_are_clipped() {
        let mut r = raster(400);
        r.render(&state(
            r#"{"goal":{"x":25,"y":-1},"players":{"A":{"x":-3,"y":40,"color":"red"}},"winner":null}"#,
        ));
        assert!(!r.surface().pixels().contains(&Rgba::BLACK));
        assert!(!r.surface().pixels().contains(&Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn tile_size_ignores_server_grid_size() {
        let mut r = raster(400);
        r.render(&state(r#"{"grid_size":10,"goal":{"x":1,"y":1},"players":{},"winner":null}"#));
        assert_eq!(r.tile_size(), 20.0);
        assert_eq!(r.surface().pixel(30, 30), Some(Rgba::BLACK));
    }
}
