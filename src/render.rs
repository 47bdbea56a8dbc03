//! Terminal frontend: maze walls, fog of war, radar ring and HUD.
//!
//! The maze is laid out on a glyph grid of `(2h+1) x (2w+1)`: odd/odd positions are
//! cells, odd/even and even/odd positions are wall slots, even/even are corner posts.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

use crate::game::{next_radar_radius, Game};

const CELL_W: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    Avatar,
    Goal,
    Wall,
    Empty,
    Radar,
    Dark,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

impl Cell {
    const fn new(glyph: Glyph, color: Color) -> Self {
        Self { glyph, color }
    }
}

const DARK: Cell = Cell::new(Glyph::Dark, Color::Reset);
const EMPTY: Cell = Cell::new(Glyph::Empty, Color::Reset);
const WALL: Cell = Cell::new(Glyph::Wall, Color::Blue);

pub struct Renderer {
    cols: usize,
    rows: usize,
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    too_small: bool,
    origin_x: u16,
    origin_y: u16,
    radar_radius: f64,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        let cols = 2 * width + 1;
        let rows = 2 * height + 1;
        Self {
            cols,
            rows,
            last: vec![EMPTY; cols * rows],
            last_hud: String::new(),
            needs_full: true,
            too_small: false,
            origin_x: 0,
            origin_y: 1,
            radar_radius: 1.0,
        }
    }

    /// Terminal size needed to show the whole layout plus the HUD, saturating at the
    /// largest size a terminal can report.
    pub fn required_size(&self) -> (u16, u16) {
        let w = u16::try_from(self.cols * CELL_W).unwrap_or(u16::MAX);
        let h = u16::try_from(self.rows + 2).unwrap_or(u16::MAX);
        (w, h)
    }

    /// Advances the radar pulse from the avatar's current distance to the goal.
    pub fn update_radar(&mut self, game: &Game) {
        self.radar_radius = next_radar_radius(
            self.radar_radius,
            game.round.distance_to_goal(),
            game.settings.diagonal(),
        );
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }
}

/// Glyph for each slot of the layout grid, row-major.
pub fn compose(game: &Game, radar_radius: f64) -> Vec<Cell> {
    let maze = &game.round.maze;
    let avatar = &game.round.avatar;
    let goal = &game.round.goal;
    let half = maze.cell_size() / 2.0;
    let sight = game.settings.sight_range();
    let (cols, rows) = (2 * maze.width() + 1, 2 * maze.height() + 1);

    let mut cells = Vec::with_capacity(cols * rows);
    for gr in 0..rows {
        for gc in 0..cols {
            let px = gc as f64 * half;
            let py = gr as f64 * half;
            let dist = ((px - avatar.x).powi(2) + (py - avatar.y).powi(2)).sqrt();
            if dist > sight {
                cells.push(DARK);
                continue;
            }
            let cell = match (gr % 2, gc % 2) {
                (0, 0) => WALL,
                (0, _) => wall_or_empty(maze.h_walls()[gr / 2][gc / 2]),
                (_, 0) => wall_or_empty(maze.v_walls()[gr / 2][gc / 2]),
                _ => {
                    let (row, col) = (gr / 2, gc / 2);
                    if (avatar.cell_y, avatar.cell_x) == (row, col) {
                        Cell::new(Glyph::Avatar, Color::Yellow)
                    } else if (goal.cell_y, goal.cell_x) == (row, col) {
                        Cell::new(Glyph::Goal, Color::Green)
                    } else if (dist - radar_radius).abs() < half {
                        Cell::new(Glyph::Radar, Color::DarkGrey)
                    } else {
                        EMPTY
                    }
                }
            };
            cells.push(cell);
        }
    }
    cells
}

fn wall_or_empty(wall: bool) -> Cell {
    if wall {
        WALL
    } else {
        EMPTY
    }
}

pub fn hud_line(game: &Game, now: Instant) -> String {
    format!(
        "Time: {}  Last: {}  Best: {}  Solved: {}  (arrows/hjkl move, r new maze, q quit)",
        format_secs(game.round.elapsed(now)),
        secs_or_none(game.last_time),
        secs_or_none(game.best_time),
        game.rounds_won
    )
}

fn format_secs(d: Duration) -> String {
    format!("{:.2}", d.as_secs_f64())
}

fn secs_or_none(d: Option<Duration>) -> String {
    d.map(format_secs).unwrap_or_else(|| "None".to_string())
}

pub fn render<W: Write>(
    out: &mut W,
    game: &Game,
    renderer: &mut Renderer,
    now: Instant,
) -> io::Result<()> {
    let (needed_w, needed_h) = renderer.required_size();

    out.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        if !renderer.too_small {
            warn!(term_w, term_h, needed_w, needed_h, "terminal too small for maze");
            renderer.too_small = true;
        }
        out.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        out.queue(Print(msg))?;
        out.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }
    if renderer.too_small {
        renderer.too_small = false;
        out.queue(Clear(ClearType::All))?;
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
        out.queue(Clear(ClearType::All))?;
    }

    let hud = hud_line(game, now);
    if renderer.needs_full || hud != renderer.last_hud {
        out.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        out.queue(SetForegroundColor(Color::White))?;
        out.queue(Clear(ClearType::CurrentLine))?;
        out.queue(Print(&hud))?;
        out.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    let cells = compose(game, renderer.radar_radius);
    for (idx, cell) in cells.into_iter().enumerate() {
        if renderer.needs_full || cell != renderer.last[idx] {
            renderer.last[idx] = cell;
            draw_cell(out, renderer, idx % renderer.cols, idx / renderer.cols, cell)?;
        }
    }
    renderer.needs_full = false;

    out.flush()
}

fn draw_cell<W: Write>(
    out: &mut W,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: Cell,
) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Avatar => "😃",
        Glyph::Goal => "🏁",
        Glyph::Wall => "██",
        Glyph::Empty => "  ",
        Glyph::Radar => "◦ ",
        Glyph::Dark => "  ",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    out.queue(MoveTo(x_pos, y_pos))?;
    out.queue(SetForegroundColor(cell.color))?;
    out.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            out.queue(Print(' '))?;
        }
    }
    out.queue(ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Entity;
    use crate::config::Settings;
    use rand::rngs::mock::StepRng;

    fn game_3x3(sight_cells: f64) -> Game {
        let settings = Settings {
            width: 3,
            height: 3,
            sight_cells,
            ..Settings::default()
        };
        let mut rng = StepRng::new(0, 0);
        let mut game = Game::new(settings, &mut rng, Instant::now());
        game.round.avatar = Entity::at_cell_center(0, 0, 50.0, 256.0);
        game.round.goal = Entity::at_cell_center(2, 2, 50.0, 0.0);
        game
    }

    #[test]
    fn layout_places_walls_and_entities() {
        let game = game_3x3(10.0);
        let cells = compose(&game, -100.0);
        let at = |gr: usize, gc: usize| cells[gr * 7 + gc].glyph;

        assert_eq!(cells.len(), 49);
        assert_eq!(at(1, 1), Glyph::Avatar);
        assert_eq!(at(5, 5), Glyph::Goal);
        assert_eq!(at(0, 0), Glyph::Wall);
        // v_walls[0][1] is open in the StepRng maze, v_walls[0][0] is the boundary.
        assert_eq!(at(1, 2), Glyph::Empty);
        assert_eq!(at(1, 0), Glyph::Wall);
        // h_walls[1][0] stays, h_walls[1][2] is open.
        assert_eq!(at(2, 1), Glyph::Wall);
        assert_eq!(at(2, 5), Glyph::Empty);
    }

    #[test]
    fn fog_hides_slots_beyond_sight() {
        let game = game_3x3(1.0);
        let cells = compose(&game, -100.0);
        assert_eq!(cells[7 + 1].glyph, Glyph::Avatar);
        assert_eq!(cells[5 * 7 + 5].glyph, Glyph::Dark);
    }

    #[test]
    fn radar_ring_marks_cells_at_radius() {
        let game = game_3x3(10.0);
        let cells = compose(&game, 50.0);
        assert_eq!(cells[7 + 3].glyph, Glyph::Radar);
        assert_eq!(cells[3 * 7 + 1].glyph, Glyph::Radar);
        assert_eq!(cells[7 + 5].glyph, Glyph::Empty);
    }

    #[test]
    fn hud_reports_last_and_best_time() {
        let mut game = game_3x3(10.0);
        let now = game.round.started + Duration::from_millis(1_500);
        assert!(hud_line(&game, now).starts_with("Time: 1.50  Last: None  Best: None"));
        game.record_time(Duration::from_millis(9_250));
        assert!(hud_line(&game, now).contains("Last: 9.25  Best: 9.25  Solved: 1"));
        game.record_time(Duration::from_millis(12_000));
        assert!(hud_line(&game, now).contains("Last: 12.00  Best: 9.25  Solved: 2"));
    }

    #[test]
    fn required_size_covers_layout_and_hud() {
        assert_eq!(Renderer::new(3, 3).required_size(), (14, 9));
        assert_eq!(Renderer::new(40_000, 3).required_size(), (u16::MAX, 9));
    }
}
