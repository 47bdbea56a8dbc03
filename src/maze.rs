//! Wall grid and recursive-backtracker generation.
//!
//! `h_walls[row][col]` is the wall on the top edge of cell `(row, col)`; the grid has
//! `height + 1` rows so the bottom boundary sits at `h_walls[height]`.
//! `v_walls[row][col]` is the wall on the left edge of cell `(row, col)`; the grid has
//! `width + 1` columns so the right boundary sits at `v_walls[row][width]`.

use rand::Rng;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Above,
    Below,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    width: usize,
    height: usize,
    cell_size: f64,
    h_walls: Vec<Vec<bool>>,
    v_walls: Vec<Vec<bool>>,
}

impl Maze {
    /// Fully walled grid with nothing carved yet.
    pub fn new(width: usize, height: usize, cell_size: f64) -> Self {
        assert!(width >= 1 && height >= 1, "maze needs at least one cell");
        assert!(cell_size > 0.0, "cell size must be positive");
        Self {
            width,
            height,
            cell_size,
            h_walls: vec![vec![true; width]; height + 1],
            v_walls: vec![vec![true; width + 1]; height],
        }
    }

    /// Builds a fresh maze and carves it.
    pub fn generate<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        cell_size: f64,
        rng: &mut R,
    ) -> Self {
        let mut maze = Maze::new(width, height, cell_size);
        maze.carve(rng);
        maze
    }

    /// Randomized depth-first carving from `(0, 0)`. The path stack doubles as the
    /// backtracking record; a cell is pushed once and popped once.
    pub fn carve<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut visited = Visited::new(self.width, self.height);
        let mut path = vec![CellPos::new(0, 0)];
        visited.mark(CellPos::new(0, 0));

        while let Some(&current) = path.last() {
            visited.mark(current);
            let neighbors = visited.unvisited_neighbors(current);
            if neighbors.is_empty() {
                path.pop();
                continue;
            }
            let next = neighbors[rng.gen_range(0..neighbors.len())];
            self.remove_wall_between(current, next);
            path.push(next);
        }

        debug!(
            width = self.width,
            height = self.height,
            removed = self.removed_walls(),
            "maze generated"
        );
    }

    fn remove_wall_between(&mut self, a: CellPos, b: CellPos) {
        if a.row == b.row {
            let col = (a.col + b.col + 1) / 2;
            self.v_walls[a.row][col] = false;
        } else {
            let row = (a.row + b.row + 1) / 2;
            self.h_walls[row][a.col] = false;
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn h_walls(&self) -> &[Vec<bool>] {
        &self.h_walls
    }

    pub fn v_walls(&self) -> &[Vec<bool>] {
        &self.v_walls
    }

    pub fn has_wall(&self, edge: Edge, row: usize, col: usize) -> bool {
        match edge {
            Edge::Above => self.h_walls[row][col],
            Edge::Below => self.h_walls[row + 1][col],
            Edge::Left => self.v_walls[row][col],
            Edge::Right => self.v_walls[row][col + 1],
        }
    }

    pub fn has_wall_above(&self, row: usize, col: usize) -> bool {
        self.has_wall(Edge::Above, row, col)
    }

    pub fn has_wall_below(&self, row: usize, col: usize) -> bool {
        self.has_wall(Edge::Below, row, col)
    }

    pub fn has_wall_left(&self, row: usize, col: usize) -> bool {
        self.has_wall(Edge::Left, row, col)
    }

    pub fn has_wall_right(&self, row: usize, col: usize) -> bool {
        self.has_wall(Edge::Right, row, col)
    }

    /// Interior walls that have been knocked down.
    pub fn removed_walls(&self) -> usize {
        let h = self.h_walls[1..self.height]
            .iter()
            .flatten()
            .filter(|w| !**w)
            .count();
        let v = self
            .v_walls
            .iter()
            .flat_map(|row| &row[1..self.width])
            .filter(|w| !**w)
            .count();
        h + v
    }

    /// Cells reachable from `cell` in one move without crossing a wall.
    pub fn open_neighbors(&self, cell: CellPos) -> Vec<CellPos> {
        let CellPos { row, col } = cell;
        let mut open = Vec::new();
        if !self.has_wall_left(row, col) {
            open.push(CellPos::new(row, col - 1));
        }
        if !self.has_wall_right(row, col) {
            open.push(CellPos::new(row, col + 1));
        }
        if !self.has_wall_above(row, col) {
            open.push(CellPos::new(row - 1, col));
        }
        if !self.has_wall_below(row, col) {
            open.push(CellPos::new(row + 1, col));
        }
        open
    }
}

/// Generation-only bookkeeping of which cells are already part of the maze.
#[derive(Debug, Clone)]
pub struct Visited {
    width: usize,
    height: usize,
    cells: Vec<Vec<bool>>,
}

impl Visited {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![false; width]; height],
        }
    }

    pub fn mark(&mut self, cell: CellPos) {
        self.cells[cell.row][cell.col] = true;
    }

    pub fn is_visited(&self, cell: CellPos) -> bool {
        self.cells[cell.row][cell.col]
    }

    /// In-bounds unvisited neighbors, always enumerated left, right, up, down.
    pub fn unvisited_neighbors(&self, cell: CellPos) -> Vec<CellPos> {
        let CellPos { row, col } = cell;
        let candidates = [
            (Some(row), col.checked_sub(1)),
            (Some(row), Some(col + 1)),
            (row.checked_sub(1), Some(col)),
            (Some(row + 1), Some(col)),
        ];
        candidates
            .into_iter()
            .filter_map(|(r, c)| Some(CellPos::new(r?, c?)))
            .filter(|n| n.row < self.height && n.col < self.width)
            .filter(|n| !self.is_visited(*n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn new_maze_is_fully_walled() {
        let maze = Maze::new(4, 3, 10.0);
        assert_eq!(maze.h_walls().len(), 4);
        assert_eq!(maze.v_walls()[0].len(), 5);
        assert!(maze.h_walls().iter().flatten().all(|w| *w));
        assert!(maze.v_walls().iter().flatten().all(|w| *w));
        assert_eq!(maze.removed_walls(), 0);
    }

    #[test]
    #[should_panic]
    fn zero_width_is_rejected() {
        Maze::new(0, 3, 10.0);
    }

    #[test]
    fn neighbors_enumerate_left_right_up_down() {
        let visited = Visited::new(3, 3);
        let n = visited.unvisited_neighbors(CellPos::new(1, 1));
        assert_eq!(
            n,
            vec![
                CellPos::new(1, 0),
                CellPos::new(1, 2),
                CellPos::new(0, 1),
                CellPos::new(2, 1),
            ]
        );
    }

    #[test]
    fn neighbors_skip_out_of_bounds_and_visited() {
        let mut visited = Visited::new(3, 2);
        visited.mark(CellPos::new(0, 1));
        let n = visited.unvisited_neighbors(CellPos::new(0, 0));
        assert_eq!(n, vec![CellPos::new(1, 0)]);
        let corner = visited.unvisited_neighbors(CellPos::new(1, 2));
        assert_eq!(corner, vec![CellPos::new(1, 1), CellPos::new(0, 2)]);
    }

    #[test]
    fn edge_accessors_index_the_right_grid() {
        let mut maze = Maze::new(2, 2, 10.0);
        maze.remove_wall_between(CellPos::new(0, 0), CellPos::new(0, 1));
        maze.remove_wall_between(CellPos::new(1, 1), CellPos::new(0, 1));
        assert!(!maze.has_wall_right(0, 0));
        assert!(!maze.has_wall_left(0, 1));
        assert!(!maze.has_wall_below(0, 1));
        assert!(!maze.has_wall_above(1, 1));
        assert!(maze.has_wall_below(0, 0));
        assert_eq!(maze.removed_walls(), 2);
        assert_eq!(
            maze.open_neighbors(CellPos::new(0, 1)),
            vec![CellPos::new(0, 0), CellPos::new(1, 1)]
        );
    }

    #[test]
    fn single_row_becomes_a_corridor() {
        let mut rng = StepRng::new(0, 0);
        let maze = Maze::generate(5, 1, 10.0, &mut rng);
        assert_eq!(maze.removed_walls(), 4);
        assert_eq!(maze.v_walls()[0], vec![true, false, false, false, false, true]);
    }
}
