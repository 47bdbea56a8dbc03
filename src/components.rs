#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Resolution order: vertical before horizontal.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn bit(self) -> u8 {
        match self {
            Direction::Up => 1,
            Direction::Down => 2,
            Direction::Left => 4,
            Direction::Right => 8,
        }
    }
}

/// Set of directions the avatar is being driven toward this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent(u8);

impl Intent {
    pub const NONE: Intent = Intent(0);

    pub fn only(dir: Direction) -> Self {
        Intent(dir.bit())
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    pub fn contains(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Active directions in resolution order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for Intent {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut intent = Intent::NONE;
        for dir in iter {
            intent.insert(dir);
        }
        intent
    }
}

/// A point-like actor in pixel space. Pixel position is authoritative; the cell
/// coordinates are derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub x: f64,
    pub y: f64,
    pub cell_x: usize,
    pub cell_y: usize,
    pub speed: f64,
}

impl Entity {
    pub fn at_cell_center(cell_x: usize, cell_y: usize, cell_size: f64, speed: f64) -> Self {
        Self {
            x: (cell_x as f64 + 0.5) * cell_size,
            y: (cell_y as f64 + 0.5) * cell_size,
            cell_x,
            cell_y,
            speed,
        }
    }

    pub fn at(x: f64, y: f64, cell_size: f64, speed: f64) -> Self {
        let mut entity = Self {
            x,
            y,
            cell_x: 0,
            cell_y: 0,
            speed,
        };
        entity.sync_cell(cell_size);
        entity
    }

    pub fn sync_cell(&mut self, cell_size: f64) {
        self.cell_x = (self.x / cell_size).floor() as usize;
        self.cell_y = (self.y / cell_size).floor() as usize;
    }

    pub fn distance_to(&self, other: &Entity) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_iterates_vertical_first() {
        let intent: Intent = [Direction::Right, Direction::Up, Direction::Left]
            .into_iter()
            .collect();
        let order: Vec<Direction> = intent.iter().collect();
        assert_eq!(order, vec![Direction::Up, Direction::Left, Direction::Right]);
    }

    #[test]
    fn intent_insert_is_idempotent() {
        let mut intent = Intent::only(Direction::Down);
        assert!(intent.contains(Direction::Down));
        intent.insert(Direction::Down);
        assert_eq!(intent, Intent::only(Direction::Down));
        assert!(!intent.contains(Direction::Up));
        assert!(Intent::NONE.is_empty());
    }

    #[test]
    fn entity_cell_follows_pixels() {
        let e = Entity::at(149.9, 50.0, 50.0, 0.0);
        assert_eq!((e.cell_x, e.cell_y), (2, 1));
        let c = Entity::at_cell_center(3, 0, 50.0, 256.0);
        assert_eq!((c.x, c.y), (175.0, 25.0));
    }
}
