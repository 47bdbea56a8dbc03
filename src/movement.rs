//! Grid collision for an entity moving in pixel space.
//!
//! Each active direction is resolved on its own axis, vertical first, and the entity's
//! cell is re-derived after every axis so later checks see the updated cell.

use crate::components::{Direction, Entity, Intent};
use crate::maze::Maze;

/// Returns where `entity` ends up after `delta_seconds` of `intent`.
///
/// Displacement per direction is capped at one cell, so an entity can never skip past a
/// wall of the cell next to it. When a move is blocked the entity stops `wall_thickness`
/// short of the wall plane, so `wall_thickness` must be positive or the clamp would land
/// on the plane itself and floor into the next cell.
pub fn resolve_movement(
    maze: &Maze,
    entity: &Entity,
    intent: Intent,
    delta_seconds: f64,
    wall_thickness: f64,
) -> Entity {
    assert!(wall_thickness > 0.0, "wall thickness must be positive");
    let mut next = *entity;
    let size = maze.cell_size();
    let step = (entity.speed * delta_seconds).min(size);

    for dir in intent.iter() {
        let blocked = is_blocked(maze, &next, dir, wall_thickness);
        match dir {
            Direction::Up => {
                let target = next.y - step;
                next.y = if blocked {
                    target.max(next.cell_y as f64 * size + wall_thickness)
                } else {
                    target
                };
            }
            Direction::Down => {
                let target = next.y + step;
                next.y = if blocked {
                    target.min((next.cell_y + 1) as f64 * size - wall_thickness)
                } else {
                    target
                };
            }
            Direction::Left => {
                let target = next.x - step;
                next.x = if blocked {
                    target.max(next.cell_x as f64 * size + wall_thickness)
                } else {
                    target
                };
            }
            Direction::Right => {
                let target = next.x + step;
                next.x = if blocked {
                    target.min((next.cell_x + 1) as f64 * size - wall_thickness)
                } else {
                    target
                };
            }
        }
        next.sync_cell(size);
    }

    next
}

/// A move is blocked by the wall straight ahead, or by a wall of the next cell over
/// that the entity's footprint would clip near either perpendicular edge.
///
/// The straight-ahead check short-circuits first; since the outer boundary is always
/// walled, the neighbor lookups that follow never index outside the grid.
fn is_blocked(maze: &Maze, e: &Entity, dir: Direction, wall_thickness: f64) -> bool {
    let size = maze.cell_size();
    let (cx, cy) = (e.cell_x, e.cell_y);
    let near_right = ((cx + 1) as f64 * size - e.x) < wall_thickness;
    let near_left = (e.x - cx as f64 * size) < wall_thickness;
    let near_bottom = ((cy + 1) as f64 * size - e.y) < wall_thickness;
    let near_top = (e.y - cy as f64 * size) < wall_thickness;

    match dir {
        Direction::Up => {
            maze.has_wall_above(cy, cx)
                || (near_right && maze.has_wall_left(cy - 1, cx + 1))
                || (near_left && maze.has_wall_left(cy - 1, cx))
        }
        Direction::Down => {
            maze.has_wall_below(cy, cx)
                || (near_right && maze.has_wall_left(cy + 1, cx + 1))
                || (near_left && maze.has_wall_left(cy + 1, cx))
        }
        Direction::Left => {
            maze.has_wall_left(cy, cx)
                || (near_bottom && maze.has_wall_above(cy + 1, cx - 1))
                || (near_top && maze.has_wall_above(cy, cx - 1))
        }
        Direction::Right => {
            maze.has_wall_right(cy, cx)
                || (near_bottom && maze.has_wall_above(cy + 1, cx + 1))
                || (near_top && maze.has_wall_above(cy, cx + 1))
        }
    }
}
