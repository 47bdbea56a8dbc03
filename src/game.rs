//! Round lifecycle: placement, win detection, timing and best time.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use crate::components::{Entity, Intent};
use crate::config::Settings;
use crate::maze::Maze;
use crate::movement::resolve_movement;

/// Fraction of a cell the avatar must be within, on both axes, to reach the goal.
pub const GOAL_TOLERANCE: f64 = 0.2;

/// One maze plus the two entities living in it.
#[derive(Debug, Clone)]
pub struct Round {
    pub maze: Maze,
    pub avatar: Entity,
    pub goal: Entity,
    pub started: Instant,
}

impl Round {
    /// Places avatar and goal in independent random cells and carves a fresh maze.
    /// The two may land in the same cell; the next win check then ends the round.
    pub fn new<R: Rng + ?Sized>(settings: &Settings, rng: &mut R, now: Instant) -> Self {
        let size = settings.cell_size;
        let avatar = Entity::at_cell_center(
            rng.gen_range(0..settings.width),
            rng.gen_range(0..settings.height),
            size,
            settings.speed,
        );
        let goal = Entity::at_cell_center(
            rng.gen_range(0..settings.width),
            rng.gen_range(0..settings.height),
            size,
            0.0,
        );
        let maze = Maze::generate(settings.width, settings.height, size, rng);
        debug!(
            avatar_cell = ?(avatar.cell_x, avatar.cell_y),
            goal_cell = ?(goal.cell_x, goal.cell_y),
            "round reset"
        );
        Round {
            maze,
            avatar,
            goal,
            started: now,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    pub fn distance_to_goal(&self) -> f64 {
        self.avatar.distance_to(&self.goal)
    }

    pub fn is_won(&self) -> bool {
        reached_goal(&self.avatar, &self.goal, self.maze.cell_size())
    }
}

/// Axis-aligned proximity test. It ignores walls, so two entities near a shared corner
/// of wall-separated cells still count as touching.
pub fn reached_goal(avatar: &Entity, goal: &Entity, cell_size: f64) -> bool {
    let limit = GOAL_TOLERANCE * cell_size;
    (avatar.x - goal.x).abs() < limit && (avatar.y - goal.y).abs() < limit
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Moving,
    Won { elapsed: Duration, new_best: bool },
}

pub struct Game {
    pub settings: Settings,
    pub round: Round,
    pub best_time: Option<Duration>,
    pub last_time: Option<Duration>,
    pub rounds_won: u32,
}

impl Game {
    pub fn new<R: Rng + ?Sized>(settings: Settings, rng: &mut R, now: Instant) -> Self {
        let round = Round::new(&settings, rng, now);
        Game {
            settings,
            round,
            best_time: None,
            last_time: None,
            rounds_won: 0,
        }
    }

    /// Throws away the current round without recording a time.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) {
        self.round = Round::new(&self.settings, rng, now);
    }

    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        intent: Intent,
        delta_seconds: f64,
        rng: &mut R,
        now: Instant,
    ) -> TickOutcome {
        self.round.avatar = resolve_movement(
            &self.round.maze,
            &self.round.avatar,
            intent,
            delta_seconds,
            self.settings.wall_thickness,
        );

        if !self.round.is_won() {
            return TickOutcome::Moving;
        }

        let elapsed = self.round.elapsed(now);
        let new_best = self.record_time(elapsed);
        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            best_ms = self.best_time.map(|b| b.as_millis() as u64),
            rounds_won = self.rounds_won,
            "goal reached"
        );
        self.reset(rng, now);
        TickOutcome::Won { elapsed, new_best }
    }

    /// Records a finished round; returns true when it beat the best time.
    pub fn record_time(&mut self, elapsed: Duration) -> bool {
        self.rounds_won += 1;
        self.last_time = Some(elapsed);
        let new_best = self.best_time.map_or(true, |best| elapsed < best);
        if new_best {
            info!(best_ms = elapsed.as_millis() as u64, "new best time");
            self.best_time = Some(elapsed);
        }
        new_best
    }
}

/// Advances the cosmetic radar pulse. The ring grows faster as the avatar closes in on
/// the goal and wraps at half the remaining distance.
pub fn next_radar_radius(radius: f64, distance_to_goal: f64, diagonal: f64) -> f64 {
    if distance_to_goal <= 0.0 || diagonal <= 0.0 {
        return 0.0;
    }
    (radius + (1.0 / (distance_to_goal / diagonal) - 1.0)) % (distance_to_goal / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Direction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_settings() -> Settings {
        Settings {
            width: 4,
            height: 3,
            ..Settings::default()
        }
    }

    #[test]
    fn round_places_entities_at_cell_centers() {
        let settings = small_settings();
        let mut rng = StdRng::seed_from_u64(7);
        let round = Round::new(&settings, &mut rng, Instant::now());
        for e in [round.avatar, round.goal] {
            assert!(e.cell_x < 4 && e.cell_y < 3);
            assert_eq!(e.x, (e.cell_x as f64 + 0.5) * 50.0);
            assert_eq!(e.y, (e.cell_y as f64 + 0.5) * 50.0);
        }
        assert_eq!(round.avatar.speed, settings.speed);
        assert_eq!(round.maze.removed_walls(), 11);
    }

    #[test]
    fn best_time_only_improves() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = Game::new(small_settings(), &mut rng, Instant::now());
        assert!(game.record_time(Duration::from_secs(10)));
        assert!(!game.record_time(Duration::from_secs(12)));
        assert!(!game.record_time(Duration::from_secs(10)));
        assert!(game.record_time(Duration::from_secs(8)));
        assert_eq!(game.best_time, Some(Duration::from_secs(8)));
        assert_eq!(game.last_time, Some(Duration::from_secs(8)));
        assert_eq!(game.rounds_won, 4);
    }

    #[test]
    fn winning_tick_resets_the_round() {
        let mut rng = StdRng::seed_from_u64(3);
        let start = Instant::now();
        let mut game = Game::new(small_settings(), &mut rng, start);
        game.round.goal = game.round.avatar;

        let later = start + Duration::from_secs(5);
        let outcome = game.tick(Intent::NONE, 0.016, &mut rng, later);

        assert_eq!(
            outcome,
            TickOutcome::Won {
                elapsed: Duration::from_secs(5),
                new_best: true
            }
        );
        assert_eq!(game.best_time, Some(Duration::from_secs(5)));
        assert_eq!(game.round.started, later);
        assert_eq!(game.rounds_won, 1);
    }

    #[test]
    fn moving_tick_keeps_round() {
        let mut rng = StdRng::seed_from_u64(3);
        let start = Instant::now();
        let mut game = Game::new(small_settings(), &mut rng, start);
        let far = Entity::at_cell_center(
            (game.round.avatar.cell_x + 2) % 4,
            game.round.avatar.cell_y,
            50.0,
            0.0,
        );
        game.round.goal = far;
        let outcome = game.tick(Intent::only(Direction::Up), 0.0, &mut rng, start);
        assert_eq!(outcome, TickOutcome::Moving);
        assert_eq!(game.rounds_won, 0);
        assert_eq!(game.round.started, start);
    }

    #[test]
    fn radar_wraps_and_handles_zero_distance() {
        assert_eq!(next_radar_radius(5.0, 0.0, 900.0), 0.0);
        let r = next_radar_radius(0.0, 450.0, 900.0);
        assert!((r - 1.0).abs() < 1e-9);
        let wrapped = next_radar_radius(224.5, 450.0, 900.0);
        assert!((wrapped - 0.5).abs() < 1e-9);
    }
}
