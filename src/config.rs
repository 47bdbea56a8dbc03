use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_WIDTH: usize = 15;
const DEFAULT_HEIGHT: usize = 10;
const DEFAULT_CELL_SIZE: f64 = 50.0;
const DEFAULT_SPEED: f64 = 256.0;
const DEFAULT_WALL_THICKNESS: f64 = 16.0;
const DEFAULT_SIGHT_CELLS: f64 = 5.0;
const DEFAULT_FPS: u64 = 60;
const DEFAULT_INPUT_HOLD_MS: u64 = 160;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Largest side that still fits a u16 terminal: the layout is `2n + 1` slots of two
/// columns each, plus two HUD rows.
pub const MAX_CELLS_PER_SIDE: usize = 4096;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid value")]
    Parse { var: &'static str, value: String },

    #[error("{var} {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub cell_size: f64,
    pub speed: f64,
    pub wall_thickness: f64,
    pub sight_cells: f64,
    pub fps: u64,
    pub input_hold: Duration,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_json: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            speed: DEFAULT_SPEED,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            sight_cells: DEFAULT_SIGHT_CELLS,
            fps: DEFAULT_FPS,
            input_hold: Duration::from_millis(DEFAULT_INPUT_HOLD_MS),
            seed: None,
            log_file: None,
            log_json: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads every setting through `lookup`; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();
        let read = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(v) = read("MAZE_WIDTH") {
            s.width = parse("MAZE_WIDTH", &v)?;
        }
        if let Some(v) = read("MAZE_HEIGHT") {
            s.height = parse("MAZE_HEIGHT", &v)?;
        }
        if let Some(v) = read("MAZE_CELL_SIZE") {
            s.cell_size = parse("MAZE_CELL_SIZE", &v)?;
        }
        if let Some(v) = read("MAZE_SPEED") {
            s.speed = parse("MAZE_SPEED", &v)?;
        }
        if let Some(v) = read("MAZE_WALL_THICKNESS") {
            s.wall_thickness = parse("MAZE_WALL_THICKNESS", &v)?;
        }
        if let Some(v) = read("MAZE_SIGHT_CELLS") {
            s.sight_cells = parse("MAZE_SIGHT_CELLS", &v)?;
        }
        if let Some(v) = read("MAZE_FPS") {
            s.fps = parse("MAZE_FPS", &v)?;
        }
        if let Some(v) = read("MAZE_INPUT_HOLD_MS") {
            s.input_hold = Duration::from_millis(parse("MAZE_INPUT_HOLD_MS", &v)?);
        }
        if let Some(v) = read("MAZE_SEED") {
            s.seed = Some(parse("MAZE_SEED", &v)?);
        }
        if let Some(v) = read("MAZE_LOG") {
            s.log_file = Some(PathBuf::from(v));
        }
        if let Some(v) = read("MAZE_LOG_JSON") {
            s.log_json = parse_flag("MAZE_LOG_JSON", &v)?;
        }
        if let Some(v) = read("RUST_LOG") {
            s.log_level = v;
        }

        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.width > MAX_CELLS_PER_SIDE {
            return Err(invalid(
                "MAZE_WIDTH",
                &format!("must be in 1..={}", MAX_CELLS_PER_SIDE),
            ));
        }
        if self.height == 0 || self.height > MAX_CELLS_PER_SIDE {
            return Err(invalid(
                "MAZE_HEIGHT",
                &format!("must be in 1..={}", MAX_CELLS_PER_SIDE),
            ));
        }
        if !(self.cell_size > 0.0) {
            return Err(invalid("MAZE_CELL_SIZE", "must be positive"));
        }
        if !(self.speed >= 0.0) {
            return Err(invalid("MAZE_SPEED", "must not be negative"));
        }
        if !(self.wall_thickness > 0.0 && self.wall_thickness < self.cell_size / 2.0) {
            return Err(invalid(
                "MAZE_WALL_THICKNESS",
                "must be in (0, cell size / 2)",
            ));
        }
        if !(self.sight_cells > 0.0) {
            return Err(invalid("MAZE_SIGHT_CELLS", "must be positive"));
        }
        if self.fps == 0 {
            return Err(invalid("MAZE_FPS", "must be positive"));
        }
        Ok(())
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1))
    }

    pub fn sight_range(&self) -> f64 {
        self.sight_cells * self.cell_size
    }

    /// Pixel diagonal of the whole maze.
    pub fn diagonal(&self) -> f64 {
        let w = self.width as f64 * self.cell_size;
        let h = self.height as f64 * self.cell_size;
        (w * w + h * h).sqrt()
    }
}

fn parse<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Parse {
        var,
        value: value.to_string(),
    })
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Parse {
            var,
            value: value.to_string(),
        }),
    }
}

fn invalid(var: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}
