use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::components::{Direction, Intent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    NewMaze,
    Quit,
}

pub fn command_for(code: KeyCode) -> Option<Command> {
    let cmd = match code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Command::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => {
            Command::Move(Direction::Down)
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => {
            Command::Move(Direction::Left)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => {
            Command::Move(Direction::Right)
        }
        KeyCode::Char('r') => Command::NewMaze,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

fn idx_for_dir(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

/// Tracks which directional keys count as held.
///
/// Terminals that report key releases give exact held state. Everywhere else a key
/// stays held for `hold` after its last press or auto-repeat.
#[derive(Debug, Clone)]
pub struct KeyTracker {
    hold: Duration,
    reports_release: bool,
    last_seen: [Option<Instant>; 4],
    held: [bool; 4],
}

impl KeyTracker {
    pub fn new(hold: Duration, reports_release: bool) -> Self {
        Self {
            hold,
            reports_release,
            last_seen: [None; 4],
            held: [false; 4],
        }
    }

    pub fn press(&mut self, dir: Direction, now: Instant) {
        let idx = idx_for_dir(dir);
        self.last_seen[idx] = Some(now);
        self.held[idx] = true;
    }

    pub fn release(&mut self, dir: Direction) {
        let idx = idx_for_dir(dir);
        self.last_seen[idx] = None;
        self.held[idx] = false;
    }

    /// Feeds one raw key event; returns any non-movement command it carried.
    pub fn handle(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        match (command_for(key.code)?, key.kind) {
            (Command::Move(dir), KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.press(dir, now);
                None
            }
            (Command::Move(dir), KeyEventKind::Release) => {
                self.release(dir);
                None
            }
            (cmd, KeyEventKind::Press) => Some(cmd),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.last_seen = [None; 4];
        self.held = [false; 4];
    }

    /// Directions active at `now`, rebuilt from scratch every frame.
    pub fn intent(&self, now: Instant) -> Intent {
        Direction::ALL
            .into_iter()
            .filter(|dir| {
                let idx = idx_for_dir(*dir);
                if self.reports_release {
                    self.held[idx]
                } else {
                    self.last_seen[idx]
                        .is_some_and(|t| now.saturating_duration_since(t) <= self.hold)
                }
            })
            .collect()
    }
}
