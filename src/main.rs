use std::io::{self, Write};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use maze_runner::config::Settings;
use maze_runner::error::GameError;
use maze_runner::game::{Game, TickOutcome};
use maze_runner::input::{Command, KeyTracker};
use maze_runner::logging::init_logging;
use maze_runner::render::{render, Renderer};
use maze_runner::terminal::TerminalGuard;

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("maze: {}", err);
            return ExitCode::from(2);
        }
    };
    if let Err(err) = init_logging(&settings) {
        eprintln!("maze: {}", err);
        return ExitCode::FAILURE;
    }
    info!(?settings, "starting");

    match play(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("maze: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn play(settings: Settings) -> Result<(), GameError> {
    let mut term = TerminalGuard::new(io::stdout());
    let result = term
        .enter()
        .map_err(GameError::from)
        .and_then(|reports_release| run(term.out(), settings, reports_release));
    let restored = term.restore();
    result?;
    restored?;
    Ok(())
}

fn run<W: Write>(out: &mut W, settings: Settings, reports_release: bool) -> Result<(), GameError> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame_time = settings.frame_time();
    let mut keys = KeyTracker::new(settings.input_hold, reports_release);
    let mut renderer = Renderer::new(settings.width, settings.height);
    let mut game = Game::new(settings, &mut rng, Instant::now());
    let mut last_update = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key)
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    return Ok(());
                }
                Event::Key(key) => match keys.handle(key, frame_start) {
                    Some(Command::Quit) => return Ok(()),
                    Some(Command::NewMaze) => {
                        game.reset(&mut rng, frame_start);
                        keys.clear();
                        renderer.invalidate();
                    }
                    _ => {}
                },
                Event::Resize(_, _) => renderer.invalidate(),
                _ => {}
            }
        }

        let now = Instant::now();
        let delta = now.duration_since(last_update).as_secs_f64();
        last_update = now;

        renderer.update_radar(&game);
        if let TickOutcome::Won { elapsed, new_best } =
            game.tick(keys.intent(now), delta, &mut rng, now)
        {
            debug!(elapsed_ms = elapsed.as_millis() as u64, new_best, "new round");
        }
        render(out, &game, &mut renderer, now)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}
