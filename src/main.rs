#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use pacman_core::{
    app::{App, AudioSink, InputSource, Renderer},
    config::Settings,
    constants::{LOOP_TIME, TICKS_PER_SECOND},
    events::GameCommand,
    formatter::CustomFormatter,
    hud,
    input::Bindings,
    map::builder::Map,
    snapshot::FrameSnapshot,
    systems::{AudioEvent, GameStage},
};
use rand::{rngs::SmallRng, seq::IndexedRandom, SeedableRng};
use tracing::{debug, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, FmtSubscriber};

const STEERING_KEYS: [&str; 4] = ["up", "down", "left", "right"];

/// Plays by itself: presses space to start, mashes arrow keys, and presses q at game over.
///
/// Keys go through the same [`Bindings`] a real keyboard host would use.
struct Autopilot {
    rng: SmallRng,
    bindings: Bindings,
}

impl Autopilot {
    fn press(&self, key: &str) -> Vec<GameCommand> {
        self.bindings.command_for(key).into_iter().collect()
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, last_frame: &FrameSnapshot) -> Vec<GameCommand> {
        match last_frame.stage {
            GameStage::Waiting { auto_start: false } => self.press("space"),
            GameStage::GameOver => self.press("q"),
            GameStage::Playing if last_frame.tick % 15 == 0 => match STEERING_KEYS.choose(&mut self.rng) {
                Some(key) => self.press(key),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

/// Writes the HUD to the log instead of drawing anything.
#[derive(Default)]
struct LogRenderer {
    last_dialog: Option<String>,
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &FrameSnapshot, map: &Map) {
        let dialog = hud::dialog_text(frame);
        if dialog != self.last_dialog {
            if let Some(text) = &dialog {
                info!(dialog = %text, "Dialog");
            }
            self.last_dialog = dialog;
        }

        if frame.tick % TICKS_PER_SECOND as u64 == 0 {
            debug!(pellets_left = map.remaining_pellets(), "{}", hud::status_line(frame));
        }
    }
}

struct LogAudio;

impl AudioSink for LogAudio {
    fn handle(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::PlaySound(sound) => debug!(cue = %sound, "Sound"),
            other => debug!(event = ?other, "Audio"),
        }
    }
}

struct Args {
    seed: u64,
    ticks: Option<u64>,
    fast: bool,
    settings: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        seed: rand::random(),
        ticks: None,
        fast: false,
        settings: None,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => args.seed = iter.next().context("--seed needs a value")?.parse().context("Invalid --seed")?,
            "--ticks" => args.ticks = Some(iter.next().context("--ticks needs a value")?.parse().context("Invalid --ticks")?),
            "--settings" => args.settings = Some(iter.next().context("--settings needs a path")?.into()),
            "--fast" => args.fast = true,
            other => bail!("Unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn setup_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .event_format(CustomFormatter)
        .with_env_filter(filter)
        .finish()
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).context("Could not set global default subscriber")
}

pub fn main() -> anyhow::Result<()> {
    setup_logging()?;
    let args = parse_args()?;

    let settings = Settings::load(args.settings.as_deref()).context("Could not load settings")?;
    info!(wall = ?settings.wall_rgb()?, player = ?settings.player_rgb()?, "Palette");
    let mut app = App::new(
        args.seed,
        settings,
        args.settings,
        Box::new(Autopilot {
            rng: SmallRng::seed_from_u64(args.seed),
            bindings: Bindings::default(),
        }),
        Box::new(LogRenderer::default()),
        Box::new(LogAudio),
    )?
    .with_realtime(!args.fast);

    info!(seed = args.seed, loop_time = ?LOOP_TIME, "Starting game loop");
    let frames = app.run_until_quit(args.ticks);

    let frame = app.last_frame();
    info!(frames, score = frame.score, level = frame.level, lives = frame.lives, "Finished");
    Ok(())
}
