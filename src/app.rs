use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::constants::LOOP_TIME;
use crate::error::GameResult;
use crate::events::GameCommand;
use crate::game::RoundController;
use crate::map::builder::Map;
use crate::snapshot::FrameSnapshot;
use crate::systems::AudioEvent;

/// Supplies commands once per frame. Receives the previous frame so scripted or automatic input can react to it.
pub trait InputSource {
    fn poll(&mut self, last_frame: &FrameSnapshot) -> Vec<GameCommand>;
}

/// Draws a frame.
pub trait Renderer {
    fn render(&mut self, frame: &FrameSnapshot, map: &Map);
}

/// Plays audio cues.
pub trait AudioSink {
    fn handle(&mut self, event: AudioEvent);
}

/// Fixed-rate host loop wiring a [`RoundController`] to input, rendering and audio.
pub struct App {
    pub controller: RoundController,
    pub settings: Settings,
    settings_path: Option<PathBuf>,
    input: Box<dyn InputSource>,
    renderer: Box<dyn Renderer>,
    audio: Box<dyn AudioSink>,
    last_frame: FrameSnapshot,
    /// Sleep out the remainder of each frame. Off for tests and fast-forwarding.
    realtime: bool,
}

impl App {
    /// Creates the controller and applies the saved mute preference.
    ///
    /// # Errors
    ///
    /// Propagates errors from building the reference maze.
    pub fn new(
        seed: u64,
        settings: Settings,
        settings_path: Option<PathBuf>,
        input: Box<dyn InputSource>,
        renderer: Box<dyn Renderer>,
        audio: Box<dyn AudioSink>,
    ) -> GameResult<Self> {
        let mut controller = RoundController::new(seed)?;
        controller.set_muted(!settings.sound_enabled);
        let last_frame = controller.snapshot();

        info!(seed, sound_enabled = settings.sound_enabled, "Application initialized");
        Ok(App {
            controller,
            settings,
            settings_path,
            input,
            renderer,
            audio,
            last_frame,
            realtime: true,
        })
    }

    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn last_frame(&self) -> &FrameSnapshot {
        &self.last_frame
    }

    /// Executes a single frame: input, tick, render, audio, then sleep out the rest of [`LOOP_TIME`].
    ///
    /// # Returns
    ///
    /// `true` if the loop should continue, `false` once [`GameCommand::Quit`] was received.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        for command in self.input.poll(&self.last_frame) {
            if command == GameCommand::Quit {
                info!("Exit requested");
                return false;
            }
            self.controller.send(command);
        }

        let was_muted = self.controller.audio_muted();
        if let Err(e) = self.controller.tick() {
            warn!(error = %e, "Tick reported an error");
        }

        self.last_frame = self.controller.snapshot();
        self.renderer.render(&self.last_frame, self.controller.map());

        let muted = self.controller.audio_muted();
        for event in self.controller.drain_audio() {
            // Transport events still go through so a muted sink can stop or pause.
            if muted && matches!(event, AudioEvent::PlaySound(_)) {
                continue;
            }
            self.audio.handle(event);
        }

        if muted != was_muted {
            self.settings.sound_enabled = !muted;
            self.persist_settings();
        }

        if self.realtime {
            let elapsed = start.elapsed();
            if elapsed < LOOP_TIME {
                let time = LOOP_TIME.saturating_sub(elapsed);
                if time != Duration::ZERO {
                    spin_sleep::sleep(time);
                }
            } else {
                warn!(behind = ?(elapsed - LOOP_TIME), "Frame behind schedule");
            }
        }

        true
    }

    /// Runs frames until quit, or until `max_frames` have run. Returns the number of frames run.
    pub fn run_until_quit(&mut self, max_frames: Option<u64>) -> u64 {
        let mut frames = 0;
        while max_frames.is_none_or(|max| frames < max) {
            if !self.run() {
                break;
            }
            frames += 1;
        }
        debug!(frames, tick = self.controller.tick_count(), "Loop finished");
        frames
    }

    fn persist_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save(path) {
            warn!(error = %e, path = %path.display(), "Failed to persist settings");
        }
    }
}
