use bevy_ecs::{
    event::{EventReader, EventWriter},
    query::{With, Without},
    resource::Resource,
    system::{Query, Res, ResMut, SystemParam},
};
use tracing::{debug, info, warn};

use crate::{
    constants::{durations, STARTING_LIVES, TICKS_PER_SECOND},
    error::{GameError, GameResult},
    events::{GameCommand, GameEvent},
    map::builder::Map,
    systems::{
        audio::{AudioEvent, AudioState, Sound},
        components::{CaptureChain, Ghost, Level, PelletCount, PlayerControlled, PlayerLives, ScoreResource, TickCounter},
        ghost::{reset_ghost, GhostState},
        movement::{Position, PreviousPosition, Velocity},
        player::reset_player,
    },
};

/// The high-level stage of a round.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameStage {
    /// Between games, or between lives and levels. With `auto_start`, the level begins on the next tick.
    Waiting { auto_start: bool },
    /// Counting down to a new game.
    Countdown,
    /// The main gameplay loop is active.
    Playing,
    /// Short freeze after a ghost is eaten.
    EatenPause,
    /// The player was caught and the death sequence is running.
    Dying,
    /// The game has ended. Only an explicit new game or restart leaves this stage.
    GameOver,
}

/// The current stage and the tick it was entered on.
#[derive(Resource, Debug, PartialEq, Eq, Clone, Copy)]
pub struct RoundState {
    pub stage: GameStage,
    pub entered_at: u64,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            stage: GameStage::Waiting { auto_start: false },
            entered_at: 0,
        }
    }
}

impl RoundState {
    /// Moves to `next`, recording the tick. Leaving [`GameStage::GameOver`] this way is refused.
    pub fn enter(&mut self, next: GameStage, tick: u64) -> GameResult<()> {
        if self.stage == GameStage::GameOver && next != GameStage::GameOver {
            return Err(GameError::IllegalTransition {
                from: self.stage,
                to: next,
            });
        }
        self.reset_to(next, tick);
        Ok(())
    }

    /// Moves to `next` unconditionally. Reserved for explicit new-game and restart commands.
    pub fn reset_to(&mut self, next: GameStage, tick: u64) {
        if self.stage != next {
            debug!(from = ?self.stage, to = ?next, tick, "Stage transition");
        }
        self.stage = next;
        self.entered_at = tick;
    }

    pub fn elapsed(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.entered_at)
    }

    /// Whole seconds left on the countdown, rounded up.
    pub fn countdown_remaining(&self, tick: u64) -> Option<u64> {
        if self.stage != GameStage::Countdown {
            return None;
        }
        let left = durations::COUNTDOWN.saturating_sub(self.elapsed(tick));
        Some(left.div_ceil(TICKS_PER_SECOND as u64))
    }
}

#[derive(Resource, Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum PauseState {
    #[default]
    Inactive,
    Active,
}

impl PauseState {
    pub fn active(&self) -> bool {
        matches!(self, PauseState::Active)
    }
}

/// Run condition: the tick is not frozen.
pub fn not_paused(pause: Res<PauseState>) -> bool {
    !pause.active()
}

/// Run condition: agents move and collide.
pub fn is_playing(round: Res<RoundState>) -> bool {
    round.stage == GameStage::Playing
}

/// Everything needed to reset agents, score and maze between lives, levels and games.
#[derive(SystemParam)]
pub struct RoundControl<'w, 's> {
    tick: Res<'w, TickCounter>,
    round: ResMut<'w, RoundState>,
    level: ResMut<'w, Level>,
    map: ResMut<'w, Map>,
    score: ResMut<'w, ScoreResource>,
    lives: ResMut<'w, PlayerLives>,
    pellets: ResMut<'w, PelletCount>,
    chain: ResMut<'w, CaptureChain>,
    players: Query<'w, 's, (&'static mut Position, &'static mut PreviousPosition, &'static mut Velocity), (With<PlayerControlled>, Without<Ghost>)>,
    ghosts: Query<
        'w,
        's,
        (&'static mut GhostState, &'static mut Position, &'static mut PreviousPosition, &'static mut Velocity),
        (With<Ghost>, Without<PlayerControlled>),
    >,
    audio: EventWriter<'w, AudioEvent>,
}

impl RoundControl<'_, '_> {
    fn reset_agents(&mut self) {
        for (mut position, mut previous, mut velocity) in self.players.iter_mut() {
            reset_player(&mut position, &mut previous, &mut velocity);
        }
        for (mut state, mut position, mut previous, mut velocity) in self.ghosts.iter_mut() {
            reset_ghost(&mut state, &mut position, &mut previous, &mut velocity);
        }
    }

    /// Puts every agent at its spawn and starts play. Pellets and score carry over.
    pub fn start_level(&mut self) -> GameResult<()> {
        self.reset_agents();
        self.audio.write(AudioEvent::PlaySound(Sound::Start));
        self.round.enter(GameStage::Playing, self.tick.0)?;
        info!(level = self.level.0, lives = self.lives.0, "Level started");
        Ok(())
    }

    fn reset_progress(&mut self) {
        self.level.0 = 1;
        self.score.0 = 0;
        self.lives.0 = STARTING_LIVES;
        self.pellets.0 = 0;
        self.chain.0 = 0;
        self.map.reset();
    }

    /// Fresh score, lives, level and maze, then straight into play.
    pub fn start_new_game(&mut self) -> GameResult<()> {
        self.reset_progress();
        self.round.reset_to(GameStage::Waiting { auto_start: false }, self.tick.0);
        self.start_level()
    }

    /// Fresh everything, then wait for a start command.
    pub fn restart(&mut self) {
        self.reset_progress();
        self.reset_agents();
        self.round.reset_to(GameStage::Waiting { auto_start: false }, self.tick.0);
        info!("Game restarted");
    }

    pub fn begin_countdown(&mut self) {
        self.round.reset_to(GameStage::Countdown, self.tick.0);
    }

    /// Advances to the next level; play resumes on the following tick.
    pub fn complete_level(&mut self) -> GameResult<()> {
        self.round.enter(GameStage::Waiting { auto_start: true }, self.tick.0)?;
        self.level.0 += 1;
        self.map.reset();
        self.pellets.0 = 0;
        self.reset_agents();
        info!(level = self.level.0, score = self.score.0, "Level complete");
        Ok(())
    }

    /// Ends the death sequence, either waiting to respawn or ending the game.
    pub fn finish_dying(&mut self) -> GameResult<()> {
        if self.lives.lose_life() {
            info!(score = self.score.0, level = self.level.0, "Game over");
            self.round.enter(GameStage::GameOver, self.tick.0)
        } else {
            debug!(lives = self.lives.0, "Life lost");
            self.round.enter(GameStage::Waiting { auto_start: true }, self.tick.0)
        }
    }
}

/// Advances the tick counter. Only runs while unpaused.
pub fn tick_system(mut tick: ResMut<TickCounter>) {
    tick.0 += 1;
}

/// Applies commands that affect the round as a whole.
pub fn command_system(
    mut events: EventReader<GameEvent>,
    mut pause: ResMut<PauseState>,
    mut audio_state: ResMut<AudioState>,
    mut control: RoundControl,
    mut errors: EventWriter<GameError>,
) {
    for event in events.read() {
        let GameEvent::Command(command) = *event else {
            continue;
        };

        let result = match command {
            GameCommand::Pause | GameCommand::Resume | GameCommand::TogglePause => {
                let pausing = match command {
                    GameCommand::Pause => true,
                    GameCommand::Resume => false,
                    _ => !pause.active(),
                };
                if pausing == pause.active() {
                    debug!(?command, "Pause state unchanged");
                } else if pausing {
                    *pause = PauseState::Active;
                    control.audio.write(AudioEvent::Pause);
                    info!("Game paused");
                } else {
                    *pause = PauseState::Inactive;
                    control.audio.write(AudioEvent::Resume);
                    info!("Game resumed");
                }
                Ok(())
            }
            GameCommand::ToggleMute => {
                audio_state.muted = !audio_state.muted;
                if audio_state.muted {
                    control.audio.write(AudioEvent::StopAll);
                }
                info!("Audio {}", if audio_state.muted { "muted" } else { "unmuted" });
                Ok(())
            }
            GameCommand::StartNewGame => control.start_new_game(),
            GameCommand::BeginCountdown => {
                control.begin_countdown();
                Ok(())
            }
            GameCommand::Restart => {
                control.restart();
                Ok(())
            }
            GameCommand::MovePlayer(_) | GameCommand::Quit => Ok(()),
        };

        if let Err(e) = result {
            errors.write(e);
        }
    }
}

/// Drives the timed stage transitions and level completion.
pub fn stage_system(mut events: EventReader<GameEvent>, mut control: RoundControl, mut errors: EventWriter<GameError>) {
    let tick = control.tick.0;
    let cleared = events
        .read()
        .filter(|event| matches!(event, GameEvent::LevelCleared))
        .count()
        > 0;

    let result = if cleared {
        control.complete_level()
    } else {
        let elapsed = control.round.elapsed(tick);
        match control.round.stage {
            GameStage::EatenPause if elapsed > durations::EATEN_PAUSE => control.round.enter(GameStage::Playing, tick),
            GameStage::Dying if elapsed > durations::DYING => control.finish_dying(),
            GameStage::Countdown if elapsed >= durations::COUNTDOWN => control.start_new_game(),
            GameStage::Waiting { auto_start: true } if elapsed > 0 => control.start_level(),
            _ => Ok(()),
        }
    };

    if let Err(e) = result {
        warn!(error = %e, "Stage transition refused");
        errors.write(e);
    }
}
