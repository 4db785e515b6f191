//! Text shown around and over the maze, derived from a [`FrameSnapshot`].

use thousands::Separable;

use crate::snapshot::FrameSnapshot;
use crate::systems::GameStage;

pub fn score_text(score: u32) -> String {
    format!("Score: {}", score.separate_with_commas())
}

pub fn lives_text(lives: u32) -> String {
    format!("Lives: {}", lives)
}

pub fn level_text(level: u32) -> String {
    format!("Level: {}", level)
}

/// The centred message for the current frame, if any. Pausing takes priority over the stage.
pub fn dialog_text(snapshot: &FrameSnapshot) -> Option<String> {
    if snapshot.paused {
        return Some("Paused".to_string());
    }

    match snapshot.stage {
        GameStage::Waiting { auto_start: false } => Some("Press N to Start".to_string()),
        GameStage::Countdown => snapshot.countdown.map(|seconds| format!("Starting in: {}", seconds)),
        GameStage::GameOver => Some("Game Over".to_string()),
        _ => None,
    }
}

/// Score, lives and level as one status line.
pub fn status_line(snapshot: &FrameSnapshot) -> String {
    format!(
        "{}   {}   {}",
        score_text(snapshot.score),
        lives_text(snapshot.lives),
        level_text(snapshot.level)
    )
}
