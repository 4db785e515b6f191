//! Tracing formatter that prefixes every line with where the simulation is: tick, level and stage.
//!
//! The round controller publishes a [`SimStamp`] after each tick; log lines written between ticks, including
//! those from the host loop, carry the most recent one.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

use crate::systems::GameStage;

static TICK: AtomicU64 = AtomicU64::new(0);
static LEVEL: AtomicU32 = AtomicU32::new(0);
static STAGE: AtomicU8 = AtomicU8::new(StageTag::Waiting as u8);

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// Four-letter stage label shown in log lines. Pause overrides the stage it froze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StageTag {
    Waiting,
    AutoStart,
    Countdown,
    Playing,
    EatenPause,
    Dying,
    GameOver,
    Paused,
}

impl StageTag {
    const ALL: [StageTag; 8] = [
        StageTag::Waiting,
        StageTag::AutoStart,
        StageTag::Countdown,
        StageTag::Playing,
        StageTag::EatenPause,
        StageTag::Dying,
        StageTag::GameOver,
        StageTag::Paused,
    ];

    pub fn new(stage: GameStage, paused: bool) -> Self {
        if paused {
            return StageTag::Paused;
        }
        match stage {
            GameStage::Waiting { auto_start: false } => StageTag::Waiting,
            GameStage::Waiting { auto_start: true } => StageTag::AutoStart,
            GameStage::Countdown => StageTag::Countdown,
            GameStage::Playing => StageTag::Playing,
            GameStage::EatenPause => StageTag::EatenPause,
            GameStage::Dying => StageTag::Dying,
            GameStage::GameOver => StageTag::GameOver,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StageTag::Waiting => "WAIT",
            StageTag::AutoStart => "NEXT",
            StageTag::Countdown => "CNTD",
            StageTag::Playing => "PLAY",
            StageTag::EatenPause => "EATN",
            StageTag::Dying => "DEAD",
            StageTag::GameOver => "OVER",
            StageTag::Paused => "PAUS",
        }
    }
}

/// Where the simulation stood when a log line was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimStamp {
    pub tick: u64,
    pub level: u32,
    pub stage: StageTag,
}

impl SimStamp {
    /// Makes this the stamp for subsequent log lines.
    pub fn publish(self) {
        TICK.store(self.tick, Ordering::Relaxed);
        LEVEL.store(self.level, Ordering::Relaxed);
        STAGE.store(self.stage as u8, Ordering::Relaxed);
    }

    pub fn current() -> SimStamp {
        let stage = StageTag::ALL
            .get(STAGE.load(Ordering::Relaxed) as usize)
            .copied()
            .unwrap_or(StageTag::Waiting);
        SimStamp {
            tick: TICK.load(Ordering::Relaxed),
            level: LEVEL.load(Ordering::Relaxed),
            stage,
        }
    }
}

/// Formats events as `time tick Llevel STAGE level scope target: fields`.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let formatted_time = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|e| {
            eprintln!("Failed to format timestamp: {}", e);
            fmt::Error
        })?;
        write_dimmed(&mut writer, formatted_time)?;
        writer.write_char(' ')?;

        write_stamp(&mut writer, SimStamp::current())?;
        writer.write_char(' ')?;

        write_colored_level(&mut writer, meta.level())?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            let mut names = Vec::new();
            for span in scope.from_root() {
                let ext = span.extensions();
                let fields = ext
                    .get::<FormattedFields<N>>()
                    .filter(|fields| !fields.is_empty())
                    .map(|fields| format!("{{{}}}", fields));
                names.push(format!("{}{}", span.metadata().name(), fields.unwrap_or_default()));
            }
            if !names.is_empty() {
                write_bold(&mut writer, names.join(":"))?;
                writer.write_char(' ')?;
            }
        }

        write_dimmed(&mut writer, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// `#000123 L1 PLAY`, dimmed except for the stage.
fn write_stamp(writer: &mut Writer<'_>, stamp: SimStamp) -> fmt::Result {
    write_dimmed(writer, format_args!("#{:06} L{}", stamp.tick, stamp.level))?;
    writer.write_char(' ')?;
    write_bold(writer, stamp.stage.label())
}

fn write_colored_level(writer: &mut Writer<'_>, level: &Level) -> fmt::Result {
    let (color, text) = match *level {
        Level::TRACE => ("\x1b[35m", "TRACE"),
        Level::DEBUG => ("\x1b[34m", "DEBUG"),
        Level::INFO => ("\x1b[32m", " INFO"),
        Level::WARN => ("\x1b[33m", " WARN"),
        Level::ERROR => ("\x1b[31m", "ERROR"),
    };
    if writer.has_ansi_escapes() {
        write!(writer, "{}{}\x1b[0m", color, text)
    } else {
        write!(writer, "{}", text)
    }
}

fn write_dimmed(writer: &mut Writer<'_>, s: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "\x1b[2m{}\x1b[0m", s)
    } else {
        write!(writer, "{}", s)
    }
}

fn write_bold(writer: &mut Writer<'_>, s: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "\x1b[1m{}\x1b[0m", s)
    } else {
        write!(writer, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_overrides_stage() {
        assert_eq!(StageTag::new(GameStage::Playing, false), StageTag::Playing);
        assert_eq!(StageTag::new(GameStage::Playing, true), StageTag::Paused);
        assert_eq!(StageTag::new(GameStage::Waiting { auto_start: true }, false).label(), "NEXT");
    }

    #[test]
    fn test_stage_tags_round_trip_through_index() {
        for tag in StageTag::ALL {
            assert_eq!(StageTag::ALL[tag as usize], tag);
        }
    }

    #[test]
    fn test_stamp_layout() {
        let mut out = String::new();
        let stamp = SimStamp {
            tick: 123,
            level: 2,
            stage: StageTag::EatenPause,
        };
        write_stamp(&mut Writer::new(&mut out), stamp).unwrap();
        assert_eq!(out, "#000123 L2 EATN");
    }
}
