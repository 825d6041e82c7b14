//! Kickoff time presentation.
//!
//! The sports API sends match dates and times as bare wall-clock fields with
//! no zone marker. They are read as UTC and shown in a single fixed display
//! zone regardless of the device locale.
//!
//! A [`TargetInstant`] keeps the event on the UTC axis shifted forward by the
//! zone offset, so its UTC fields read as display-zone wall clock. `now` is
//! moved into the same frame before any comparison.

use std::time::Duration as StdDuration;
use time::format_description::FormatItem;
use time::macros::{format_description, offset};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

const API_DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

const API_TIME_FORMAT: &[FormatItem<'static>] = format_description!(
    "[hour padding:none]:[minute padding:none][optional [:[second padding:none]]]"
);

const DAY_LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");

const CLOCK_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:none]:[minute padding:zero] [period case:upper]");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetZone {
    pub offset: UtcOffset,
    pub label: &'static str,
}

/// The display zone used everywhere in the app.
pub const IST: TargetZone = TargetZone {
    offset: offset!(+5:30),
    label: "IST",
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KickoffParseError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),

    #[error("invalid time '{0}', expected HH:MM[:SS]")]
    Time(String),

    #[error("kickoff is outside the representable range")]
    OutOfRange,
}

/// Date and time fields as the API reports them, read as UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventTime {
    pub date: Date,
    pub time: Time,
}

impl EventTime {
    /// Parses `YYYY-MM-DD` and `HH:MM[:SS]`. Seconds are ignored.
    pub fn parse(date: &str, time: &str) -> Result<Self, KickoffParseError> {
        let parsed_date = Date::parse(date.trim(), API_DATE_FORMAT)
            .map_err(|_| KickoffParseError::Date(date.to_string()))?;
        let parsed_time = Time::parse(time.trim(), API_TIME_FORMAT)
            .ok()
            .and_then(|t| t.replace_second(0).ok())
            .ok_or_else(|| KickoffParseError::Time(time.to_string()))?;

        Ok(Self {
            date: parsed_date,
            time: parsed_time,
        })
    }

    /// The event as a UTC instant.
    pub fn assume_utc(&self) -> OffsetDateTime {
        PrimitiveDateTime::new(self.date, self.time).assume_utc()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetInstant {
    /// UTC instant whose fields are the display-zone wall clock.
    pub instant: OffsetDateTime,
    pub offset: UtcOffset,
}

impl TargetInstant {
    /// Display-zone calendar date of the event.
    pub fn local_date(&self) -> Date {
        self.instant.date()
    }
}

impl TargetZone {
    fn shift(&self, at: OffsetDateTime) -> Option<OffsetDateTime> {
        at.to_offset(UtcOffset::UTC)
            .checked_add(Duration::seconds(i64::from(self.offset.whole_seconds())))
    }

    pub fn to_target_instant(
        &self,
        date: &str,
        time: &str,
    ) -> Result<TargetInstant, KickoffParseError> {
        let event = EventTime::parse(date, time)?;
        let instant = self.shift(event.assume_utc()).ok_or(KickoffParseError::OutOfRange)?;
        Ok(TargetInstant {
            instant,
            offset: self.offset,
        })
    }

    pub fn format_relative_datetime(&self, date: &str, time: &str, now: OffsetDateTime) -> String {
        let raw = || format!("{date} {time} {}", self.label);

        let target = match self.to_target_instant(date, time) {
            Ok(target) => target,
            Err(err) => {
                tracing::debug!(error = %err, "showing raw kickoff");
                return raw();
            }
        };
        let Some(now_local) = self.shift(now) else {
            return raw();
        };

        let diff_days = (target.local_date() - now_local.date()).whole_days();
        let day = match diff_days {
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            -1 => "Yesterday".to_string(),
            _ => match target.instant.format(DAY_LABEL_FORMAT) {
                Ok(label) => label,
                Err(_) => return raw(),
            },
        };

        match target.instant.format(CLOCK_FORMAT) {
            Ok(clock) => format!("{day}, {clock} {}", self.label),
            Err(_) => raw(),
        }
    }
}

/// Reads `date`/`time` as UTC and moves them into the display zone.
pub fn to_target_instant(date: &str, time: &str) -> Result<TargetInstant, KickoffParseError> {
    IST.to_target_instant(date, time)
}

/// Time left until `target`, most significant unit pair only. `None` once the
/// match has started.
pub fn countdown(target: &TargetInstant, now: OffsetDateTime) -> Option<String> {
    let now = now
        .to_offset(UtcOffset::UTC)
        .checked_add(Duration::seconds(i64::from(target.offset.whole_seconds())))?;
    if target.instant <= now {
        return None;
    }

    let secs = (target.instant - now).whole_seconds();
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3_600;
    let minutes = secs % 3_600 / 60;
    let seconds = secs % 60;

    Some(if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {seconds}s")
    })
}

/// "Today, 8:30 PM IST", "Tomorrow, ...", "Mar 1, 2024, ...". Never fails:
/// unparseable input comes back as the raw fields plus the zone label.
pub fn format_relative_datetime(date: &str, time: &str, now: OffsetDateTime) -> String {
    IST.format_relative_datetime(date, time, now)
}

/// Re-renders the countdown every `period`, handing each rendering to
/// `on_tick`, and returns once the match has started. Returns how many
/// renderings were produced.
pub async fn run_countdown<C, F>(
    target: TargetInstant,
    clock: C,
    period: StdDuration,
    mut on_tick: F,
) -> usize
where
    C: Fn() -> OffsetDateTime,
    F: FnMut(&str),
{
    let mut ticker = tokio::time::interval(period.max(StdDuration::from_millis(1)));
    let mut rendered = 0;
    loop {
        ticker.tick().await;
        match countdown(&target, clock()) {
            Some(text) => {
                on_tick(&text);
                rendered += 1;
            }
            None => return rendered,
        }
    }
}
