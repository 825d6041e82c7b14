use crate::kickoff::{countdown, format_relative_datetime, to_target_instant};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    Live,
    Finished,
    Postponed,
    Upcoming,
}

impl MatchStatus {
    /// Maps the provider's free-form status field. Unknown or missing values
    /// are treated as not yet started.
    pub fn from_api(raw: Option<&str>) -> Self {
        match raw.map(str::trim).unwrap_or_default() {
            "Live" | "1H" | "2H" | "HT" => MatchStatus::Live,
            "Finished" | "FT" => MatchStatus::Finished,
            "Postponed" | "Canceled" => MatchStatus::Postponed,
            _ => MatchStatus::Upcoming,
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            MatchStatus::Live => "LIVE",
            MatchStatus::Finished => "FT",
            MatchStatus::Postponed => "PP",
            MatchStatus::Upcoming => "UPCOMING",
        }
    }
}

/// Everything a match card shows about when a match happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KickoffView {
    pub status: MatchStatus,
    pub when: String,
    /// Only upcoming matches with a parseable future kickoff get one.
    pub countdown: Option<String>,
}

pub fn kickoff_view(
    status: Option<&str>,
    date: &str,
    time: &str,
    now: OffsetDateTime,
) -> KickoffView {
    let status = MatchStatus::from_api(status);
    let remaining = match status {
        MatchStatus::Upcoming => to_target_instant(date, time)
            .ok()
            .and_then(|target| countdown(&target, now)),
        _ => None,
    };

    KickoffView {
        status,
        when: format_relative_datetime(date, time, now),
        countdown: remaining,
    }
}
