//! Local time for a resolved location.
//!
//! The rendered clock is an external widget; [`ClockProvider`] is the seam it
//! plugs into. [`LocalClock`] renders from the IANA zone when no widget is
//! available.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use ipdash_core::Language;
use ipdash_geo::LocationRecord;

/// Everything a clock widget needs to render one location.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockRequest {
    pub timezone: String,
    pub lat: f64,
    pub lon: f64,
    pub language: Language,
}

impl ClockRequest {
    /// Build a request for a location with a zone and usable coordinates
    pub fn for_location(record: &LocationRecord, language: Language) -> Option<Self> {
        let (lat, lon) = record.coordinates()?;
        if record.timezone.is_empty() {
            return None;
        }
        Some(Self {
            timezone: record.timezone.clone(),
            lat,
            lon,
            language,
        })
    }

    /// Language tag understood by the widget script
    pub fn widget_language(&self) -> &'static str {
        match self.language {
            Language::ChineseSimplified => "zh",
            other => other.code(),
        }
    }

    /// `lat,lon` rounded to four decimals
    pub fn coords_param(&self) -> String {
        format!("{:.4},{:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockDisplay {
    /// `HH:MM:SS`, 24h
    pub time: String,
    /// e.g. `Wednesday, May 1, 2024`
    pub date: String,
    pub timezone: String,
}

pub trait ClockProvider {
    /// `None` when the clock cannot be shown for this request
    fn display(&self, request: &ClockRequest) -> Option<ClockDisplay>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl LocalClock {
    pub fn render_at(&self, request: &ClockRequest, now: DateTime<Utc>) -> Option<ClockDisplay> {
        let tz: Tz = match request.timezone.parse() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::debug!(timezone = %request.timezone, "Unknown timezone, clock unavailable");
                return None;
            }
        };
        let local = now.with_timezone(&tz);
        Some(ClockDisplay {
            time: local.format("%H:%M:%S").to_string(),
            date: local.format("%A, %B %-d, %Y").to_string(),
            timezone: request.timezone.clone(),
        })
    }
}

impl ClockProvider for LocalClock {
    fn display(&self, request: &ClockRequest) -> Option<ClockDisplay> {
        self.render_at(request, Utc::now())
    }
}
