//! Domain types for mission stops.
//!
//! A mission is a set of geographic stops; each stop collects items
//! (pickup), releases items (dropoff), or is just passed through
//! (waypoint/depot). Time windows are carried for display and ETA
//! reporting only; the solver does not enforce them.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within geographic bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Role of a stop in the precedence model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopKind {
    Pickup,
    Dropoff,
    Waypoint,
    Depot,
}

/// A single location to visit during a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Site identifier, or a synthetic id for the vehicle start position.
    pub id: String,
    pub coordinates: Coordinates,
    pub kind: StopKind,
    /// Items collected here (pickup) or released here (dropoff).
    pub item_ids: Vec<String>,
    /// Informational service window; not enforced by the solver.
    pub time_window: Option<TimeWindow>,
}

impl Stop {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, kind: StopKind) -> Self {
        Self {
            id: id.into(),
            coordinates: Coordinates::new(latitude, longitude),
            kind,
            item_ids: Vec::new(),
            time_window: None,
        }
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_ids = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }
}

/// Earliest/latest service time for a stop (display only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

/// Wall-clock time of day, minute resolution.
///
/// Parsed from and rendered as `HH:MM`. Arithmetic wraps at midnight,
/// matching how ETAs are reported for overnight routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

const MINUTES_PER_DAY: u16 = 24 * 60;

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    pub fn hour(&self) -> u8 {
        (self.minutes / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.minutes % 60) as u8
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_from_midnight(&self) -> u16 {
        self.minutes
    }

    /// Advance by a (possibly fractional) number of minutes, rounding to
    /// the nearest minute and wrapping past midnight.
    pub fn add_minutes(&self, minutes: f64) -> ClockTime {
        let offset = minutes.round() as i64;
        let total = (i64::from(self.minutes) + offset).rem_euclid(i64::from(MINUTES_PER_DAY));
        ClockTime {
            minutes: total as u16,
        }
    }
}

/// Defaults to the standard 08:00 mission start.
impl Default for ClockTime {
    fn default() -> Self {
        ClockTime { minutes: 8 * 60 }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Error parsing an `HH:MM` clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid HH:MM time: {input}")]
pub struct ParseClockTimeError {
    pub input: String,
}

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseClockTimeError {
            input: s.to_string(),
        };
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        ClockTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(45.76, 4.83).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.5, 4.83).is_valid());
        assert!(!Coordinates::new(45.76, -180.1).is_valid());
        assert!(!Coordinates::new(f64::NAN, 4.83).is_valid());
        assert!(!Coordinates::new(45.76, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_clock_time_parse_and_display() {
        let time: ClockTime = "08:05".parse().expect("parse 08:05");
        assert_eq!(time.hour(), 8);
        assert_eq!(time.minute(), 5);
        assert_eq!(time.to_string(), "08:05");
    }

    #[test]
    fn test_clock_time_rejects_garbage() {
        assert!("8h30".parse::<ClockTime>().is_err());
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("08:60".parse::<ClockTime>().is_err());
        assert!("".parse::<ClockTime>().is_err());
    }

    #[test]
    fn test_clock_time_add_minutes() {
        let start: ClockTime = "08:00".parse().expect("parse");
        assert_eq!(start.add_minutes(90.0).to_string(), "09:30");
        assert_eq!(start.add_minutes(12.4).to_string(), "08:12");
        assert_eq!(start.add_minutes(12.6).to_string(), "08:13");
    }

    #[test]
    fn test_clock_time_wraps_past_midnight() {
        let late: ClockTime = "23:30".parse().expect("parse");
        assert_eq!(late.add_minutes(45.0).to_string(), "00:15");
    }

    #[test]
    fn test_stop_builder() {
        let stop = Stop::new("site-1", 45.76, 4.83, StopKind::Pickup).with_items(["crate-a"]);
        assert_eq!(stop.id, "site-1");
        assert_eq!(stop.item_ids, vec!["crate-a".to_string()]);
        assert!(stop.time_window.is_none());
    }
}
