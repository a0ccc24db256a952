//! Presentation-ready values derived from a snapshot.

use chrono::{DateTime, TimeZone, Timelike};

use crate::model::{Condition, WeatherSnapshot};

/// Illustration shown next to the temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Imagery {
    Sun,
    Moon,
    Atmosphere,
    Clouds,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl Imagery {
    /// `hour` is the viewer's local hour of day (0-23).
    pub fn for_condition(condition: Condition, hour: u32) -> Self {
        match condition {
            Condition::Clear if is_night(hour) => Self::Moon,
            Condition::Clear => Self::Sun,
            Condition::Atmosphere => Self::Atmosphere,
            Condition::Clouds => Self::Clouds,
            Condition::Drizzle => Self::Drizzle,
            Condition::Rain => Self::Rain,
            Condition::Snow => Self::Snow,
            Condition::Thunderstorm => Self::Thunderstorm,
            Condition::Unknown => Self::Sun,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Moon => "moon",
            Self::Atmosphere => "atmosphere",
            Self::Clouds => "clouds",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Thunderstorm => "thunderstorm",
        }
    }
}

/// Night runs from 21:00 through 05:59.
pub fn is_night(hour: u32) -> bool {
    hour > 20 || hour < 6
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Round to one decimal, halves towards positive infinity.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// "21.5°C / 70.7°F", with the preferred unit first.
pub fn temperature_line(celsius: f64, use_celsius: bool) -> String {
    let c = round_tenth(celsius);
    let f = round_tenth(celsius_to_fahrenheit(celsius));

    if use_celsius {
        format!("{c}°C / {f}°F")
    } else {
        format!("{f}°F / {c}°C")
    }
}

/// Everything the screen shows for a reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub weekday: String,
    pub date: String,
    pub city: String,
    pub temperature: String,
    pub condition: String,
    pub imagery: Imagery,
}

impl ScreenView {
    /// Dates are rendered in `now`'s time zone, and imagery follows `now`'s
    /// hour rather than the observation time.
    pub fn build<Tz>(snapshot: &WeatherSnapshot, use_celsius: bool, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let (weekday, date) = match DateTime::from_timestamp(snapshot.observed_at_epoch_seconds, 0)
        {
            Some(observed) => {
                let local = observed.with_timezone(&now.timezone());
                (
                    local.format("%A").to_string(),
                    local.format("%B %-d %Y").to_string(),
                )
            }
            None => (String::new(), String::new()),
        };

        Self {
            weekday,
            date,
            city: snapshot.city.clone(),
            temperature: temperature_line(snapshot.temperature_celsius, use_celsius),
            condition: snapshot.description.clone(),
            imagery: Imagery::for_condition(snapshot.condition, now.hour()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use chrono::Utc;

    fn snapshot(condition: Condition, description: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            city: "San Francisco".into(),
            coordinates: Coordinates::DEFAULT,
            temperature_celsius: 21.46,
            condition,
            description: description.into(),
            // Friday, October 16 2026 18:40:00 UTC
            observed_at_epoch_seconds: 1_792_176_000,
        }
    }

    #[test]
    fn clear_sky_switches_to_moon_at_night() {
        assert_eq!(Imagery::for_condition(Condition::Clear, 22), Imagery::Moon);
        assert_eq!(Imagery::for_condition(Condition::Clear, 3), Imagery::Moon);
        assert_eq!(Imagery::for_condition(Condition::Clear, 12), Imagery::Sun);
        assert_eq!(Imagery::for_condition(Condition::Clear, 20), Imagery::Sun);
        assert_eq!(Imagery::for_condition(Condition::Clear, 6), Imagery::Sun);
    }

    #[test]
    fn unknown_condition_uses_default_imagery() {
        let condition = Condition::from_provider("Tornado");
        assert_eq!(Imagery::for_condition(condition, 22), Imagery::Sun);
        assert_eq!(Imagery::for_condition(condition, 12), Imagery::Sun);
    }

    #[test]
    fn other_conditions_ignore_time_of_day() {
        assert_eq!(Imagery::for_condition(Condition::Rain, 23), Imagery::Rain);
        assert_eq!(Imagery::for_condition(Condition::Snow, 1), Imagery::Snow);
        assert_eq!(Imagery::Thunderstorm.name(), "thunderstorm");
    }

    #[test]
    fn temperature_line_orders_preferred_unit_first() {
        assert_eq!(temperature_line(21.46, true), "21.5°C / 70.6°F");
        assert_eq!(temperature_line(21.46, false), "70.6°F / 21.5°C");
        assert_eq!(temperature_line(0.0, true), "0°C / 32°F");
        assert_eq!(temperature_line(-40.0, false), "-40°F / -40°C");
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_tenth(1.25), 1.3);
        assert_eq!(round_tenth(-1.25), -1.2);
        assert_eq!(round_tenth(-0.04), 0.0);
    }

    #[test]
    fn screen_view_formats_observation_date() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 22, 0, 0).unwrap();
        let view = ScreenView::build(&snapshot(Condition::Clear, "Clear"), true, &now);

        assert_eq!(view.weekday, "Friday");
        assert_eq!(view.date, "October 16 2026");
        assert_eq!(view.city, "San Francisco");
        assert_eq!(view.temperature, "21.5°C / 70.6°F");
        assert_eq!(view.condition, "Clear");
        assert_eq!(view.imagery, Imagery::Moon);
    }
}
