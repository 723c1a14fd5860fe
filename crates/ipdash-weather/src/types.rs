use chrono::{NaiveDateTime, Timelike};
use ipdash_core::{AppError, ConfigError, ReqwestErrorExt};
use serde::{Deserialize, Serialize};

/// Open-Meteo local timestamp format (`timezone=auto`)
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Hours shown in the temperature chart
pub const CHART_HOURS: usize = 24;

/// Weather condition buckets mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    ClearSky,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    RimeFog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::ClearSky,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 => Self::Fog,
            48 => Self::RimeFog,
            51 => Self::Drizzle,
            50..=67 => Self::Rain,
            70..=77 => Self::Snow,
            95.. => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::RimeFog => "Depositing rime fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    /// Get icon name
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::ClearSky | Self::MainlyClear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Overcast | Self::Unknown => "cloud",
            Self::Fog | Self::RimeFog => "cloud_fog",
            Self::Drizzle | Self::Rain => "cloud_rain",
            Self::Snow => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// Current conditions block, as sent by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
    #[serde(default)]
    pub winddirection: f64,
    pub weathercode: i32,
    /// 1 during daylight, 0 at night
    pub is_day: u8,
    /// Local time of the observation
    pub time: String,
}

/// Hourly series; the three vectors are index-aligned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relativehumidity_2m: Vec<Option<f64>>,
}

/// Forecast response, passed through unmodified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub current_weather: CurrentWeather,
    #[serde(default)]
    pub hourly: HourlySeries,
}

/// One point of the hourly temperature chart
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPoint {
    /// `H:00` in the location's local time
    pub label: String,
    pub temperature: f64,
}

fn parse_local_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, LOCAL_TIME_FORMAT).ok()
}

impl WeatherRecord {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.current_weather.weathercode)
    }

    pub fn is_day(&self) -> bool {
        self.current_weather.is_day == 1
    }

    /// First `hours` hourly temperatures, skipping slots the provider left empty
    pub fn chart_points(&self, hours: usize) -> Vec<HourlyPoint> {
        self.hourly
            .time
            .iter()
            .zip(&self.hourly.temperature_2m)
            .take(hours)
            .filter_map(|(time, temp)| {
                let temperature = (*temp)?;
                let label = match parse_local_time(time) {
                    Some(t) => format!("{}:00", t.hour()),
                    None => time.clone(),
                };
                Some(HourlyPoint { label, temperature })
            })
            .collect()
    }

    /// Relative humidity for the hour containing the current observation
    pub fn current_humidity(&self) -> Option<f64> {
        let now = parse_local_time(&self.current_weather.time)?;
        let hour = now.with_minute(0)?;
        let index = self
            .hourly
            .time
            .iter()
            .position(|t| parse_local_time(t) == Some(hour))?;
        self.hourly.relativehumidity_2m.get(index).copied().flatten()
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather Fetch Error: {reason}")]
    Http { status: u16, reason: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid weather endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        use ipdash_core::WeatherError as CoreWeatherError;
        match e {
            WeatherError::Network(err) => AppError::Network(err.into_network_error()),
            WeatherError::Http { status, .. } if status >= 500 => {
                AppError::Weather(CoreWeatherError::ServiceUnavailable)
            }
            err @ WeatherError::Http { .. } => {
                AppError::Weather(CoreWeatherError::ApiError(err.to_string()))
            }
            WeatherError::Parse(msg) => AppError::Weather(CoreWeatherError::InvalidData(msg)),
            WeatherError::InvalidEndpoint(msg) => AppError::Config(ConfigError::Invalid(msg)),
        }
    }
}
