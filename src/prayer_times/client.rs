use chrono::{NaiveDate, NaiveTime};
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{DailySchedule, PrayerType};

const TIMINGS_URL: &str = "http://api.aladhan.com/v1/timings";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("prayer times service returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("prayer times service answered with code {0}")]
    ApiCode(i64),
    #[error("response has no timing for {0}")]
    MissingTiming(PrayerType),
    #[error("bad time '{value}' for {prayer}")]
    BadTime { prayer: PrayerType, value: String },
}

/// Anything that can produce the five prayer times for a calendar day.
pub trait ScheduleSource {
    fn fetch(&self, config: &AppConfig, date: NaiveDate) -> Result<DailySchedule, ScheduleError>;
}

#[derive(Debug, Deserialize)]
struct TimingsResponse {
    code: i64,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: HashMap<String, String>,
}

/// Client for the Aladhan `timings` endpoint.
pub struct AladhanClient {
    http: Client,
    base_url: String,
}

impl AladhanClient {
    pub fn new() -> Result<Self, ScheduleError> {
        Self::with_base_url(TIMINGS_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ScheduleError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ScheduleSource for AladhanClient {
    fn fetch(&self, config: &AppConfig, date: NaiveDate) -> Result<DailySchedule, ScheduleError> {
        let url = format!("{}/{}", self.base_url, date.format("%d-%m-%Y"));
        debug!("Requesting prayer times from {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", config.latitude.to_string()),
                ("longitude", config.longitude.to_string()),
                ("method", config.method.to_string()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScheduleError::Status(status));
        }

        let body = response.text()?;
        let schedule = parse_timings(&body, date)?;
        info!("Fetched prayer times for {}", date);
        Ok(schedule)
    }
}

/// Parse a `timings` response body into a schedule for `date`.
pub fn parse_timings(body: &str, date: NaiveDate) -> Result<DailySchedule, ScheduleError> {
    let response: TimingsResponse = serde_json::from_str(body)?;
    if response.code != 200 {
        return Err(ScheduleError::ApiCode(response.code));
    }
    let data: TimingsData = serde_json::from_value(response.data)?;

    let mut times = [NaiveTime::default(); 5];
    for (slot, prayer) in times.iter_mut().zip(PrayerType::ALL) {
        let raw = data
            .timings
            .get(prayer.api_key())
            .ok_or(ScheduleError::MissingTiming(prayer))?;
        *slot = parse_hhmm(raw).ok_or_else(|| ScheduleError::BadTime {
            prayer,
            value: raw.clone(),
        })?;
    }

    Ok(DailySchedule::new(date, times))
}

// The service may append a zone label, e.g. "05:12 (EET)".
fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let token = raw.split_whitespace().next()?;
    NaiveTime::parse_from_str(token, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::hm;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    const OK_BODY: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:00",
                "Sunrise": "06:15",
                "Dhuhr": "12:30",
                "Asr": "16:00",
                "Sunset": "18:58",
                "Maghrib": "19:00",
                "Isha": "20:30 (AST)"
            }
        }
    }"#;

    #[test]
    fn parses_five_prayers_in_order() {
        let schedule = parse_timings(OK_BODY, date()).unwrap();
        let times: Vec<_> = schedule.iter().map(|(_, t)| t).collect();
        assert_eq!(
            times,
            vec![hm(5, 0), hm(12, 30), hm(16, 0), hm(19, 0), hm(20, 30)]
        );
        assert_eq!(schedule.date(), date());
    }

    #[test]
    fn non_200_code_is_an_error() {
        let body = r#"{"code": 400, "status": "BAD_REQUEST", "data": "Invalid date"}"#;
        assert!(matches!(
            parse_timings(body, date()),
            Err(ScheduleError::ApiCode(400))
        ));
    }

    #[test]
    fn missing_prayer_is_an_error() {
        let body = r#"{"code": 200, "data": {"timings": {"Fajr": "05:00", "Dhuhr": "12:30"}}}"#;
        assert!(matches!(
            parse_timings(body, date()),
            Err(ScheduleError::MissingTiming(PrayerType::Asr))
        ));
    }

    #[test]
    fn malformed_time_is_an_error() {
        let body = OK_BODY.replace("\"16:00\"", "\"4pm\"");
        match parse_timings(&body, date()) {
            Err(ScheduleError::BadTime { prayer, value }) => {
                assert_eq!(prayer, PrayerType::Asr);
                assert_eq!(value, "4pm");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_data_is_an_error() {
        assert!(matches!(
            parse_timings(r#"{"code": 200}"#, date()),
            Err(ScheduleError::Json(_))
        ));
        assert!(parse_timings("not json", date()).is_err());
    }
}
