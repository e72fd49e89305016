use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const IP_API_URL: &str = "http://ip-api.com/json/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("lookup unsuccessful (status: {0})")]
    Lookup(String),
    #[error("response is missing '{0}'")]
    MissingField(&'static str),
    #[error("coordinates out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
}

impl Location {
    /// Fixed location used when detection fails.
    pub fn mecca() -> Self {
        Self {
            latitude: 21.4225,
            longitude: 39.8262,
            city: "Mecca".to_string(),
            country: "Saudi Arabia".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), GeoError> {
        if valid_coordinates(self.latitude, self.longitude) {
            Ok(())
        } else {
            Err(GeoError::OutOfRange {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

pub fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

/// Where a configuration's location came from.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoOutcome {
    Detected(Location),
    DefaultFallback,
}

impl GeoOutcome {
    pub fn into_location(self) -> Location {
        match self {
            GeoOutcome::Detected(location) => location,
            GeoOutcome::DefaultFallback => Location::mecca(),
        }
    }
}

pub trait Geolocator {
    fn locate(&self) -> Result<Location, GeoError>;
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

/// IP-based lookup against ip-api.com.
pub struct IpApiLocator {
    http: Client,
    url: String,
}

impl IpApiLocator {
    pub fn new() -> Result<Self, GeoError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: IP_API_URL.to_string(),
        })
    }
}

impl Geolocator for IpApiLocator {
    fn locate(&self) -> Result<Location, GeoError> {
        let response: IpApiResponse = self.http.get(&self.url).send()?.json()?;
        location_from_response(response)
    }
}

fn location_from_response(response: IpApiResponse) -> Result<Location, GeoError> {
    if response.status != "success" {
        let reason = response.message.unwrap_or(response.status);
        return Err(GeoError::Lookup(reason));
    }
    Ok(Location {
        latitude: response.lat.ok_or(GeoError::MissingField("lat"))?,
        longitude: response.lon.ok_or(GeoError::MissingField("lon"))?,
        city: response.city.ok_or(GeoError::MissingField("city"))?,
        country: response.country.ok_or(GeoError::MissingField("country"))?,
    })
}

/// Run the lookup, validating what comes back. Never fails: every error
/// collapses into [`GeoOutcome::DefaultFallback`].
pub fn detect_location(locator: &dyn Geolocator) -> GeoOutcome {
    let result = locator
        .locate()
        .and_then(|location| location.validate().map(|_| location));

    match result {
        Ok(location) => {
            info!(
                "Detected location {}, {} ({:.4}, {:.4})",
                location.city, location.country, location.latitude, location.longitude
            );
            GeoOutcome::Detected(location)
        }
        Err(e) => {
            warn!("Location detection failed: {e}; using Mecca, Saudi Arabia");
            GeoOutcome::DefaultFallback
        }
    }
}
