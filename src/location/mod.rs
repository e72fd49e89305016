pub mod detect;

pub use detect::{GeoOutcome, Geolocator, IpApiLocator, Location, detect_location};
