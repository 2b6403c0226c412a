// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;

use canonical_error::CanonicalError;
use log::{info, warn};

use crate::astro_util::format_dms_lat_long;

/// An observer's position on Earth.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    // Degrees, -90..90.
    pub latitude: f64,
    // Degrees, -180..180, positive east.
    pub longitude: f64,
    // Meters above sea level. None when the source could not determine it
    // (e.g. IP based geolocation).
    pub altitude: Option<f64>,

    pub city: String,
    pub country: String,
}

/// Where a Location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Network,
    Device,
    UserSupplied,
    Default,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LocationSource::Network => "current IP address",
            LocationSource::Device => "network or device data",
            LocationSource::UserSupplied => "user supplied coordinates",
            LocationSource::Default => "application default settings",
        };
        write!(f, "{}", text)
    }
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, altitude: Option<f64>) -> Self {
        Location {
            latitude,
            longitude,
            altitude,
            city: String::new(),
            country: String::new(),
        }
    }

    pub fn with_label(mut self, city: &str, country: &str) -> Self {
        self.city = city.to_string();
        self.country = country.to_string();
        self
    }

    /// Latitude and longitude as degrees-minutes-seconds strings.
    pub fn dms(&self) -> (String, String) {
        format_dms_lat_long(self.latitude, self.longitude)
    }

    /// Used when there are no location services available: Braga, Portugal.
    pub fn default_location() -> Self {
        Location::new(41.55926513671875, -8.405625509894655, Some(190.0))
            .with_label("Braga", "Portugal")
    }

    /// A few well known observing sites, useful for testing.
    pub fn alternative_locations() -> Vec<Location> {
        vec![
            Location::new(51.1739726374, -1.82237671048, Some(92.0))
                .with_label("Stonehenge", "United Kingdom"),
            Location::new(28.304474, -16.509514, Some(2390.0))
                .with_label("Izaña, Teide Observatory", "Tenerife, Spain"),
            Location::new(-43.9866667, 170.4650000, Some(1027.0))
                .with_label("Mackenzie Basin, Mt. John Observatory",
                            "New Zealand"),
        ]
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lat, long) = self.dms();
        write!(f, "{} {}", lat, long)?;
        if !self.city.is_empty() || !self.country.is_empty() {
            write!(f, " ({}, {})", self.city, self.country)?;
        }
        match self.altitude {
            Some(alt) => write!(f, " alt {:.0}m", alt),
            None => write!(f, " alt <undetermined>"),
        }
    }
}

pub trait LocationProvider {
    /// Determines the observer's current location. Can fail when the network
    /// or the device's location service is unavailable.
    fn resolve_current_location(
        &self,
    ) -> Result<(Location, LocationSource), CanonicalError>;
}

/// Returns the provider's location, or the default location when there is no
/// provider or it fails.
pub fn resolve_location(
    provider: Option<&dyn LocationProvider>,
) -> (Location, LocationSource) {
    if let Some(provider) = provider {
        match provider.resolve_current_location() {
            Ok((location, source)) => {
                info!("Based on the {}, location is {}", source, location);
                return (location, source);
            }
            Err(e) => {
                warn!("Could not determine current location: {:?}", e);
            }
        }
    }
    let location = Location::default_location();
    info!("Using default location {}", location);
    (location, LocationSource::Default)
}

// mod tests.
