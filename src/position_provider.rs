// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use canonical_error::{not_found_error, CanonicalError};

use crate::location::Location;

// Degrees. `ra` is 0..360, `dec` is -90..90.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialCoord {
    pub ra: f64,
    pub dec: f64,
}

// Position of a target in the observer's sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalPosition {
    // Degrees above the horizon.
    pub alt: f64,
    // Degrees clockwise from north, 0..360.
    pub az: f64,
    // Astronomical units. None for fixed (catalog) targets.
    pub distance: Option<f64>,
}

/// Solar System bodies that can be observed from Earth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarSystemBody {
    Sun,
    Mercury,
    Venus,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl SolarSystemBody {
    /// The bodies considered when a session does not list its own. Earth is
    /// skipped, since observatories on other planets are not supported.
    pub const DEFAULT_TOP_LIST: &'static [SolarSystemBody] = &[
        SolarSystemBody::Sun,
        SolarSystemBody::Mercury,
        SolarSystemBody::Venus,
        SolarSystemBody::Moon,
        SolarSystemBody::Mars,
        SolarSystemBody::Jupiter,
        SolarSystemBody::Saturn,
        SolarSystemBody::Uranus,
        SolarSystemBody::Neptune,
        SolarSystemBody::Pluto,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SolarSystemBody::Sun => "sun",
            SolarSystemBody::Mercury => "mercury",
            SolarSystemBody::Venus => "venus",
            SolarSystemBody::Moon => "moon",
            SolarSystemBody::Mars => "mars",
            SolarSystemBody::Jupiter => "jupiter",
            SolarSystemBody::Saturn => "saturn",
            SolarSystemBody::Uranus => "uranus",
            SolarSystemBody::Neptune => "neptune",
            SolarSystemBody::Pluto => "pluto",
        }
    }

    /// Upper case label used as the observer's name, e.g. "JUPITER".
    pub fn display_name(&self) -> String {
        self.name().to_uppercase()
    }
}

impl fmt::Display for SolarSystemBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// Only the first word counts, so ephemeris style names such as
// "JUPITER BARYCENTER" are accepted.
impl FromStr for SolarSystemBody {
    type Err = CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let first_word = s.split_whitespace().next().unwrap_or("");
        SolarSystemBody::DEFAULT_TOP_LIST
            .iter()
            .find(|b| b.name().eq_ignore_ascii_case(first_word))
            .copied()
            .ok_or_else(|| {
                not_found_error(
                    format!("Unknown Solar System body {:?}", s).as_str(),
                )
            })
    }
}

/// Where and when positions are evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationContext {
    pub location: Location,
    pub instant: SystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    SolarSystem(SolarSystemBody),
    Fixed(EquatorialCoord),
}

/// Source of astrometric positions. Implementations must be deterministic:
/// identical arguments give identical results.
pub trait PositionProvider {
    /// Converts a point of the observer's sky (degrees) to the equatorial
    /// coordinates it corresponds to at `instant`.
    fn altaz_to_radec(&self,
                      location: &Location,
                      instant: SystemTime,
                      alt: f64,
                      az: f64)
                      -> Result<EquatorialCoord, CanonicalError>;

    /// Where `target` is in the observer's sky at `instant`.
    fn observe(&self,
               location: &Location,
               instant: SystemTime,
               target: &Target)
               -> Result<HorizontalPosition, CanonicalError>;

    /// Like `observe()`, but the altitude is never corrected for atmospheric
    /// refraction. Providers that do not model refraction need not override
    /// this.
    fn observe_geometric(&self,
                         location: &Location,
                         instant: SystemTime,
                         target: &Target)
                         -> Result<HorizontalPosition, CanonicalError> {
        self.observe(location, instant, target)
    }
}

// mod tests.
