// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// Sunset and sunrise search, used for the default session window.

use std::time::{Duration, SystemTime};

use canonical_error::{failed_precondition_error, CanonicalError};
use log::debug;

use crate::location::Location;
use crate::position_provider::{PositionProvider, SolarSystemBody, Target};

/// Geometric altitude of the Sun's center at sunrise and sunset. Includes the
/// solar semi-diameter and standard horizon refraction, so it is compared
/// against unrefracted altitudes.
pub const SUNRISE_SUNSET_ALTITUDE: f64 = -0.833;

const SCAN_STEP: Duration = Duration::from_secs(10 * 60);
const SCAN_LIMIT: Duration = Duration::from_secs(48 * 3600);
const RESOLUTION: Duration = Duration::from_secs(1);

/// Geometric (unrefracted) altitude of the Sun's center, degrees.
pub fn sun_altitude(provider: &dyn PositionProvider,
                    location: &Location,
                    instant: SystemTime)
                    -> Result<f64, CanonicalError> {
    Ok(provider
       .observe_geometric(location, instant,
                          &Target::SolarSystem(SolarSystemBody::Sun))?
       .alt)
}

// Finds the first instant after `from` where the Sun's altitude crosses
// SUNRISE_SUNSET_ALTITUDE, going up if `rising`, else going down.
fn next_crossing(provider: &dyn PositionProvider,
                 location: &Location,
                 from: SystemTime,
                 rising: bool)
                 -> Result<SystemTime, CanonicalError> {
    // True when the Sun is on the far side of the crossing.
    let crossed = |alt: f64| {
        if rising {
            alt >= SUNRISE_SUNSET_ALTITUDE
        } else {
            alt <= SUNRISE_SUNSET_ALTITUDE
        }
    };
    let mut before = from;
    let mut before_crossed = crossed(sun_altitude(provider, location, from)?);
    while before < from + SCAN_LIMIT {
        let after = before + SCAN_STEP;
        let after_crossed = crossed(sun_altitude(provider, location, after)?);
        if !before_crossed && after_crossed {
            // Bisect.
            let (mut lo, mut hi) = (before, after);
            while hi.duration_since(lo).unwrap_or_default() > RESOLUTION {
                let mid = lo + hi.duration_since(lo).unwrap_or_default() / 2;
                if crossed(sun_altitude(provider, location, mid)?) {
                    hi = mid;
                } else {
                    lo = mid;
                }
            }
            return Ok(hi);
        }
        before = after;
        before_crossed = after_crossed;
    }
    Err(failed_precondition_error(
        format!("No {} within {} hours of {:?} at {}",
                if rising { "sunrise" } else { "sunset" },
                SCAN_LIMIT.as_secs() / 3600, from, location).as_str(),
    ))
}

/// First sunset after `from`. FailedPrecondition if the Sun does not set
/// within 48 hours (polar day or night).
pub fn next_sunset(location: &Location,
                   from: SystemTime,
                   provider: &dyn PositionProvider)
                   -> Result<SystemTime, CanonicalError> {
    next_crossing(provider, location, from, /*rising=*/false)
}

/// First sunrise after `from`. FailedPrecondition if the Sun does not rise
/// within 48 hours.
pub fn next_sunrise(location: &Location,
                    from: SystemTime,
                    provider: &dyn PositionProvider)
                    -> Result<SystemTime, CanonicalError> {
    next_crossing(provider, location, from, /*rising=*/true)
}

/// The night following (or containing) `from`: starts at `from` if the Sun
/// is already down, else at the next sunset; ends at the following sunrise.
pub fn coming_night(location: &Location,
                    from: SystemTime,
                    provider: &dyn PositionProvider)
                    -> Result<(SystemTime, SystemTime), CanonicalError> {
    let start =
        if sun_altitude(provider, location, from)? <= SUNRISE_SUNSET_ALTITUDE {
            from
        } else {
            next_sunset(location, from, provider)?
        };
    let end = next_sunrise(location, start, provider)?;
    debug!("Coming night at {}: {:?} to {:?}", location, start, end);
    Ok((start, end))
}

// mod tests.
