// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;
use std::time::{Duration, SystemTime};

use canonical_error::{failed_precondition_error, invalid_argument_error,
                      CanonicalError};

use crate::catalog_provider::{CatalogProvider, Magnitudes};
use crate::constellation::Constellation;
use crate::constraints::ObjectKind;
use crate::location::Location;
use crate::position_provider::{EquatorialCoord, ObservationContext,
                               PositionProvider, SolarSystemBody, Target};

// Sampling interval for `will_be_up()`.
const WILL_BE_UP_STEP: Duration = Duration::from_secs(10 * 60);

/// What is being observed.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverKind {
    // Position recomputed from the ephemeris on every update.
    Planet(SolarSystemBody),

    // Catalog position, fixed at construction.
    DeepSky {
        coords: EquatorialCoord,
        constellation: Option<Constellation>,
        object_type: ObjectKind,
    },
}

/// Position snapshot from the most recent `update_coords()`. All None until
/// the first successful update, and after invalidation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservedPosition {
    // Degrees.
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub alt: Option<f64>,
    pub az: Option<f64>,
    // AU; Solar System bodies only.
    pub distance: Option<f64>,
}

/// One celestial object being tracked by a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceObserver {
    pub object_name: String,
    // Never empty; `object_name` first.
    pub names: Vec<String>,
    pub kind: ObserverKind,
    pub magnitudes: Magnitudes,
    pub position: ObservedPosition,

    pub is_bookmarked: bool,
    pub score: f64,
}

impl SpaceObserver {
    /// Fails with NotFound if `name` is not a Solar System body.
    pub fn planet(name: &str) -> Result<Self, CanonicalError> {
        let body = name.parse::<SolarSystemBody>()?;
        Ok(SpaceObserver {
            object_name: body.display_name(),
            names: vec![body.display_name()],
            kind: ObserverKind::Planet(body),
            magnitudes: Magnitudes::default(),
            position: ObservedPosition::default(),
            is_bookmarked: false,
            score: 0.0,
        })
    }

    /// Looks up `id` in the catalog. Fails with the catalog's error when the
    /// id is unknown, or FailedPrecondition when the entry has no position.
    pub fn deep_sky(id: &str, catalog: &dyn CatalogProvider)
                    -> Result<Self, CanonicalError> {
        let object = catalog.resolve(id)?;
        let Some(coords) = object.coords else {
            return Err(failed_precondition_error(
                format!("Catalog entry {} has no position", object.id)
                    .as_str(),
            ));
        };
        Ok(SpaceObserver {
            object_name: object.id.clone(),
            names: object.names(),
            kind: ObserverKind::DeepSky {
                coords,
                constellation: object.constellation,
                object_type: object.object_type,
            },
            magnitudes: object.magnitudes,
            position: ObservedPosition {
                ra: Some(coords.ra),
                dec: Some(coords.dec),
                ..Default::default()
            },
            is_bookmarked: false,
            score: 0.0,
        })
    }

    pub fn is_planet(&self) -> bool {
        matches!(self.kind, ObserverKind::Planet(_))
    }

    fn target(&self) -> Target {
        match &self.kind {
            ObserverKind::Planet(body) => Target::SolarSystem(*body),
            ObserverKind::DeepSky { coords, .. } => Target::Fixed(*coords),
        }
    }

    /// Recomputes the position for the context's location and instant. On
    /// failure the previous alt/az are discarded.
    pub fn update_coords(&mut self,
                         context: &ObservationContext,
                         provider: &dyn PositionProvider)
                         -> Result<(), CanonicalError> {
        self.invalidate();
        let observed = provider.observe(&context.location, context.instant,
                                        &self.target())?;
        if let ObserverKind::Planet(_) = self.kind {
            let coord = provider.altaz_to_radec(&context.location,
                                                context.instant,
                                                observed.alt, observed.az)?;
            self.position.ra = Some(coord.ra);
            self.position.dec = Some(coord.dec);
        }
        self.position.alt = Some(observed.alt);
        self.position.az = Some(observed.az);
        self.position.distance = observed.distance;
        Ok(())
    }

    /// Forgets the computed position, e.g. after the observer moved. Catalog
    /// coordinates are kept.
    pub fn invalidate(&mut self) {
        self.position.alt = None;
        self.position.az = None;
        self.position.distance = None;
        if self.is_planet() {
            self.position.ra = None;
            self.position.dec = None;
        }
    }

    /// True if the last computed altitude is above the horizon. False when
    /// there is no position.
    pub fn is_up_now(&self) -> bool {
        self.position.alt.is_some_and(|alt| alt > 0.0)
    }

    /// Whether the object is above the horizon at any time in `start..=end`,
    /// sampled every ten minutes (both ends included). Does not change the
    /// cached position.
    pub fn will_be_up(&self,
                      location: &Location,
                      start: SystemTime,
                      end: SystemTime,
                      provider: &dyn PositionProvider)
                      -> Result<bool, CanonicalError> {
        if end < start {
            return Err(invalid_argument_error(
                "will_be_up() window ends before it starts",
            ));
        }
        let target = self.target();
        let mut when = start;
        loop {
            if provider.observe(location, when, &target)?.alt > 0.0 {
                return Ok(true);
            }
            if when >= end {
                return Ok(false);
            }
            when = std::cmp::min(when + WILL_BE_UP_STEP, end);
        }
    }

    /// E.g. "Galaxy in Andromeda, mag 3.44" or "Planet".
    pub fn description(&self) -> String {
        match &self.kind {
            ObserverKind::Planet(body) => match body {
                SolarSystemBody::Sun => "Star".to_string(),
                SolarSystemBody::Moon => "Moon".to_string(),
                SolarSystemBody::Pluto => "Dwarf planet".to_string(),
                _ => "Planet".to_string(),
            },
            ObserverKind::DeepSky { constellation, object_type, .. } => {
                let mut text = object_type.description().to_string();
                if let Some(constellation) = constellation {
                    text += &format!(" in {}", constellation);
                }
                if let Some(mag) = self.magnitudes.best() {
                    text += &format!(", mag {:.2}", mag);
                }
                text
            }
        }
    }
}

impl fmt::Display for SpaceObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.object_name, self.description())?;
        match (self.position.alt, self.position.az) {
            (Some(alt), Some(az)) => write!(f, " alt {:.1}° az {:.1}°", alt, az),
            _ => write!(f, " position unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate approx;
    use approx::assert_abs_diff_eq;
    use canonical_error::CanonicalErrorCode;

    use super::*;
    use crate::ephemeris::AstroPositionProvider;
    use crate::test_util::{test_catalog, utc, FlatSky};

    fn braga_at(instant: SystemTime) -> ObservationContext {
        ObservationContext { location: Location::default_location(), instant }
    }

    #[test]
    fn test_planet_construction() {
        let jupiter = SpaceObserver::planet("JUPITER BARYCENTER").unwrap();
        assert_eq!(jupiter.object_name, "JUPITER");
        assert_eq!(jupiter.names, vec!["JUPITER"]);
        assert!(jupiter.is_planet());
        assert!(!jupiter.is_up_now());

        let err = SpaceObserver::planet("vulcan").unwrap_err();
        assert_eq!(err.code, CanonicalErrorCode::NotFound);
    }

    #[test]
    fn test_deep_sky_construction() {
        let catalog = test_catalog();
        let m31 = SpaceObserver::deep_sky("M 31", &catalog).unwrap();
        assert_eq!(m31.object_name, "NGC0224");
        assert_eq!(m31.names[0], "NGC0224");
        assert!(m31.names.contains(&"M31".to_string()));
        assert!(m31.position.ra.is_some());
        assert_eq!(m31.description(), "Galaxy in Andromeda, mag 3.44");

        let err = SpaceObserver::deep_sky("NGC9999", &catalog).unwrap_err();
        assert_eq!(err.code, CanonicalErrorCode::NotFound);
        let err = SpaceObserver::deep_sky("IC9999", &catalog).unwrap_err();
        assert_eq!(err.code, CanonicalErrorCode::FailedPrecondition);
    }

    #[test]
    fn test_update_coords_idempotent() {
        let provider = AstroPositionProvider::new();
        let context = braga_at(utc(2024, 3, 8, 21, 0, 0));
        let mut observers = vec![
            SpaceObserver::planet("moon").unwrap(),
            SpaceObserver::planet("saturn").unwrap(),
            SpaceObserver::deep_sky("M42", &test_catalog()).unwrap(),
        ];
        for observer in &mut observers {
            observer.update_coords(&context, &provider).unwrap();
            let first = observer.position;
            observer.update_coords(&context, &provider).unwrap();
            let second = observer.position;
            assert_abs_diff_eq!(first.alt.unwrap(), second.alt.unwrap(),
                                epsilon = 1e-9);
            assert_abs_diff_eq!(first.az.unwrap(), second.az.unwrap(),
                                epsilon = 1e-9);
            assert_eq!(first.distance.is_some(), observer.is_planet());
            assert!(second.ra.is_some() && second.dec.is_some());
        }
    }

    #[test]
    fn test_is_up_now() {
        let context = braga_at(utc(2024, 3, 8, 21, 0, 0));
        let sky = FlatSky::default();
        // FlatSky puts the Sun (index 0) up and Mercury (index 1) down.
        let mut sun = SpaceObserver::planet("sun").unwrap();
        let mut mercury = SpaceObserver::planet("mercury").unwrap();
        sun.update_coords(&context, &sky).unwrap();
        mercury.update_coords(&context, &sky).unwrap();
        assert!(sun.is_up_now());
        assert!(!mercury.is_up_now());

        sun.invalidate();
        assert!(!sun.is_up_now());
        assert_eq!(sun.position, ObservedPosition::default());
    }

    #[test]
    fn test_failed_update_clears_position() {
        let catalog = test_catalog();
        let context = braga_at(utc(2024, 3, 8, 21, 0, 0));
        let mut m31 = SpaceObserver::deep_sky("M31", &catalog).unwrap();
        m31.update_coords(&context, &FlatSky::default()).unwrap();
        assert!(m31.is_up_now());

        let ra = match m31.kind {
            ObserverKind::DeepSky { coords, .. } => coords.ra,
            _ => panic!("not a deep sky observer"),
        };
        let failing = FlatSky { failing_ra: vec![ra], ..Default::default() };
        assert!(m31.update_coords(&context, &failing).is_err());
        assert!(!m31.is_up_now());
        // Catalog coordinates survive.
        assert_eq!(m31.position.ra, Some(ra));
    }

    #[test]
    fn test_will_be_up() {
        let provider = AstroPositionProvider::new();
        let braga = Location::default_location();
        let sun = SpaceObserver::planet("sun").unwrap();
        // Short summer night, well after sunset and before sunrise.
        assert!(!sun.will_be_up(&braga, utc(2024, 6, 21, 22, 0, 0),
                                utc(2024, 6, 22, 4, 0, 0), &provider).unwrap());
        assert!(sun.will_be_up(&braga, utc(2024, 6, 21, 22, 0, 0),
                               utc(2024, 6, 22, 22, 0, 0), &provider).unwrap());
        // Zero length window samples a single instant.
        let noon = utc(2024, 6, 21, 12, 40, 0);
        assert!(sun.will_be_up(&braga, noon, noon, &provider).unwrap());
        assert!(sun.will_be_up(&braga, noon, utc(2024, 6, 21, 0, 0, 0),
                               &provider).is_err());
    }

    #[test]
    fn test_display() {
        let mut venus = SpaceObserver::planet("venus").unwrap();
        assert_eq!(format!("{}", venus), "VENUS (Planet) position unknown");
        venus.update_coords(&braga_at(utc(2024, 3, 8, 21, 0, 0)),
                            &FlatSky::default()).unwrap();
        assert_eq!(format!("{}", venus), "VENUS (Planet) alt 12.0° az 180.0°");
    }

} // mod tests.
