// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use canonical_error::CanonicalError;
use log::debug;

use crate::constraints::SessionConstraints;
use crate::position_provider::{EquatorialCoord, ObservationContext,
                               PositionProvider};

/// Equatorial bounding box (degrees) approximating the session's alt/az
/// rectangle at one instant.
///
/// Only the two corners (min_alt, min_az) and (max_alt, max_az) are
/// converted, and the box spans their component-wise extremes. An alt/az
/// rectangle does not map onto an axis aligned ra/dec box, so objects near
/// the edges can be wrongly kept or dropped. Right ascension wrap around at
/// 0/360 is not handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialWindow {
    pub min_ra: f64,
    pub max_ra: f64,
    pub min_dec: f64,
    pub max_dec: f64,
}

impl EquatorialWindow {
    pub fn translate(provider: &dyn PositionProvider,
                     context: &ObservationContext,
                     constraints: &SessionConstraints)
                     -> Result<Self, CanonicalError> {
        let low = provider.altaz_to_radec(&context.location, context.instant,
                                          constraints.min_alt,
                                          constraints.min_az)?;
        let high = provider.altaz_to_radec(&context.location, context.instant,
                                           constraints.max_alt,
                                           constraints.max_az)?;
        let window = EquatorialWindow {
            min_ra: low.ra.min(high.ra),
            max_ra: low.ra.max(high.ra),
            min_dec: low.dec.min(high.dec),
            max_dec: low.dec.max(high.dec),
        };
        debug!("Equatorial window {:?}", window);
        Ok(window)
    }

    /// Inclusive on all four bounds.
    pub fn contains(&self, coord: &EquatorialCoord) -> bool {
        coord.ra >= self.min_ra && coord.ra <= self.max_ra
            && coord.dec >= self.min_dec && coord.dec <= self.max_dec
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::ephemeris::AstroPositionProvider;
    use crate::location::Location;
    use crate::test_util::{utc, FlatSky};

    fn braga_context() -> ObservationContext {
        ObservationContext {
            location: Location::default_location(),
            instant: utc(2024, 3, 8, 21, 0, 0),
        }
    }

    fn bounds(min_alt: f64, max_alt: f64, min_az: f64, max_az: f64)
              -> SessionConstraints {
        SessionConstraints { min_alt, max_alt, min_az, max_az,
                             ..Default::default() }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let window = EquatorialWindow::translate(
            &FlatSky::default(), &braga_context(),
            &bounds(20.0, 60.0, 100.0, 200.0)).unwrap();
        assert_eq!(window, EquatorialWindow {
            min_ra: 100.0, max_ra: 200.0, min_dec: 20.0, max_dec: 60.0 });

        let eps = 1e-9;
        assert!(window.contains(&EquatorialCoord { ra: 100.0, dec: 20.0 }));
        assert!(window.contains(&EquatorialCoord { ra: 200.0, dec: 60.0 }));
        assert!(!window.contains(&EquatorialCoord { ra: 100.0 - eps,
                                                    dec: 20.0 }));
        assert!(!window.contains(&EquatorialCoord { ra: 150.0,
                                                    dec: 60.0 + eps }));
    }

    #[test]
    fn test_provider_failure_propagates() {
        let offline = FlatSky { offline: true, ..Default::default() };
        assert!(EquatorialWindow::translate(
            &offline, &braga_context(), &SessionConstraints::default())
                .is_err());
    }

    proptest! {
        #[test]
        fn prop_window_is_ordered(min_alt in -90.0..89.0f64,
                                  alt_span in 0.5..90.0f64,
                                  min_az in 0.0..359.0f64,
                                  az_span in 0.5..360.0f64,
                                  lat in -89.0..89.0f64,
                                  long in -180.0..180.0f64) {
            let max_alt = (min_alt + alt_span).min(90.0);
            let max_az = (min_az + az_span).min(360.0);
            let context = ObservationContext {
                location: Location::new(lat, long, None),
                instant: utc(2024, 3, 8, 21, 0, 0),
            };
            let window = EquatorialWindow::translate(
                &AstroPositionProvider::new(), &context,
                &bounds(min_alt, max_alt, min_az, max_az)).unwrap();
            prop_assert!(window.min_ra <= window.max_ra);
            prop_assert!(window.min_dec <= window.max_dec);
            prop_assert!(window.min_dec >= -90.0 && window.max_dec <= 90.0);
        }
    }

} // mod tests.
