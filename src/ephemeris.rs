// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// PositionProvider implementation built on the `astro` crate (Meeus
// algorithms): VSOP87 for the planets, ELP-2000 for the Moon and the Pluto
// periodic series. Positions are of-date ecliptic converted with the mean
// obliquity; catalog (J2000) coordinates are used as given. The resulting
// precession error (well under a degree) is acceptable for deciding what is
// above the horizon.

use std::time::SystemTime;

use astro::coords::{asc_frm_ecl, dec_frm_ecl};
use astro::ecliptic::mn_oblq_IAU;
use astro::planet::{heliocent_coords, Planet};
use astro::{lunar, pluto};
use canonical_error::{internal_error, invalid_argument_error, CanonicalError};

use crate::astro_util::{alt_az_from_equatorial, equatorial_from_alt_az,
                        julian_day_from_system_time,
                        refraction_from_true_altitude,
                        true_altitude_from_apparent};
use crate::location::Location;
use crate::position_provider::{EquatorialCoord, HorizontalPosition,
                               PositionProvider, SolarSystemBody, Target};

const AU_KM: f64 = 149_597_870.7;
const EARTH_RADIUS_KM: f64 = 6378.14;
// Light travel time for one astronomical unit.
const LIGHT_DAYS_PER_AU: f64 = 0.005_775_518_3;

#[derive(Debug, Clone)]
pub struct AstroPositionProvider {
    // When true, altitudes are apparent (refracted) altitudes for standard
    // atmospheric conditions.
    refraction: bool,
}

impl Default for AstroPositionProvider {
    fn default() -> Self {
        AstroPositionProvider::new()
    }
}

impl AstroPositionProvider {
    pub fn new() -> Self {
        AstroPositionProvider { refraction: true }
    }

    /// Reports geometric altitudes.
    pub fn without_refraction() -> Self {
        AstroPositionProvider { refraction: false }
    }

    /// Returns the geocentric ecliptic longitude, latitude (radians) and
    /// distance (AU) of `body` at Julian day `jd`.
    pub fn geocentric_ecliptic(body: SolarSystemBody, jd: f64)
                               -> (f64, f64, f64) {
        match body {
            SolarSystemBody::Sun => {
                let (long, lat, rad) = heliocent_coords(&Planet::Earth, jd);
                (long + std::f64::consts::PI, -lat, rad)
            }
            SolarSystemBody::Moon => {
                let (point, distance_km) = lunar::geocent_ecl_pos(jd);
                (point.long, point.lat, distance_km / AU_KM)
            }
            _ => {
                let earth = to_rectangular(heliocent_coords(&Planet::Earth, jd));
                // One light-time iteration is plenty at this precision.
                let mut geo = [0.0; 3];
                let mut distance = 0.0;
                for _i in 0..2 {
                    let t = jd - distance * LIGHT_DAYS_PER_AU;
                    let body_pos = to_rectangular(heliocentric(body, t));
                    geo = [body_pos[0] - earth[0],
                           body_pos[1] - earth[1],
                           body_pos[2] - earth[2]];
                    distance =
                        (geo[0] * geo[0] + geo[1] * geo[1] + geo[2] * geo[2])
                        .sqrt();
                }
                (geo[1].atan2(geo[0]), (geo[2] / distance).asin(), distance)
            }
        }
    }
}

// Heliocentric (long, lat, radius) of a planet or Pluto.
fn heliocentric(body: SolarSystemBody, jd: f64) -> (f64, f64, f64) {
    let planet = match body {
        SolarSystemBody::Mercury => Planet::Mercury,
        SolarSystemBody::Venus => Planet::Venus,
        SolarSystemBody::Mars => Planet::Mars,
        SolarSystemBody::Jupiter => Planet::Jupiter,
        SolarSystemBody::Saturn => Planet::Saturn,
        SolarSystemBody::Uranus => Planet::Uranus,
        SolarSystemBody::Neptune => Planet::Neptune,
        SolarSystemBody::Pluto => return pluto::heliocent_pos(jd),
        SolarSystemBody::Sun | SolarSystemBody::Moon => {
            unreachable!("{:?} is not heliocentric", body)
        }
    };
    heliocent_coords(&planet, jd)
}

fn to_rectangular((long, lat, rad): (f64, f64, f64)) -> [f64; 3] {
    [rad * lat.cos() * long.cos(),
     rad * lat.cos() * long.sin(),
     rad * lat.sin()]
}

fn check_location(location: &Location) -> Result<(), CanonicalError> {
    if !(-90.0..=90.0).contains(&location.latitude)
        || !(-180.0..=180.0).contains(&location.longitude)
    {
        return Err(invalid_argument_error(
            format!("Invalid observer location {:?}", location).as_str(),
        ));
    }
    Ok(())
}

impl PositionProvider for AstroPositionProvider {
    fn altaz_to_radec(&self,
                      location: &Location,
                      instant: SystemTime,
                      alt: f64,
                      az: f64)
                      -> Result<EquatorialCoord, CanonicalError> {
        check_location(location)?;
        let true_alt = if self.refraction {
            true_altitude_from_apparent(alt)
        } else {
            alt
        };
        let (ra, dec) = equatorial_from_alt_az(
            true_alt.to_radians(),
            az.to_radians(),
            location.latitude.to_radians(),
            location.longitude.to_radians(),
            &instant,
        );
        Ok(EquatorialCoord { ra: ra.to_degrees(), dec: dec.to_degrees() })
    }

    fn observe(&self,
               location: &Location,
               instant: SystemTime,
               target: &Target)
               -> Result<HorizontalPosition, CanonicalError> {
        self.horizontal(location, instant, target, self.refraction)
    }

    fn observe_geometric(&self,
                         location: &Location,
                         instant: SystemTime,
                         target: &Target)
                         -> Result<HorizontalPosition, CanonicalError> {
        self.horizontal(location, instant, target, /*refraction=*/false)
    }
}

impl AstroPositionProvider {
    fn horizontal(&self,
                  location: &Location,
                  instant: SystemTime,
                  target: &Target,
                  refraction: bool)
                  -> Result<HorizontalPosition, CanonicalError> {
        check_location(location)?;
        let (ra, dec, distance) = match target {
            Target::Fixed(coord) => {
                (coord.ra.to_radians(), coord.dec.to_radians(), None)
            }
            Target::SolarSystem(body) => {
                let jd = julian_day_from_system_time(&instant);
                let (long, lat, distance) =
                    Self::geocentric_ecliptic(*body, jd);
                let oblq = mn_oblq_IAU(jd);
                (asc_frm_ecl(long, lat, oblq),
                 dec_frm_ecl(long, lat, oblq),
                 Some(distance))
            }
        };
        let (alt, az) = alt_az_from_equatorial(
            ra,
            dec,
            location.latitude.to_radians(),
            location.longitude.to_radians(),
            &instant,
        );
        let mut alt = alt.to_degrees();
        if let Some(distance) = distance {
            // Diurnal parallax; only matters for the Moon.
            let parallax = (EARTH_RADIUS_KM / (distance * AU_KM)).asin();
            alt -= parallax.to_degrees() * alt.to_radians().cos();
        }
        if refraction {
            alt += refraction_from_true_altitude(alt);
        }
        let az = az.to_degrees();
        if !alt.is_finite() || !az.is_finite() {
            return Err(internal_error(
                format!("Could not compute position of {:?}", target).as_str(),
            ));
        }
        Ok(HorizontalPosition { alt, az, distance })
    }
}

// mod tests.
