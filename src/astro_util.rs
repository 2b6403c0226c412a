// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::{f64::consts::PI, time::SystemTime};

use astro::{
    angle::limit_to_two_PI,
    coords::{alt_frm_eq, az_frm_eq, hr_angl_frm_hz},
    time::{julian_day, mn_sidr, CalType, Date},
};
use canonical_error::{invalid_argument_error, CanonicalError};
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Returns (alt, az) in radians. Returned azimuth is clockwise from north.
/// ra: right ascension in radians.
/// dec: declination in radians.
/// lat: observer latitude in radians.
/// long: observer longitude in radians, positive east.
pub fn alt_az_from_equatorial(
    ra: f64,
    dec: f64,
    lat: f64,
    long: f64,
    time: &SystemTime,
) -> (/* alt */ f64, /* az */ f64) {
    let gmst = greenwich_mean_sidereal_time_from_system_time(time);

    // Note that astro::coords::hr_angl_frm_observer_long() has a bug.
    // Fortunately the correct relation is trivial.
    let hour_angle = gmst + long - ra;

    let meeus_az = az_frm_eq(hour_angle, dec, lat);
    let az = limit_to_two_PI(meeus_az + PI);

    (alt_frm_eq(hour_angle, dec, lat), az)
}

/// Returns (ra, dec) in radians. Returned ra is 0..2PI.
/// alt: elevation in radians
/// az: radians, clockwise from north
/// lat: observer latitude in radians.
/// long: observer longitude in radians, positive east.
pub fn equatorial_from_alt_az(
    alt: f64,
    az: f64,
    lat: f64,
    long: f64,
    time: &SystemTime,
) -> (f64, f64) {
    let meeus_az = limit_to_two_PI(az - PI);
    let gmst = greenwich_mean_sidereal_time_from_system_time(time);

    // astro::coords::dec_frm_hz() is incorrect.
    let dec =
        (lat.sin() * alt.sin() - lat.cos() * alt.cos() * meeus_az.cos()).asin();
    let hour_angle = hr_angl_frm_hz(meeus_az, alt, lat);
    let ra = limit_to_two_PI(gmst + long - hour_angle);

    (ra, dec)
}

/// Julian day (UT) of the given time, including the fraction of the day.
pub fn julian_day_from_system_time(time: &SystemTime) -> f64 {
    let dt_utc = DateTime::<Utc>::from(*time);
    let seconds = dt_utc.time().num_seconds_from_midnight() as f64
        + dt_utc.time().nanosecond() as f64 / 1.0e9;
    let date = Date {
        year: dt_utc.date_naive().year() as i16,
        month: dt_utc.date_naive().month() as u8,
        decimal_day: dt_utc.date_naive().day() as f64 + seconds / 86400.0,
        cal_type: CalType::Gregorian,
    };
    julian_day(&date)
}

fn greenwich_mean_sidereal_time_from_system_time(time: &SystemTime) -> f64 {
    let dt_utc = DateTime::<Utc>::from(*time);
    let date = Date {
        year: dt_utc.date_naive().year() as i16,
        month: dt_utc.date_naive().month() as u8,
        decimal_day: dt_utc.date_naive().day() as f64,
        cal_type: CalType::Gregorian,
    };
    let jd = julian_day(&date);

    let utc_hours = (dt_utc.time().num_seconds_from_midnight() as f64
        + dt_utc.time().nanosecond() as f64 / 1.0e9)
        / 3600.0;
    let gmst_hours =
        mn_sidr(jd).to_degrees() / 15.0 + utc_hours * 1.00273790935;

    limit_to_two_PI((gmst_hours * 15.0).to_radians())
}

/// Atmospheric refraction (degrees) to add to a geometric altitude (degrees)
/// to obtain the apparent altitude, for standard pressure and temperature.
/// Saemundsson's formula. Below -1 degree the refraction is held at its -1
/// degree value, keeping apparent altitude continuous and monotonic.
pub fn refraction_from_true_altitude(true_alt: f64) -> f64 {
    let true_alt = true_alt.max(-1.0);
    let arg = (true_alt + 10.3 / (true_alt + 5.11)).to_radians();
    1.02 / arg.tan() / 60.0
}

/// Inverse of `refraction_from_true_altitude()`: returns the geometric
/// altitude (degrees) whose refracted altitude is `apparent_alt`.
pub fn true_altitude_from_apparent(apparent_alt: f64) -> f64 {
    let mut true_alt = apparent_alt;
    for _i in 0..20 {
        let next = apparent_alt - refraction_from_true_altitude(true_alt);
        if (next - true_alt).abs() < 1e-12 {
            return next;
        }
        true_alt = next;
    }
    true_alt
}

/// Convert decimal degrees latitude/longitude to degrees-minutes-seconds
/// strings, e.g. 41°33'33.38"N and 8°24'20.25"W.
pub fn format_dms_lat_long(latitude: f64, longitude: f64) -> (String, String) {
    let north_south = if latitude < 0.0 { "S" } else { "N" };
    let east_west = if longitude < 0.0 { "W" } else { "E" };
    (
        format!("{}{}", format_dms(latitude.abs()), north_south),
        format!("{}{}", format_dms(longitude.abs()), east_west),
    )
}

// Rounds to hundredths of an arcsecond first, so that the rounding carries
// into minutes and degrees.
fn format_dms(degrees: f64) -> String {
    let centiseconds = (degrees * 360_000.0).round() as i64;
    let whole = centiseconds / 360_000;
    let minutes = centiseconds / 6000 % 60;
    let seconds = (centiseconds % 6000) as f64 / 100.0;
    format!("{}°{}'{}\"", whole, minutes, seconds)
}

/// Parses a right ascension in "HH:MM:SS.ss" form to degrees.
pub fn parse_hms(ra: &str) -> Result<f64, CanonicalError> {
    let (negative, hours, mins, secs) = split_sexagesimal(ra)?;
    let deg = hours * 15.0 + mins / 4.0 + secs / 240.0;
    Ok(if negative { -deg } else { deg })
}

/// Parses a declination in "[+-]DD:MM:SS.s" form to degrees.
pub fn parse_dms(dec: &str) -> Result<f64, CanonicalError> {
    let (negative, degs, mins, secs) = split_sexagesimal(dec)?;
    let deg = degs + mins / 60.0 + secs / 3600.0;
    Ok(if negative { -deg } else { deg })
}

// The sign is taken from the text, so "-00:30:00" is negative.
fn split_sexagesimal(
    value: &str,
) -> Result<(bool, f64, f64, f64), CanonicalError> {
    let value = value.trim();
    let negative = value.starts_with('-');
    let unsigned = value.trim_start_matches(['-', '+']);
    let fields: Vec<&str> = unsigned.split(':').collect();
    if fields.len() != 3 {
        return Err(invalid_argument_error(
            format!("Expected three ':' separated fields in {:?}", value)
                .as_str(),
        ));
    }
    let mut parsed = [0.0; 3];
    for (i, field) in fields.iter().enumerate() {
        parsed[i] = field.trim().parse::<f64>().map_err(|e| {
            invalid_argument_error(
                format!("Bad field {:?} in {:?}: {:?}", field, value, e)
                    .as_str(),
            )
        })?;
    }
    Ok((negative, parsed[0], parsed[1], parsed[2]))
}

// mod tests.
