// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use canonical_error::{invalid_argument_error, CanonicalError};
use chrono::DateTime;
use log::warn;

use crate::constellation::Constellation;

/// Deep sky catalogs a session can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Ngc,
    Ic,
    Messier,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Catalog::Ngc => "NGC",
            Catalog::Ic => "IC",
            Catalog::Messier => "Messier",
        };
        write!(f, "{}", text)
    }
}

impl FromStr for Catalog {
    type Err = CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ngc" => Ok(Catalog::Ngc),
            "ic" => Ok(Catalog::Ic),
            "m" | "messier" => Ok(Catalog::Messier),
            _ => Err(invalid_argument_error(
                format!("Unknown catalog {:?}", s).as_str(),
            )),
        }
    }
}

/// Catalog object types, as coded by OpenNGC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Star,
    DoubleStar,
    Association,
    OpenCluster,
    GlobularCluster,
    ClusterNebula,
    Galaxy,
    GalaxyPair,
    GalaxyTriplet,
    GalaxyGroup,
    PlanetaryNebula,
    HiiRegion,
    DarkNebula,
    EmissionNebula,
    Nebula,
    ReflectionNebula,
    SupernovaRemnant,
    Nova,
    Nonexistent,
    Duplicate,
    Other,
}

impl ObjectKind {
    const CODES: &'static [(ObjectKind, &'static str, &'static str)] = &[
        (ObjectKind::Star, "*", "Star"),
        (ObjectKind::DoubleStar, "**", "Double star"),
        (ObjectKind::Association, "*Ass", "Association of stars"),
        (ObjectKind::OpenCluster, "OCl", "Open Cluster"),
        (ObjectKind::GlobularCluster, "GCl", "Globular Cluster"),
        (ObjectKind::ClusterNebula, "Cl+N", "Star cluster + Nebula"),
        (ObjectKind::Galaxy, "G", "Galaxy"),
        (ObjectKind::GalaxyPair, "GPair", "Galaxy Pair"),
        (ObjectKind::GalaxyTriplet, "GTrpl", "Galaxy Triplet"),
        (ObjectKind::GalaxyGroup, "GGroup", "Group of galaxies"),
        (ObjectKind::PlanetaryNebula, "PN", "Planetary Nebula"),
        (ObjectKind::HiiRegion, "HII", "HII Ionized region"),
        (ObjectKind::DarkNebula, "DrkN", "Dark Nebula"),
        (ObjectKind::EmissionNebula, "EmN", "Emission Nebula"),
        (ObjectKind::Nebula, "Neb", "Nebula"),
        (ObjectKind::ReflectionNebula, "RfN", "Reflection Nebula"),
        (ObjectKind::SupernovaRemnant, "SNR", "Supernova remnant"),
        (ObjectKind::Nova, "Nova", "Nova star"),
        (ObjectKind::Nonexistent, "NonEx", "Nonexistent object"),
        (ObjectKind::Duplicate, "Dup", "Duplicated record"),
        (ObjectKind::Other, "Other", "Other classification"),
    ];

    /// OpenNGC type code, e.g. "GCl".
    pub fn code(&self) -> &'static str {
        Self::CODES.iter().find(|(k, _, _)| k == self).map_or("", |e| e.1)
    }

    pub fn description(&self) -> &'static str {
        Self::CODES.iter().find(|(k, _, _)| k == self).map_or("", |e| e.2)
    }

    /// True for catalog records that do not describe a real observable object.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ObjectKind::Duplicate | ObjectKind::Nonexistent)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// Accepts the OpenNGC code (case sensitive, since "G" and "g" are
// unambiguous anyway) or the description (case insensitive).
impl FromStr for ObjectKind {
    type Err = CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::CODES
            .iter()
            .find(|(_, code, _)| *code == s)
            .or_else(|| {
                Self::CODES
                    .iter()
                    .find(|(_, _, desc)| desc.eq_ignore_ascii_case(s))
            })
            .map(|(kind, _, _)| *kind)
            .ok_or_else(|| {
                invalid_argument_error(
                    format!("Unknown object type {:?}", s).as_str(),
                )
            })
    }
}

/// Explicit inclusion lists. When a list is present it replaces catalog based
/// selection for its category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplicitSources {
    pub planets: Option<Vec<String>>,
    pub objects: Option<Vec<String>>,
}

/// The filtering parameters for one planning session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConstraints {
    // Session window. When absent the coming night is used.
    pub start: Option<SystemTime>,
    pub end: Option<SystemTime>,

    // Limits imposed by the telescope mount angles or physical obstacles at
    // the observing site. Degrees; azimuth clockwise from north.
    pub min_alt: f64,
    pub max_alt: f64,
    pub min_az: f64,
    pub max_az: f64,

    // Restrict to objects inside a specific constellation.
    pub constellation: Option<Constellation>,

    // Restrict to one catalog object type.
    pub kind: Option<ObjectKind>,

    // Limiting magnitude: objects fainter than this (numerically greater) are
    // excluded, as are objects with no known magnitude.
    pub min_apparent_mag: Option<f64>,

    pub catalog: Option<Catalog>,
    pub explicit_sources: ExplicitSources,

    // Maximum number of catalog query results.
    pub limit: Option<usize>,

    // Whether deep sky candidates are filtered against the equatorial window
    // derived from the alt/az bounds.
    pub horizon_filter: bool,
}

impl Default for SessionConstraints {
    fn default() -> Self {
        SessionConstraints {
            start: None,
            end: None,
            min_alt: 0.0,
            max_alt: 90.0,
            min_az: 0.0,
            max_az: 360.0,
            constellation: None,
            kind: None,
            min_apparent_mag: None,
            catalog: None,
            explicit_sources: ExplicitSources::default(),
            limit: None,
            horizon_filter: true,
        }
    }
}

/// Recognized session option names, with their defaults and effect.
pub const SESSION_OPTIONS: &[(&str, &str)] = &[
    ("start", "RFC 3339 session start; default: sunset (or now, if dark)"),
    ("end", "RFC 3339 session end; default: next sunrise"),
    ("min_alt", "minimum altitude, degrees; default 0"),
    ("max_alt", "maximum altitude, degrees; default 90"),
    ("min_az", "minimum azimuth, degrees; default 0"),
    ("max_az", "maximum azimuth, degrees; default 360"),
    ("constellation", "IAU abbreviation or name; default: any"),
    ("kind", "OpenNGC object type code or name; default: any"),
    ("min_apparent_mag", "limiting magnitude; default: none"),
    ("catalog", "NGC, IC or Messier; default: any"),
    ("planets", "comma separated Solar System bodies; default: all"),
    ("objects", "comma separated catalog ids; default: catalog query"),
    ("limit", "maximum catalog query results; default: unlimited"),
    ("horizon_filter", "true|false, apply the alt/az window; default true"),
];

impl SessionConstraints {
    /// Builds constraints from name/value option pairs. Unknown option names
    /// and malformed times, enums or booleans are errors. Numeric values that
    /// do not parse are dropped with a warning, leaving the default in place.
    pub fn from_options<'a, I>(options: I) -> Result<Self, CanonicalError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut constraints = SessionConstraints::default();
        for (name, value) in options {
            let value = value.trim();
            match name {
                "start" => constraints.start = Some(parse_time(value)?),
                "end" => constraints.end = Some(parse_time(value)?),
                "min_alt" => {
                    lenient_number(name, value, &mut constraints.min_alt)
                }
                "max_alt" => {
                    lenient_number(name, value, &mut constraints.max_alt)
                }
                "min_az" => lenient_number(name, value, &mut constraints.min_az),
                "max_az" => lenient_number(name, value, &mut constraints.max_az),
                "constellation" => {
                    constraints.constellation = Some(value.parse()?)
                }
                "kind" => constraints.kind = Some(value.parse()?),
                "min_apparent_mag" => match value.parse::<f64>() {
                    Ok(mag) if mag.is_finite() => {
                        constraints.min_apparent_mag = Some(mag)
                    }
                    _ => warn!("Ignoring unparseable {} value {:?}", name,
                               value),
                },
                "catalog" => constraints.catalog = Some(value.parse()?),
                "planets" => {
                    constraints.explicit_sources.planets = Some(split_list(value))
                }
                "objects" => {
                    constraints.explicit_sources.objects = Some(split_list(value))
                }
                "limit" => match value.parse::<usize>() {
                    Ok(limit) => constraints.limit = Some(limit),
                    Err(_) => warn!("Ignoring unparseable {} value {:?}", name,
                                    value),
                },
                "horizon_filter" => {
                    constraints.horizon_filter =
                        value.parse().map_err(|_| {
                            invalid_argument_error(
                                format!("Bad horizon_filter value {:?}", value)
                                    .as_str(),
                            )
                        })?
                }
                _ => {
                    return Err(invalid_argument_error(
                        format!("Unknown session option {:?}", name).as_str(),
                    ));
                }
            }
        }
        constraints.validate()?;
        Ok(constraints)
    }

    pub fn validate(&self) -> Result<(), CanonicalError> {
        for (label, value) in [("min_alt", self.min_alt),
                               ("max_alt", self.max_alt)] {
            if !(-90.0..=90.0).contains(&value) {
                return Err(invalid_argument_error(
                    format!("{} {} outside -90..90", label, value).as_str(),
                ));
            }
        }
        for (label, value) in [("min_az", self.min_az),
                               ("max_az", self.max_az)] {
            if !(0.0..=360.0).contains(&value) {
                return Err(invalid_argument_error(
                    format!("{} {} outside 0..360", label, value).as_str(),
                ));
            }
        }
        if self.min_alt >= self.max_alt {
            return Err(invalid_argument_error(
                format!("min_alt {} must be less than max_alt {}",
                        self.min_alt, self.max_alt).as_str(),
            ));
        }
        if self.min_az >= self.max_az {
            return Err(invalid_argument_error(
                format!("min_az {} must be less than max_az {}",
                        self.min_az, self.max_az).as_str(),
            ));
        }
        if self.limit == Some(0) {
            return Err(invalid_argument_error("limit must be positive"));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start >= end {
                return Err(invalid_argument_error(
                    "Session start must precede its end",
                ));
            }
        }
        Ok(())
    }
}

fn lenient_number(name: &str, value: &str, target: &mut f64) {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => *target = number,
        _ => warn!("Ignoring unparseable {} value {:?}", name, value),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}

pub fn parse_time(value: &str) -> Result<SystemTime, CanonicalError> {
    DateTime::parse_from_rfc3339(value)
        .map(SystemTime::from)
        .map_err(|e| {
            invalid_argument_error(
                format!("Bad time {:?}: {:?}", value, e).as_str(),
            )
        })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use canonical_error::CanonicalErrorCode;

    use super::*;

    #[test]
    fn test_defaults() {
        let constraints =
            SessionConstraints::from_options(std::iter::empty()).unwrap();
        assert_eq!(constraints, SessionConstraints::default());
        assert!(constraints.horizon_filter);
        assert_eq!(constraints.max_az, 360.0);
    }

    #[test]
    fn test_from_options() {
        let constraints = SessionConstraints::from_options([
            ("start", "2024-03-08T20:00:00Z"),
            ("end", "2024-03-09T06:00:00+00:00"),
            ("min_alt", "15"),
            ("max_az", "270.5"),
            ("constellation", "UMa"),
            ("kind", "G"),
            ("min_apparent_mag", "9.5"),
            ("catalog", "Messier"),
            ("planets", "venus, mars,,"),
            ("limit", "5"),
            ("horizon_filter", "false"),
        ])
        .unwrap();
        assert_eq!(
            constraints.end.unwrap().duration_since(constraints.start.unwrap())
                .unwrap(),
            Duration::from_secs(10 * 3600)
        );
        assert_eq!(constraints.min_alt, 15.0);
        assert_eq!(constraints.max_az, 270.5);
        assert_eq!(constraints.constellation, Some(Constellation::UrsaMajor));
        assert_eq!(constraints.kind, Some(ObjectKind::Galaxy));
        assert_eq!(constraints.min_apparent_mag, Some(9.5));
        assert_eq!(constraints.catalog, Some(Catalog::Messier));
        assert_eq!(constraints.explicit_sources.planets,
                   Some(vec!["venus".to_string(), "mars".to_string()]));
        assert_eq!(constraints.explicit_sources.objects, None);
        assert_eq!(constraints.limit, Some(5));
        assert!(!constraints.horizon_filter);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = SessionConstraints::from_options([("min_magnitude", "6")])
            .unwrap_err();
        assert_eq!(err.code, CanonicalErrorCode::InvalidArgument);
    }

    #[test]
    fn test_unparseable_numbers_dropped() {
        let constraints = SessionConstraints::from_options([
            ("min_apparent_mag", "bright"),
            ("min_alt", "ten"),
            ("limit", "-3"),
        ])
        .unwrap();
        assert_eq!(constraints.min_apparent_mag, None);
        assert_eq!(constraints.min_alt, 0.0);
        assert_eq!(constraints.limit, None);
    }

    #[test]
    fn test_validation() {
        assert!(SessionConstraints::from_options([("min_alt", "95")]).is_err());
        assert!(SessionConstraints::from_options([("min_az", "360"),
                                                  ("max_az", "360")]).is_err());
        assert!(SessionConstraints::from_options([("min_alt", "40"),
                                                  ("max_alt", "30")]).is_err());
        assert!(SessionConstraints::from_options([("limit", "0")]).is_err());
        assert!(SessionConstraints::from_options([
            ("start", "2024-03-09T06:00:00Z"),
            ("end", "2024-03-08T20:00:00Z"),
        ]).is_err());
        assert!(SessionConstraints::from_options([("start", "tonight")])
                .is_err());
        assert!(SessionConstraints::from_options([("catalog", "Caldwell")])
                .is_err());
    }

    #[test]
    fn test_object_kind() {
        assert_eq!("GCl".parse::<ObjectKind>().unwrap(),
                   ObjectKind::GlobularCluster);
        assert_eq!("globular cluster".parse::<ObjectKind>().unwrap(),
                   ObjectKind::GlobularCluster);
        assert_eq!("Dup".parse::<ObjectKind>().unwrap(), ObjectKind::Duplicate);
        assert!(ObjectKind::Duplicate.is_placeholder());
        assert!(ObjectKind::Nonexistent.is_placeholder());
        assert!(!ObjectKind::Galaxy.is_placeholder());
        assert_eq!(ObjectKind::PlanetaryNebula.code(), "PN");
        assert!("Quasar".parse::<ObjectKind>().is_err());
    }

} // mod tests.
