// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// Test doubles shared by the unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use canonical_error::{internal_error, unavailable_error, CanonicalError};
use chrono::{TimeZone, Utc};

use crate::catalog_provider::{CatalogObject, CatalogProvider, CatalogQuery,
                              CatalogSummary, Magnitudes};
use crate::constraints::ObjectKind;
use crate::location::Location;
use crate::ongc_catalog::OngcCatalog;
use crate::position_provider::{EquatorialCoord, HorizontalPosition,
                               PositionProvider, SolarSystemBody, Target};

pub fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32)
           -> SystemTime {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
        .into()
}

// A small excerpt in OpenNGC layout, with a few synthetic rows for the
// placeholder and missing position cases.
pub const TEST_CATALOG_CSV: &str = "\
Name;Type;RA;Dec;Const;MajAx;B-Mag;V-Mag;M;Identifiers;Common names
NGC0224;G;00:42:44.35;+41:16:08.6;And;177.83;4.29;3.44;031;M 031,UGC 00454;Andromeda Galaxy
NGC0598;G;01:33:50.89;+30:39:36.8;Tri;;6.27;5.72;033;M 033;Triangulum Galaxy
NGC1976;Cl+N;05:35:16.48;-05:23:22.8;Ori;;4.00;;042;M 042;Great Orion Nebula,Orion Nebula
NGC6405;OCl;17:40:20.75;-32:15:15.0;Sco;;4.20;;006;M 006;Butterfly Cluster
NGC3587;PN;11:14:47.71;+55:01:08.7;UMa;;;9.90;097;M 097;Owl Nebula
NGC0651;Dup;01:42:19.69;+51:34:31.7;Per;;5.00;;076;M 076;
NGC7000;HII;20:59:17.14;+44:31:43.6;Cyg;;;4.00;;;North America Nebula
IC0001;**;00:08:27.05;+27:43:03.6;Peg;;;;;;
IC0002;Dup;00:11:00.88;-12:49:22.3;Cet;;15.80;;;;
NGC1000;NonEx;;;;;;;;;
IC9999;G;;;;;;;;;
";

pub fn test_catalog() -> OngcCatalog {
    OngcCatalog::from_reader(TEST_CATALOG_CSV.as_bytes()).unwrap()
}

pub fn fixed_object(id: &str, ra: f64, dec: f64) -> CatalogObject {
    CatalogObject {
        id: id.to_string(),
        coords: Some(EquatorialCoord { ra, dec }),
        identifiers: vec![],
        common_names: vec![],
        constellation: None,
        object_type: ObjectKind::OpenCluster,
        magnitudes: Magnitudes { v: Some(5.0), b: None },
    }
}

/// Flat sky: a fixed target at (ra, dec) is seen at az = ra, alt = dec
/// regardless of location and time. Solar System bodies sit at fixed
/// altitudes, alternating above and below the horizon.
#[derive(Default)]
pub struct FlatSky {
    // Fixed targets whose observation fails with an internal error.
    pub failing_ra: Vec<f64>,
    pub failing_bodies: HashSet<SolarSystemBody>,
    // Every call fails with Unavailable.
    pub offline: bool,
}

impl FlatSky {
    pub fn body_altitude(body: SolarSystemBody) -> f64 {
        let i = SolarSystemBody::DEFAULT_TOP_LIST
            .iter()
            .position(|b| *b == body)
            .unwrap_or(0);
        if i % 2 == 0 { 10.0 + i as f64 } else { -10.0 - i as f64 }
    }
}

impl PositionProvider for FlatSky {
    fn altaz_to_radec(&self,
                      _location: &Location,
                      _instant: SystemTime,
                      alt: f64,
                      az: f64)
                      -> Result<EquatorialCoord, CanonicalError> {
        if self.offline {
            return Err(unavailable_error("ephemeris offline"));
        }
        Ok(EquatorialCoord { ra: az, dec: alt })
    }

    fn observe(&self,
               _location: &Location,
               _instant: SystemTime,
               target: &Target)
               -> Result<HorizontalPosition, CanonicalError> {
        if self.offline {
            return Err(unavailable_error("ephemeris offline"));
        }
        match target {
            Target::Fixed(coord) => {
                if self.failing_ra.contains(&coord.ra) {
                    return Err(internal_error("bad ephemeris row"));
                }
                Ok(HorizontalPosition {
                    alt: coord.dec,
                    az: coord.ra,
                    distance: None,
                })
            }
            Target::SolarSystem(body) => {
                if self.failing_bodies.contains(body) {
                    return Err(internal_error("bad ephemeris row"));
                }
                Ok(HorizontalPosition {
                    alt: Self::body_altitude(*body),
                    az: 180.0,
                    distance: Some(1.0),
                })
            }
        }
    }
}

/// Catalog that can be switched offline, after which every call fails with
/// Unavailable.
pub struct FlakyCatalog {
    catalog: OngcCatalog,
    offline: AtomicBool,
}

impl FlakyCatalog {
    pub fn new(catalog: OngcCatalog) -> Self {
        FlakyCatalog { catalog, offline: AtomicBool::new(false) }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), CanonicalError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable_error("catalog offline"));
        }
        Ok(())
    }
}

impl CatalogProvider for FlakyCatalog {
    fn query(&self, query: &CatalogQuery)
             -> Result<(Vec<CatalogSummary>, usize), CanonicalError> {
        self.check_online()?;
        self.catalog.query(query)
    }

    fn resolve(&self, id: &str) -> Result<CatalogObject, CanonicalError> {
        self.check_online()?;
        self.catalog.resolve(id)
    }
}
