// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// In-memory deep sky catalog loaded from the OpenNGC database
// (https://github.com/mattiaverga/OpenNGC), a semicolon separated CSV file
// with one row per NGC/IC entry.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use canonical_error::{invalid_argument_error, not_found_error, CanonicalError};
use log::{debug, info, warn};

use crate::astro_util::{parse_dms, parse_hms};
use crate::catalog_provider::{CatalogObject, CatalogProvider, CatalogQuery,
                              CatalogSummary, Magnitudes};
use crate::constellation::Constellation;
use crate::constraints::{Catalog, ObjectKind};
use crate::position_provider::EquatorialCoord;

struct OngcEntry {
    object: CatalogObject,
    // Messier number, when the entry has one.
    messier: Option<u32>,
}

pub struct OngcCatalog {
    entries: Vec<OngcEntry>,
    // Normalized designation (see `normalize_id()`) to index in `entries`.
    index: HashMap<String, usize>,
}

// Column positions, located by header name.
struct Columns {
    name: usize,
    object_type: usize,
    ra: usize,
    dec: usize,
    constellation: usize,
    b_mag: usize,
    v_mag: usize,
    messier: Option<usize>,
    identifiers: Option<usize>,
    common_names: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, CanonicalError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                invalid_argument_error(
                    format!("OpenNGC header lacks column {:?}", name).as_str(),
                )
            })
        };
        Ok(Columns {
            name: require("Name")?,
            object_type: require("Type")?,
            ra: require("RA")?,
            dec: require("Dec")?,
            constellation: require("Const")?,
            b_mag: require("B-Mag")?,
            v_mag: require("V-Mag")?,
            messier: find("M"),
            identifiers: find("Identifiers"),
            common_names: find("Common names"),
        })
    }
}

/// Canonical form of a designation: upper case, no spaces, no leading zeros
/// in the number. "ngc 224", "NGC0224" and "NGC224" all become "NGC224".
pub fn normalize_id(id: &str) -> String {
    let compact: String = id
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    let prefix_len = compact
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(compact.len());
    let (prefix, rest) = compact.split_at(prefix_len);
    let digits_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, suffix) = rest.split_at(digits_len);
    let mut number = digits.trim_start_matches('0');
    if number.is_empty() && !digits.is_empty() {
        number = "0";
    }
    format!("{}{}{}", prefix, number, suffix)
}

fn field<'a>(record: &'a csv::StringRecord, column: usize) -> &'a str {
    record.get(column).unwrap_or("").trim()
}

fn optional_field<'a>(record: &'a csv::StringRecord, column: Option<usize>)
                      -> &'a str {
    column.map_or("", |c| field(record, c))
}

fn parse_magnitude(value: &str) -> Option<f64> {
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|m| m.is_finite())
}

fn split_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .collect()
}

impl OngcCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CanonicalError> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            not_found_error(
                format!("Could not open catalog {:?}: {:?}",
                        path.as_ref(), e).as_str(),
            )
        })?;
        let catalog = Self::from_reader(file)?;
        info!("Loaded {} entries from {:?}", catalog.len(), path.as_ref());
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CanonicalError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers().map_err(|e| {
            invalid_argument_error(
                format!("Could not read OpenNGC header: {:?}", e).as_str(),
            )
        })?.clone();
        let columns = Columns::locate(&headers)?;

        let mut entries = Vec::<OngcEntry>::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                invalid_argument_error(
                    format!("Malformed OpenNGC row: {:?}", e).as_str(),
                )
            })?;
            let name = field(&record, columns.name);
            if name.is_empty() {
                continue;
            }
            entries.push(Self::parse_entry(name, &record, &columns));
        }
        Ok(Self::from_entries(entries))
    }

    /// Builds a catalog from already parsed objects. An "M<n>" identifier
    /// marks an object as a Messier object.
    pub fn from_objects(objects: Vec<CatalogObject>) -> Self {
        let entries = objects
            .into_iter()
            .map(|object| {
                let messier = object
                    .identifiers
                    .iter()
                    .find_map(|ident| messier_number(ident));
                OngcEntry { object, messier }
            })
            .collect();
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<OngcEntry>) -> Self {
        let mut index = HashMap::<String, usize>::new();
        for (i, entry) in entries.iter().enumerate() {
            let key = normalize_id(&entry.object.id);
            if index.insert(key, i).is_some() {
                warn!("Duplicate catalog designation {}", entry.object.id);
            }
            if let Some(m) = entry.messier {
                index.entry(format!("M{}", m)).or_insert(i);
            }
        }
        OngcCatalog { entries, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn parse_entry(name: &str, record: &csv::StringRecord, columns: &Columns)
                   -> OngcEntry {
        let type_code = field(record, columns.object_type);
        let object_type = type_code.parse::<ObjectKind>().unwrap_or_else(|_| {
            debug!("{}: unrecognized type {:?}", name, type_code);
            ObjectKind::Other
        });
        let ra = field(record, columns.ra);
        let dec = field(record, columns.dec);
        let coords = if ra.is_empty() || dec.is_empty() {
            None
        } else {
            match (parse_hms(ra), parse_dms(dec)) {
                (Ok(ra), Ok(dec)) => Some(EquatorialCoord { ra, dec }),
                _ => {
                    warn!("{}: unparseable position {:?} {:?}", name, ra, dec);
                    None
                }
            }
        };
        let constellation_code = field(record, columns.constellation);
        let constellation = if constellation_code.is_empty() {
            None
        } else {
            constellation_code.parse::<Constellation>().ok()
        };
        let messier = optional_field(record, columns.messier)
            .parse::<u32>()
            .ok();
        let mut identifiers = split_names(
            optional_field(record, columns.identifiers));
        if let Some(m) = messier {
            let designation = format!("M{}", m);
            identifiers.retain(|ident| normalize_id(ident) != designation);
            identifiers.insert(0, designation);
        }

        OngcEntry {
            object: CatalogObject {
                id: name.to_string(),
                coords,
                identifiers,
                common_names: split_names(
                    optional_field(record, columns.common_names)),
                constellation,
                object_type,
                magnitudes: Magnitudes {
                    v: parse_magnitude(field(record, columns.v_mag)),
                    b: parse_magnitude(field(record, columns.b_mag)),
                },
            },
            messier,
        }
    }

    fn in_catalog(entry: &OngcEntry, catalog: Catalog) -> bool {
        let id = entry.object.id.to_ascii_uppercase();
        match catalog {
            Catalog::Ngc => id.starts_with("NGC"),
            Catalog::Ic => id.starts_with("IC"),
            Catalog::Messier => entry.messier.is_some(),
        }
    }
}

fn messier_number(ident: &str) -> Option<u32> {
    let normalized = normalize_id(ident);
    normalized.strip_prefix('M')?.parse::<u32>().ok()
}

impl CatalogProvider for OngcCatalog {
    fn query(&self, query: &CatalogQuery)
             -> Result<(Vec<CatalogSummary>, usize), CanonicalError> {
        let mut selected = Vec::<CatalogSummary>::new();
        let mut truncated = 0;
        for entry in &self.entries {
            let object = &entry.object;
            if let Some(catalog) = query.catalog {
                if !Self::in_catalog(entry, catalog) {
                    continue;
                }
            }
            if let Some(kind) = query.kind {
                if object.object_type != kind {
                    continue;
                }
            }
            if let Some(constellation) = query.constellation {
                if object.constellation != Some(constellation) {
                    continue;
                }
            }
            let magnitude = object.magnitudes.best();
            if let Some(limit) = query.min_apparent_mag {
                match magnitude {
                    Some(mag) if mag <= limit => (),
                    _ => continue,
                }
            }
            if query.limit.is_some_and(|limit| selected.len() >= limit) {
                truncated += 1;
                continue;
            }
            // Messier queries report Messier designations.
            let id = match (query.catalog, entry.messier) {
                (Some(Catalog::Messier), Some(m)) => format!("M{}", m),
                _ => object.id.clone(),
            };
            selected.push(CatalogSummary {
                id,
                object_type: object.object_type,
                magnitude,
            });
        }
        debug!("Catalog query {:?} matched {} (+{} over limit)",
               query, selected.len(), truncated);
        Ok((selected, truncated))
    }

    fn resolve(&self, id: &str) -> Result<CatalogObject, CanonicalError> {
        self.index
            .get(&normalize_id(id))
            .map(|i| self.entries[*i].object.clone())
            .ok_or_else(|| {
                not_found_error(
                    format!("No catalog entry for {:?}", id).as_str(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    extern crate approx;
    use approx::assert_abs_diff_eq;
    use canonical_error::CanonicalErrorCode;

    use super::*;
    use crate::test_util::test_catalog;

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("NGC0224"), "NGC224");
        assert_eq!(normalize_id("ngc 224"), "NGC224");
        assert_eq!(normalize_id("M 031"), "M31");
        assert_eq!(normalize_id("IC0001"), "IC1");
        assert_eq!(normalize_id("NGC5194A"), "NGC5194A");
        assert_eq!(normalize_id("Sh2-0155"), "SH2-0155");
    }

    #[test]
    fn test_resolve_spellings() {
        let catalog = test_catalog();
        for id in ["NGC224", "ngc 224", "NGC0224", "M31", "M 31", "m031"] {
            let object = catalog.resolve(id).unwrap();
            assert_eq!(object.id, "NGC0224");
        }
        let andromeda = catalog.resolve("M31").unwrap();
        assert_eq!(andromeda.constellation, Some(Constellation::Andromeda));
        assert_eq!(andromeda.object_type, ObjectKind::Galaxy);
        assert_eq!(andromeda.magnitudes.v, Some(3.44));
        assert_eq!(andromeda.identifiers[0], "M31");
        assert_eq!(andromeda.common_names, vec!["Andromeda Galaxy"]);
        let coords = andromeda.coords.unwrap();
        assert_abs_diff_eq!(coords.ra, 10.684792, epsilon = 1e-5);
        assert_abs_diff_eq!(coords.dec, 41.269056, epsilon = 1e-5);

        assert_eq!(catalog.resolve("IC1").unwrap().object_type,
                   ObjectKind::DoubleStar);
    }

    #[test]
    fn test_resolve_failures() {
        let catalog = test_catalog();
        let err = catalog.resolve("NGC9999").unwrap_err();
        assert_eq!(err.code, CanonicalErrorCode::NotFound);
        // Present, but without a position.
        assert_eq!(catalog.resolve("IC9999").unwrap().coords, None);
    }

    #[test]
    fn test_query_filters() {
        let catalog = test_catalog();
        let (all, truncated) = catalog.query(&CatalogQuery::default()).unwrap();
        assert_eq!(all.len(), catalog.len());
        assert_eq!(truncated, 0);

        let (messier, _) = catalog.query(&CatalogQuery {
            catalog: Some(Catalog::Messier),
            ..Default::default()
        }).unwrap();
        let ids: Vec<&str> = messier.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["M31", "M33", "M42", "M6", "M97", "M76"]);

        let (bright, _) = catalog.query(&CatalogQuery {
            min_apparent_mag: Some(4.0),
            ..Default::default()
        }).unwrap();
        let ids: Vec<&str> = bright.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["NGC0224", "NGC1976", "NGC7000"]);
        // Visual magnitude when known, else blue.
        let mags: Vec<Option<f64>> = bright.iter().map(|s| s.magnitude).collect();
        assert_eq!(mags, vec![Some(3.44), Some(4.0), Some(4.0)]);

        let (galaxies, _) = catalog.query(&CatalogQuery {
            kind: Some(ObjectKind::Galaxy),
            constellation: Some(Constellation::Triangulum),
            ..Default::default()
        }).unwrap();
        assert_eq!(galaxies.len(), 1);
        assert_eq!(galaxies[0].id, "NGC0598");

        let (ic, _) = catalog.query(&CatalogQuery {
            catalog: Some(Catalog::Ic),
            ..Default::default()
        }).unwrap();
        assert!(ic.iter().all(|s| s.id.starts_with("IC")));
    }

    #[test]
    fn test_query_limit() {
        let catalog = test_catalog();
        let (limited, truncated) = catalog.query(&CatalogQuery {
            limit: Some(2),
            ..Default::default()
        }).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(truncated, catalog.len() - 2);
    }

    #[test]
    fn test_missing_column() {
        let csv = "Name;Type;RA\nNGC0001;G;00:07:15.84\n";
        let err = OngcCatalog::from_reader(csv.as_bytes()).err().unwrap();
        assert_eq!(err.code, CanonicalErrorCode::InvalidArgument);
    }

} // mod tests.
