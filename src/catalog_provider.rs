// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use canonical_error::CanonicalError;

use crate::constellation::Constellation;
use crate::constraints::{Catalog, ObjectKind};
use crate::position_provider::EquatorialCoord;

/// Catalog side filters. Unset fields do not restrict the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub catalog: Option<Catalog>,
    pub kind: Option<ObjectKind>,
    pub constellation: Option<Constellation>,
    // Objects fainter than this, or with no known magnitude, are excluded.
    pub min_apparent_mag: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSummary {
    pub id: String,
    pub object_type: ObjectKind,
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Magnitudes {
    // Visual.
    pub v: Option<f64>,
    // Blue.
    pub b: Option<f64>,
}

impl Magnitudes {
    /// The visual magnitude, else the blue one.
    pub fn best(&self) -> Option<f64> {
        self.v.or(self.b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogObject {
    // Primary catalog designation, e.g. "NGC0224".
    pub id: String,
    // None when the catalog has no position for the entry.
    pub coords: Option<EquatorialCoord>,
    // Cross identifications, e.g. "M31", "UGC 454".
    pub identifiers: Vec<String>,
    pub common_names: Vec<String>,
    pub constellation: Option<Constellation>,
    pub object_type: ObjectKind,
    pub magnitudes: Magnitudes,
}

impl CatalogObject {
    /// All names, primary designation first.
    pub fn names(&self) -> Vec<String> {
        let mut names = vec![self.id.clone()];
        for name in self.identifiers.iter().chain(self.common_names.iter()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

pub trait CatalogProvider {
    /// Returns the matching entries in catalog order, plus the number of
    /// entries left off because of `query.limit`.
    fn query(&self, query: &CatalogQuery)
             -> Result<(Vec<CatalogSummary>, usize), CanonicalError>;

    /// Looks up an entry by any accepted spelling of its designation. Fails
    /// with NotFound for unknown ids.
    fn resolve(&self, id: &str) -> Result<CatalogObject, CanonicalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_magnitudes() {
        let object = CatalogObject {
            id: "NGC0224".to_string(),
            coords: None,
            identifiers: vec!["M31".to_string(), "NGC0224".to_string()],
            common_names: vec!["Andromeda Galaxy".to_string()],
            constellation: Some(Constellation::Andromeda),
            object_type: ObjectKind::Galaxy,
            magnitudes: Magnitudes { v: None, b: Some(4.29) },
        };
        assert_eq!(object.names(), vec!["NGC0224", "M31", "Andromeda Galaxy"]);
        assert_eq!(object.magnitudes.best(), Some(4.29));
        assert_eq!(Magnitudes { v: Some(3.44), b: Some(4.29) }.best(),
                   Some(3.44));
    }

} // mod tests.
