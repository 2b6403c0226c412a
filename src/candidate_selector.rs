// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// Narrows the catalog down to the session's candidate list.

use canonical_error::CanonicalError;
use log::{debug, info};

use crate::catalog_provider::{CatalogProvider, CatalogQuery};
use crate::constraints::SessionConstraints;
use crate::horizon_window::EquatorialWindow;
use crate::position_provider::SolarSystemBody;

pub fn catalog_query(constraints: &SessionConstraints) -> CatalogQuery {
    CatalogQuery {
        catalog: constraints.catalog,
        kind: constraints.kind,
        constellation: constraints.constellation,
        min_apparent_mag: constraints.min_apparent_mag,
        limit: constraints.limit,
    }
}

/// Returns the deep sky ids to observe, in catalog order.
///
/// An explicit object list is returned as is. Otherwise the catalog is
/// queried with the session's catalog side filters, placeholder entries
/// (duplicates, nonexistent objects) are dropped, and when `window` is given
/// the survivors outside it are dropped too. Entries whose position cannot be
/// determined are kept, so that they surface as undefined instead of
/// vanishing.
pub fn select_deepspace(catalog: &dyn CatalogProvider,
                        constraints: &SessionConstraints,
                        window: Option<&EquatorialWindow>)
                        -> Result<Vec<String>, CanonicalError> {
    if let Some(objects) = &constraints.explicit_sources.objects {
        return Ok(objects.clone());
    }
    let (summaries, truncated) = catalog.query(&catalog_query(constraints))?;
    if truncated > 0 {
        info!("Catalog query limited to {} results, {} left off",
              summaries.len(), truncated);
    }
    let mut selected = Vec::<String>::with_capacity(summaries.len());
    for summary in summaries {
        if summary.object_type.is_placeholder() {
            debug!("Dropping placeholder {} ({})",
                   summary.id, summary.object_type.code());
            continue;
        }
        let Some(window) = window else {
            selected.push(summary.id);
            continue;
        };
        match catalog.resolve(&summary.id) {
            Ok(object) => match object.coords {
                Some(coords) if !window.contains(&coords) => {
                    debug!("{} at {:?} is outside the window",
                           summary.id, coords);
                }
                _ => {
                    debug!("Selected {} (mag {:?})", summary.id,
                           summary.magnitude);
                    selected.push(summary.id);
                }
            },
            Err(e) => {
                debug!("Keeping unresolvable {}: {:?}", summary.id, e);
                selected.push(summary.id);
            }
        }
    }
    Ok(selected)
}

/// The Solar System bodies to observe: the explicit list when given,
/// otherwise every default body. Positions are not considered.
pub fn select_planets(constraints: &SessionConstraints) -> Vec<String> {
    match &constraints.explicit_sources.planets {
        Some(planets) => planets.clone(),
        None => SolarSystemBody::DEFAULT_TOP_LIST
            .iter()
            .map(|body| body.name().to_string())
            .collect(),
    }
}

// mod tests.
