// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use canonical_error::{CanonicalError, CanonicalErrorCode};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info, warn};

use crate::candidate_selector::{select_deepspace, select_planets};
use crate::catalog_provider::CatalogProvider;
use crate::constraints::SessionConstraints;
use crate::horizon_window::EquatorialWindow;
use crate::location::{resolve_location, Location, LocationSource};
use crate::position_provider::{ObservationContext, PositionProvider};
use crate::space_observer::SpaceObserver;
use crate::twilight::{coming_night, next_sunrise};

// Session length used when the night cannot be determined.
const FALLBACK_WINDOW: Duration = Duration::from_secs(12 * 3600);

/// Outcome of the most recent classification of one observer.
#[derive(Debug)]
pub enum Classification {
    Visible,
    NotVisible,
    // The position could not be computed.
    Undefined(CanonicalError),
}

/// A requested object for which no observer could be constructed (unknown
/// planet name, unknown catalog id, catalog entry without position).
#[derive(Debug)]
pub struct UnresolvedObject {
    pub id: String,
    pub error: CanonicalError,
}

/// The observers of one category (Solar System or deep sky), with their
/// classification. `classification[i]` is the state of `observers[i]`.
#[derive(Debug, Default)]
pub struct ObserverSet {
    observers: Vec<SpaceObserver>,
    classification: Vec<Classification>,
    unresolved: Vec<UnresolvedObject>,
}

impl ObserverSet {
    // Builds an observer for each id. Unavailable errors abort, since
    // retrying later may succeed; other failures are recorded as unresolved.
    // The new set is unclassified until its first refresh().
    fn construct<F>(ids: Vec<String>, mut make: F)
                    -> Result<Self, CanonicalError>
    where
        F: FnMut(&str) -> Result<SpaceObserver, CanonicalError>,
    {
        let mut set = ObserverSet::default();
        for id in ids {
            match make(&id) {
                Ok(observer) => set.observers.push(observer),
                Err(e) if e.code == CanonicalErrorCode::Unavailable => {
                    return Err(e);
                }
                Err(e) => {
                    warn!("Could not construct observer for {}: {}", id,
                          e.message);
                    set.unresolved.push(UnresolvedObject { id, error: e });
                }
            }
        }
        Ok(set)
    }

    // Never fails; observers whose update fails are classified undefined.
    fn refresh(&mut self,
               context: &ObservationContext,
               provider: &dyn PositionProvider) {
        self.classification = self
            .observers
            .iter_mut()
            .map(|observer| {
                match observer.update_coords(context, provider) {
                    Ok(()) if observer.is_up_now() => Classification::Visible,
                    Ok(()) => Classification::NotVisible,
                    Err(e) => {
                        warn!("Could not update {}: {}", observer.object_name,
                              e.message);
                        Classification::Undefined(e)
                    }
                }
            })
            .collect();
    }

    fn invalidate(&mut self) {
        for observer in &mut self.observers {
            observer.invalidate();
        }
    }

    pub fn observers(&self) -> &[SpaceObserver] {
        &self.observers
    }

    pub fn classified(&self)
                      -> impl Iterator<Item = (&SpaceObserver, &Classification)> {
        self.observers.iter().zip(self.classification.iter())
    }

    pub fn visible(&self) -> impl Iterator<Item = &SpaceObserver> {
        self.classified()
            .filter(|(_, c)| matches!(c, Classification::Visible))
            .map(|(o, _)| o)
    }

    pub fn not_visible(&self) -> impl Iterator<Item = &SpaceObserver> {
        self.classified()
            .filter(|(_, c)| matches!(c, Classification::NotVisible))
            .map(|(o, _)| o)
    }

    /// Observers whose position could not be computed.
    pub fn undefined(&self) -> impl Iterator<Item = &SpaceObserver> {
        self.classified()
            .filter(|(_, c)| matches!(c, Classification::Undefined(_)))
            .map(|(o, _)| o)
    }

    /// Requested objects that have no observer.
    pub fn unresolved(&self) -> &[UnresolvedObject] {
        &self.unresolved
    }

    pub fn report(&self) -> CategoryReport {
        let mut undefined = names(self.undefined());
        undefined.extend(self.unresolved.iter().map(|u| u.id.clone()));
        CategoryReport {
            visible: names(self.visible()),
            not_visible: names(self.not_visible()),
            undefined,
        }
    }
}

fn names<'a>(observers: impl Iterator<Item = &'a SpaceObserver>)
             -> Vec<String> {
    observers.map(|o| o.object_name.clone()).collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryReport {
    pub visible: Vec<String>,
    pub not_visible: Vec<String>,
    // Failed observers, then unresolved ids.
    pub undefined: Vec<String>,
}

impl CategoryReport {
    pub fn total(&self) -> usize {
        self.visible.len() + self.not_visible.len() + self.undefined.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub location: Location,
    pub location_source: LocationSource,
    pub instant: SystemTime,
    pub start: SystemTime,
    pub end: SystemTime,
    pub solar: CategoryReport,
    pub deepspace: CategoryReport,
}

fn format_time(t: SystemTime) -> String {
    DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn write_category(f: &mut fmt::Formatter<'_>, title: &str,
                  category: &CategoryReport) -> fmt::Result {
    writeln!(f, "{}: {} visible, {} not visible, {} undefined", title,
             category.visible.len(), category.not_visible.len(),
             category.undefined.len())?;
    for (label, names) in [("Visible", &category.visible),
                           ("Not visible", &category.not_visible),
                           ("Undefined", &category.undefined)] {
        if !names.is_empty() {
            writeln!(f, "  {}: {}", label, names.join(", "))?;
        }
    }
    Ok(())
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Location: {} (from {})", self.location,
                 self.location_source)?;
        writeln!(f, "Observed at: {}", format_time(self.instant))?;
        writeln!(f, "Session: {} to {}", format_time(self.start),
                 format_time(self.end))?;
        write_category(f, "Solar System", &self.solar)?;
        write_category(f, "Deep sky", &self.deepspace)
    }
}

/// One planning run: where and when, what to look for, and the resulting
/// observers.
pub struct Session {
    constraints: SessionConstraints,
    location: Location,
    location_source: LocationSource,

    // Instant at which positions are evaluated.
    instant: SystemTime,

    // Session window; see `resolve_window()`.
    start: SystemTime,
    end: SystemTime,

    // Derived from the alt/az bounds at the time of the last selection. None
    // when the horizon filter is off.
    equatorial_window: Option<EquatorialWindow>,

    position_provider: Arc<dyn PositionProvider + Send + Sync>,
    catalog: Arc<dyn CatalogProvider + Send + Sync>,

    solar: ObserverSet,
    deepspace: ObserverSet,
}

impl Session {
    /// Resolves the location (the given one, else the default) and session
    /// window, selects the candidates, constructs their observers and
    /// classifies them at `now`.
    ///
    /// Fails on invalid constraints, on provider failures while translating
    /// the horizon window or querying the catalog, and on Unavailable errors
    /// while constructing observers. Other per-object failures end up in the
    /// undefined buckets.
    pub fn build(constraints: SessionConstraints,
                 location: Option<(Location, LocationSource)>,
                 now: SystemTime,
                 position_provider: Arc<dyn PositionProvider + Send + Sync>,
                 catalog: Arc<dyn CatalogProvider + Send + Sync>)
                 -> Result<Self, CanonicalError> {
        constraints.validate()?;
        let (location, location_source) =
            location.unwrap_or_else(|| resolve_location(None));
        let (start, end) = resolve_window(&constraints, &location, now,
                                          &*position_provider);
        info!("Session at {} from {} to {}", location, format_time(start),
              format_time(end));
        let mut session = Session {
            constraints,
            location,
            location_source,
            instant: now,
            start,
            end,
            equatorial_window: None,
            position_provider,
            catalog,
            solar: ObserverSet::default(),
            deepspace: ObserverSet::default(),
        };
        session.reselect()?;
        Ok(session)
    }

    pub fn context(&self) -> ObservationContext {
        ObservationContext {
            location: self.location.clone(),
            instant: self.instant,
        }
    }

    /// Recomputes the horizon window and candidate selection for the current
    /// location and instant, rebuilds the observers and refreshes them. On
    /// failure the session keeps its previous window, observers and
    /// classification.
    pub fn reselect(&mut self) -> Result<(), CanonicalError> {
        let context = self.context();
        let equatorial_window = if self.constraints.horizon_filter {
            Some(EquatorialWindow::translate(&*self.position_provider,
                                             &context, &self.constraints)?)
        } else {
            None
        };
        let planets = select_planets(&self.constraints);
        let deep_ids = select_deepspace(&*self.catalog, &self.constraints,
                                        equatorial_window.as_ref())?;
        debug!("Selected {} planets, {} deep sky objects",
               planets.len(), deep_ids.len());

        let solar = ObserverSet::construct(planets, SpaceObserver::planet)?;
        let deepspace = ObserverSet::construct(deep_ids, |id| {
            SpaceObserver::deep_sky(id, &*self.catalog)
        })?;
        self.equatorial_window = equatorial_window;
        self.solar = solar;
        self.deepspace = deepspace;
        self.refresh();
        Ok(())
    }

    pub fn update_now_solar_objects(&mut self) {
        let context = self.context();
        self.solar.refresh(&context, &*self.position_provider);
    }

    pub fn update_now_deepspace_objects(&mut self) {
        let context = self.context();
        self.deepspace.refresh(&context, &*self.position_provider);
    }

    /// Reclassifies every observer at the current instant. The observer sets
    /// do not change.
    pub fn refresh(&mut self) {
        self.update_now_solar_objects();
        self.update_now_deepspace_objects();
        info!("Refreshed at {}: {} + {} visible", format_time(self.instant),
              self.solar.visible().count(), self.deepspace.visible().count());
    }

    /// Moves the observer. Cached positions are discarded; the horizon
    /// window, selection and classification stay as they are until
    /// `reselect()` or `refresh()`.
    pub fn update_user_location(&mut self, location: Location,
                                source: LocationSource) {
        info!("Observer moved to {} ({})", location, source);
        self.location = location;
        self.location_source = source;
        self.solar.invalidate();
        self.deepspace.invalidate();
    }

    /// Sets the instant used by subsequent refreshes.
    pub fn set_observation_instant(&mut self, instant: SystemTime) {
        self.instant = instant;
    }

    /// Whether `observer` rises above the horizon during the session window.
    pub fn will_be_up(&self, observer: &SpaceObserver)
                      -> Result<bool, CanonicalError> {
        observer.will_be_up(&self.location, self.start, self.end,
                            &*self.position_provider)
    }

    pub fn constraints(&self) -> &SessionConstraints {
        &self.constraints
    }

    pub fn location(&self) -> (&Location, LocationSource) {
        (&self.location, self.location_source)
    }

    pub fn instant(&self) -> SystemTime {
        self.instant
    }

    pub fn window(&self) -> (SystemTime, SystemTime) {
        (self.start, self.end)
    }

    pub fn equatorial_window(&self) -> Option<&EquatorialWindow> {
        self.equatorial_window.as_ref()
    }

    pub fn solar_objects(&self) -> &ObserverSet {
        &self.solar
    }

    pub fn deepspace_objects(&self) -> &ObserverSet {
        &self.deepspace
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            location: self.location.clone(),
            location_source: self.location_source,
            instant: self.instant,
            start: self.start,
            end: self.end,
            solar: self.solar.report(),
            deepspace: self.deepspace.report(),
        }
    }
}

// Explicit bounds win. A missing start defaults to the start of the coming
// night (or `now` if it is dark); a missing end to the following sunrise.
// When twilight cannot be determined the window is 12 hours long.
fn resolve_window(constraints: &SessionConstraints,
                  location: &Location,
                  now: SystemTime,
                  provider: &dyn PositionProvider)
                  -> (SystemTime, SystemTime) {
    match (constraints.start, constraints.end) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => {
            match next_sunrise(location, start, provider) {
                Ok(end) => (start, end),
                Err(e) => {
                    warn!("Using a 12 hour session: {}", e.message);
                    (start, start + FALLBACK_WINDOW)
                }
            }
        }
        (None, Some(end)) => {
            let start = match coming_night(location, now, provider) {
                Ok((start, _)) if start < end => start,
                _ => now.min(end),
            };
            (start, end)
        }
        (None, None) => match coming_night(location, now, provider) {
            Ok(window) => window,
            Err(e) => {
                warn!("Using a 12 hour session: {}", e.message);
                (now, now + FALLBACK_WINDOW)
            }
        },
    }
}

// mod tests.
