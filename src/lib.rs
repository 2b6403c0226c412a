pub mod astro_util;
pub mod candidate_selector;
pub mod catalog_provider;
pub mod constellation;
pub mod constraints;
pub mod ephemeris;
pub mod horizon_window;
pub mod location;
pub mod ongc_catalog;
pub mod position_provider;
pub mod session;
pub mod space_observer;
pub mod twilight;

#[cfg(test)]
mod test_util;
