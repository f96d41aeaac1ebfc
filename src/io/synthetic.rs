//! Seeded synthetic catalog for demos and presets.
//!
//! Produces a pre-shaped history (base prices, noisy competitor quotes,
//! seeded lag context) so the simulator can run without an external dataset.

use chrono::{Datelike, Days, NaiveDate};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::sim::types::{Competitors, DailyRecord, LAG_WINDOW};

use super::history::Catalog;

/// Product names and list prices cycled through by the generator.
const PRODUCTS: &[(&str, f64)] = &[
    ("Trail Running Shoes", 129.99),
    ("Road Bike Helmet", 59.90),
    ("Yoga Mat", 24.99),
    ("Hiking Backpack 30L", 89.00),
    ("Smart Fitness Watch", 249.00),
    ("Tennis Racket", 139.50),
];

/// Parameters for [`generate_catalog`].
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    /// First simulated day.
    pub start_date: NaiveDate,
    /// Horizon length in days.
    pub days: usize,
    /// Number of products (capped at the built-in list length).
    pub products: usize,
    /// Master random seed.
    pub seed: u64,
}

/// Gaussian noise via Box-Muller.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Generates a catalog against the declared competitor set.
///
/// With two or more competitors, product `p` is not listed by competitor
/// `p % (competitors + 1)` (when that index exists), so catalogs include
/// partially-listed items while every product keeps at least one quote.
/// Day-0 lags follow a weekly demand cycle with noise; later days carry the
/// same seeded context, which the forecaster overwrites.
pub fn generate_catalog(spec: &SyntheticSpec, competitors: &Competitors) -> Catalog {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let n_products = spec.products.min(PRODUCTS.len());
    let mut records = Vec::with_capacity(n_products * spec.days);

    for (p, &(name, list_price)) in PRODUCTS.iter().take(n_products).enumerate() {
        let skipped = if competitors.len() > 1 {
            p % (competitors.len() + 1)
        } else {
            usize::MAX
        };
        // cheaper items sell more units
        let base_demand = (400.0 / list_price.sqrt()).max(1.0);

        let mut lags = [0.0; LAG_WINDOW];
        for (k, lag) in lags.iter_mut().enumerate() {
            let day = spec.start_date - Days::new(k as u64 + 1);
            let weekly = weekly_factor(day.weekday().num_days_from_monday());
            *lag = (base_demand * weekly + gaussian_noise(&mut rng, base_demand * 0.1)).max(0.0);
        }
        let rolling_mean_7 = lags.iter().sum::<f64>() / LAG_WINDOW as f64;

        for d in 0..spec.days {
            let date = spec.start_date + Days::new(d as u64);
            let mut record = DailyRecord::new(name, date, list_price);
            record.lags = lags;
            record.rolling_mean_7 = rolling_mean_7;

            let listed: Vec<(&str, f64)> = competitors
                .names()
                .iter()
                .enumerate()
                .filter(|(c, _)| *c != skipped)
                .map(|(_, comp)| {
                    let spread = 1.0 + gaussian_noise(&mut rng, 0.04);
                    (comp.as_str(), (list_price * spread * 100.0).round() / 100.0)
                })
                .collect();
            record.competitor_prices = competitors.quotes(listed);

            let weekend = date.weekday().num_days_from_monday() >= 5;
            record
                .extra_features
                .insert("is_weekend".to_string(), if weekend { 1.0 } else { 0.0 });

            records.push(record);
        }
    }

    Catalog::from_records(competitors.clone(), records)
}

/// Relative demand by weekday (Mon=0), peaking at the weekend.
fn weekly_factor(weekday: u32) -> f64 {
    match weekday {
        5 => 1.35,
        6 => 1.2,
        4 => 1.1,
        _ => 0.9,
    }
}
