use crate::cli::ImportArgs;
use metrics_exporter_prometheus::PrometheusHandle;
use rentals::apartments::{ApartmentFixture, ImportSummary};
use rentals::config::{RentalsConfig, StaffSeed};
use rentals::reservations::TransitionPolicy;
use rentals::store::MemoryStore;
use rentals::{AppError, Rentals};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the in-memory service graph, provisions staff and seeds apartments.
pub(crate) fn bootstrap(
    config: &RentalsConfig,
    fixture: Option<&Path>,
) -> Result<Rentals<MemoryStore>, AppError> {
    let rentals = Rentals::new(Arc::new(MemoryStore::new()), config.transition_policy);
    provision_staff(&rentals, &config.staff_users)?;

    if let Some(path) = fixture.or(config.apartment_fixture.as_deref()) {
        let summary = import_fixture(&rentals, path)?;
        info!(
            path = %path.display(),
            imported = summary.imported,
            skipped = summary.skipped,
            "apartment fixture loaded"
        );
    }

    Ok(rentals)
}

pub(crate) fn provision_staff(
    rentals: &Rentals<MemoryStore>,
    seeds: &[StaffSeed],
) -> Result<(), AppError> {
    for seed in seeds {
        rentals
            .accounts
            .provision_staff(&seed.username, &seed.full_name)?;
    }
    Ok(())
}

pub(crate) fn import_fixture(
    rentals: &Rentals<MemoryStore>,
    path: &Path,
) -> Result<ImportSummary, AppError> {
    let fixture = ApartmentFixture::from_path(path)?;
    Ok(rentals.apartments.import(fixture)?)
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let rentals = Rentals::new(Arc::new(MemoryStore::new()), TransitionPolicy::default());
    let summary = import_fixture(&rentals, &args.fixture)?;

    println!("Apartment fixture {}", args.fixture.display());
    println!(
        "- {} units valid | {} duplicates skipped",
        summary.imported, summary.skipped
    );
    for apartment in rentals.apartments.list(&Default::default())? {
        println!(
            "  - {} | floor {} | {} | {} per month | {}",
            apartment,
            apartment.floor,
            apartment.apartment_type.label(),
            apartment.price_per_month,
            apartment.status.label()
        );
    }
    Ok(())
}

pub(crate) fn parse_policy(raw: &str) -> Result<TransitionPolicy, String> {
    TransitionPolicy::parse(raw)
        .ok_or_else(|| format!("unknown transition policy '{raw}' (expected strict or legacy)"))
}
