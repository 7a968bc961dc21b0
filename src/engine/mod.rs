mod availability;
mod conflict;
mod error;
mod mutations;
mod queries;
mod store;
#[cfg(test)]
mod tests;

pub use availability::{booked_keys, is_open, min_date, resolve};
pub use error::EngineError;
pub use mutations::book;
pub use store::EntityStore;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::{ConfigError, EngineConfig};
use crate::model::*;
use crate::notify::NotifyHub;

/// Appointments plus the highest id ever issued, so deleted ids stay retired.
#[derive(Debug, Default)]
pub(super) struct Ledger {
    pub(super) appointments: EntityStore<Appointment>,
    pub(super) high_water: AppointmentId,
}

impl Ledger {
    fn absorb(&mut self, appointments: Vec<Appointment>) {
        if let Some(max) = appointments.iter().map(|a| a.id).max() {
            self.high_water = self.high_water.max(max);
        }
        self.appointments.upsert_many(appointments);
    }
}

/// Session owner of the four collections.
///
/// Catalog stores (practitioners, patients, timeslots) are only replaced by the
/// loading collaborator. The ledger is written only by `book` and
/// `delete_appointment`, each under its write guard, so a conflict check and the
/// append that follows it are atomic against other bookings. Readers clone a
/// snapshot under the read guard.
pub struct Engine {
    pub(super) practitioners: RwLock<EntityStore<Practitioner>>,
    pub(super) patients: RwLock<EntityStore<Patient>>,
    pub(super) timeslots: RwLock<EntityStore<Timeslot>>,
    pub(super) ledger: RwLock<Ledger>,
    pub notify: Arc<NotifyHub>,
    pub(super) config: EngineConfig,
}

impl Engine {
    /// Fails when `config` is outside the ranges in [`crate::limits`].
    pub fn new(config: EngineConfig, notify: Arc<NotifyHub>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, notify))
    }

    fn build(config: EngineConfig, notify: Arc<NotifyHub>) -> Self {
        Self {
            practitioners: RwLock::new(EntityStore::new()),
            patients: RwLock::new(EntityStore::new()),
            timeslots: RwLock::new(EntityStore::new()),
            ledger: RwLock::new(Ledger::default()),
            notify,
            config,
        }
    }

    /// Engine with default config and its own hub, loaded from `catalog`.
    pub async fn with_catalog(catalog: Catalog) -> Self {
        let engine = Self::build(EngineConfig::default(), Arc::new(NotifyHub::new()));
        engine.load_catalog(catalog).await;
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn load_catalog(&self, catalog: Catalog) {
        let Catalog {
            practitioners,
            patients,
            timeslots,
            appointments,
        } = catalog;
        tracing::info!(
            practitioners = practitioners.len(),
            patients = patients.len(),
            timeslots = timeslots.len(),
            appointments = appointments.len(),
            "loading catalog"
        );
        self.upsert_practitioners(practitioners).await;
        self.upsert_patients(patients).await;
        self.upsert_timeslots(timeslots).await;
        self.upsert_appointments(appointments).await;
    }

    pub async fn upsert_practitioners(&self, practitioners: Vec<Practitioner>) {
        self.practitioners.write().await.upsert_many(practitioners);
    }

    pub async fn upsert_patients(&self, patients: Vec<Patient>) {
        self.patients.write().await.upsert_many(patients);
    }

    pub async fn upsert_timeslots(&self, timeslots: Vec<Timeslot>) {
        let mut guard = self.timeslots.write().await;
        guard.upsert_many(timeslots);
        metrics::gauge!(crate::observability::TIMESLOTS_LOADED).set(guard.len() as f64);
    }

    /// Appointments already recorded elsewhere. Trusted as loaded: no conflict check.
    pub async fn upsert_appointments(&self, appointments: Vec<Appointment>) {
        let mut ledger = self.ledger.write().await;
        ledger.absorb(appointments);
        metrics::gauge!(crate::observability::APPOINTMENTS_ACTIVE)
            .set(ledger.appointments.len() as f64);
    }
}
