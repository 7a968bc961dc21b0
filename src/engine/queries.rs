use chrono::{NaiveDate, Utc};

use crate::model::*;
use crate::observability::AVAILABILITY_QUERIES_TOTAL;
use crate::window::{format_range, DateWindow, DayBucket};

use super::availability::{min_date, resolve};
use super::{Engine, EngineError};

impl Engine {
    // ── Snapshots ────────────────────────────────────────────

    pub async fn practitioners(&self) -> Vec<Practitioner> {
        self.practitioners.read().await.get_all()
    }

    pub async fn patients(&self) -> Vec<Patient> {
        self.patients.read().await.get_all()
    }

    pub async fn timeslots(&self) -> Vec<Timeslot> {
        self.timeslots.read().await.get_all()
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        self.ledger.read().await.appointments.get_all()
    }

    // ── Lookups ──────────────────────────────────────────────

    pub async fn get_practitioner(&self, id: PractitionerId) -> Result<Practitioner, EngineError> {
        self.practitioners.read().await.require(id).cloned()
    }

    pub async fn get_patient(&self, id: PatientId) -> Result<Patient, EngineError> {
        self.patients.read().await.require(id).cloned()
    }

    pub async fn get_timeslot(&self, id: TimeslotId) -> Result<Timeslot, EngineError> {
        self.timeslots.read().await.require(id).cloned()
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment, EngineError> {
        self.ledger.read().await.appointments.require(id).cloned()
    }

    // ── Availability ─────────────────────────────────────────

    /// Open timeslots of the selected practitioner, in catalog order.
    pub async fn availability(&self, practitioner_id: Option<PractitionerId>) -> Vec<Timeslot> {
        metrics::counter!(AVAILABILITY_QUERIES_TOTAL).increment(1);
        let timeslots = self.timeslots().await;
        let appointments = self.appointments().await;
        resolve(&timeslots, &appointments, practitioner_id)
    }

    /// Open timeslots bucketed into the days `window` shows.
    pub async fn availability_window(
        &self,
        practitioner_id: Option<PractitionerId>,
        window: &DateWindow,
        selected: Option<TimeslotId>,
    ) -> Vec<DayBucket> {
        let open = self.availability(practitioner_id).await;
        window.buckets(&open, selected)
    }

    /// Date of the earliest loaded timeslot, in the configured offset.
    pub async fn min_date(&self) -> Option<NaiveDate> {
        let timeslots = self.timeslots.read().await;
        min_date(timeslots.iter(), self.config.offset())
    }

    /// Window opened on the earliest timeslot date, or today without timeslots.
    pub async fn initial_window(&self) -> DateWindow {
        let offset = self.config.offset();
        let bound = match self.min_date().await {
            Some(date) => date,
            None => Utc::now().with_timezone(&offset).date_naive(),
        };
        DateWindow::new(bound, &self.config)
    }

    // ── Appointment list ─────────────────────────────────────

    /// One row per appointment with practitioner and patient names resolved.
    pub async fn list_appointments(&self) -> Result<Vec<AppointmentSummary>, EngineError> {
        let appointments = self.appointments().await;
        let practitioners = self.practitioners.read().await;
        let patients = self.patients.read().await;
        let offset = self.config.offset();

        appointments
            .iter()
            .map(|a| -> Result<AppointmentSummary, EngineError> {
                let practitioner = practitioners.require(a.practitioner_id)?;
                let patient = patients.require(a.patient_id)?;
                Ok(AppointmentSummary {
                    id: a.id,
                    practitioner: format!("{} {}", practitioner.first_name, practitioner.last_name),
                    patient: patient.display_name(),
                    when: format_range(a.start_date, a.end_date, offset),
                })
            })
            .collect()
    }
}
