use std::time::Instant;

use tracing::{debug, info, warn};

use crate::limits::*;
use crate::model::*;
use crate::observability::{self, APPOINTMENTS_ACTIVE, APPOINTMENTS_REMOVED_TOTAL, BOOKINGS_TOTAL, BOOKING_DURATION_SECONDS};

use super::conflict::{check_no_conflict, next_appointment_id, validate_request};
use super::{Engine, EngineError, EntityStore};

/// Validate `request` and append the appointment it describes.
///
/// Fails without touching `appointments` when a field is missing, the slot
/// belongs to another practitioner, or (practitioner, start) is already held.
/// The new id is `max existing id + 1`, or 1 for an empty collection.
pub fn book(
    request: &BookingRequest,
    appointments: &mut EntityStore<Appointment>,
) -> Result<Appointment, EngineError> {
    commit(request, appointments, 0)
}

/// [`book`] with a floor under the allocated id.
fn commit(
    request: &BookingRequest,
    appointments: &mut EntityStore<Appointment>,
    floor: AppointmentId,
) -> Result<Appointment, EngineError> {
    let (practitioner_id, patient_id, timeslot) = validate_request(request)?;
    check_no_conflict(appointments, practitioner_id, timeslot.start_date)?;

    let id = next_appointment_id(appointments, floor)?;
    let appointment = Appointment::for_timeslot(id, patient_id, timeslot);
    appointments.upsert_one(appointment.clone());
    Ok(appointment)
}

impl Engine {
    /// Book `request` against the loaded catalog.
    ///
    /// On top of [`book`], the practitioner, patient and timeslot must all be
    /// loaded, and the request's timeslot must equal the loaded one.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment, EngineError> {
        let started = Instant::now();
        let result = self.book_inner(&request).await;
        metrics::counter!(BOOKINGS_TOTAL, "status" => observability::outcome_label(&result)).increment(1);
        metrics::histogram!(BOOKING_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        match &result {
            Ok(a) => info!(
                appointment_id = a.id,
                practitioner_id = a.practitioner_id,
                patient_id = a.patient_id,
                start = %a.start_date,
                "appointment booked"
            ),
            Err(e) if e.is_validation() => debug!("booking rejected: {e}"),
            Err(e) => warn!("booking failed: {e}"),
        }
        result
    }

    async fn book_inner(&self, request: &BookingRequest) -> Result<Appointment, EngineError> {
        let (practitioner_id, patient_id, timeslot) = validate_request(request)?;
        self.get_practitioner(practitioner_id).await?;
        self.get_patient(patient_id).await?;
        let loaded = self.get_timeslot(timeslot.id).await?;
        if &loaded != timeslot {
            return Err(EngineError::TimeslotMismatch(timeslot.id));
        }

        let mut ledger = self.ledger.write().await;
        if ledger.appointments.len() >= MAX_APPOINTMENTS {
            return Err(EngineError::LimitExceeded("too many appointments"));
        }
        let floor = ledger.high_water;
        let appointment = commit(request, &mut ledger.appointments, floor)?;
        ledger.high_water = appointment.id;
        metrics::gauge!(APPOINTMENTS_ACTIVE).set(ledger.appointments.len() as f64);

        self.notify.send(&Event::AppointmentBooked {
            appointment: appointment.clone(),
        });
        Ok(appointment)
    }

    /// Remove an appointment, freeing its slot. Its id is not issued again.
    pub async fn delete_appointment(&self, id: AppointmentId) -> Result<Appointment, EngineError> {
        let mut ledger = self.ledger.write().await;
        let removed = ledger
            .appointments
            .remove_one(id)
            .ok_or(EngineError::not_found(EntityKind::Appointment, id))?;
        metrics::gauge!(APPOINTMENTS_ACTIVE).set(ledger.appointments.len() as f64);
        metrics::counter!(APPOINTMENTS_REMOVED_TOTAL).increment(1);

        self.notify.send(&Event::AppointmentRemoved {
            id,
            practitioner_id: removed.practitioner_id,
        });
        info!(appointment_id = id, practitioner_id = removed.practitioner_id, "appointment removed");
        Ok(removed)
    }
}
