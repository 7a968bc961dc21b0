use crate::model::*;

use super::{EngineError, EntityStore};

/// Fails if any appointment already holds `(practitioner_id, start)`.
pub(crate) fn check_no_conflict(
    appointments: &EntityStore<Appointment>,
    practitioner_id: PractitionerId,
    start: Timestamp,
) -> Result<(), EngineError> {
    match appointments
        .iter()
        .find(|a| a.practitioner_id == practitioner_id && a.start_date == start)
    {
        Some(existing) => Err(EngineError::Conflict {
            practitioner_id,
            start,
            existing: existing.id,
        }),
        None => Ok(()),
    }
}

/// `max existing id + 1`, or 1 for an empty store. `floor` is the highest id ever
/// issued, so ids freed by deletion are not handed out again.
pub(crate) fn next_appointment_id(
    appointments: &EntityStore<Appointment>,
    floor: AppointmentId,
) -> Result<AppointmentId, EngineError> {
    appointments
        .max_id()
        .unwrap_or(0)
        .max(floor)
        .checked_add(1)
        .ok_or(EngineError::LimitExceeded("appointment ids exhausted"))
}

/// Every required field is set and the slot belongs to the booking practitioner.
pub(crate) fn validate_request(
    request: &BookingRequest,
) -> Result<(PractitionerId, PatientId, &Timeslot), EngineError> {
    let (Some(practitioner_id), Some(patient_id), Some(timeslot)) =
        (request.practitioner_id, request.patient_id, request.timeslot.as_ref())
    else {
        return Err(EngineError::MissingFields(request.missing_fields()));
    };
    if timeslot.practitioner_id != practitioner_id {
        return Err(EngineError::PractitionerMismatch {
            practitioner_id,
            timeslot_id: timeslot.id,
            owner_id: timeslot.practitioner_id,
        });
    }
    Ok((practitioner_id, patient_id, timeslot))
}
