use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate};

use crate::model::*;

// ── Availability Algorithm ────────────────────────────────────────

/// Set of (practitioner, start) pairs already held by an appointment.
pub fn booked_keys<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> HashSet<SlotKey> {
    appointments.into_iter().map(Appointment::slot_key).collect()
}

/// Open timeslots of `practitioner_id`.
///
/// A slot is open iff it belongs to the practitioner and no appointment holds the
/// same (practitioner, start) pair. Start instants must match exactly.
/// Output keeps the order of `timeslots`. No practitioner selected → empty.
pub fn resolve(
    timeslots: &[Timeslot],
    appointments: &[Appointment],
    practitioner_id: Option<PractitionerId>,
) -> Vec<Timeslot> {
    let Some(pid) = practitioner_id else {
        return Vec::new();
    };
    let booked = booked_keys(appointments.iter().filter(|a| a.practitioner_id == pid));
    timeslots
        .iter()
        .filter(|t| t.practitioner_id == pid && !booked.contains(&t.slot_key()))
        .cloned()
        .collect()
}

/// Single-slot form of [`resolve`].
pub fn is_open(timeslot: &Timeslot, appointments: &[Appointment]) -> bool {
    let key = timeslot.slot_key();
    !appointments.iter().any(|a| a.slot_key() == key)
}

/// Calendar date (in `offset`) of the earliest timeslot start. This is the
/// lower bound the date window may not page back past.
pub fn min_date<'a>(
    timeslots: impl IntoIterator<Item = &'a Timeslot>,
    offset: FixedOffset,
) -> Option<NaiveDate> {
    timeslots
        .into_iter()
        .map(|t| t.start_date)
        .min()
        .map(|start| start.with_timezone(&offset).date_naive())
}
