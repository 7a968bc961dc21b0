use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

/// An exact point in time. Slots and appointments are matched on equality of these.
pub type Timestamp = DateTime<Utc>;

pub type EntityId = u64;
pub type PractitionerId = EntityId;
pub type PatientId = EntityId;
pub type TimeslotId = EntityId;
pub type AppointmentId = EntityId;

/// Anything held in an [`EntityStore`](crate::engine::EntityStore).
pub trait Entity: Clone {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Practitioner,
    Patient,
    Timeslot,
    Appointment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Practitioner => "practitioner",
            EntityKind::Patient => "patient",
            EntityKind::Timeslot => "timeslot",
            EntityKind::Appointment => "appointment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    pub id: PractitionerId,
    pub first_name: String,
    pub last_name: String,
    pub speciality: String,
}

impl Practitioner {
    pub fn new(
        id: PractitionerId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        speciality: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            speciality: speciality.into(),
        }
    }

    /// `"Jane Doe | Cardiology"`
    pub fn display_name(&self) -> String {
        format!("{} {} | {}", self.first_name, self.last_name, self.speciality)
    }
}

impl Entity for Practitioner {
    const KIND: EntityKind = EntityKind::Practitioner;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
}

impl Patient {
    pub fn new(
        id: PatientId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Patient {
    const KIND: EntityKind = EntityKind::Patient;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// A fixed offering of one practitioner's time, `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeslot {
    pub id: TimeslotId,
    pub practitioner_id: PractitionerId,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

impl Timeslot {
    pub fn new(
        id: TimeslotId,
        practitioner_id: PractitionerId,
        start_date: Timestamp,
        end_date: Timestamp,
    ) -> Result<Self, EngineError> {
        validate_span(start_date, end_date)?;
        Ok(Self {
            id,
            practitioner_id,
            start_date,
            end_date,
        })
    }

    /// Key an appointment must not already hold for this slot to be open.
    pub fn slot_key(&self) -> SlotKey {
        (self.practitioner_id, self.start_date)
    }
}

impl Entity for Timeslot {
    const KIND: EntityKind = EntityKind::Timeslot;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub practitioner_id: PractitionerId,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

impl Appointment {
    pub fn new(
        id: AppointmentId,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        start_date: Timestamp,
        end_date: Timestamp,
    ) -> Result<Self, EngineError> {
        validate_span(start_date, end_date)?;
        Ok(Self {
            id,
            patient_id,
            practitioner_id,
            start_date,
            end_date,
        })
    }

    /// Materialize an appointment consuming `slot`.
    pub fn for_timeslot(id: AppointmentId, patient_id: PatientId, slot: &Timeslot) -> Self {
        Self {
            id,
            patient_id,
            practitioner_id: slot.practitioner_id,
            start_date: slot.start_date,
            end_date: slot.end_date,
        }
    }

    pub fn slot_key(&self) -> SlotKey {
        (self.practitioner_id, self.start_date)
    }
}

impl Entity for Appointment {
    const KIND: EntityKind = EntityKind::Appointment;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// (practitioner, start): at most one appointment may hold each key.
pub type SlotKey = (PractitionerId, Timestamp);

fn validate_span(start: Timestamp, end: Timestamp) -> Result<(), EngineError> {
    if start >= end {
        return Err(EngineError::InvalidSpan { start, end });
    }
    Ok(())
}

/// Everything a session loads from the outside, already deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub practitioners: Vec<Practitioner>,
    pub patients: Vec<Patient>,
    pub timeslots: Vec<Timeslot>,
    pub appointments: Vec<Appointment>,
}

/// Output events for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    AppointmentBooked {
        appointment: Appointment,
    },
    AppointmentRemoved {
        id: AppointmentId,
        practitioner_id: PractitionerId,
    },
}

impl Event {
    pub fn practitioner_id(&self) -> PractitionerId {
        match self {
            Event::AppointmentBooked { appointment } => appointment.practitioner_id,
            Event::AppointmentRemoved { practitioner_id, .. } => *practitioner_id,
        }
    }
}

// ── Booking input ────────────────────────────────────────────────

/// Form fields a booking needs. Each may still be unset when submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Practitioner,
    Patient,
    Timeslot,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Practitioner => "practitioner",
            Field::Patient => "patient",
            Field::Timeslot => "timeslot",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub practitioner_id: Option<PractitionerId>,
    pub patient_id: Option<PatientId>,
    pub timeslot: Option<Timeslot>,
}

impl BookingRequest {
    pub fn new(practitioner_id: PractitionerId, patient_id: PatientId, timeslot: Timeslot) -> Self {
        Self {
            practitioner_id: Some(practitioner_id),
            patient_id: Some(patient_id),
            timeslot: Some(timeslot),
        }
    }

    /// Fields that are still unset, in form order.
    pub fn missing_fields(&self) -> Vec<Field> {
        let mut missing = Vec::new();
        if self.practitioner_id.is_none() {
            missing.push(Field::Practitioner);
        }
        if self.patient_id.is_none() {
            missing.push(Field::Patient);
        }
        if self.timeslot.is_none() {
            missing.push(Field::Timeslot);
        }
        missing
    }
}

// ── Query result types ───────────────────────────────────────────

/// One row of the appointment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub id: AppointmentId,
    pub practitioner: String,
    pub patient: String,
    pub when: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2022, 1, 3, h, m, 0).unwrap()
    }

    #[test]
    fn timeslot_rejects_empty_span() {
        let err = Timeslot::new(1, 1, at(9, 0), at(9, 0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSpan { .. }));
        assert!(Timeslot::new(1, 1, at(10, 0), at(9, 0)).is_err());
        assert!(Timeslot::new(1, 1, at(9, 0), at(9, 30)).is_ok());
    }

    #[test]
    fn appointment_copies_slot_span() {
        let slot = Timeslot::new(7, 3, at(9, 0), at(9, 30)).unwrap();
        let appt = Appointment::for_timeslot(12, 5, &slot);
        assert_eq!(appt.practitioner_id, 3);
        assert_eq!(appt.patient_id, 5);
        assert_eq!(appt.start_date, slot.start_date);
        assert_eq!(appt.end_date, slot.end_date);
        assert_eq!(appt.slot_key(), slot.slot_key());
    }

    #[test]
    fn display_names() {
        let p = Practitioner::new(1, "Jane", "Doe", "Cardiology");
        assert_eq!(p.display_name(), "Jane Doe | Cardiology");
        let pt = Patient::new(1, "John", "Smith", NaiveDate::from_ymd_opt(1980, 5, 1).unwrap());
        assert_eq!(pt.display_name(), "John Smith");
    }

    #[test]
    fn missing_fields_in_form_order() {
        let req = BookingRequest::default();
        assert_eq!(
            req.missing_fields(),
            vec![Field::Practitioner, Field::Patient, Field::Timeslot]
        );

        let req = BookingRequest {
            practitioner_id: Some(1),
            ..Default::default()
        };
        assert_eq!(req.missing_fields(), vec![Field::Patient, Field::Timeslot]);
    }

    #[test]
    fn catalog_reads_camel_case_json() {
        let json = r#"{
            "practitioners": [{"id": 1, "firstName": "Jane", "lastName": "Doe", "speciality": "GP"}],
            "timeslots": [{"id": 4, "practitionerId": 1,
                           "startDate": "2022-01-03T09:00:00Z", "endDate": "2022-01-03T09:30:00Z"}]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.practitioners[0].first_name, "Jane");
        assert_eq!(catalog.timeslots[0].start_date, at(9, 0));
        assert!(catalog.patients.is_empty());
        assert!(catalog.appointments.is_empty());
    }

    #[test]
    fn event_reports_practitioner() {
        let slot = Timeslot::new(7, 3, at(9, 0), at(9, 30)).unwrap();
        let booked = Event::AppointmentBooked {
            appointment: Appointment::for_timeslot(1, 5, &slot),
        };
        assert_eq!(booked.practitioner_id(), 3);
        let removed = Event::AppointmentRemoved { id: 1, practitioner_id: 9 };
        assert_eq!(removed.practitioner_id(), 9);
    }
}
