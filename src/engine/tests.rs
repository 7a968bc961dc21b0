use super::*;
use crate::window::SlotCell;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

const D: u32 = 3; // Monday 3 January 2022

fn at(day: u32, h: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2022, 1, day, h, 0, 0).unwrap()
}

fn slot(id: u64, practitioner_id: u64, day: u32, h: u32) -> Timeslot {
    Timeslot::new(id, practitioner_id, at(day, h), at(day, h) + Duration::minutes(30)).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, day).unwrap()
}

/// Two practitioners, two patients. Practitioner 1 has 09:00 and 10:00 on day D,
/// with 09:00 already taken by appointment 5.
fn catalog() -> Catalog {
    Catalog {
        practitioners: vec![
            Practitioner::new(1, "Jane", "Doe", "Cardiology"),
            Practitioner::new(2, "Paul", "Roe", "Dermatology"),
        ],
        patients: vec![
            Patient::new(10, "John", "Smith", NaiveDate::from_ymd_opt(1980, 5, 1).unwrap()),
            Patient::new(11, "Mary", "Major", NaiveDate::from_ymd_opt(1991, 2, 9).unwrap()),
        ],
        timeslots: vec![
            slot(100, 1, D, 9),
            slot(101, 1, D, 10),
            slot(102, 2, D, 9),
            slot(103, 1, D + 1, 14),
        ],
        appointments: vec![Appointment::for_timeslot(5, 10, &slot(100, 1, D, 9))],
    }
}

async fn engine() -> Engine {
    Engine::with_catalog(catalog()).await
}

// ── Load + lookups ───────────────────────────────────────

#[tokio::test]
async fn load_catalog_populates_stores() {
    let engine = engine().await;
    assert_eq!(engine.practitioners().await.len(), 2);
    assert_eq!(engine.patients().await.len(), 2);
    assert_eq!(engine.timeslots().await.len(), 4);
    assert_eq!(engine.appointments().await.len(), 1);
}

#[tokio::test]
async fn lookup_absent_is_not_found() {
    let engine = engine().await;
    assert_eq!(
        engine.get_patient(99).await,
        Err(EngineError::not_found(EntityKind::Patient, 99))
    );
    assert!(matches!(
        engine.get_appointment(99).await,
        Err(EngineError::NotFound { kind: EntityKind::Appointment, id: 99 })
    ));
    assert_eq!(engine.get_practitioner(2).await.unwrap().last_name, "Roe");
}

// ── Availability ─────────────────────────────────────────

#[tokio::test]
async fn availability_excludes_booked_slot() {
    let engine = engine().await;
    let open: Vec<u64> = engine.availability(Some(1)).await.iter().map(|t| t.id).collect();
    assert_eq!(open, vec![101, 103]);
    assert!(engine.availability(None).await.is_empty());
    assert!(engine.availability(Some(42)).await.is_empty());
}

#[tokio::test]
async fn initial_window_starts_at_earliest_slot() {
    let engine = engine().await;
    let window = engine.initial_window().await;
    assert_eq!(window.cursor(), date(D));
    assert_eq!(window.min_bound(), date(D));
    assert!(!window.can_go_back());

    let days = engine.availability_window(Some(1), &window, Some(101)).await;
    assert_eq!(days.len(), 4);
    match &days[0].slots[0] {
        SlotCell::Open { timeslot, label, selected } => {
            assert_eq!(timeslot.id, 101);
            assert_eq!(label, "10:00");
            assert!(*selected);
        }
        SlotCell::Empty => panic!("expected 10:00 slot"),
    }
    assert_eq!(days[0].slots[1], SlotCell::Empty);
    assert_eq!(days[1].open_slots().next().map(|t| t.id), Some(103));
    assert!(!days[2].has_open_slots());
    assert!(!days[3].has_open_slots());
}

#[tokio::test]
async fn initial_window_without_timeslots_is_today() {
    let engine = Engine::with_catalog(Catalog::default()).await;
    let before = Utc::now().date_naive();
    let window = engine.initial_window().await;
    let after = Utc::now().date_naive();
    // The call may straddle midnight
    assert!(window.cursor() >= before && window.cursor() <= after);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let config = EngineConfig {
        utc_offset_minutes: 100_000_000,
        ..Default::default()
    };
    let err = Engine::new(config, Arc::new(NotifyHub::new())).err();
    assert!(matches!(
        err,
        Some(ConfigError::OutOfRange { key: "SLOTBOOK_UTC_OFFSET_MINUTES", .. })
    ));

    let config = EngineConfig {
        window_days: u32::MAX,
        ..Default::default()
    };
    assert!(Engine::new(config, Arc::new(NotifyHub::new())).is_err());
    assert!(Engine::new(EngineConfig::default(), Arc::new(NotifyHub::new())).is_ok());
}

// ── Booking ──────────────────────────────────────────────

#[tokio::test]
async fn book_then_rebook_conflicts() {
    let engine = engine().await;

    let booked = engine
        .book(BookingRequest::new(1, 11, slot(101, 1, D, 10)))
        .await
        .unwrap();
    assert_eq!(booked.id, 6);
    assert_eq!(booked.start_date, at(D, 10));
    assert!(engine.availability(Some(1)).await.iter().all(|t| t.id != 101));

    let err = engine
        .book(BookingRequest::new(1, 10, slot(101, 1, D, 10)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict {
            practitioner_id: 1,
            start: at(D, 10),
            existing: 6,
        }
    );
    assert_eq!(engine.appointments().await.len(), 2);
}

#[tokio::test]
async fn sequential_bookings_get_increasing_ids() {
    let engine = engine().await;
    let a = engine.book(BookingRequest::new(1, 10, slot(101, 1, D, 10))).await.unwrap();
    let b = engine.book(BookingRequest::new(2, 11, slot(102, 2, D, 9))).await.unwrap();
    assert_eq!((a.id, b.id), (6, 7));
}

#[tokio::test]
async fn missing_fields_leave_ledger_untouched() {
    let engine = engine().await;
    let before = engine.appointments().await;
    let err = engine
        .book(BookingRequest {
            practitioner_id: Some(1),
            patient_id: None,
            timeslot: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingFields(vec![Field::Patient, Field::Timeslot]));
    assert_eq!(engine.appointments().await, before);
}

#[tokio::test]
async fn unknown_patient_is_not_found() {
    let engine = engine().await;
    let err = engine
        .book(BookingRequest::new(1, 99, slot(101, 1, D, 10)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::not_found(EntityKind::Patient, 99));
}

#[tokio::test]
async fn unloaded_or_altered_timeslot_rejected() {
    let engine = engine().await;
    let err = engine
        .book(BookingRequest::new(1, 10, slot(555, 1, D, 11)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::not_found(EntityKind::Timeslot, 555));

    // Same id as a loaded slot, different start
    let err = engine
        .book(BookingRequest::new(1, 10, slot(101, 1, D, 11)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::TimeslotMismatch(101));
    assert_eq!(engine.appointments().await.len(), 1);
}

#[tokio::test]
async fn delete_frees_slot_without_reusing_id() {
    let engine = engine().await;
    let a = engine.book(BookingRequest::new(1, 10, slot(101, 1, D, 10))).await.unwrap();
    assert_eq!(a.id, 6);

    let removed = engine.delete_appointment(a.id).await.unwrap();
    assert_eq!(removed, a);
    assert!(engine.availability(Some(1)).await.iter().any(|t| t.id == 101));

    let again = engine.book(BookingRequest::new(1, 11, slot(101, 1, D, 10))).await.unwrap();
    assert_eq!(again.id, 7);
}

#[tokio::test]
async fn delete_absent_is_not_found() {
    let engine = engine().await;
    assert_eq!(
        engine.delete_appointment(77).await,
        Err(EngineError::not_found(EntityKind::Appointment, 77))
    );
    assert_eq!(engine.appointments().await.len(), 1);
}

// ── Events ───────────────────────────────────────────────

#[tokio::test]
async fn booking_and_removal_are_published() {
    let engine = engine().await;
    let mut all = engine.notify.subscribe_all();
    let mut p1 = engine.notify.subscribe(1);

    let a = engine.book(BookingRequest::new(1, 10, slot(101, 1, D, 10))).await.unwrap();
    engine.delete_appointment(a.id).await.unwrap();

    let booked = Event::AppointmentBooked { appointment: a.clone() };
    let removed = Event::AppointmentRemoved { id: a.id, practitioner_id: 1 };
    assert_eq!(all.recv().await.unwrap(), booked);
    assert_eq!(all.recv().await.unwrap(), removed);
    assert_eq!(p1.recv().await.unwrap(), booked);
    assert_eq!(p1.recv().await.unwrap(), removed);
}

#[tokio::test]
async fn failed_booking_publishes_nothing() {
    let engine = engine().await;
    let mut all = engine.notify.subscribe_all();
    let _ = engine.book(BookingRequest::new(1, 10, slot(100, 1, D, 9))).await;
    assert!(all.try_recv().is_err());
}

// ── Appointment list ─────────────────────────────────────

#[tokio::test]
async fn list_joins_names_and_formats_range() {
    let engine = engine().await;
    let rows = engine.list_appointments().await.unwrap();
    assert_eq!(
        rows,
        vec![AppointmentSummary {
            id: 5,
            practitioner: "Jane Doe".into(),
            patient: "John Smith".into(),
            when: "Mon 3 Jan 2022, 09:00 - 09:30".into(),
        }]
    );
}

#[tokio::test]
async fn list_with_dangling_patient_is_not_found() {
    let engine = engine().await;
    engine
        .upsert_appointments(vec![Appointment::for_timeslot(9, 404, &slot(102, 2, D, 9))])
        .await;
    assert_eq!(
        engine.list_appointments().await,
        Err(EngineError::not_found(EntityKind::Patient, 404))
    );
}

#[tokio::test]
async fn loaded_appointments_raise_id_floor() {
    let engine = engine().await;
    engine
        .upsert_appointments(vec![Appointment::for_timeslot(40, 11, &slot(102, 2, D, 9))])
        .await;
    let a = engine.book(BookingRequest::new(1, 10, slot(101, 1, D, 10))).await.unwrap();
    assert_eq!(a.id, 41);
}
