use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Required booking fields left unset, in form order.
    MissingFields(Vec<Field>),
    /// Timeslot belongs to a different practitioner than the one booking it.
    PractitionerMismatch {
        practitioner_id: PractitionerId,
        timeslot_id: TimeslotId,
        owner_id: PractitionerId,
    },
    /// Timeslot in the request differs from the loaded timeslot with the same id.
    TimeslotMismatch(TimeslotId),
    InvalidSpan {
        start: Timestamp,
        end: Timestamp,
    },
    /// (practitioner, start) is already held by `existing`.
    Conflict {
        practitioner_id: PractitionerId,
        start: Timestamp,
        existing: AppointmentId,
    },
    NotFound {
        kind: EntityKind,
        id: EntityId,
    },
    LimitExceeded(&'static str),
}

impl EngineError {
    pub fn not_found(kind: EntityKind, id: EntityId) -> Self {
        EngineError::NotFound { kind, id }
    }

    /// The request itself was incomplete or inconsistent; nothing was checked against bookings.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::MissingFields(_)
                | EngineError::PractitionerMismatch { .. }
                | EngineError::TimeslotMismatch(_)
                | EngineError::InvalidSpan { .. }
        )
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MissingFields(fields) => {
                let names: Vec<String> = fields
                    .iter()
                    .map(|field| format!("field {field} is required"))
                    .collect();
                write!(f, "{}", names.join("; "))
            }
            EngineError::PractitionerMismatch {
                practitioner_id,
                timeslot_id,
                owner_id,
            } => write!(
                f,
                "timeslot {timeslot_id} belongs to practitioner {owner_id}, not {practitioner_id}"
            ),
            EngineError::TimeslotMismatch(id) => {
                write!(f, "timeslot {id} does not match the loaded timeslot")
            }
            EngineError::InvalidSpan { start, end } => {
                write!(f, "invalid span: start {start} is not before end {end}")
            }
            EngineError::Conflict {
                practitioner_id,
                start,
                existing,
            } => write!(
                f,
                "practitioner {practitioner_id} already booked at {start} (appointment {existing})"
            ),
            EngineError::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
