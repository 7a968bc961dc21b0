//! Availability and booking core for practitioner appointments.
//!
//! Callers load practitioners, patients, timeslots and existing appointments
//! into an [`engine::Engine`], read open slots bucketed by calendar day through
//! [`window::DateWindow`], and book or delete appointments. The pure pieces
//! ([`engine::resolve`], [`engine::book`], [`window::window`],
//! [`window::advance`]) work on plain collections without an engine.

pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod window;
