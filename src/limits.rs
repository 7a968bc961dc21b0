/// Appointments held by one engine.
pub const MAX_APPOINTMENTS: usize = 100_000;

/// Days shown side by side in one window.
pub const MAX_WINDOW_DAYS: u32 = 31;

/// Placeholder cells per day bucket.
pub const MAX_SLOT_PADDING: usize = 24;

/// Largest accepted UTC offset, in minutes (±18h, the chrono bound).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;
