use chrono::{FixedOffset, Offset, Utc};

use crate::limits::*;
use crate::window::{DEFAULT_SLOT_PADDING, DEFAULT_WINDOW_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Consecutive days in one availability window.
    pub window_days: u32,
    /// Cells per day bucket, filled with empty markers when short.
    pub slot_padding: usize,
    /// Offset whose midnight starts each calendar day.
    pub utc_offset_minutes: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            slot_padding: DEFAULT_SLOT_PADDING,
            utc_offset_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
    OutOfRange { key: &'static str, value: i64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => write!(f, "{key}: cannot parse {value:?}"),
            ConfigError::OutOfRange { key, value } => write!(f, "{key}: {value} out of range"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl EngineConfig {
    /// Defaults overridden by `SLOTBOOK_WINDOW_DAYS`, `SLOTBOOK_SLOT_PADDING`
    /// and `SLOTBOOK_UTC_OFFSET_MINUTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = parse(&lookup, "SLOTBOOK_WINDOW_DAYS")? {
            config.window_days = v;
        }
        if let Some(v) = parse(&lookup, "SLOTBOOK_SLOT_PADDING")? {
            config.slot_padding = v;
        }
        if let Some(v) = parse(&lookup, "SLOTBOOK_UTC_OFFSET_MINUTES")? {
            config.utc_offset_minutes = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 || self.window_days > MAX_WINDOW_DAYS {
            return Err(ConfigError::OutOfRange {
                key: "SLOTBOOK_WINDOW_DAYS",
                value: i64::from(self.window_days),
            });
        }
        if self.slot_padding > MAX_SLOT_PADDING {
            return Err(ConfigError::OutOfRange {
                key: "SLOTBOOK_SLOT_PADDING",
                value: self.slot_padding as i64,
            });
        }
        if self.utc_offset_minutes.unsigned_abs() > MAX_UTC_OFFSET_MINUTES.unsigned_abs() {
            return Err(ConfigError::OutOfRange {
                key: "SLOTBOOK_UTC_OFFSET_MINUTES",
                value: i64::from(self.utc_offset_minutes),
            });
        }
        Ok(())
    }

    /// Falls back to UTC for an offset `validate` would reject.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
