//! Minute bar representation.

use chrono::NaiveDateTime;

/// One timestamped closing-price observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: NaiveDateTime, close: f64) -> Self {
        Self { timestamp, close }
    }
}
