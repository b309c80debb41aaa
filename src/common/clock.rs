// src/common/clock.rs

use chrono::{Local, NaiveDateTime, Timelike};

/// Fonte do "agora" usado para carimbar data/hora dos recibos.
pub trait Clock: Send + Sync {
    /// Data e hora locais do negócio, sem fração de segundo.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

#[cfg(test)]
pub use fixed::FixedClock;
