use crate::ports::clock::Clock as ClockTrait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};

/// 壁時計によるClock実装
///
/// システム時刻が巻き戻った場合でも、直前に返した時刻より
/// 前の値は返さない。
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClockTrait for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let wall = Utc::now();
        let now = match *last {
            Some(previous) if previous > wall => previous,
            _ => wall,
        };
        *last = Some(now);
        now
    }
}
