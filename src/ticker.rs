use std::time::{Duration, Instant};

/// Interval clock of the generation loop. Deadlines are computed from
/// caller-provided instants, so schedules can be driven in tests
/// without real time.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    deadline: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Schedules the next fire one period after `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Replaces the period. A pending deadline is rescheduled from
    /// `now`, cancelling the old one, so the stale period never fires.
    pub fn set_period(&mut self, period: Duration, now: Instant) {
        self.period = period;
        if self.deadline.is_some() {
            self.deadline = Some(now + period);
        }
    }

    /// True at most once per elapsed deadline. Rearms from `now` rather
    /// than the missed deadline, so a stalled loop does not burst to
    /// catch up.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}
