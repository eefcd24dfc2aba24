//! Injectable wall clock.
//!
//! Report rendering stamps the current time twice (closing sentence and
//! location line); every other component takes timestamps from callers. Tests
//! pin the clock with [`FixedClock`].

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}

impl<C: Clock + ?Sized> Clock for &C {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
}
