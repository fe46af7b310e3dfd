use core::time::Duration;

/// A point in time, with millisecond resolution, measured from an
/// arbitrary epoch chosen by the [`Clock`] that produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    millis: u64,
}

impl Instant {
    pub const fn from_millis(millis: u64) -> Self {
        Instant { millis }
    }

    pub const fn millis(self) -> u64 {
        self.millis
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is actually
    /// later than `self`.
    pub const fn saturating_duration_since(self, earlier: Instant) -> Duration {
        Duration::from_millis(self.millis.saturating_sub(earlier.millis))
    }

    pub fn checked_add(self, duration: Duration) -> Option<Instant> {
        let millis = u64::try_from(duration.as_millis()).ok()?;
        self.millis.checked_add(millis).map(Instant::from_millis)
    }

    /// Whether at least `duration` has passed between `earlier` and `self`.
    pub const fn has_elapsed(self, earlier: Instant, duration: Duration) -> bool {
        self.saturating_duration_since(earlier).as_millis() >= duration.as_millis()
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::time::Duration;

    use super::Instant;

    #[test]
    fn test_duration_since_saturates() {
        let a = Instant::from_millis(100);
        let b = Instant::from_millis(250);
        assert_eq!(b.saturating_duration_since(a), Duration::from_millis(150));
        assert_eq!(a.saturating_duration_since(b), Duration::ZERO);
    }

    #[test]
    fn test_has_elapsed_is_inclusive() {
        let start = Instant::from_millis(1000);
        assert!(!Instant::from_millis(1199).has_elapsed(start, Duration::from_millis(200)));
        assert!(Instant::from_millis(1200).has_elapsed(start, Duration::from_millis(200)));
    }

    #[test]
    fn test_checked_add() {
        let start = Instant::from_millis(5);
        assert_eq!(start.checked_add(Duration::from_millis(10)), Some(Instant::from_millis(15)));
        assert_eq!(Instant::from_millis(u64::MAX).checked_add(Duration::from_millis(1)), None);
    }
}
