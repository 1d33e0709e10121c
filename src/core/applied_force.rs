use crate::config::MAX_JOINT_AXES;
use crate::error::{JointError, Result};
use log::warn;

/// Last externally-applied generalized force per axis, plus the simulation
/// time at which it was applied.
///
/// Applications are last-write-wins with no accumulation. The stored timestamp
/// never moves backwards; supplying an older-or-equal timestamp still
/// overwrites the value (the call itself is the intent) but is reported via a
/// warning rather than silently accepted. The tracker never clears itself;
/// staleness policy belongs to the caller, which can invoke
/// [`AppliedForceTracker::clear_if_older_than`] with its own maximum age.
#[derive(Debug, Clone)]
pub struct AppliedForceTracker {
    dofs: usize,
    forces: [f64; MAX_JOINT_AXES],
    timestamp: f64,
}

impl AppliedForceTracker {
    pub fn new(dofs: usize) -> Self {
        debug_assert!(dofs <= MAX_JOINT_AXES);
        Self {
            dofs,
            forces: [0.0; MAX_JOINT_AXES],
            timestamp: 0.0,
        }
    }

    pub fn dofs(&self) -> usize {
        self.dofs
    }

    /// Overwrites the force on `axis` unconditionally.
    pub fn apply(&mut self, axis: usize, value: f64, timestamp: f64) -> Result<()> {
        if axis >= self.dofs {
            return Err(JointError::InvalidAxis {
                axis,
                dofs: self.dofs,
            });
        }
        if timestamp <= self.timestamp && self.timestamp > 0.0 {
            warn!(
                "force application at t={timestamp} does not advance the last application at t={}",
                self.timestamp
            );
        }
        self.forces[axis] = value;
        self.timestamp = self.timestamp.max(timestamp);
        Ok(())
    }

    pub fn force(&self, axis: usize) -> Result<f64> {
        if axis >= self.dofs {
            return Err(JointError::InvalidAxis {
                axis,
                dofs: self.dofs,
            });
        }
        Ok(self.forces[axis])
    }

    /// Time of the most recent application.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Zeroes all stored forces once their age exceeds `max_age`. Returns
    /// whether a clear happened.
    pub fn clear_if_older_than(&mut self, now: f64, max_age: f64) -> bool {
        if now - self.timestamp > max_age {
            self.forces = [0.0; MAX_JOINT_AXES];
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut tracker = AppliedForceTracker::new(2);
        tracker.apply(0, 5.0, 10.0).unwrap();
        tracker.apply(0, -3.0, 11.0).unwrap();

        assert_eq!(tracker.force(0).unwrap(), -3.0);
        assert_eq!(tracker.timestamp(), 11.0);
        // Untouched axis stays at zero.
        assert_eq!(tracker.force(1).unwrap(), 0.0);
    }

    #[test]
    fn timestamp_is_monotonic() {
        let mut tracker = AppliedForceTracker::new(1);
        tracker.apply(0, 1.0, 10.0).unwrap();
        tracker.apply(0, 2.0, 4.0).unwrap();

        // Value overwritten, timestamp held.
        assert_eq!(tracker.force(0).unwrap(), 2.0);
        assert_eq!(tracker.timestamp(), 10.0);
    }

    #[test]
    fn out_of_range_axis_is_rejected() {
        let mut tracker = AppliedForceTracker::new(2);
        assert_eq!(
            tracker.apply(2, 1.0, 0.0).unwrap_err(),
            JointError::InvalidAxis { axis: 2, dofs: 2 }
        );
        assert_eq!(
            tracker.force(5).unwrap_err(),
            JointError::InvalidAxis { axis: 5, dofs: 2 }
        );
    }

    #[test]
    fn stale_forces_clear_only_past_max_age() {
        let mut tracker = AppliedForceTracker::new(1);
        tracker.apply(0, 7.5, 2.0).unwrap();

        assert!(!tracker.clear_if_older_than(2.5, 1.0));
        assert_eq!(tracker.force(0).unwrap(), 7.5);

        assert!(tracker.clear_if_older_than(3.5, 1.0));
        assert_eq!(tracker.force(0).unwrap(), 0.0);
    }
}
