//! Restart scheduling after convergence
//!
//! Restarts are counted in authority ticks. A scheduled restart is never
//! cancelled: if the run was replaced in the meantime (a reset), the restart
//! still fires and reseeds whatever run is live at that point.

use std::collections::VecDeque;

/// Pending reseeds, each due at an absolute authority tick
#[derive(Debug, Clone)]
pub struct RestartScheduler {
    delay_ticks: u64,
    pending: VecDeque<u64>,
}

impl RestartScheduler {
    pub fn new(delay_ticks: u64) -> Self {
        Self {
            delay_ticks: delay_ticks.max(1),
            pending: VecDeque::new(),
        }
    }

    pub fn delay_ticks(&self) -> u64 {
        self.delay_ticks
    }

    /// Schedule a reseed `delay_ticks` after `now`; returns the due tick
    pub fn schedule(&mut self, now: u64) -> u64 {
        let due = now.saturating_add(self.delay_ticks);
        // Delay is constant, so pushing keeps the queue sorted
        self.pending.push_back(due);
        due
    }

    /// Pop every restart due at or before `now`, returning how many fired
    pub fn take_due(&mut self, now: u64) -> usize {
        let mut fired = 0;
        while self.pending.front().is_some_and(|&due| due <= now) {
            self.pending.pop_front();
            fired += 1;
        }
        fired
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut scheduler = RestartScheduler::new(50);
        assert_eq!(scheduler.schedule(10), 60);
        assert_eq!(scheduler.take_due(59), 0);
        assert_eq!(scheduler.take_due(60), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_overlapping_restarts_all_fire() {
        let mut scheduler = RestartScheduler::new(5);
        scheduler.schedule(0);
        scheduler.schedule(2);
        assert_eq!(scheduler.take_due(5), 1);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.take_due(100), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_huge_delay_saturates() {
        let mut scheduler = RestartScheduler::new(u64::MAX);
        assert_eq!(scheduler.schedule(7), u64::MAX);
        assert_eq!(scheduler.take_due(1_000_000), 0);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_zero_delay_is_one_tick() {
        let mut scheduler = RestartScheduler::new(0);
        assert_eq!(scheduler.delay_ticks(), 1);
        assert_eq!(scheduler.schedule(3), 4);
    }
}
