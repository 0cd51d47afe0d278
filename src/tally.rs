//! Win history across runs
//!
//! Counts how often each kind took the arena, and keeps the most recent
//! results for display.

use serde::{Deserialize, Serialize};

use crate::sim::Kind;

/// Maximum number of recent results to keep
pub const MAX_RECENT: usize = 10;

/// One completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub run: u64,
    pub winner: Kind,
    /// Ticks the run took to converge
    pub ticks: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinTally {
    rock: u64,
    paper: u64,
    scissors: u64,
    /// Newest first
    recent: Vec<RunResult>,
}

impl WinTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: RunResult) {
        *self.slot(result.winner) += 1;
        self.recent.insert(0, result);
        self.recent.truncate(MAX_RECENT);
    }

    pub fn wins(&self, kind: Kind) -> u64 {
        match kind {
            Kind::Rock => self.rock,
            Kind::Paper => self.paper,
            Kind::Scissors => self.scissors,
        }
    }

    pub fn total_runs(&self) -> u64 {
        self.rock + self.paper + self.scissors
    }

    pub fn is_empty(&self) -> bool {
        self.total_runs() == 0
    }

    pub fn recent(&self) -> &[RunResult] {
        &self.recent
    }

    /// Kinds ranked by wins, most first. Ties keep the cycle order.
    pub fn leaderboard(&self) -> Vec<(Kind, u64)> {
        let mut board: Vec<(Kind, u64)> = Kind::ALL.iter().map(|&k| (k, self.wins(k))).collect();
        board.sort_by(|a, b| b.1.cmp(&a.1));
        board
    }

    /// Mean ticks to convergence over the recent results
    pub fn mean_recent_ticks(&self) -> Option<f64> {
        if self.recent.is_empty() {
            return None;
        }
        let sum: u64 = self.recent.iter().map(|r| r.ticks).sum();
        Some(sum as f64 / self.recent.len() as f64)
    }

    fn slot(&mut self, kind: Kind) -> &mut u64 {
        match kind {
            Kind::Rock => &mut self.rock,
            Kind::Paper => &mut self.paper,
            Kind::Scissors => &mut self.scissors,
        }
    }
}
