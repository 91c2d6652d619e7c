use serde::{Deserialize, Serialize};

use super::belief::Belief;

/// One committed reveal — an immutable snapshot taken at commit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub number: u32,
    pub row: usize,
    pub col: usize,
    pub belief: Belief,
    pub reasoning: String,
}

/// Append-only record of all committed turns in a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
    records: Vec<TurnRecord>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: TurnRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    /// Reveal coordinates in commit order, as (row, col) pairs.
    pub fn reveal_path(&self) -> Vec<(usize, usize)> {
        self.records.iter().map(|r| (r.row, r.col)).collect()
    }

    pub fn reasonings(&self) -> Vec<String> {
        self.records.iter().map(|r| r.reasoning.clone()).collect()
    }

    pub fn belief_path(&self) -> Vec<Vec<f64>> {
        self.records.iter().map(|r| r.belief.to_vec()).collect()
    }
}
