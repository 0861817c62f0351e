//! Ring buffer of register snapshots for post-mortem diagnostics.

use std::collections::VecDeque;

use crate::registers::Registers;

/// The most recent register states, oldest first.
#[derive(Debug, Clone, Default)]
pub struct PcHistory {
    entries: VecDeque<Registers>,
    capacity: usize,
}

impl PcHistory {
    /// A history keeping at most `capacity` snapshots. Zero disables it.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, regs: &Registers) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(*regs);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registers> {
        self.entries.iter()
    }

    /// Program counters of the recorded snapshots, oldest first.
    #[must_use]
    pub fn pcs(&self) -> Vec<u16> {
        self.entries.iter().map(|r| r.pc).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_when_full() {
        let mut history = PcHistory::new(2);
        for pc in [0x100, 0x101, 0x102] {
            history.record(&Registers { pc, ..Registers::default() });
        }
        assert_eq!(history.pcs(), vec![0x101, 0x102]);
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut history = PcHistory::new(0);
        history.record(&Registers::default());
        assert_eq!(history.iter().count(), 0);
    }
}
