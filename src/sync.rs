// Clock domain crossing for a level signal.
//
// The level is generated in one clock domain and latched through a chain
// of flip-flops clocked by the observing domain.  The observing side only
// acts on a rising transition between the last two stages, so a level that
// stays high produces a single pulse, `stages` ticks after the first latch
// saw it.

use crate::error::{Error, Result};

pub const MAX_STAGES: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Synchronizer {
    stages: [bool; MAX_STAGES],
    len: usize,
    pulse: bool,
}

impl Synchronizer {
    pub fn new(len: usize) -> Result<Synchronizer> {
        if len < 2 || len > MAX_STAGES {
            return Err(Error::SyncStages(len));
        }
        Ok(Synchronizer { stages: [false; MAX_STAGES], len, pulse: false })
    }

    pub fn reset(&self) -> Synchronizer {
        Synchronizer { stages: [false; MAX_STAGES], len: self.len, pulse: false }
    }

    /// Ticks from the first latch seeing a rising level to the pulse.
    pub fn latency(&self) -> usize {
        self.len
    }

    /// Most recent registered pulse.
    pub fn pulse(&self) -> bool {
        self.pulse
    }

    pub fn step(&self, level: bool) -> (Synchronizer, bool) {
        let s = &self.stages;
        let mut n = *self;
        n.stages[0] = level;
        for k in 1..self.len {
            n.stages[k] = s[k - 1];
        }
        n.pulse = s[self.len - 2] && !s[self.len - 1];
        (n, n.pulse)
    }
}

impl_Tick!(Synchronizer, bool, bool);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tick;

    #[test]
    fn one_pulse_per_rising_level() {
        for len in 2..=MAX_STAGES {
            let mut s = Synchronizer::new(len).unwrap();
            let pulses: Vec<usize> = (0..20)
                .map(|t| s.tick(t >= 3))
                .enumerate()
                .filter(|&(_, p)| p)
                .map(|(t, _)| t)
                .collect();
            // Latched on tick 3, pulse `len` ticks later counting that one.
            assert_eq!(pulses, vec![3 + len - 1], "{} stages", len);
        }
    }

    #[test]
    fn short_level_is_still_seen() {
        let mut s = Synchronizer::new(2).unwrap();
        let pulses = [false, true, false, false, false]
            .iter()
            .filter(|&&level| s.tick(level))
            .count();
        assert_eq!(pulses, 1);
    }

    #[test]
    fn bad_depth() {
        assert_eq!(Synchronizer::new(1), Err(Error::SyncStages(1)));
        assert_eq!(Synchronizer::new(MAX_STAGES + 1), Err(Error::SyncStages(MAX_STAGES + 1)));
    }
}
