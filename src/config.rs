// Deployment parameters.  These are fixed for the lifetime of a component
// and checked once, when the component is built.

use embedded_hal::spi::{Mode, MODE_0};

use crate::error::{Error, Result};
use crate::signal::MAX_WIDTH;
use crate::sync::MAX_STAGES;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    pub mode: Mode,
    pub half_bit_period: usize, // reference ticks per half bus clock
    pub data_width: usize,
    pub max_words: usize,       // words per chip select
    pub idle_period: usize,     // ticks deselected between transactions
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            mode: MODE_0,
            half_bit_period: 2,
            data_width: 8,
            max_words: 1,
            idle_period: 1,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.half_bit_period < 2 {
            return Err(Error::HalfBitPeriod(self.half_bit_period));
        }
        check_width(self.data_width)?;
        if self.max_words < 1 {
            return Err(Error::MaxWords);
        }
        if self.idle_period < 1 {
            return Err(Error::IdlePeriod);
        }
        Ok(())
    }

    /// Reference ticks needed to clock one word.
    pub fn word_ticks(&self) -> usize {
        2 * self.data_width * self.half_bit_period
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResponderConfig {
    pub mode: Mode,
    pub data_width: usize,
    pub significant_width: usize, // low bits of the reply that carry data
    pub sync_stages: usize,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        ResponderConfig {
            mode: MODE_0,
            data_width: 8,
            significant_width: 8,
            sync_stages: 2,
        }
    }
}

impl ResponderConfig {
    pub fn validate(&self) -> Result<()> {
        check_width(self.data_width)?;
        if self.significant_width > self.data_width {
            return Err(Error::SignificantWidth {
                significant: self.significant_width,
                data: self.data_width,
            });
        }
        if self.sync_stages < 2 || self.sync_stages > MAX_STAGES {
            return Err(Error::SyncStages(self.sync_stages));
        }
        Ok(())
    }
}

pub(crate) fn check_width(width: usize) -> Result<()> {
    if width < 1 || width > MAX_WIDTH {
        return Err(Error::DataWidth(width));
    }
    Ok(())
}

/// Number of words in one transaction, known to be in 1..=max_words of the
/// controller that issued it.  Build with `Controller::word_count`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WordCount(usize);

impl WordCount {
    pub fn new(count: usize, config: &ControllerConfig) -> Result<WordCount> {
        if count < 1 || count > config.max_words {
            return Err(Error::WordCount { count, max: config.max_words });
        }
        Ok(WordCount(count))
    }
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for WordCount {
    fn default() -> Self {
        WordCount(1)
    }
}
