// Bus signals and SPI mode helpers.

use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};

use crate::error::{Error, Result};
use crate::Bus;

/// Data word, MSB first on the wire.  Only the low `data_width` bits are used.
pub type Word = u64;

/// Widest word a deployment can be configured for.
pub const MAX_WIDTH: usize = 64;

#[inline(always)]
pub fn mask(width: usize) -> Word {
    if width >= MAX_WIDTH { !0 } else { (1 << width) - 1 }
}

#[inline(always)]
pub fn bit(word: Word, index: usize) -> bool {
    index < MAX_WIDTH && (word >> index) & 1 == 1
}

/* SPI clock configurations can be confusing as there are many ways to
express the same information.  Mode numbers map to the embedded-hal
Mode pairs:

  mode  polarity  phase
  0     IdleLow   CaptureOnFirstTransition
  1     IdleLow   CaptureOnSecondTransition
  2     IdleHigh  CaptureOnFirstTransition
  3     IdleHigh  CaptureOnSecondTransition

https://en.wikipedia.org/wiki/Serial_Peripheral_Interface_Bus#Mode_numbers
*/
pub fn mode_from_number(n: u8) -> Result<Mode> {
    match n {
        0 => Ok(MODE_0),
        1 => Ok(MODE_1),
        2 => Ok(MODE_2),
        3 => Ok(MODE_3),
        _ => Err(Error::Mode(n)),
    }
}

pub fn mode_number(mode: Mode) -> u8 {
    (idle_high(mode) as u8) << 1 | late_capture(mode) as u8
}

/// CPOL: clock rests high between transfers.
#[inline(always)]
pub fn idle_high(mode: Mode) -> bool {
    mode.polarity == Polarity::IdleHigh
}

/// CPHA: the first clock edge drives, the second one samples.
#[inline(always)]
pub fn late_capture(mode: Mode) -> bool {
    mode.phase == Phase::CaptureOnSecondTransition
}

/// Sampling clock as seen by a receiver: the bus clock normalized to rest
/// low, inverted when CPHA=1.  Data is sampled on its rising edges and
/// changes on its falling edges, for all four modes.
#[inline(always)]
pub fn sampling_clock(mode: Mode, sclk: bool) -> bool {
    sclk ^ idle_high(mode) ^ late_capture(mode)
}

/// Output of a line driver that can let go of the line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Driven(bool),
    Undriven,
}

impl Line {
    /// Level observed by a receiver.  Nothing models pulls, so a floating
    /// line reads as `default`.
    #[inline(always)]
    pub fn level_or(self, default: bool) -> bool {
        match self {
            Line::Driven(level) => level,
            Line::Undriven => default,
        }
    }
    pub fn is_driven(self) -> bool {
        matches!(self, Line::Driven(_))
    }
}

// Channel numbers of a Wire sample when read through Bus.
pub const SCLK: usize = 0;
pub const MOSI: usize = 1;
pub const MISO: usize = 2;
pub const CS_N: usize = 3;

/// Levels on the four bus lines during one tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Wire {
    pub sclk: bool,
    pub mosi: bool,
    pub miso: Line,
    pub cs_n: bool,
}

impl Wire {
    /// Deselected bus with the clock at its rest level.
    pub fn idle(mode: Mode) -> Wire {
        Wire {
            sclk: idle_high(mode),
            mosi: false,
            miso: Line::Undriven,
            cs_n: true,
        }
    }
    #[inline(always)]
    pub fn selected(&self) -> bool {
        !self.cs_n
    }
}

impl Bus for Wire {
    #[inline(always)]
    fn channel(&self, c: usize) -> usize {
        self.as_usize().channel(c)
    }
    fn as_usize(&self) -> usize {
        (self.sclk as usize) << SCLK
            | (self.mosi as usize) << MOSI
            | (self.miso.level_or(false) as usize) << MISO
            | (self.cs_n as usize) << CS_N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_numbers() {
        for n in 0..4 {
            assert_eq!(mode_number(mode_from_number(n).unwrap()), n);
        }
        assert_eq!(mode_from_number(4), Err(Error::Mode(4)));
    }

    #[test]
    fn sampling_clock_rises_on_capture_edge() {
        // (mode, rest level, level after first edge, level after second edge)
        for n in 0..4 {
            let mode = mode_from_number(n).unwrap();
            let rest = idle_high(mode);
            let first = sampling_clock(mode, !rest) && !sampling_clock(mode, rest);
            let second = sampling_clock(mode, rest) && !sampling_clock(mode, !rest);
            assert_eq!(first, !late_capture(mode), "mode {}", n);
            assert_eq!(second, late_capture(mode), "mode {}", n);
        }
    }

    #[test]
    fn masks() {
        assert_eq!(mask(1), 1);
        assert_eq!(mask(15), 0x7fff);
        assert_eq!(mask(64), !0);
        assert!(bit(0x4000, 14));
        assert!(!bit(!0, 64));
    }

    #[test]
    fn wire_channels() {
        let w = Wire { sclk: true, mosi: false, miso: Line::Driven(true), cs_n: false };
        assert_eq!(w.channel(SCLK), 1);
        assert_eq!(w.channel(MOSI), 0);
        assert_eq!(w.channel(MISO), 1);
        assert_eq!(w.channel(CS_N), 0);
        let idle = Wire::idle(MODE_2);
        assert_eq!(idle.channel(SCLK), 1);
        assert_eq!(idle.channel(MISO), 0);
        assert!(!idle.selected());
        assert_eq!(w.channel(64), 0);
        assert_eq!(w.channel(1000), 0);
    }
}
