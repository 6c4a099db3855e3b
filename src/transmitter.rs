// Responder transmitter.
//
// The reply word is written in the local clock domain and held until the
// next write, across any number of transactions.  Only the low
// `significant_width` bits are kept; on the wire the word is
// `data_width` bits, MSB first, with the upper bits driven as zero.
//
// The driver runs on the bus clock.  It puts the MSB on MISO as soon as
// chip select is asserted and moves to the next bit on a falling edge of
// the sampling clock, once the current bit has been sampled.  With CPHA=1
// the first clock edge is such a falling edge; it arrives before anything
// was sampled and leaves the MSB in place.  While deselected MISO is left
// undriven.
//
// The held word is copied into the driver's own shadow register when chip
// select is asserted, and every bit of the transaction is taken from that
// copy.  The copy on select is the one read across domains without a
// synchronizer: the held word must be stable while chip select goes low.
// Writes during a transaction take effect on the next one.

use embedded_hal::spi::Mode;
use tracing::{debug, trace};

use crate::config::ResponderConfig;
use crate::error::Result;
use crate::signal::{bit, idle_high, mask, sampling_clock, Line, Wire, Word};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransmitInput {
    pub rst_n: bool,
    pub tx_dv: bool,
    pub tx_word: Word,
}

impl Default for TransmitInput {
    fn default() -> Self {
        TransmitInput { rst_n: true, tx_dv: false, tx_word: 0 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Driver {
    clock: bool,
    selected: bool,
    index: usize,    // bit position on the line
    consumed: bool,  // current bit has been sampled
    word: Word,      // copy of the held word, taken on select
    miso: Line,
}

impl Driver {
    fn idle(mode: Mode, width: usize) -> Driver {
        Driver {
            clock: sampling_clock(mode, idle_high(mode)),
            selected: false,
            index: width - 1,
            consumed: false,
            word: 0,
            miso: Line::Undriven,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transmitter {
    pub config: ResponderConfig,
    held: Word,
    bus: Driver,
}

impl Transmitter {
    pub fn new(config: ResponderConfig) -> Result<Transmitter> {
        config.validate()?;
        Ok(Transmitter {
            config,
            held: 0,
            bus: Driver::idle(config.mode, config.data_width),
        })
    }

    /// Reply word currently held, significant bits only.
    pub fn held(&self) -> Word {
        self.held
    }

    pub fn miso(&self) -> Line {
        self.bus.miso
    }

    // Wire level for a bit position: zero above the significant bits.
    fn level(&self, word: Word, index: usize) -> bool {
        index < self.config.significant_width && bit(word, index)
    }

    /// Local clock domain.
    pub fn local_step(&self, i: TransmitInput) -> Transmitter {
        let c = &self.config;
        if !i.rst_n {
            return Transmitter {
                config: *c,
                held: 0,
                bus: Driver::idle(c.mode, c.data_width),
            };
        }
        let mut n = *self;
        if i.tx_dv {
            n.held = i.tx_word & mask(c.significant_width);
            debug!(word = n.held, "reply loaded");
        }
        n
    }

    /// Bus clock domain: observe the lines for one sample, return MISO.
    pub fn bus_step(&self, wire: Wire) -> (Transmitter, Line) {
        let c = &self.config;
        let s = &self.bus;
        let clock = sampling_clock(c.mode, wire.sclk);
        let mut d = *s;
        d.clock = clock;
        d.selected = wire.selected();

        if !wire.selected() {
            d.index = c.data_width - 1;
            d.consumed = false;
            d.miso = Line::Undriven;
        }
        else if !s.selected {
            // Preload the MSB.
            d.index = c.data_width - 1;
            d.consumed = false;
            d.word = self.held;
            d.miso = Line::Driven(self.level(d.word, d.index));
        }
        else if clock && !s.clock {
            d.consumed = true;
        }
        else if !clock && s.clock && s.consumed {
            d.index = if s.index == 0 { c.data_width - 1 } else { s.index - 1 };
            d.consumed = false;
            d.miso = Line::Driven(self.level(s.word, d.index));
            trace!(index = d.index, "drive");
        }

        let next = Transmitter { bus: d, ..*self };
        (next, d.miso)
    }

    pub fn local_tick(&mut self, i: TransmitInput) {
        *self = self.local_step(i);
    }

    pub fn bus_tick(&mut self, wire: Wire) -> Line {
        let (next, miso) = self.bus_step(wire);
        *self = next;
        miso
    }
}
