// Responder receiver.
//
// Two halves in two clock domains:
//
// - the shifter runs on the bus clock.  It samples MOSI on every rising
//   edge of the sampling clock while selected and raises `done` when a
//   full word is assembled.  `done` drops again on the next falling edge
//   or when chip select is released, whichever comes first.
//
// - the local half runs on the responder's own clock.  It only sees the
//   shifter through the synchronizer on `done`; the assembled word is
//   copied across on the synchronized rising edge, when it is stable.

use embedded_hal::spi::Mode;
use tracing::{debug, trace};

use crate::config::ResponderConfig;
use crate::error::Result;
use crate::signal::{idle_high, mask, sampling_clock, Wire, Word};
use crate::sync::Synchronizer;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Received {
    pub rx_dv: bool,
    pub rx_word: Word,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Shifter {
    clock: bool,  // sampling clock level seen on the previous bus tick
    index: usize, // bit position of the next sample
    shift: Word,
    word: Word,
    done: bool,
}

impl Shifter {
    fn idle(mode: Mode, width: usize) -> Shifter {
        Shifter {
            clock: sampling_clock(mode, idle_high(mode)),
            index: width - 1,
            shift: 0,
            word: 0,
            done: false,
        }
    }

    fn step(&self, mode: Mode, width: usize, wire: Wire) -> Shifter {
        let clock = sampling_clock(mode, wire.sclk);
        let mut n = *self;
        n.clock = clock;

        if wire.cs_n {
            n.index = width - 1;
            n.done = false;
            return n;
        }
        if clock && !self.clock {
            n.shift = ((self.shift << 1) | wire.mosi as Word) & mask(width);
            if self.index == 0 {
                n.word = n.shift;
                n.done = true;
                n.index = width - 1;
                trace!(word = n.word, "shifted in");
            }
            else {
                n.index = self.index - 1;
            }
        }
        else if !clock && self.clock {
            n.done = false;
        }
        n
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Receiver {
    pub config: ResponderConfig,
    bus: Shifter,
    sync: Synchronizer,
    rx_dv: bool,
    rx_word: Word,
}

impl Receiver {
    pub fn new(config: ResponderConfig) -> Result<Receiver> {
        config.validate()?;
        let sync = Synchronizer::new(config.sync_stages)?;
        Ok(Receiver {
            config,
            bus: Shifter::idle(config.mode, config.data_width),
            sync,
            rx_dv: false,
            rx_word: 0,
        })
    }

    fn reset(&self) -> Receiver {
        let c = &self.config;
        Receiver {
            config: *c,
            bus: Shifter::idle(c.mode, c.data_width),
            sync: self.sync.reset(),
            rx_dv: false,
            rx_word: 0,
        }
    }

    pub fn output(&self) -> Received {
        Received { rx_dv: self.rx_dv, rx_word: self.rx_word }
    }

    /// Word complete flag in the bus clock domain.
    pub fn done(&self) -> bool {
        self.bus.done
    }

    /// Local ticks from `done` rising to the `rx_dv` pulse.
    pub fn latency(&self) -> usize {
        self.sync.latency()
    }

    /// Bus clock domain: observe the lines for one sample.
    pub fn bus_step(&self, wire: Wire) -> Receiver {
        let c = &self.config;
        Receiver { bus: self.bus.step(c.mode, c.data_width, wire), ..*self }
    }

    /// Local clock domain: one tick of the responder's own clock.
    pub fn local_step(&self, rst_n: bool) -> (Receiver, Received) {
        if !rst_n {
            let next = self.reset();
            return (next, next.output());
        }
        let (sync, edge) = self.sync.step(self.bus.done);
        let mut n = Receiver { sync, rx_dv: edge, ..*self };
        if edge {
            n.rx_word = self.bus.word;
            debug!(word = n.rx_word, "responder received");
        }
        (n, n.output())
    }

    pub fn bus_tick(&mut self, wire: Wire) {
        *self = self.bus_step(wire);
    }

    pub fn local_tick(&mut self, rst_n: bool) -> Received {
        let (next, out) = self.local_step(rst_n);
        *self = next;
        out
    }
}
