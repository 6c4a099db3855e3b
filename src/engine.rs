// Bit engine: clocks one word out of MOSI and into MISO.
//
// The engine generates the bus clock from the reference clock.  A tick
// counter runs through one bus clock period (2 x half_bit_period ticks);
// the clock flips at the half way point (leading edge) and at the end
// (trailing edge).  Every word takes exactly 2 x data_width edges.
//
// Which edge drives and which samples depends on CPHA:
//
//   CPHA  drive                             sample
//   0     MSB on data valid, then trailing  leading
//   1     leading                           trailing
//
// Edge flags are registered, so the visible clock output is delayed by
// one tick to line up with the data that is driven and sampled on them.
// The tick after the last edge takes the last CPHA=1 sample and pulses
// rx_dv with the assembled word; ready follows one tick later.

use tracing::debug;

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::signal::{bit, idle_high, late_capture, mask, Word};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineInput {
    pub rst_n: bool,
    pub tx_dv: bool,
    pub tx_word: Word,
    pub miso: bool,
}

impl Default for EngineInput {
    fn default() -> Self {
        EngineInput { rst_n: true, tx_dv: false, tx_word: 0, miso: false }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineOutput {
    pub sclk: bool,
    pub mosi: bool,
    pub ready: bool,
    pub rx_dv: bool,
    pub rx_word: Word,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Engine {
    pub config: ControllerConfig,
    state: State,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct State {
    ready: bool,
    edges: usize,     // clock edges left in the current word
    clk_count: usize, // ticks into the current bus clock period
    clk: bool,        // internal clock, one tick ahead of sclk
    leading: bool,
    trailing: bool,
    sclk: bool,
    tx_dv: bool,      // data valid, delayed one tick
    tx_word: Word,
    tx_left: usize,   // bits still to drive
    mosi: bool,
    rx_left: usize,   // bits still to sample
    rx_word: Word,
    rx_dv: bool,
    finish: bool,     // last edge done, rx_dv due
}

impl State {
    fn reset(c: &ControllerConfig) -> State {
        let rest = idle_high(c.mode);
        State {
            ready: false,
            edges: 0,
            clk_count: 0,
            clk: rest,
            leading: false,
            trailing: false,
            sclk: rest,
            tx_dv: false,
            tx_word: 0,
            tx_left: c.data_width,
            mosi: false,
            rx_left: c.data_width,
            rx_word: 0,
            rx_dv: false,
            finish: false,
        }
    }
}

impl Engine {
    pub fn new(config: ControllerConfig) -> Result<Engine> {
        config.validate()?;
        Ok(Engine { config, state: State::reset(&config) })
    }

    /// Registered outputs, as currently driven.
    pub fn output(&self) -> EngineOutput {
        let s = &self.state;
        EngineOutput {
            sclk: s.sclk,
            mosi: s.mosi,
            ready: s.ready,
            rx_dv: s.rx_dv,
            rx_word: s.rx_word,
        }
    }

    #[inline(always)]
    pub fn ready(&self) -> bool {
        self.state.ready
    }

    #[inline(always)]
    pub fn rx_dv(&self) -> bool {
        self.state.rx_dv
    }

    /// Clock edges left in the word in flight.
    pub fn edges_left(&self) -> usize {
        self.state.edges
    }

    pub fn step(&self, i: EngineInput) -> (Engine, EngineOutput) {
        let c = &self.config;
        let s = &self.state;

        if !i.rst_n {
            let next = Engine { config: *c, state: State::reset(c) };
            return (next, next.output());
        }

        let width = c.data_width;
        let half = c.half_bit_period;
        let cpha = late_capture(c.mode);
        let mut n = *s;

        let start = i.tx_dv && s.ready;
        if i.tx_dv && !s.ready {
            debug!(edges = s.edges, "engine busy, data valid ignored");
        }

        // Clock generation.
        n.leading = false;
        n.trailing = false;
        if start {
            n.ready = false;
            n.edges = 2 * width;
        }
        else if s.edges > 0 {
            n.ready = false;
            if s.clk_count == 2 * half - 1 {
                n.edges = s.edges - 1;
                n.trailing = true;
                n.clk_count = 0;
                n.clk = !s.clk;
            }
            else if s.clk_count == half - 1 {
                n.edges = s.edges - 1;
                n.leading = true;
                n.clk_count = s.clk_count + 1;
                n.clk = !s.clk;
            }
            else {
                n.clk_count = s.clk_count + 1;
            }
        }
        else if !s.finish {
            n.ready = true;
        }
        n.finish = s.edges > 0 && n.edges == 0;

        // Word register.  Data valid is delayed so the first CPHA=0 bit
        // goes out one tick after it, ahead of the first clock edge.
        n.tx_dv = start;
        if start {
            n.tx_word = i.tx_word & mask(width);
        }

        // MOSI
        if s.ready {
            n.tx_left = width;
        }
        else if s.tx_dv && !cpha {
            n.mosi = bit(s.tx_word, width - 1);
            n.tx_left = width - 1;
        }
        else if (s.leading && cpha) || (s.trailing && !cpha) {
            if s.tx_left > 0 {
                n.tx_left = s.tx_left - 1;
                n.mosi = bit(s.tx_word, n.tx_left);
            }
        }

        // MISO
        n.rx_dv = s.finish;
        if s.ready {
            n.rx_left = width;
        }
        else if (s.leading && !cpha) || (s.trailing && cpha) {
            if s.rx_left > 0 {
                let index = s.rx_left - 1;
                n.rx_word = (s.rx_word & !(1 << index)) | ((i.miso as Word) << index);
                n.rx_left = index;
            }
        }

        n.sclk = s.clk;

        let next = Engine { config: *c, state: n };
        (next, next.output())
    }
}

impl_Tick!(Engine, EngineInput, EngineOutput);
