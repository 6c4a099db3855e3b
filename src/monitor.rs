// Passive bus decoder.
//
// (A) Only MSBit first is supported, same as the controller and the
//     responder.
//
// (B) A word is emitted as soon as data_width bits are in; a frame
//     (chip select) start throws away any partial word.

use embedded_hal::spi::{Mode, MODE_0};

use crate::config::check_width;
use crate::error::Result;
use crate::signal::{self, idle_high, mask, sampling_clock, Word};
use crate::{Bus, Tick};

/* The monitor watches one data line.  Sampling follows the mode: the
clock is normalized to rest low and inverted for CPHA=1, data is taken on
the rising edges of the result.  See signal::sampling_clock. */

#[derive(Copy,Clone,Debug,PartialEq,Eq)]
pub struct Config {
    pub mode:           Mode,
    pub nb_bits:        usize,
    pub clock_channel:  usize,
    pub data_channel:   usize,
    pub frame_channel:  usize,   // chip select
    pub frame_active:   usize,
    pub frame_enable:   bool,
}
#[derive(Copy,Clone,Debug)]
struct State {
    clock_state: bool,
    frame_state: usize,
    shift_count: usize,
    shift_reg: Word,
}
#[derive(Copy,Clone,Debug)]
pub struct Monitor {
    pub config: Config,
    state: State,
}

impl Default for Config {
    // MOSI of a Wire sample, framed by its chip select.
    fn default() -> Config {
        Config {
            mode: MODE_0,
            nb_bits: 8,
            clock_channel: signal::SCLK,
            data_channel:  signal::MOSI,
            frame_channel: signal::CS_N,
            frame_active: 0,
            frame_enable: true,
        }
    }
}

impl Monitor {
    pub fn new(c: Config) -> Result<Monitor> {
        check_width(c.nb_bits)?;
        Ok(Monitor {
            config: c,
            state: State {
                clock_state: sampling_clock(c.mode, idle_high(c.mode)),
                frame_state: c.frame_active ^ 1,
                shift_count: 0,
                shift_reg: 0,
            }
        })
    }
}

impl<B> Tick<B,Option<Word>> for Monitor where B: Bus {
    #[inline(always)]
    fn tick(&mut self, input: B) -> Option<Word> {

        let s = &mut self.state;
        let c = &self.config;

        let clock_bit = sampling_clock(c.mode, input.channel(c.clock_channel) == 1);
        let frame_bit = input.channel(c.frame_channel);
        let data_bit  = input.channel(c.data_channel) as Word;

        let mut rv = None;

        // Frame edge
        if c.frame_enable {
            if frame_bit != s.frame_state { // transition
                if frame_bit == c.frame_active {
                    // reset shift register
                    s.shift_reg = 0;
                    s.shift_count = 0;
                }
            }
        }

        // Shift in data on sampling clock edge.
        if !c.frame_enable || (frame_bit == c.frame_active) {
            if clock_bit && !s.clock_state { // sampling edge
                s.shift_reg = ((s.shift_reg << 1) | data_bit) & mask(c.nb_bits); // (A)
                s.shift_count += 1;
                if s.shift_count == c.nb_bits { // (B)
                    rv = Some(s.shift_reg);
                    s.shift_reg = 0;
                    s.shift_count = 0;
                }
            }
        }

        // Edge detector state
        s.clock_state = clock_bit;
        s.frame_state = frame_bit;

        rv
    }
}
