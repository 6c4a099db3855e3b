// Simulation bench: one controller wired to one responder.
//
// Both responder clock domains are stepped once per reference tick.  The
// order within a tick is fixed:
//
//   1. the controller steps, sampling MISO as it was before the tick;
//   2. the responder's local halves step, seeing the bus halves as they
//      were before the tick;
//   3. the responder's bus halves react to the new clock, MOSI and chip
//      select levels, producing the new MISO level.

use tracing::debug;

use crate::config::{ControllerConfig, ResponderConfig, WordCount};
use crate::error::{Error, Result};
use crate::receiver::{Received, Receiver};
use crate::sequencer::{Controller, ControllerInput, ControllerOutput, State};
use crate::signal::{mode_number, Line, Wire, Word};
use crate::transmitter::{TransmitInput, Transmitter};
use crate::Tick;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BenchInput {
    pub rst_n: bool,
    pub tx_dv: bool,
    pub tx_count: WordCount,
    pub tx_word: Word,
    pub reply_dv: bool,
    pub reply: Word,
}

impl Default for BenchInput {
    fn default() -> Self {
        BenchInput {
            rst_n: true,
            tx_dv: false,
            tx_count: WordCount::default(),
            tx_word: 0,
            reply_dv: false,
            reply: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BenchOutput {
    pub controller: ControllerOutput,
    pub responder: Received,
    pub wire: Wire,
}

/// Result of `Loopback::transfer`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transfer {
    pub received: Vec<Word>,  // by the controller
    pub responded: Vec<Word>, // received by the responder
    pub select_ticks: usize,
    pub ticks: usize,
}

pub struct Loopback {
    pub controller: Controller,
    pub receiver: Receiver,
    pub transmitter: Transmitter,
    last: BenchOutput,
}

impl Loopback {
    pub fn new(controller: ControllerConfig, responder: ResponderConfig) -> Result<Loopback> {
        if controller.data_width != responder.data_width {
            return Err(Error::WidthMismatch {
                controller: controller.data_width,
                responder: responder.data_width,
            });
        }
        if controller.mode != responder.mode {
            return Err(Error::ModeMismatch {
                controller: mode_number(controller.mode),
                responder: mode_number(responder.mode),
            });
        }
        let controller = Controller::new(controller)?;
        let receiver = Receiver::new(responder)?;
        let transmitter = Transmitter::new(responder)?;
        let last = BenchOutput {
            controller: controller.output(),
            responder: receiver.output(),
            wire: Wire::idle(responder.mode),
        };
        Ok(Loopback { controller, receiver, transmitter, last })
    }

    /// Outputs of the most recent tick.
    pub fn last(&self) -> BenchOutput {
        self.last
    }

    pub fn tick(&mut self, i: BenchInput) -> BenchOutput {
        let miso = self.last.wire.miso;
        let controller = self.controller.tick(ControllerInput {
            rst_n: i.rst_n,
            tx_dv: i.tx_dv,
            tx_count: i.tx_count,
            tx_word: i.tx_word,
            miso: miso.level_or(false),
        });
        let responder = self.receiver.local_tick(i.rst_n);
        self.transmitter.local_tick(TransmitInput {
            rst_n: i.rst_n,
            tx_dv: i.reply_dv,
            tx_word: i.reply,
        });

        let wire = Wire {
            sclk: controller.sclk,
            mosi: controller.mosi,
            miso,
            cs_n: controller.cs_n,
        };
        self.receiver.bus_tick(wire);
        let miso: Line = self.transmitter.bus_tick(wire);

        self.last = BenchOutput { controller, responder, wire: Wire { miso, ..wire } };
        self.last
    }

    /// Run one transaction.  The reply is loaded first, then every word is
    /// presented on the first tick `tx_ready` is seen.  Returns once the
    /// controller is idle again and the responder has reported every word,
    /// or after a generous tick budget.
    pub fn transfer(&mut self, words: &[Word], reply: Word) -> Result<Transfer> {
        let count = self.controller.word_count(words.len())?;
        let c = self.controller.config;
        let budget = words.len() * (c.word_ticks() + 4)
            + c.idle_period
            + self.receiver.latency()
            + 16;

        let mut t = Transfer::default();
        self.tick(BenchInput { reply_dv: true, reply, ..Default::default() });
        let mut next = 0;
        while t.ticks < budget {
            let send = next < words.len() && self.last.controller.tx_ready;
            let out = self.tick(BenchInput {
                tx_dv: send,
                tx_count: count,
                tx_word: if send { words[next] } else { 0 },
                ..Default::default()
            });
            if send {
                next += 1;
            }
            t.ticks += 1;
            if !out.controller.cs_n {
                t.select_ticks += 1;
            }
            if out.controller.rx_dv {
                t.received.push(out.controller.rx_word);
            }
            if out.responder.rx_dv {
                t.responded.push(out.responder.rx_word);
            }
            if next == words.len()
                && self.controller.state() == State::Idle
                && t.responded.len() >= words.len()
            {
                break;
            }
        }
        debug!(sent = words.len(), received = t.received.len(), ticks = t.ticks, "transfer");
        Ok(t)
    }
}
