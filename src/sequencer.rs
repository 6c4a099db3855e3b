// Chip-select sequencer: the initiator side of the bus.
//
// Wraps the bit engine so that several words go out under one chip select
// assertion, then keeps chip select released for `idle_period` ticks
// before the next transaction may begin.
//
// Flow control: after the first word the sequencer does not advance on its
// own.  Every further word needs its own data valid pulse, presented while
// `tx_ready` is high.  Pulses presented while not ready are dropped and
// counted.

use tracing::{debug, info, warn};

use crate::config::{ControllerConfig, WordCount};
use crate::engine::{Engine, EngineInput};
use crate::error::Result;
use crate::signal::Word;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Transferring,
    PostTransactionIdle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ControllerInput {
    pub rst_n: bool,
    pub tx_dv: bool,
    pub tx_count: WordCount, // only looked at on the first word
    pub tx_word: Word,
    pub miso: bool,
}

impl Default for ControllerInput {
    fn default() -> Self {
        ControllerInput {
            rst_n: true,
            tx_dv: false,
            tx_count: WordCount::default(),
            tx_word: 0,
            miso: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ControllerOutput {
    pub sclk: bool,
    pub mosi: bool,
    pub cs_n: bool,
    pub tx_ready: bool,
    pub rx_dv: bool,
    pub rx_word: Word,
    pub rx_count: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Controller {
    pub config: ControllerConfig,
    engine: Engine,
    state: State,
    cs_n: bool,
    words_left: usize, // words still to accept in this transaction
    idle_left: usize,
    rx_count: usize,
    dropped: usize,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Result<Controller> {
        let engine = Engine::new(config)?;
        Ok(Controller::reset(config, engine, 0))
    }

    fn reset(config: ControllerConfig, engine: Engine, dropped: usize) -> Controller {
        Controller {
            config,
            engine,
            state: State::Idle,
            cs_n: true,
            words_left: 0,
            idle_left: config.idle_period,
            rx_count: 0,
            dropped,
        }
    }

    /// Validate a transaction length against this controller.
    pub fn word_count(&self, count: usize) -> Result<WordCount> {
        WordCount::new(count, &self.config)
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Data valid pulses ignored because the controller was not ready.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    // Ready for a data valid pulse on the coming tick.
    fn accepting(&self) -> bool {
        match self.state {
            State::Idle => self.engine.ready(),
            State::Transferring => self.engine.ready() && self.words_left > 0,
            State::PostTransactionIdle => false,
        }
    }

    pub fn output(&self) -> ControllerOutput {
        let e = self.engine.output();
        ControllerOutput {
            sclk: e.sclk,
            mosi: e.mosi,
            cs_n: self.cs_n,
            tx_ready: self.accepting(),
            rx_dv: e.rx_dv,
            rx_word: e.rx_word,
            rx_count: self.rx_count,
        }
    }

    pub fn step(&self, i: ControllerInput) -> (Controller, ControllerOutput) {
        if !i.rst_n {
            if self.state != State::Idle {
                info!(state = ?self.state, "reset, transaction abandoned");
            }
            let (engine, _) = self.engine.step(EngineInput { rst_n: false, ..Default::default() });
            let next = Controller::reset(self.config, engine, self.dropped);
            return (next, next.output());
        }

        let accept = i.tx_dv && self.accepting();
        let mut n = *self;

        if i.tx_dv && !accept {
            n.dropped += 1;
            warn!(state = ?self.state, word = i.tx_word, "data valid while not ready, dropped");
        }

        match self.state {
            State::Idle => {
                if accept {
                    n.words_left = i.tx_count.get() - 1;
                    n.cs_n = false;
                    n.state = State::Transferring;
                    debug!(words = i.tx_count.get(), "select");
                }
            }
            State::Transferring => {
                if self.engine.ready() {
                    if self.words_left > 0 {
                        if accept {
                            n.words_left = self.words_left - 1;
                        }
                    }
                    else {
                        n.cs_n = true;
                        n.idle_left = self.config.idle_period;
                        n.state = State::PostTransactionIdle;
                        debug!(received = self.rx_count, "deselect");
                    }
                }
            }
            State::PostTransactionIdle => {
                if self.idle_left > 0 {
                    n.idle_left = self.idle_left - 1;
                }
                else {
                    n.state = State::Idle;
                }
            }
        }

        // Words received under the current select.
        if self.cs_n {
            n.rx_count = 0;
        }
        else if self.engine.rx_dv() {
            n.rx_count = self.rx_count + 1;
        }

        let (engine, out) = self.engine.step(EngineInput {
            rst_n: true,
            tx_dv: accept,
            tx_word: i.tx_word,
            miso: i.miso,
        });
        if out.rx_dv {
            debug!(word = out.rx_word, "word received");
        }
        n.engine = engine;

        (n, n.output())
    }
}

impl_Tick!(Controller, ControllerInput, ControllerOutput);
