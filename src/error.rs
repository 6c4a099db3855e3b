// Configuration errors.  The protocol itself has no error channel: every
// violation is caught when a component or an input is constructed.

use derive_more::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[display(fmt = "half bit period of {} ticks, need at least 2", _0)]
    HalfBitPeriod(usize),
    #[display(fmt = "data width {} not in 1..=64", _0)]
    DataWidth(usize),
    #[display(fmt = "significant width {} exceeds data width {}", significant, data)]
    SignificantWidth { significant: usize, data: usize },
    #[display(fmt = "controller is {} bits wide, responder {}", controller, responder)]
    WidthMismatch { controller: usize, responder: usize },
    #[display(fmt = "controller runs SPI mode {}, responder mode {}", controller, responder)]
    ModeMismatch { controller: u8, responder: u8 },
    #[display(fmt = "max words per select must be at least 1")]
    MaxWords,
    #[display(fmt = "idle period must be at least 1 tick")]
    IdlePeriod,
    #[display(fmt = "word count {} not in 1..={}", count, max)]
    WordCount { count: usize, max: usize },
    #[display(fmt = "{} synchronizer stages, need 2..=8", _0)]
    SyncStages(usize),
    #[display(fmt = "no SPI mode {}", _0)]
    Mode(u8),
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
