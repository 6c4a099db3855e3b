
/* Trampoline binary.

   One binary hosts the commands:

   loopback  run one transaction through the simulated controller and
             responder, words to send given as hex arguments

   decode    decode SPI words from captured 8-channel logic samples on
             stdin, one sample per byte

   Everything else is configured through SPISIM_* environment
   variables, see below for the defaults.
*/

use derive_more::From;
use embedded_hal::spi::Mode;
use tracing::info;

use spisim::loopback::Loopback;
use spisim::monitor::{self, Monitor};
use spisim::io::stdin8;
use spisim::signal::{mode_from_number, Word};
use spisim::{decode, ControllerConfig, ResponderConfig};

fn start_loopback(args: &[String]) -> Result<(), AppError> {
    let mode = mode_var()?;
    let data_width = var("SPISIM_WIDTH", 8)?;
    let words = args
        .iter()
        .map(|a| parse_word(a))
        .collect::<Result<Vec<Word>, _>>()?;
    if words.is_empty() {
        return Err(AppError::AppStrError("no words to send"));
    }

    let controller = ControllerConfig {
        mode,
        half_bit_period: var("SPISIM_HALF_BIT", 2)?,
        data_width,
        max_words: var("SPISIM_MAX_WORDS", words.len())?,
        idle_period: var("SPISIM_IDLE", 1)?,
    };
    let responder = ResponderConfig {
        mode,
        data_width,
        significant_width: var("SPISIM_SIGNIFICANT", data_width)?,
        ..Default::default()
    };
    let reply = match std::env::var("SPISIM_REPLY") {
        Ok(s) => parse_word(&s)?,
        Err(_) => 0,
    };

    let mut bench = Loopback::new(controller, responder)?;
    let t = bench.transfer(&words, reply)?;
    info!(ticks = t.ticks, select_ticks = t.select_ticks, "done");

    let digits = (data_width + 3) / 4;
    let show = |w: Option<&Word>| match w {
        Some(w) => format!("{:0d$x}", w, d = digits),
        None => format!("{:-<d$}", "", d = digits),
    };
    for (k, sent) in words.iter().enumerate() {
        println!("{} -> {}   {} <- {}",
                 show(Some(sent)), show(t.responded.get(k)),
                 show(t.received.get(k)), show(Some(&reply)));
    }
    if t.responded.len() < words.len() || t.received.len() < words.len() {
        return Err(AppError::AppStrError("transfer incomplete, words missing"));
    }
    Ok(())
}

/* Decode captured samples.  Channel defaults follow the Wire layout:

   0 SCLK
   1 MOSI
   2 MISO
   3 CS (active low)
*/

fn start_decode() -> Result<(), AppError> {
    let nb_bits = var("SPISIM_WIDTH", 8)?;
    let config = monitor::Config {
        mode:           mode_var()?,
        nb_bits,
        clock_channel:  var("SPISIM_CLOCK_CHANNEL", 0)?,
        data_channel:   var("SPISIM_DATA_CHANNEL", 1)?,
        frame_channel:  var("SPISIM_FRAME_CHANNEL", 3)?,
        frame_active:   0,
        frame_enable:   var("SPISIM_FRAME_ENABLE", 1)? != 0,
    };
    for &c in &[config.clock_channel, config.data_channel, config.frame_channel] {
        if c >= 8 {
            return Err(AppError::AppStrError("capture channels are 0..8"));
        }
    }
    let mut monitor = Monitor::new(config)?;
    for w in decode(&mut monitor, stdin8()) {
        println!("{:01$x}", w, (nb_bits + 3) / 4);
    }
    Ok(())
}


fn start() -> Result<(), AppError> {
    let args : Vec<String> = std::env::args().collect() ;
    match args.get(1).map(|a| &a[..]) {
        Some("loopback") => start_loopback(&args[2..]),
        Some("decode")   => start_decode(),
        _ => Err(AppError::AppStrError("usage: spisim loopback|decode")),
    }
}
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = start() {
        eprintln!("spisim: {}", e);
        std::process::exit(1);
    }
}

// To handle multiple errors, put them in an Enum like this
#[derive(From, Debug)]
enum AppError {
    AppParseIntError(std::num::ParseIntError),
    AppTryFromIntError(std::num::TryFromIntError),
    AppSpiError(spisim::Error),
    AppStrError(&'static str),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AppError::AppParseIntError(e) => write!(f, "{}", e),
            AppError::AppTryFromIntError(e) => write!(f, "{}", e),
            AppError::AppSpiError(e) => write!(f, "{}", e),
            AppError::AppStrError(e) => write!(f, "{}", e),
        }
    }
}

/* Some shared code. */

fn var(varname: &str, default: usize) -> Result<usize, AppError> {
    match std::env::var(varname) {
        Ok(s) => {
            let v = s.parse::<usize>()?;
            Ok(v)
        },
        Err(_) =>
            Ok(default)
    }
}

fn mode_var() -> Result<Mode, AppError> {
    Ok(mode_from_number(u8::try_from(var("SPISIM_MODE", 0)?)?)?)
}

// Words are given in hex, with or without 0x.
fn parse_word(s: &str) -> Result<Word, std::num::ParseIntError> {
    Word::from_str_radix(s.trim_start_matches("0x"), 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_words() {
        assert_eq!(parse_word("1abc"), Ok(0x1abc));
        assert_eq!(parse_word("0x10"), Ok(0x10));
        assert!(parse_word("xyz").is_err());
    }

    #[test]
    fn mode_number_range() {
        std::env::set_var("SPISIM_MODE", "256");
        assert!(matches!(mode_var(), Err(AppError::AppTryFromIntError(_))));
        std::env::set_var("SPISIM_MODE", "4");
        assert!(matches!(mode_var(), Err(AppError::AppSpiError(spisim::Error::Mode(4)))));
        std::env::set_var("SPISIM_MODE", "3");
        assert!(matches!(mode_var(), Ok(m) if m == embedded_hal::spi::MODE_3));
        std::env::remove_var("SPISIM_MODE");
    }
}
