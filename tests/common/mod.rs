#![allow(dead_code)]

use embedded_hal::spi::Mode;

use spisim::loopback::{BenchInput, BenchOutput, Loopback};
use spisim::sequencer::State;
use spisim::signal::{bit, idle_high, late_capture, mode_from_number, Line, Wire, Word};
use spisim::{ControllerConfig, ResponderConfig};

pub fn mode(n: u8) -> Mode {
    mode_from_number(n).unwrap()
}

pub fn configs(mode_nb: u8, width: usize, half: usize, significant: usize,
               max_words: usize, idle: usize) -> (ControllerConfig, ResponderConfig) {
    let m = mode(mode_nb);
    (ControllerConfig {
        mode: m,
        half_bit_period: half,
        data_width: width,
        max_words,
        idle_period: idle,
    },
     ResponderConfig {
         mode: m,
         data_width: width,
         significant_width: significant,
         sync_stages: 2,
     })
}

pub fn bench(mode_nb: u8, width: usize, half: usize, significant: usize,
             max_words: usize, idle: usize) -> Loopback {
    let (c, r) = configs(mode_nb, width, half, significant, max_words, idle);
    Loopback::new(c, r).unwrap()
}

/* Like Loopback::transfer, but keeps every tick's outputs.  Loads the
reply, presents each word on the first tick tx_ready is seen, then runs
until the controller is idle again plus `tail` ticks. */
pub fn drive(b: &mut Loopback, words: &[Word], reply: Word, tail: usize) -> Vec<BenchOutput> {
    let count = b.controller.word_count(words.len()).unwrap();
    let mut trace = vec![];
    b.tick(BenchInput { reply_dv: true, reply, ..Default::default() });
    let mut next = 0;
    let mut left = tail;
    for _ in 0..100_000 {
        let send = next < words.len() && b.last().controller.tx_ready;
        let out = b.tick(BenchInput {
            tx_dv: send,
            tx_count: count,
            tx_word: if send { words[next] } else { 0 },
            ..Default::default()
        });
        if send {
            next += 1;
        }
        trace.push(out);
        if next == words.len() && b.controller.state() == State::Idle {
            if left == 0 {
                break;
            }
            left -= 1;
        }
    }
    trace
}

/* Synthetic bus waveform for one chip select frame: setup, then every
bit as two clock halves of `period` samples, data held for the whole
bit, then release. */
pub fn frame(m: Mode, nb_bits: usize, words: &[Word], period: usize) -> Vec<Wire> {
    let rest = idle_high(m);
    let halves = if late_capture(m) { [!rest, rest] } else { [rest, !rest] };
    let idle = Wire::idle(m);
    let mut v = vec![idle; period];
    v.extend((0..period).map(|_| Wire { cs_n: false, ..idle }));
    for &w in words {
        for i in (0..nb_bits).rev() {
            let b = bit(w, i);
            for &level in &halves {
                for _ in 0..period {
                    v.push(Wire { sclk: level, mosi: b, miso: Line::Undriven, cs_n: false });
                }
            }
        }
    }
    v.extend((0..period).map(|_| Wire { cs_n: false, ..idle }));
    v.extend((0..period).map(|_| idle));
    v
}
