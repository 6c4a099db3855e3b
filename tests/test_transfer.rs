mod common;

use rstest::rstest;

use spisim::monitor::{self, Monitor};
use spisim::signal::{self, mask, Word};
use spisim::decode;

use common::{bench, drive, mode};

fn pattern(width: usize, n: usize) -> Vec<Word> {
    (0..n as Word)
        .map(|k| (0x5A5A_C3C3_0F0F_9669 ^ (k * 0x1111_1111_1111_1111)) & mask(width))
        .collect()
}

#[rstest]
fn single_word_round_trip(
    #[values(0, 1, 2, 3)] mode_nb: u8,
    #[values(1, 8, 15, 32)] width: usize,
    #[values(2, 3, 5)] half: usize,
) {
    let mut b = bench(mode_nb, width, half, width, 1, 1);
    let word = pattern(width, 1)[0];
    let reply = !word & mask(width);
    let t = b.transfer(&[word], reply).unwrap();
    assert_eq!(t.responded, vec![word]);
    assert_eq!(t.received, vec![reply]);
}

#[test]
fn fifteen_bit_word_two_bit_reply() {
    let mut b = bench(0, 15, 2, 2, 1, 1);
    let t = b.transfer(&[0x1ABC], 0b11).unwrap();
    assert_eq!(t.received, vec![0x0003]);
    assert_eq!(t.responded, vec![0x1ABC]);
}

#[rstest]
#[case(0, 8, 2, 3)]
#[case(1, 8, 3, 4)]
#[case(2, 12, 2, 2)]
#[case(3, 5, 4, 5)]
fn multi_word_round_trip(#[case] mode_nb: u8, #[case] width: usize,
                         #[case] half: usize, #[case] n: usize) {
    let mut b = bench(mode_nb, width, half, width, n, 2);
    let words = pattern(width, n);
    let reply = 0x2D & mask(width);
    let t = b.transfer(&words, reply).unwrap();
    assert_eq!(t.responded, words);
    assert_eq!(t.received, vec![reply; n]);
    // Every word holds chip select for its clock edges plus the hand-off.
    assert_eq!(t.select_ticks, n * (2 * width * half + 3));
}

#[test]
fn reply_is_held_across_transactions() {
    let mut b = bench(1, 8, 2, 8, 1, 1);
    let first = b.transfer(&[0x01], 0x9C).unwrap();
    assert_eq!(first.received, vec![0x9C]);
    assert_eq!(b.transmitter.held(), 0x9C);
    let second = b.transfer(&[0x02], 0x9C).unwrap();
    assert_eq!(second.received, vec![0x9C]);
    assert_eq!(second.responded, vec![0x02]);
}

#[test]
fn too_many_words() {
    let mut b = bench(0, 8, 2, 8, 2, 1);
    assert_eq!(
        b.transfer(&[1, 2, 3], 0),
        Err(spisim::Error::WordCount { count: 3, max: 2 })
    );
    assert_eq!(b.transfer(&[], 0), Err(spisim::Error::WordCount { count: 0, max: 2 }));
}

// A passive monitor on the wires sees the same words as both ends.
#[rstest]
fn monitor_agrees_with_both_ends(#[values(0, 1, 2, 3)] mode_nb: u8) {
    let width = 10;
    let words = pattern(width, 3);
    let reply = 0x2A5;
    let mut b = bench(mode_nb, width, 2, width, 3, 1);
    let trace = drive(&mut b, &words, reply, 4);
    let wires: Vec<_> = trace.iter().map(|o| o.wire).collect();

    let watch = |data_channel| {
        let mut m = Monitor::new(monitor::Config {
            mode: mode(mode_nb),
            nb_bits: width,
            data_channel,
            ..Default::default()
        }).unwrap();
        decode(&mut m, wires.iter().cloned()).collect::<Vec<Word>>()
    };
    assert_eq!(watch(signal::MOSI), words);
    assert_eq!(watch(signal::MISO), vec![reply; 3]);
}
