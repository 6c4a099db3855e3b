// A cycle-stepped SPI model is a collection of clocked state machines:
//
//   - Tick: run a state machine for one clock tick, feeding it the
//     input signals of that tick and returning its registered outputs.
//
//   - Decode: apply a rate-reducing machine (one that only sometimes
//     produces an element) to a sequence of samples, collect the
//     result sequence.
//
// Each component keeps its state in a Copy struct and computes the next
// state from a snapshot of the current one.  Nothing is committed until
// the whole tick has been evaluated, so no component ever observes a
// half-updated neighbour.


// ---- Tick ----

pub trait Tick<I,O> {
    fn tick(&mut self, input: I) -> O;
}
pub trait Bus {
    fn channel(&self, c: usize) -> usize;
    fn as_usize(&self) -> usize;
}


macro_rules! impl_Bus {
    ($t:ty) => (
        impl Bus for $t {
            #[inline(always)]
            fn channel(&self, c:usize) -> usize {
                // Channels past the sample width read as 0.
                u32::try_from(c).ok()
                    .and_then(|c| (*self).checked_shr(c))
                    .map_or(0, |v| (v & 1) as usize)
            }
            #[inline(always)]
            fn as_usize(&self) -> usize {
                (*self) as usize
            }
        });
    }
impl_Bus!(u8);
impl_Bus!(usize);

impl<'a,T> Bus for &'a T where T: Bus {
    #[inline(always)]
    fn channel(&self, c:usize) -> usize { (*self).channel(c) }
    fn as_usize(&self) -> usize { (*self).as_usize() }
}

// Components are written as a pure step function over an immutable
// snapshot.  This commits the result at the tick boundary.
macro_rules! impl_Tick {
    ($t:ty, $i:ty, $o:ty) => (
        impl $crate::Tick<$i,$o> for $t {
            #[inline(always)]
            fn tick(&mut self, input: $i) -> $o {
                let (next, output) = self.step(input);
                *self = next;
                output
            }
        });
    }

pub mod error;
pub mod signal;
pub mod config;
pub mod engine;
pub mod sequencer;
pub mod sync;
pub mod receiver;
pub mod transmitter;
pub mod loopback;
pub mod monitor;
pub mod io;

pub use config::{ControllerConfig, ResponderConfig, WordCount};
pub use error::{Error, Result};
pub use signal::{Line, Wire, Word};


// ---- Decode ----

use std::marker::PhantomData;

pub struct Decode<'a,I,S,T:'a,O>
    where S: Iterator<Item=I>, T: Tick<I,Option<O>>
{ s: S, t: &'a mut T, _p: PhantomData<fn(I) -> O> }

pub fn decode<I,S,T,O>(tick: &mut T, stream: S) -> Decode<I,S,T,O>
    where S: Iterator<Item=I>, T: Tick<I,Option<O>>,
{ Decode { s: stream, t: tick, _p: PhantomData } }

impl<'a,I,S,P,O> Iterator for Decode<'a,I,S,P,O> where
    S: Iterator<Item=I>,
    P: Tick<I,Option<O>>,
{
    type Item = O;
    #[inline(always)]
    fn next(&mut self) -> Option<O> {
        loop {
            match self.s.next() {
                None => return None,
                Some(input) => match self.t.tick(input) {
                    None => (),
                    rv => return rv,
                },
            }
        }
    }
}
