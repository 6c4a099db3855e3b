use std::io::{self, Read};

use tracing::error;

/* Manually buffered sample reader: one byte is one 8-channel logic
sample.  Buffer size such that a write from a capture driver doesn't
need to be chunked.  The stream ends at end of input or on the first
read error. */
pub struct Buf8<R> {
    src: R,
    buf: Box<[u8]>,
    offset: usize,
    nb: usize,
}

pub const BUF_SIZE: usize = 262144;

impl<R> Iterator for Buf8<R> where R: Read {
    type Item = u8;
    #[inline(always)]
    fn next(&mut self) -> Option<u8> {
        loop {
            if self.offset < self.nb {
                let rv = self.buf[self.offset];
                self.offset += 1;
                return Some(rv);
            }
            match self.src.read(&mut self.buf) {
                Ok(0) => return None,
                Ok(nb) => {
                    self.offset = 0;
                    self.nb = nb;
                }
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => (),
                Err(err) => {
                    error!(%err, "sample input");
                    return None;
                }
            }
        }
    }
}

pub fn buf8<R: Read>(src: R) -> Buf8<R> {
    Buf8 {
        src,
        buf: vec![0; BUF_SIZE].into_boxed_slice(),
        offset: 0,
        nb: 0,
    }
}

pub fn stdin8() -> Buf8<io::Stdin> {
    buf8(io::stdin())
}
