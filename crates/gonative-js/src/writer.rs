//! Line-buffering byte sink behind the host's `fs.write`.
//!
//! Writes arrive in whatever chunks the translated program produced; the
//! terminal contract is line-oriented. Bytes queue up until a newline
//! appears, then everything up to it is emitted as one line. Partial lines
//! persist across calls.

use std::collections::VecDeque;
use std::io::{self, Write as _};

pub struct Writer {
    out: Box<dyn io::Write>,
    buf: VecDeque<u8>,
}

impl Writer {
    pub fn new(out: Box<dyn io::Write>) -> Writer {
        Writer {
            out,
            buf: VecDeque::new(),
        }
    }

    pub fn stdout() -> Writer {
        Writer::new(Box::new(io::stdout()))
    }

    pub fn stderr() -> Writer {
        Writer::new(Box::new(io::stderr()))
    }

    /// Queue `bytes` and emit every complete line now present in the queue.
    ///
    /// The destination has no error channel in the host contract, so I/O
    /// failures on it are ignored.
    pub fn write(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes);
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..pos).collect();
            self.buf.pop_front();
            let _ = self.out.write_all(&line);
            let _ = self.out.write_all(b"\n");
            let _ = self.out.flush();
        }
    }
}
