//! In-memory link halves for exercising the decoder and bridge

#![allow(dead_code)]

use parking_lot::Mutex;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;

/// Serves a fixed byte script in chunks of the given sizes, cycling through
/// them, optionally reporting a read timeout between chunks. Ends with EOF.
pub struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunks: Vec<usize>,
    next_chunk: usize,
    timeout_between: bool,
    timed_out: bool,
}

impl ChunkedReader {
    pub fn new(data: impl Into<Vec<u8>>, chunks: Vec<usize>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            chunks: if chunks.is_empty() { vec![usize::MAX] } else { chunks },
            next_chunk: 0,
            timeout_between: false,
            timed_out: false,
        }
    }

    pub fn whole(data: impl Into<Vec<u8>>) -> Self {
        Self::new(data, vec![usize::MAX])
    }

    pub fn bytewise(data: impl Into<Vec<u8>>) -> Self {
        Self::new(data, vec![1])
    }

    pub fn with_timeouts(mut self) -> Self {
        self.timeout_between = true;
        self
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        if self.timeout_between && !self.timed_out {
            self.timed_out = true;
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
        }
        self.timed_out = false;

        let chunk = self.chunks[self.next_chunk % self.chunks.len()].max(1);
        self.next_chunk += 1;
        let n = chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// A link that never delivers data; every read times out after a short wait
pub struct IdleReader;

impl Read for IdleReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        std::thread::sleep(Duration::from_millis(5));
        Err(io::Error::new(io::ErrorKind::TimedOut, "idle"))
    }
}

/// Serves a script, then idles instead of reaching EOF
pub struct ScriptThenIdle {
    inner: ChunkedReader,
}

impl ScriptThenIdle {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: ChunkedReader::whole(data),
        }
    }
}

impl Read for ScriptThenIdle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf)? {
            0 => IdleReader.read(buf),
            n => Ok(n),
        }
    }
}

/// Records everything written to it
#[derive(Clone, Default)]
pub struct Capture(pub Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one byte per call and yields in between, to provoke interleaving
#[derive(Clone, Default)]
pub struct TrickleCapture(pub Arc<Mutex<Vec<u8>>>);

impl Write for TrickleCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.0.lock().push(buf[0]);
        std::thread::yield_now();
        Ok(1)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Every write fails as if the device was unplugged
pub struct Unplugged;

impl Write for Unplugged {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
