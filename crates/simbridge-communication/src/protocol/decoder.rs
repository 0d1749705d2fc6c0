//! Frame decoder
//!
//! Turns the raw serial byte stream into typed [`Event`]s. The decoder keeps
//! a small read buffer across frames, so a single `read` may deliver bytes of
//! several frames (or a fraction of one) without affecting the result.
//!
//! Malformed frames are discarded with a [`FrameParseError`] and decoding
//! resumes at the next byte. Only link failures end the stream.

use super::{
    BITMAP_SELECTOR, BYTES_PER_PIXEL, GPIO_SELECTOR, MOTOR_SELECTOR, RECT_SELECTOR, SIGIL,
    TERMINATOR,
};
use simbridge_core::{Event, FrameParseError, LinkError};
use std::io::{ErrorKind, Read};
use std::str::FromStr;

/// Size of the internal read buffer
const READ_BUFFER_SIZE: usize = 4096;

/// Result of decoding one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Frame decoded into an event
    Event(Event),
    /// Frame was malformed and dropped
    Discarded(FrameParseError),
}

type AbortCheck = Box<dyn Fn() -> bool + Send>;

/// Streaming decoder over a blocking byte source with bounded waits
///
/// Read timeouts (`TimedOut`, `WouldBlock`) are treated as "no data yet" and
/// retried. Between retries the optional abort check is consulted so the
/// owning thread can stop a decoder that is waiting on an idle link.
pub struct FrameDecoder<R> {
    reader: R,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    abort: Option<AbortCheck>,
    failed: bool,
}

impl<R: Read> FrameDecoder<R> {
    /// Create a decoder reading from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            start: 0,
            end: 0,
            abort: None,
            failed: false,
        }
    }

    /// Stop decoding with [`LinkError::Closed`] once `check` returns true
    pub fn with_abort<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + Send + 'static,
    {
        self.abort = Some(Box::new(check));
        self
    }

    /// Decode frames until one produces an event
    ///
    /// Discarded frames are logged and skipped.
    pub fn next_event(&mut self) -> Result<Event, LinkError> {
        loop {
            match self.next_frame()? {
                FrameOutcome::Event(event) => return Ok(event),
                FrameOutcome::Discarded(reason) => {
                    tracing::debug!("Discarding frame: {}", reason);
                }
            }
        }
    }

    /// Decode exactly one frame from the stream
    pub fn next_frame(&mut self) -> Result<FrameOutcome, LinkError> {
        let first = self.next_byte()?;
        if first != SIGIL {
            let line = self.line_starting_with(first)?;
            if line.is_empty() {
                return Ok(FrameOutcome::Discarded(FrameParseError::EmptyLine));
            }
            return Ok(FrameOutcome::Event(Event::LogLine { text: line }));
        }

        let selector = self.next_byte()?;
        if selector == BITMAP_SELECTOR {
            return self.bitmap_frame();
        }

        let line = self.line_starting_with(selector)?;
        Ok(parse_text_frame(&line))
    }

    /// Bytes read from the link but not yet consumed by a frame
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    fn bitmap_frame(&mut self) -> Result<FrameOutcome, LinkError> {
        let mut raw = Vec::new();
        self.read_line(&mut raw)?;
        let header = String::from_utf8_lossy(&raw);

        // Payload length is unknown when the header is bad, so nothing past
        // the header is consumed.
        let (x, y, w, h) = match parse_bitmap_header(&header) {
            Ok(dims) => dims,
            Err(e) => return Ok(FrameOutcome::Discarded(e)),
        };

        let len = usize::from(w) * usize::from(h) * BYTES_PER_PIXEL;
        // Grows as payload arrives; the header alone never sizes the buffer.
        let mut pixels = Vec::with_capacity(len.min(READ_BUFFER_SIZE));
        self.read_exact(len, &mut pixels)?;

        Ok(FrameOutcome::Event(Event::BitmapBlit {
            x,
            y,
            w,
            h,
            pixels,
        }))
    }

    /// Rest of the current line prefixed with `first`, lossily decoded and trimmed
    fn line_starting_with(&mut self, first: u8) -> Result<String, LinkError> {
        let mut raw = vec![first];
        if first != TERMINATOR {
            self.read_line(&mut raw)?;
        }
        Ok(String::from_utf8_lossy(&raw).trim().to_string())
    }

    fn next_byte(&mut self) -> Result<u8, LinkError> {
        if self.start == self.end {
            self.fill()?;
        }
        let byte = self.buf[self.start];
        self.start += 1;
        Ok(byte)
    }

    /// Append bytes up to and including the next terminator
    fn read_line(&mut self, out: &mut Vec<u8>) -> Result<(), LinkError> {
        loop {
            if self.start == self.end {
                self.fill()?;
            }
            let available = &self.buf[self.start..self.end];
            match available.iter().position(|&b| b == TERMINATOR) {
                Some(pos) => {
                    out.extend_from_slice(&available[..=pos]);
                    self.start += pos + 1;
                    return Ok(());
                }
                None => {
                    out.extend_from_slice(available);
                    self.start = self.end;
                }
            }
        }
    }

    /// Append exactly `len` bytes, across as many reads as it takes
    fn read_exact(&mut self, len: usize, out: &mut Vec<u8>) -> Result<(), LinkError> {
        let mut remaining = len;
        while remaining > 0 {
            if self.start == self.end {
                self.fill()?;
            }
            let take = remaining.min(self.end - self.start);
            out.extend_from_slice(&self.buf[self.start..self.start + take]);
            self.start += take;
            remaining -= take;
        }
        Ok(())
    }

    fn fill(&mut self) -> Result<(), LinkError> {
        loop {
            if self.aborted() {
                return self.fail(LinkError::Closed);
            }
            match self.reader.read(&mut self.buf) {
                Ok(0) => return self.fail(LinkError::Closed),
                Ok(n) => {
                    self.start = 0;
                    self.end = n;
                    return Ok(());
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) => {}
                Err(e) => return self.fail(LinkError::read(&e)),
            }
        }
    }

    fn aborted(&self) -> bool {
        self.abort.as_ref().is_some_and(|check| check())
    }

    fn fail(&mut self, err: LinkError) -> Result<(), LinkError> {
        self.failed = true;
        self.start = 0;
        self.end = 0;
        Err(err)
    }
}

/// Lazy event stream; ends after the first link error
impl<R: Read> Iterator for FrameDecoder<R> {
    type Item = Result<Event, LinkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        Some(self.next_event())
    }
}

/// Classify a text frame whose sigil has already been consumed
///
/// `line` is the selector byte plus the rest of the line, trimmed.
pub fn parse_text_frame(line: &str) -> FrameOutcome {
    let result = match line.chars().next() {
        Some(RECT_SELECTOR) => parse_rect(&line[1..]),
        Some(GPIO_SELECTOR) => parse_gpio(&line[1..]),
        Some(MOTOR_SELECTOR) => parse_motor(&line[1..]),
        _ => Ok(Event::LogLine {
            text: format!("{}{}", SIGIL as char, line),
        }),
    };

    match result {
        Ok(event) => FrameOutcome::Event(event),
        Err(e) => FrameOutcome::Discarded(e),
    }
}

fn parse_bitmap_header(header: &str) -> Result<(u16, u16, u16, u16), FrameParseError> {
    let malformed = || FrameParseError::MalformedHeader {
        header: header.trim().to_string(),
    };

    let fields: Vec<&str> = header.trim().split(',').collect();
    if fields.len() != 4 {
        return Err(malformed());
    }

    let mut dims = [0u16; 4];
    for (slot, field) in dims.iter_mut().zip(&fields) {
        *slot = field.trim().parse().map_err(|_| malformed())?;
    }

    Ok((dims[0], dims[1], dims[2], dims[3]))
}

fn parse_rect(body: &str) -> Result<Event, FrameParseError> {
    let fields = split_fields(RECT_SELECTOR, body, 5, true)?;
    Ok(Event::RectDraw {
        x: parse_field(RECT_SELECTOR, &fields, 0)?,
        y: parse_field(RECT_SELECTOR, &fields, 1)?,
        w: parse_field(RECT_SELECTOR, &fields, 2)?,
        h: parse_field(RECT_SELECTOR, &fields, 3)?,
        color: parse_field(RECT_SELECTOR, &fields, 4)?,
    })
}

fn parse_gpio(body: &str) -> Result<Event, FrameParseError> {
    let fields = split_fields(GPIO_SELECTOR, body, 2, true)?;
    Ok(Event::GpioUpdate {
        pin: parse_field(GPIO_SELECTOR, &fields, 0)?,
        value: parse_field(GPIO_SELECTOR, &fields, 1)?,
    })
}

fn parse_motor(body: &str) -> Result<Event, FrameParseError> {
    // Trailing fields are reserved for future telemetry.
    let fields = split_fields(MOTOR_SELECTOR, body, 3, false)?;
    Ok(Event::MotorTelemetry {
        target: parse_field(MOTOR_SELECTOR, &fields, 0)?,
        current: parse_field(MOTOR_SELECTOR, &fields, 1)?,
        direction: parse_field(MOTOR_SELECTOR, &fields, 2)?,
    })
}

fn split_fields(
    kind: char,
    body: &str,
    expected: usize,
    exact: bool,
) -> Result<Vec<&str>, FrameParseError> {
    let fields: Vec<&str> = body.split(',').collect();
    let ok = if exact {
        fields.len() == expected
    } else {
        fields.len() >= expected
    };
    if !ok {
        return Err(FrameParseError::FieldCount {
            kind,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

fn parse_field<T: FromStr>(kind: char, fields: &[&str], index: usize) -> Result<T, FrameParseError> {
    let raw = fields[index];
    raw.trim()
        .parse()
        .map_err(|_| FrameParseError::InvalidField {
            kind,
            index,
            value: raw.to_string(),
        })
}
