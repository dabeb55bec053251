//! Line framing over a byte stream.
//!
//! Bytes are pulled one at a time from the transport and run through a small
//! state machine recognising `\r\n<text>\r\n`. Framing violations drop the
//! machine back to [`FrameState::Start`] and the offending byte is evaluated
//! again from there, so the reader resynchronises on the next header.

use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};
use embedded_io_async::Read;
use heapless::Vec;

use crate::{error::Error, fmt::LossyStr};

pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';

/// Consecutive buffer overflows tolerated within one read before the stream
/// is declared out of sync.
const MAX_OVERFLOWS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    Start,
    Header,
    Text,
    Trailer,
    Complete,
}

impl FrameState {
    /// Transition on `byte`. `text_len` is the number of text bytes seen so
    /// far, used to complete prompt lines (`\r\n>` and `\r\n@`) which have
    /// no trailer.
    fn next(self, byte: u8, text_len: usize) -> Self {
        match self {
            Self::Start => match byte {
                CR => Self::Header,
                _ => Self::Text,
            },
            Self::Header => match byte {
                LF => Self::Text,
                _ => Self::Start.next(byte, 0),
            },
            Self::Text => match byte {
                CR => Self::Trailer,
                LF => Self::Start,
                b'>' | b'@' if text_len == 0 => Self::Complete,
                _ => Self::Text,
            },
            Self::Trailer => match byte {
                LF => Self::Complete,
                _ => Self::Start.next(byte, 0),
            },
            Self::Complete => Self::Complete,
        }
    }
}

pub struct LineFramer<const N: usize> {
    buf: Vec<u8, N>,
    state: FrameState,
    text_len: usize,
}

impl<const N: usize> Default for LineFramer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineFramer<N> {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            state: FrameState::Start,
            text_len: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.state = FrameState::Start;
        self.text_len = 0;
    }

    /// Feed one byte. Returns `true` once a line is complete.
    ///
    /// On overflow the partial line is dropped and `Err(Error::Overflow)` is
    /// returned; the byte itself starts the next attempt.
    pub fn push(&mut self, byte: u8) -> Result<bool, Error> {
        if self.state == FrameState::Complete {
            self.reset();
        }

        let overflow = self.buf.push(byte).is_err();
        if overflow {
            warn!("Line buffer overflow, dropping {} bytes", self.buf.len());
            self.reset();
            // Capacity is at least one, so this cannot fail after a reset.
            self.buf.push(byte).ok();
        }

        self.state = self.state.next(byte, self.text_len);
        match self.state {
            FrameState::Text if byte != LF => self.text_len += 1,
            FrameState::Start | FrameState::Header => self.text_len = 0,
            _ => {}
        }

        if overflow {
            Err(Error::Overflow)
        } else {
            Ok(self.state == FrameState::Complete)
        }
    }

    /// Bytes of the current (possibly partial) line.
    pub fn line(&self) -> &[u8] {
        &self.buf
    }

    /// Read bytes until a line is framed or `deadline` passes.
    ///
    /// Returns an empty slice if no line completed in time. A partial line is
    /// kept and the next call carries on framing it.
    pub async fn read_line<R: Read>(
        &mut self,
        transport: &mut R,
        deadline: Instant,
    ) -> Result<&[u8], Error> {
        let mut overflows = 0;

        loop {
            let mut byte = [0u8; 1];
            match select(transport.read(&mut byte), Timer::at(deadline)).await {
                Either::First(Ok(0)) | Either::Second(()) => {
                    if self.state != FrameState::Complete && !self.buf.is_empty() {
                        trace!("Partial line at deadline: {:?}", LossyStr(&self.buf));
                    }
                    return Ok(&[]);
                }
                Either::First(Ok(_)) => {}
                Either::First(Err(_)) => return Err(Error::Io),
            }

            match self.push(byte[0]) {
                Ok(true) => return Ok(&self.buf),
                Ok(false) => {}
                Err(_) => {
                    overflows += 1;
                    if overflows >= MAX_OVERFLOWS {
                        error!("Unable to frame a line in {} bytes", N * MAX_OVERFLOWS as usize);
                        self.reset();
                        return Err(Error::ProtocolDesync);
                    }
                }
            }
        }
    }
}
