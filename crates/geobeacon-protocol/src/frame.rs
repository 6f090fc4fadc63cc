//! Line framing for the serial input.
//!
//! Location records arrive as text lines terminated by `\r`, `\n` or `\r\n`,
//! split across reads at arbitrary points. [`FrameAssembler`] gathers bytes
//! into a fixed-capacity buffer and reports when a terminator has been seen.
//!
//! The buffer never grows. Bytes arriving once it is full are dropped until a
//! terminator shows up, which caps the damage from an over-long line.
//!
//! A pass stops at the first terminator so the next line stays with the
//! source. An LF directly after a CR belongs to the same line ending and is
//! skipped, even when it arrives in a later pass.

use crate::types::RECORD_LEN;

/// Carriage return.
pub const CR: u8 = b'\r';

/// Line feed.
pub const LF: u8 = b'\n';

/// Frame buffer capacity: a full record plus room for a stray byte and a
/// CR LF pair.
pub const FRAME_CAPACITY: usize = RECORD_LEN + 2;

/// Whether a byte terminates a line.
pub fn is_terminator(byte: u8) -> bool {
    byte == CR || byte == LF
}

/// Result of feeding bytes to a [`FrameAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStatus {
    /// A terminator was seen.
    pub complete: bool,
    /// Number of bytes currently held in the frame.
    pub len: usize,
}

impl FrameStatus {
    /// A complete frame with at least one byte in it.
    ///
    /// A bare terminator is not a record and should not be decoded.
    pub fn has_record(&self) -> bool {
        self.complete && self.len > 0
    }
}

/// Accumulates bytes into a line-delimited frame.
///
/// The cursor persists between calls, so a frame can be built from many small
/// reads. Call [`reset`](Self::reset) once a complete frame has been consumed.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    /// Frame storage.
    buffer: [u8; FRAME_CAPACITY],
    /// Number of valid bytes in `buffer`.
    len: usize,
    /// Bytes dropped because the buffer was full.
    dropped: usize,
    /// The last byte seen was a CR.
    after_cr: bool,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        FrameAssembler {
            buffer: [0u8; FRAME_CAPACITY],
            len: 0,
            dropped: 0,
            after_cr: false,
        }
    }

    /// Maximum number of bytes a frame can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes in the current frame.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the current frame is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes dropped on overflow since the last reset.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The bytes of the current frame.
    pub fn frame(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Feed a single byte.
    ///
    /// Terminators are never stored. Other bytes are appended while there is
    /// room and silently dropped otherwise. The LF of a CR LF pair is
    /// swallowed without completing another frame.
    pub fn accumulate(&mut self, byte: u8) -> FrameStatus {
        if byte == LF && self.after_cr {
            self.after_cr = false;
            return FrameStatus {
                complete: false,
                len: self.len,
            };
        }
        self.after_cr = byte == CR;

        if is_terminator(byte) {
            return FrameStatus {
                complete: true,
                len: self.len,
            };
        }

        match self.buffer.get_mut(self.len) {
            Some(slot) => {
                *slot = byte;
                self.len += 1;
            }
            None => {
                if self.dropped == 0 {
                    log::warn!(
                        "frame overflow: line longer than {} bytes, dropping input until end of line",
                        FRAME_CAPACITY
                    );
                }
                self.dropped += 1;
            }
        }

        FrameStatus {
            complete: false,
            len: self.len,
        }
    }

    /// Run one accumulation pass over the available bytes.
    ///
    /// Pulls bytes until the first terminator or until `bytes` runs dry.
    /// Anything after the terminator is left unread for the next pass.
    /// Trailing terminators are trimmed from the frame afterwards.
    pub fn accumulate_pass<I>(&mut self, bytes: I) -> FrameStatus
    where
        I: IntoIterator<Item = u8>,
    {
        let mut complete = false;
        for byte in bytes {
            if self.accumulate(byte).complete {
                complete = true;
                break;
            }
        }
        self.trim_trailing_terminators();

        FrameStatus {
            complete,
            len: self.len,
        }
    }

    /// Remove a trailing CR, LF or CR LF pair from the frame.
    ///
    /// Does nothing when the frame does not end in a terminator.
    pub fn trim_trailing_terminators(&mut self) {
        for _ in 0..2 {
            match self.frame().last() {
                Some(&last) if is_terminator(last) => self.len -= 1,
                _ => break,
            }
        }
    }

    /// Clear the frame for reuse.
    ///
    /// A CR that ended the previous frame is remembered, so its LF is still
    /// skipped.
    pub fn reset(&mut self) {
        self.len = 0;
        self.dropped = 0;
    }
}
