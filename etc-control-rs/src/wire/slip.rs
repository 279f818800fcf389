//! SLIP framing (RFC 1055).
//!
//! Frames are sent with a leading and a trailing `END` so a receiver that
//! joined mid-stream resynchronises on the next frame. Empty frames
//! between back-to-back delimiters are skipped.

use crate::error::WireError;

pub const END: u8 = 0xC0;
pub const ESC: u8 = 0xDB;
pub const ESC_END: u8 = 0xDC;
pub const ESC_ESC: u8 = 0xDD;

/// Incremental SLIP decoder with an `N`-byte frame buffer.
#[derive(Debug)]
pub struct SlipDecoder<const N: usize> {
    buf: [u8; N],
    len: usize,
    escaped: bool,
    error: Option<WireError>,
}

impl<const N: usize> Default for SlipDecoder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SlipDecoder<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
            escaped: false,
            error: None,
        }
    }

    /// Consume one byte.
    ///
    /// Returns `Ok(Some(frame))` when `byte` closes a non-empty frame, and
    /// `Err` when it closes a frame that overflowed or contained a bad
    /// escape. The decoder is ready for the next frame either way.
    pub fn push(&mut self, byte: u8) -> Result<Option<&[u8]>, WireError> {
        if byte == END {
            let len = self.len;
            let error = self.error.take();
            self.len = 0;
            self.escaped = false;
            if let Some(e) = error {
                return Err(e);
            }
            return Ok((len > 0).then(|| &self.buf[..len]));
        }

        if self.error.is_some() {
            return Ok(None);
        }

        let decoded = if self.escaped {
            self.escaped = false;
            match byte {
                ESC_END => END,
                ESC_ESC => ESC,
                _ => {
                    self.error = Some(WireError::BadEscape);
                    return Ok(None);
                }
            }
        } else if byte == ESC {
            self.escaped = true;
            return Ok(None);
        } else {
            byte
        };

        if self.len == N {
            self.error = Some(WireError::FrameTooLong);
            return Ok(None);
        }
        self.buf[self.len] = decoded;
        self.len += 1;
        Ok(None)
    }
}

/// SLIP-encode `payload` into `out` with leading and trailing `END`.
///
/// Returns the number of bytes written, or
/// [`WireError::BufferTooSmall`].
pub fn encode(payload: &[u8], out: &mut [u8]) -> Result<usize, WireError> {
    let mut pos = 0;
    let mut put = |b: u8| -> Result<(), WireError> {
        let slot = out.get_mut(pos).ok_or(WireError::BufferTooSmall)?;
        *slot = b;
        pos += 1;
        Ok(())
    };

    put(END)?;
    for &b in payload {
        match b {
            END => {
                put(ESC)?;
                put(ESC_END)?;
            }
            ESC => {
                put(ESC)?;
                put(ESC_ESC)?;
            }
            _ => put(b)?,
        }
    }
    put(END)?;
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames<const N: usize>(dec: &mut SlipDecoder<N>, bytes: &[u8]) -> Vec<Result<Vec<u8>, WireError>> {
        let mut out = Vec::new();
        for &b in bytes {
            match dec.push(b) {
                Ok(Some(frame)) => out.push(Ok(frame.to_vec())),
                Ok(None) => {}
                Err(e) => out.push(Err(e)),
            }
        }
        out
    }

    #[test]
    fn plain_frame() {
        let mut dec = SlipDecoder::<16>::new();
        assert_eq!(frames(&mut dec, &[END, 1, 2, 3, END]), [Ok(vec![1, 2, 3])]);
    }

    #[test]
    fn escapes_are_decoded() {
        let mut dec = SlipDecoder::<16>::new();
        let got = frames(&mut dec, &[END, ESC, ESC_END, 9, ESC, ESC_ESC, END]);
        assert_eq!(got, [Ok(vec![END, 9, ESC])]);
    }

    #[test]
    fn empty_frames_are_skipped() {
        let mut dec = SlipDecoder::<16>::new();
        assert!(frames(&mut dec, &[END, END, END]).is_empty());
    }

    #[test]
    fn overflow_drops_frame_and_recovers() {
        let mut dec = SlipDecoder::<2>::new();
        let got = frames(&mut dec, &[1, 2, 3, END, 4, END]);
        assert_eq!(got, [Err(WireError::FrameTooLong), Ok(vec![4])]);
    }

    #[test]
    fn bad_escape_drops_frame() {
        let mut dec = SlipDecoder::<8>::new();
        let got = frames(&mut dec, &[ESC, 0x01, 5, END, 6, END]);
        assert_eq!(got, [Err(WireError::BadEscape), Ok(vec![6])]);
    }

    #[test]
    fn encode_escapes_and_delimits() {
        let mut out = [0u8; 16];
        let n = encode(&[1, END, ESC, 2], &mut out).unwrap();
        assert_eq!(&out[..n], &[END, 1, ESC, ESC_END, ESC, ESC_ESC, 2, END]);
    }

    #[test]
    fn encode_reports_small_buffer() {
        let mut out = [0u8; 3];
        assert_eq!(encode(&[1, 2], &mut out), Err(WireError::BufferTooSmall));
    }

    #[test]
    fn encoded_frame_decodes_to_payload() {
        let payload = [0u8, END, 7, ESC, ESC_END, 255];
        let mut out = [0u8; 32];
        let n = encode(&payload, &mut out).unwrap();
        let mut dec = SlipDecoder::<32>::new();
        assert_eq!(frames(&mut dec, &out[..n]), [Ok(payload.to_vec())]);
    }
}
