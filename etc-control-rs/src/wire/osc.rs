//! OSC 1.0 message encoding.
//!
//! Only messages are supported (no bundles) with `i`, `f`, and `b`
//! arguments. Strings are NUL-terminated and padded to a multiple of four
//! bytes; numbers are big-endian.

use heapless::{String, Vec};

use super::message::{Arg, Message, MAX_ARGS};
use crate::error::WireError;

/// Decode one OSC message packet.
///
/// A packet consisting of only an address (no type tag string) is accepted
/// as a message without arguments.
pub fn decode(packet: &[u8]) -> Result<Message, WireError> {
    let mut reader = Reader { data: packet, pos: 0 };

    let address = reader.read_str().map_err(|e| match e {
        WireError::Truncated => WireError::Truncated,
        _ => WireError::BadAddress,
    })?;
    if !address.starts_with('/') {
        return Err(WireError::BadAddress);
    }
    let mut msg = Message::new(address)?;

    if reader.is_empty() {
        return Ok(msg);
    }

    let tags = reader.read_str()?;
    let tags = tags.strip_prefix(',').ok_or(WireError::BadTypeTags)?;

    for tag in tags.bytes() {
        let arg = match tag {
            b'i' => Arg::Int(reader.read_i32()?),
            b'f' => Arg::Float(f32::from_bits(reader.read_i32()? as u32)),
            b'b' => {
                let len = usize::try_from(reader.read_i32()?).map_err(|_| WireError::Truncated)?;
                let bytes = reader.read_padded(len)?;
                Arg::Blob(Vec::from_slice(bytes).map_err(|_| WireError::CapacityExceeded)?)
            }
            other => return Err(WireError::UnsupportedType(other)),
        };
        msg.push(arg)?;
    }

    Ok(msg)
}

/// Encode `msg` into `out`, returning the packet length.
pub fn encode(msg: &Message, out: &mut [u8]) -> Result<usize, WireError> {
    let mut tags: String<{ MAX_ARGS + 1 }> = String::new();
    let _ = tags.push(',');
    for arg in msg.args() {
        let tag = match arg {
            Arg::Int(_) => 'i',
            Arg::Float(_) => 'f',
            Arg::Blob(_) => 'b',
        };
        tags.push(tag).map_err(|_| WireError::CapacityExceeded)?;
    }

    let mut writer = Writer { out, pos: 0 };
    writer.write_str(msg.address())?;
    writer.write_str(&tags)?;

    for arg in msg.args() {
        match arg {
            Arg::Int(v) => writer.write(&v.to_be_bytes())?,
            Arg::Float(v) => writer.write(&v.to_bits().to_be_bytes())?,
            Arg::Blob(bytes) => {
                writer.write(&(bytes.len() as i32).to_be_bytes())?;
                writer.write(bytes)?;
                writer.pad()?;
            }
        }
    }

    Ok(writer.pos)
}

/// Round `n` up to the next multiple of four.
const fn padded(n: usize) -> usize {
    (n + 3) & !3
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self.pos.checked_add(n).ok_or(WireError::Truncated)?;
        let bytes = self.data.get(self.pos..end).ok_or(WireError::Truncated)?;
        self.pos = end;
        Ok(bytes)
    }

    fn read_str(&mut self) -> Result<&'a str, WireError> {
        let rest = self.data.get(self.pos..).ok_or(WireError::Truncated)?;
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(WireError::Truncated)?;
        let bytes = self.take(padded(nul + 1))?;
        core::str::from_utf8(&bytes[..nul]).map_err(|_| WireError::BadTypeTags)
    }

    fn read_i32(&mut self) -> Result<i32, WireError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_padded(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let bytes = self.take(padded(len))?;
        Ok(&bytes[..len])
    }
}

struct Writer<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let end = self.pos + bytes.len();
        let dst = self
            .out
            .get_mut(self.pos..end)
            .ok_or(WireError::BufferTooSmall)?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Zero-fill up to the next four-byte boundary.
    fn pad(&mut self) -> Result<(), WireError> {
        const ZEROS: [u8; 4] = [0; 4];
        let fill = padded(self.pos) - self.pos;
        self.write(&ZEROS[..fill])
    }

    fn write_str(&mut self, s: &str) -> Result<(), WireError> {
        self.write(s.as_bytes())?;
        self.write(&[0])?;
        self.pad()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Decoding ─────────────────────────────────────────────────────

    #[test]
    fn decodes_int_message() {
        let packet = b"/led\0\0\0\0,i\0\0\0\0\0\x05";
        let msg = decode(packet).unwrap();
        assert_eq!(msg.address(), "/led");
        assert_eq!(msg.int(0), Some(5));
    }

    #[test]
    fn decodes_message_without_args() {
        let msg = decode(b"/ready\0\0,\0\0\0").unwrap();
        assert_eq!(msg.address(), "/ready");
        assert!(msg.args().is_empty());
    }

    #[test]
    fn accepts_missing_type_tags() {
        let msg = decode(b"/nf\0").unwrap();
        assert_eq!(msg.address(), "/nf");
        assert!(msg.args().is_empty());
    }

    #[test]
    fn decodes_negative_int_and_float() {
        let mut packet = b"/x\0\0,if\0".to_vec();
        packet.extend_from_slice(&(-3i32).to_be_bytes());
        packet.extend_from_slice(&1.5f32.to_bits().to_be_bytes());
        let msg = decode(&packet).unwrap();
        assert_eq!(msg.args(), &[Arg::Int(-3), Arg::Float(1.5)]);
    }

    #[test]
    fn decodes_blob() {
        let packet = b"/b\0\0,b\0\0\0\0\0\x03\x01\x02\x03\0";
        let msg = decode(packet).unwrap();
        assert_eq!(msg.blob(0), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn rejects_address_without_slash() {
        assert_eq!(decode(b"led\0,\0\0\0"), Err(WireError::BadAddress));
    }

    #[test]
    fn rejects_tags_without_comma() {
        assert_eq!(decode(b"/led\0\0\0\0i\0\0\0"), Err(WireError::BadTypeTags));
    }

    #[test]
    fn rejects_truncated_argument() {
        assert_eq!(decode(b"/led\0\0\0\0,i\0\0\0\0"), Err(WireError::Truncated));
    }

    #[test]
    fn rejects_unterminated_address() {
        assert_eq!(decode(b"/led"), Err(WireError::Truncated));
    }

    #[test]
    fn rejects_unknown_type() {
        assert_eq!(
            decode(b"/s\0\0,s\0\0abc\0"),
            Err(WireError::UnsupportedType(b's'))
        );
    }

    #[test]
    fn rejects_oversized_blob() {
        let mut packet = b"/b\0\0,b\0\0".to_vec();
        packet.extend_from_slice(&64i32.to_be_bytes());
        packet.extend_from_slice(&[0u8; 64]);
        assert_eq!(decode(&packet), Err(WireError::CapacityExceeded));
    }

    // ── Encoding ─────────────────────────────────────────────────────

    #[test]
    fn encodes_padded_address_and_tags() {
        let msg = Message::new("/key").unwrap().with_int(2).unwrap().with_int(100).unwrap();
        let mut out = [0u8; 64];
        let n = encode(&msg, &mut out).unwrap();
        assert_eq!(
            &out[..n],
            b"/key\0\0\0\0,ii\0\0\0\0\x02\0\0\0\x64"
        );
    }

    #[test]
    fn encodes_blob_with_padding() {
        let msg = Message::new("/b").unwrap().with_blob(&[9, 8, 7, 6, 5]).unwrap();
        let mut out = [0u8; 64];
        let n = encode(&msg, &mut out).unwrap();
        assert_eq!(n, 4 + 4 + 4 + 8);
        assert_eq!(&out[8..12], &5i32.to_be_bytes());
        assert_eq!(&out[12..20], &[9, 8, 7, 6, 5, 0, 0, 0]);
        assert_eq!(decode(&out[..n]).unwrap(), msg);
    }

    #[test]
    fn encode_reports_small_buffer() {
        let msg = Message::new("/knobs").unwrap();
        let mut out = [0u8; 6];
        assert_eq!(encode(&msg, &mut out), Err(WireError::BufferTooSmall));
    }
}
