//! Borrowed TLV views and the two TLV chain walkers
//!
//! CDP and LLDP both encode their payload as a chain of Type-Length-Value
//! records, but with different headers:
//!
//! - CDP: 2-byte big-endian type, 2-byte big-endian *total* length (header
//!   included, minimum 4)
//! - LLDP: one 16-bit word, type in the top 7 bits, payload length in the
//!   bottom 9 bits; type 0 ends the chain
//!
//! Both walkers yield `Ok(Tlv)` for every well-formed record and a single
//! `Err(Error::MalformedTlv)` when a declared length overruns the buffer,
//! after which they are exhausted. Nothing already yielded is invalidated.

use linkscout_core::Error;

/// A decoded (type, length, payload) view into a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    /// TLV type code
    pub tlv_type: u16,
    /// Payload length in bytes (header excluded)
    pub length: usize,
    /// Payload bytes
    pub payload: &'a [u8],
    /// Offset of the TLV header within the walked buffer
    pub offset: usize,
}

/// Walker over a CDP TLV chain
#[derive(Debug, Clone)]
pub struct CdpTlvIter<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> CdpTlvIter<'a> {
    /// Walk `data` starting at `offset`
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            offset,
            done: false,
        }
    }
}

impl<'a> Iterator for CdpTlvIter<'a> {
    type Item = Result<Tlv<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let offset = self.offset;
        // Fewer than 4 bytes left is trailing padding, not a fault
        let header = match self.data.get(offset..offset + 4) {
            Some(h) => h,
            None => {
                self.done = true;
                return None;
            }
        };

        let tlv_type = u16::from_be_bytes([header[0], header[1]]);
        let total_len = u16::from_be_bytes([header[2], header[3]]) as usize;

        if total_len < 4 {
            self.done = true;
            return Some(Err(Error::malformed(
                offset,
                format!("CDP TLV 0x{:04x} declares length {} (< 4)", tlv_type, total_len),
            )));
        }

        let remaining = self.data.len() - offset;
        if total_len > remaining {
            self.done = true;
            return Some(Err(Error::malformed(
                offset,
                format!(
                    "CDP TLV 0x{:04x} length {} exceeds {} remaining bytes",
                    tlv_type, total_len, remaining
                ),
            )));
        }

        self.offset += total_len;
        Some(Ok(Tlv {
            tlv_type,
            length: total_len - 4,
            payload: &self.data[offset + 4..offset + total_len],
            offset,
        }))
    }
}

/// Walker over an LLDP TLV chain
#[derive(Debug, Clone)]
pub struct LldpTlvIter<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> LldpTlvIter<'a> {
    /// Walk `data` starting at `offset`
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            offset,
            done: false,
        }
    }
}

impl<'a> Iterator for LldpTlvIter<'a> {
    type Item = Result<Tlv<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let offset = self.offset;
        let header = match self.data.get(offset..offset + 2) {
            Some(h) => h,
            None => {
                self.done = true;
                return None;
            }
        };

        let word = u16::from_be_bytes([header[0], header[1]]);
        let tlv_type = (word >> 9) & 0x7F;
        let length = (word & 0x01FF) as usize;

        // End of LLDPDU
        if tlv_type == 0 {
            self.done = true;
            return None;
        }

        let start = offset + 2;
        let remaining = self.data.len() - start;
        if length > remaining {
            self.done = true;
            return Some(Err(Error::malformed(
                offset,
                format!(
                    "LLDP TLV {} length {} exceeds {} remaining bytes",
                    tlv_type, length, remaining
                ),
            )));
        }

        self.offset = start + length;
        Some(Ok(Tlv {
            tlv_type,
            length,
            payload: &self.data[start..start + length],
            offset,
        }))
    }
}

/// Decode text the way both protocols carry it: UTF-8 with invalid
/// sequences dropped and surrounding NUL padding removed
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect::<String>()
        .trim_matches('\0')
        .to_string()
}

/// Like [`decode_text`], but an empty result counts as absent
pub(crate) fn decode_field(bytes: &[u8]) -> Option<String> {
    let text = decode_text(bytes);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Read a big-endian u16 at `at`, if present
pub(crate) fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    let b = data.get(at..at + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

/// Read a big-endian u32 at `at`, if present
pub(crate) fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdp_walk() {
        let data = [
            0x00, 0x01, 0x00, 0x07, b'a', b'b', b'c', // DeviceID "abc"
            0x00, 0x0A, 0x00, 0x06, 0x00, 0x0A, // NativeVlan 10
        ];
        let tlvs: Vec<_> = CdpTlvIter::new(&data, 0).collect();
        assert_eq!(tlvs.len(), 2);

        let first = tlvs[0].as_ref().unwrap();
        assert_eq!(first.tlv_type, 1);
        assert_eq!(first.length, 3);
        assert_eq!(first.payload, b"abc");

        let second = tlvs[1].as_ref().unwrap();
        assert_eq!(second.tlv_type, 0x0A);
        assert_eq!(second.offset, 7);
    }

    #[test]
    fn test_cdp_walk_overrun() {
        let data = [
            0x00, 0x01, 0x00, 0x05, b'x', // ok
            0x00, 0x03, 0x00, 0x40, b'y', // declares 64 bytes
            0x00, 0x01, 0x00, 0x05, b'z', // never reached
        ];
        let mut iter = CdpTlvIter::new(&data, 0);
        assert!(iter.next().unwrap().is_ok());
        match iter.next() {
            Some(Err(Error::MalformedTlv { offset, .. })) => assert_eq!(offset, 5),
            other => panic!("expected MalformedTlv, got {:?}", other),
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_cdp_walk_short_length() {
        let data = [0x00, 0x01, 0x00, 0x02, 0x00, 0x00];
        let mut iter = CdpTlvIter::new(&data, 0);
        assert!(matches!(iter.next(), Some(Err(Error::MalformedTlv { .. }))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_cdp_walk_trailing_padding() {
        let data = [0x00, 0x01, 0x00, 0x05, b'x', 0x00, 0x00];
        let tlvs: Vec<_> = CdpTlvIter::new(&data, 0).collect();
        assert_eq!(tlvs.len(), 1);
        assert!(tlvs[0].is_ok());
    }

    #[test]
    fn test_lldp_walk_stops_at_end() {
        // SystemName(5) len 2, End, then garbage
        let data = [0x0A, 0x02, b'h', b'i', 0x00, 0x00, 0xFF, 0xFF];
        let tlvs: Vec<_> = LldpTlvIter::new(&data, 0).collect();
        assert_eq!(tlvs.len(), 1);
        let tlv = tlvs[0].as_ref().unwrap();
        assert_eq!(tlv.tlv_type, 5);
        assert_eq!(tlv.payload, b"hi");
    }

    #[test]
    fn test_lldp_walk_nine_bit_length() {
        // type 6, length 0x1FF in the low 9 bits
        let word: u16 = (6 << 9) | 0x1FF;
        let mut data = word.to_be_bytes().to_vec();
        data.extend(std::iter::repeat(b'd').take(0x1FF));
        let tlvs: Vec<_> = LldpTlvIter::new(&data, 0).collect();
        assert_eq!(tlvs.len(), 1);
        assert_eq!(tlvs[0].as_ref().unwrap().length, 511);
    }

    #[test]
    fn test_lldp_walk_overrun() {
        let data = [0x0A, 0x10, b'h', b'i'];
        let mut iter = LldpTlvIter::new(&data, 0);
        assert!(matches!(iter.next(), Some(Err(Error::MalformedTlv { offset: 0, .. }))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"switch-01\0"), "switch-01");
        assert_eq!(decode_text(b"\0\0sw\0"), "sw");
        assert_eq!(decode_text(&[b'o', 0xFF, b'k']), "ok");
        assert_eq!(decode_field(b"\0\0"), None);
        assert_eq!(decode_field(b"Gi0/1"), Some("Gi0/1".to_string()));
    }

    #[test]
    fn test_be_readers() {
        let data = [0x00, 0x0A, 0x00, 0x00, 0x00, 0x28];
        assert_eq!(be_u16(&data, 0), Some(10));
        assert_eq!(be_u32(&data, 2), Some(0x28));
        assert_eq!(be_u16(&data, 5), None);
        assert_eq!(be_u32(&data, 3), None);
    }
}
