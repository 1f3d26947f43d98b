//! String encodings of the raw format.
//!
//! Modified UTF-8 encodes every UTF-16 code unit on its own: NUL takes two
//! bytes, and supplementary characters become two three-byte surrogates.

use weft_core::CodecError;

/// How strings are laid out. Type tags always use modified UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StringEncoding {
    /// A big-endian `u16` byte length, then modified UTF-8.
    #[default]
    ModifiedUtf8,
    /// A big-endian `u16` code unit count, then big-endian UTF-16.
    Utf16,
}

fn too_long(what: &str, len: usize) -> CodecError {
    CodecError::backend(format!(
        "string needs {len} {what}, more than the {} a length prefix can hold",
        u16::MAX
    ))
}

/// Encodes `text` with its length prefix.
pub(crate) fn encode(text: &str, encoding: StringEncoding) -> Result<Vec<u8>, CodecError> {
    match encoding {
        StringEncoding::ModifiedUtf8 => {
            let mut out = vec![0, 0];
            for unit in text.encode_utf16() {
                match unit {
                    0x0001..=0x007f => out.push(unit as u8),
                    0x0000 | 0x0080..=0x07ff => {
                        out.push(0xc0 | (unit >> 6) as u8);
                        out.push(0x80 | (unit & 0x3f) as u8);
                    }
                    _ => {
                        out.push(0xe0 | (unit >> 12) as u8);
                        out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                        out.push(0x80 | (unit & 0x3f) as u8);
                    }
                }
            }
            let len = out.len() - 2;
            let prefix = u16::try_from(len).map_err(|_| too_long("bytes", len))?;
            out[..2].copy_from_slice(&prefix.to_be_bytes());
            Ok(out)
        }
        StringEncoding::Utf16 => {
            let units: Vec<u16> = text.encode_utf16().collect();
            let prefix =
                u16::try_from(units.len()).map_err(|_| too_long("code units", units.len()))?;
            let mut out = Vec::with_capacity(2 + units.len() * 2);
            out.extend_from_slice(&prefix.to_be_bytes());
            for unit in units {
                out.extend_from_slice(&unit.to_be_bytes());
            }
            Ok(out)
        }
    }
}

/// Decodes `len` bytes of modified UTF-8.
pub(crate) fn decode_modified_utf8(bytes: &[u8]) -> Result<String, CodecError> {
    let malformed =
        |at: usize| CodecError::backend(format!("malformed modified UTF-8 at byte {at}"));
    let mut units = Vec::with_capacity(bytes.len());
    let mut at = 0;
    while at < bytes.len() {
        let lead = bytes[at];
        let continuation = |offset: usize| match bytes.get(at + offset) {
            Some(byte) if byte & 0xc0 == 0x80 => Ok(u16::from(byte & 0x3f)),
            _ => Err(malformed(at + offset)),
        };
        match lead {
            0x00..=0x7f => {
                units.push(u16::from(lead));
                at += 1;
            }
            0xc0..=0xdf => {
                units.push((u16::from(lead & 0x1f) << 6) | continuation(1)?);
                at += 2;
            }
            0xe0..=0xef => {
                let high = u16::from(lead & 0x0f) << 12;
                units.push(high | (continuation(1)? << 6) | continuation(2)?);
                at += 3;
            }
            _ => return Err(malformed(at)),
        }
    }
    String::from_utf16(&units)
        .map_err(|_| CodecError::backend("modified UTF-8 holds an unpaired surrogate"))
}

/// Decodes big-endian UTF-16 code units.
pub(crate) fn decode_utf16(bytes: &[u8]) -> Result<String, CodecError> {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|_| CodecError::backend("UTF-16 holds an unpaired surrogate"))
}
