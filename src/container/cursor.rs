use crate::foundation::error::DecodeError;

/// Sequential little-endian reader over a borrowed byte buffer.
///
/// Every read checks bounds and reports a truncated buffer as
/// [`DecodeError::MalformedStructure`].
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Start reading at offset zero.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current offset.
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Move to an absolute offset. Seeking to exactly the end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<(), DecodeError> {
        if pos > self.bytes.len() {
            return Err(DecodeError::malformed(format!(
                "seek to offset {pos} past end of {}-byte buffer",
                self.bytes.len()
            )));
        }
        self.pos = pos;
        Ok(())
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                DecodeError::malformed(format!(
                    "need {len} bytes at offset {}, only {} left",
                    self.pos,
                    self.remaining()
                ))
            })?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `f32`.
    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read an 8-byte little-endian offset of which only the low 48 bits are significant.
    pub fn read_u64_48(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?) & 0x0000_FFFF_FFFF_FFFF)
    }

    /// Read a null-terminated string of at most `max_len` bytes (terminator excluded).
    pub fn read_cstr(&mut self, max_len: usize) -> Result<String, DecodeError> {
        let rest = &self.bytes[self.pos.min(self.bytes.len())..];
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| DecodeError::malformed("unterminated string"))?;
        if len > max_len {
            return Err(DecodeError::malformed(format!(
                "string of {len} bytes exceeds limit of {max_len}"
            )));
        }
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(text)
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/container/cursor.rs"]
mod tests;
