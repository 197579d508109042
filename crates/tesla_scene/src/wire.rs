//! Little-endian primitive encoding
//!
//! Every multi-byte value in a `.tesm` file is little-endian. Strings are a
//! `u32` byte length followed by UTF-8 bytes.

use crate::error::{DecodeResult, FormatError, TruncatedInputError};

/// Append-only byte sink
#[derive(Debug, Default)]
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32_slice(&mut self, values: &[f32]) {
        self.buffer.reserve(values.len() * 4);
        for value in values {
            self.write_f32(*value);
        }
    }

    pub fn write_u32_slice(&mut self, values: &[u32]) {
        self.buffer.reserve(values.len() * 4);
        for value in values {
            self.write_u32(*value);
        }
    }

    /// Length-prefixed UTF-8 string. The caller checks the length limit.
    pub fn write_str(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.write_bytes(value.as_bytes());
    }

    /// Overwrite a previously written `u32` (used to back-patch sizes)
    pub fn patch_u32(&mut self, position: usize, value: u32) {
        self.buffer[position..position + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Bounds-checked cursor over a byte slice
///
/// Offsets reported in errors are absolute positions in the input buffer,
/// also for readers produced by [`WireReader::split`].
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    /// Absolute offset of the next byte to be read
    #[inline]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn underrun(&self, needed: usize) -> TruncatedInputError {
        TruncatedInputError {
            offset: self.offset(),
            needed,
            available: self.remaining(),
        }
    }

    /// Fail unless at least `len` bytes remain
    pub fn ensure(&self, len: usize) -> Result<(), TruncatedInputError> {
        if len > self.remaining() {
            return Err(self.underrun(len));
        }
        Ok(())
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], TruncatedInputError> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Carve the next `len` bytes off into an independent reader
    pub fn split(&mut self, len: usize) -> Result<WireReader<'a>, TruncatedInputError> {
        let base = self.offset();
        let data = self.read_bytes(len)?;
        Ok(WireReader { data, pos: 0, base })
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TruncatedInputError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, TruncatedInputError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, TruncatedInputError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, TruncatedInputError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, TruncatedInputError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read `count` floats; the byte length is checked before allocating
    pub fn read_f32_vec(&mut self, count: usize) -> Result<Vec<f32>, TruncatedInputError> {
        let bytes = self.read_counted(count)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    /// Read `count` u32 values; the byte length is checked before allocating
    pub fn read_u32_vec(&mut self, count: usize) -> Result<Vec<u32>, TruncatedInputError> {
        let bytes = self.read_counted(count)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    fn read_counted(&mut self, count: usize) -> Result<&'a [u8], TruncatedInputError> {
        match count.checked_mul(4) {
            Some(len) => self.read_bytes(len),
            None => Err(self.underrun(usize::MAX)),
        }
    }

    /// Length-prefixed UTF-8 string of at most `max_len` bytes
    pub fn read_str(&mut self, max_len: u32) -> DecodeResult<String> {
        let offset = self.offset();
        let len = self.read_u32()?;
        if len > max_len {
            return Err(FormatError::StringTooLong {
                offset,
                len,
                max: max_len,
            }
            .into());
        }
        let bytes = self.read_bytes(len as usize)?;
        let value = std::str::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { offset })?;
        Ok(value.to_owned())
    }
}
