use crate::error::codec::CodecError;

use common::ErrorLocation;

use std::panic::Location;

/// Bounds-checked cursor over one received frame.
///
/// Every read validates the remaining length first and reports the field that
/// ran short, so a lying length prefix can never index past the buffer.
pub(crate) struct FrameReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> FrameReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    #[track_caller]
    pub(crate) fn read_bytes(&mut self, length: usize, field: &str) -> Result<&'a [u8], CodecError> {
        let end = self
            .position
            .checked_add(length)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| CodecError::TruncatedFrame {
                message: format!(
                    "{field} needs {length} bytes at offset {}, only {} available",
                    self.position,
                    self.remaining()
                ),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    #[track_caller]
    pub(crate) fn read_u8(&mut self, field: &str) -> Result<u8, CodecError> {
        let [byte] = self.read_array::<1>(field)?;
        Ok(byte)
    }

    #[track_caller]
    pub(crate) fn read_u16_le(&mut self, field: &str) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.read_array(field)?))
    }

    #[track_caller]
    pub(crate) fn read_f32_le(&mut self, field: &str) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.read_array(field)?))
    }

    /// Reads `length` bytes as text; invalid UTF-8 is replaced rather than rejected.
    #[track_caller]
    pub(crate) fn read_text(&mut self, length: usize, field: &str) -> Result<String, CodecError> {
        let bytes = self.read_bytes(length, field)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    #[track_caller]
    fn read_array<const N: usize>(&mut self, field: &str) -> Result<[u8; N], CodecError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N, field)?);
        Ok(array)
    }
}
