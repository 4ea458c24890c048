//! MSB-first bit reader with a non-consuming peek.

use std::io::{Cursor, SeekFrom};

use bitstream_io::{BigEndian, BitRead, BitReader as RawReader};

use crate::error::{Error, Result};

pub struct BitReader<'a> {
    inner: RawReader<Cursor<&'a [u8]>, BigEndian>,
    position: u64,
    total_bits: u64,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            inner: RawReader::endian(Cursor::new(data), BigEndian),
            position: 0,
            total_bits: data.len() as u64 * 8,
        }
    }

    /// Bits consumed so far.
    pub fn position_bits(&self) -> u64 {
        self.position
    }

    pub fn remaining_bits(&self) -> u64 {
        self.total_bits - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.total_bits
    }

    /// Next bit, or `None` once every byte has been consumed.
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.is_at_end() {
            return Ok(None);
        }
        let bit = self.inner.read_bit()?;
        self.position += 1;
        Ok(Some(bit))
    }

    /// Next bit without advancing.
    pub fn peek_bit(&mut self) -> Result<Option<bool>> {
        let saved = self.position;
        let bit = self.read_bit()?;
        if bit.is_some() {
            self.inner.seek_bits(SeekFrom::Start(saved))?;
            self.position = saved;
        }
        Ok(bit)
    }

    /// Read `width` bits as a big-endian unsigned integer.
    pub fn read_fixed_width(&mut self, width: u32) -> Result<u32> {
        if width > 32 {
            return Err(Error::Internal(format!("cannot read {width} bits into a u32")));
        }
        if u64::from(width) > self.remaining_bits() {
            return Err(Error::UnexpectedEndOfStream {
                needed_bits: u64::from(width),
                available_bits: self.remaining_bits(),
            });
        }
        if width == 0 {
            return Ok(0);
        }
        let value = self.inner.read_var::<u32>(width)?;
        self.position += u64::from(width);
        Ok(value)
    }
}
