//! MSB-first bit writer over a buffer of fixed size.
//! The size is decided up front; the buffer never grows.

use std::io::{self, Cursor};

use bitstream_io::{BigEndian, BitWrite, BitWriter as RawWriter};

use crate::codeword::Codeword;
use crate::error::{Error, Result};

pub struct BitWriter {
    inner: RawWriter<Cursor<Box<[u8]>>, BigEndian>,
    written: u64,
    capacity_bits: u64,
}

impl BitWriter {
    /// Allocate a zeroed buffer of exactly `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        let buffer = vec![0u8; bytes].into_boxed_slice();
        BitWriter {
            inner: RawWriter::endian(Cursor::new(buffer), BigEndian),
            written: 0,
            capacity_bits: bytes as u64 * 8,
        }
    }

    /// Bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.written
    }

    fn reserve(&mut self, bits: u64) -> Result<()> {
        if self.written + bits > self.capacity_bits {
            return Err(Error::overrun(format!(
                "writing {bits} bits at bit {} exceeds capacity of {} bits",
                self.written, self.capacity_bits
            )));
        }
        self.written += bits;
        Ok(())
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.reserve(1)?;
        self.inner.write_bit(bit).map_err(map_io)
    }

    /// Write the low `width` bits of `value`, most significant first.
    pub fn write_fixed_width(&mut self, value: u32, width: u32) -> Result<()> {
        if width > 32 || (width < 32 && value >> width != 0) {
            return Err(Error::Internal(format!(
                "value {value:#x} does not fit in {width} bits"
            )));
        }
        if width == 0 {
            return Ok(());
        }
        self.reserve(u64::from(width))?;
        self.inner.write_var(width, value).map_err(map_io)
    }

    pub fn write_codeword(&mut self, codeword: Codeword) -> Result<()> {
        self.write_fixed_width(u32::from(codeword.value()), codeword.len() as u32)
    }

    /// Pad the last partial byte with zero bits and hand back the buffer
    /// together with the number of pad bits (0-7).
    ///
    /// Fails if the padded output does not fill the buffer exactly.
    pub fn finish(mut self) -> Result<(Vec<u8>, u8)> {
        let padding = ((8 - self.written % 8) % 8) as u8;
        self.reserve(u64::from(padding))?;
        self.inner.byte_align().map_err(map_io)?;

        if self.written != self.capacity_bits {
            return Err(Error::overrun(format!(
                "wrote {} of {} bytes",
                self.written / 8,
                self.capacity_bits / 8
            )));
        }

        let buffer = self.inner.into_writer().into_inner().into_vec();
        Ok((buffer, padding))
    }
}

fn map_io(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::WriteZero {
        Error::overrun(err.to_string())
    } else {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_packed_msb_first() {
        let mut writer = BitWriter::with_capacity(1);
        for bit in [true, false, true, true] {
            writer.write_bit(bit).unwrap();
        }
        let (bytes, padding) = writer.finish().unwrap();
        assert_eq!(bytes, vec![0b1011_0000]);
        assert_eq!(padding, 4);
    }

    #[test]
    fn fixed_width_is_big_endian() {
        let mut writer = BitWriter::with_capacity(7);
        writer.write_fixed_width(0x0102, 16).unwrap();
        writer.write_fixed_width(0xdead_beef, 32).unwrap();
        writer.write_fixed_width(7, 8).unwrap();
        let (bytes, padding) = writer.finish().unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0xde, 0xad, 0xbe, 0xef, 0x07]);
        assert_eq!(padding, 0);
    }

    #[test]
    fn codewords_cross_byte_boundaries() {
        let mut writer = BitWriter::with_capacity(2);
        writer.write_codeword(Codeword::new(0b101, 3).unwrap()).unwrap();
        writer.write_codeword(Codeword::new(0b1_1111_1111, 9).unwrap()).unwrap();
        assert_eq!(writer.bits_written(), 12);
        let (bytes, padding) = writer.finish().unwrap();
        assert_eq!(bytes, vec![0b1011_1111, 0b1111_0000]);
        assert_eq!(padding, 4);
    }

    #[test]
    fn overrun_is_reported() {
        let mut writer = BitWriter::with_capacity(1);
        writer.write_fixed_width(0xff, 8).unwrap();
        assert!(matches!(
            writer.write_bit(true),
            Err(Error::BufferOverrun { .. })
        ));
    }

    #[test]
    fn underfilled_buffer_is_reported() {
        let mut writer = BitWriter::with_capacity(2);
        writer.write_fixed_width(0xff, 8).unwrap();
        assert!(matches!(
            writer.finish(),
            Err(Error::BufferOverrun { .. })
        ));
    }

    #[test]
    fn value_wider_than_field_is_rejected() {
        let mut writer = BitWriter::with_capacity(1);
        assert!(writer.write_fixed_width(0x100, 8).is_err());
        assert_eq!(writer.bits_written(), 0);
    }

    #[test]
    fn empty_buffer_finishes_cleanly() {
        let (bytes, padding) = BitWriter::with_capacity(0).finish().unwrap();
        assert!(bytes.is_empty());
        assert_eq!(padding, 0);
    }
}
