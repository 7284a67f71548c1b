use crate::prelude::*;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io;

use super::error;

/// width of every keyword / description record in an Ensight C Binary file
pub const LINE_LENGTH: usize = 80;

/// Byte order of the integers and floats in a binary Ensight file.
///
/// Ensight does not store this anywhere, it has to be guessed from a value
/// with a known range (see [`Endian::detect`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Guess the byte order from the raw bytes of a part number.
    ///
    /// Part numbers are small positive integers, so whichever interpretation
    /// gives a plausible value wins. Little endian is preferred on a tie.
    pub fn detect(part_number: [u8; 4]) -> Self {
        let little = i32::from_le_bytes(part_number);
        if (1..=MAX_PART_NUMBER).contains(&little) {
            return Endian::Little;
        }

        let big = i32::from_be_bytes(part_number);
        if (1..=MAX_PART_NUMBER).contains(&big) {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

const MAX_PART_NUMBER: i32 = 1 << 20;

/// Thin wrapper around a reader that knows how to pull Ensight records out of it
pub struct BinaryReader<R> {
    inner: R,
    endian: Endian,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R, endian: Endian) -> Self {
        Self { inner, endian }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// read an 80 byte record, trimmed of padding
    pub fn read_line(&mut self) -> Result<String, ParseError> {
        match self.read_line_or_eof()? {
            Some(line) => Ok(line),
            None => Err(ParseError::Io(io::ErrorKind::UnexpectedEof.into())),
        }
    }

    /// read an 80 byte record, returning `None` if the file ended cleanly
    /// before the first byte of the record
    pub fn read_line_or_eof(&mut self) -> Result<Option<String>, ParseError> {
        let mut buf = [0u8; LINE_LENGTH];
        let mut filled = 0;

        while filled < LINE_LENGTH {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match filled {
            0 => Ok(None),
            LINE_LENGTH => Ok(Some(trim_record(&buf))),
            _ => Err(ParseError::Io(io::ErrorKind::UnexpectedEof.into())),
        }
    }

    /// read a record and check that it starts with `keyword`
    pub fn expect_keyword(&mut self, keyword: &'static str) -> Result<String, ParseError> {
        let line = self.read_line()?;
        if line.starts_with(keyword) {
            Ok(line)
        } else {
            Err(error::UnexpectedKeyword::new(keyword, line).into())
        }
    }

    /// read the raw bytes of a single 4 byte word
    pub fn read_word(&mut self) -> Result<[u8; 4], ParseError> {
        let mut word = [0u8; 4];
        self.inner.read_exact(&mut word)?;
        Ok(word)
    }

    pub fn decode_i32(&self, word: [u8; 4]) -> i32 {
        match self.endian {
            Endian::Little => i32::from_le_bytes(word),
            Endian::Big => i32::from_be_bytes(word),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32, ParseError> {
        let value = match self.endian {
            Endian::Little => self.inner.read_i32::<LittleEndian>()?,
            Endian::Big => self.inner.read_i32::<BigEndian>()?,
        };
        Ok(value)
    }

    /// read an element / node count, rejecting negative values
    pub fn read_count(&mut self, what: &'static str) -> Result<usize, ParseError> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| error::InvalidCount::new(what, count as i64).into())
    }

    pub fn read_i32_vec(&mut self, len: usize) -> Result<Vec<i32>, ParseError> {
        let mut values = vec![0; len];
        match self.endian {
            Endian::Little => self.inner.read_i32_into::<LittleEndian>(&mut values)?,
            Endian::Big => self.inner.read_i32_into::<BigEndian>(&mut values)?,
        }
        Ok(values)
    }

    pub fn read_f32(&mut self) -> Result<f32, ParseError> {
        let value = match self.endian {
            Endian::Little => self.inner.read_f32::<LittleEndian>()?,
            Endian::Big => self.inner.read_f32::<BigEndian>()?,
        };
        Ok(value)
    }

    pub fn read_f32_vec(&mut self, len: usize) -> Result<Vec<f32>, ParseError> {
        let mut values = vec![0.0; len];
        match self.endian {
            Endian::Little => self.inner.read_f32_into::<LittleEndian>(&mut values)?,
            Endian::Big => self.inner.read_f32_into::<BigEndian>(&mut values)?,
        }
        Ok(values)
    }

    /// skip `len` 4 byte words
    pub fn skip_words(&mut self, len: usize) -> Result<(), ParseError> {
        let skipped = io::copy(
            &mut (&mut self.inner).take((len * 4) as u64),
            &mut io::sink(),
        )?;

        if skipped as usize != len * 4 {
            return Err(ParseError::Io(io::ErrorKind::UnexpectedEof.into()));
        }
        Ok(())
    }
}

/// strip the NUL / space padding of a fixed width record
fn trim_record(buf: &[u8]) -> String {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim().to_string()
}
