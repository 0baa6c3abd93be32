//! Primitive wire reads and writes.
//!
//! Every message is a sequence of these primitives:
//!
//! ```text
//! byte    [u8]
//! boolean [0x00 | 0x01]
//! int     [i32 big-endian]
//! long    [i64 big-endian]
//! string  [present:boolean][length:u16][utf8:length]   (length/bytes only if present)
//! bytes   [length:int][raw:length]
//! ```
//!
//! [`BufferInput`] is implemented for every [`bytes::Buf`] and
//! [`BufferOutput`] for every [`bytes::BufMut`], so `&[u8]`, `Bytes`,
//! `BytesMut` and `Vec<u8>` all work directly.

use bytes::{Buf, BufMut, Bytes};

use crate::error::{DecodeError, EncodeError};

/// Maximum encodable string length in bytes (`u16` length prefix).
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Maximum encodable byte payload length (`i32` length prefix).
pub const MAX_BYTES_LEN: usize = i32::MAX as usize;

fn ensure<B: Buf + ?Sized>(
    buf: &B,
    needed: usize,
    context: &'static str,
) -> Result<(), DecodeError> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(DecodeError::Underflow {
            context,
            needed,
            remaining,
        });
    }
    Ok(())
}

/// Read side of the wire primitives.
pub trait BufferInput {
    /// Read a single byte.
    fn read_byte(&mut self) -> Result<u8, DecodeError>;

    /// Read a boolean, rejecting bytes other than 0 and 1.
    fn read_boolean(&mut self) -> Result<bool, DecodeError>;

    /// Read a big-endian `i32`.
    fn read_int(&mut self) -> Result<i32, DecodeError>;

    /// Read a big-endian `i64`.
    fn read_long(&mut self) -> Result<i64, DecodeError>;

    /// Read a nullable string.
    fn read_string(&mut self) -> Result<Option<String>, DecodeError>;

    /// Read a length-prefixed byte payload.
    fn read_bytes(&mut self) -> Result<Bytes, DecodeError>;

    /// Read a string that must not be null.
    fn read_required_string(&mut self, field: &'static str) -> Result<String, DecodeError> {
        self.read_string()?.ok_or(DecodeError::NullField(field))
    }
}

impl<B: Buf + ?Sized> BufferInput for B {
    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        ensure(self, 1, "byte")?;
        Ok(self.get_u8())
    }

    fn read_boolean(&mut self) -> Result<bool, DecodeError> {
        ensure(self, 1, "boolean")?;
        match self.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBoolean(other)),
        }
    }

    fn read_int(&mut self) -> Result<i32, DecodeError> {
        ensure(self, 4, "int")?;
        Ok(self.get_i32())
    }

    fn read_long(&mut self) -> Result<i64, DecodeError> {
        ensure(self, 8, "long")?;
        Ok(self.get_i64())
    }

    fn read_string(&mut self) -> Result<Option<String>, DecodeError> {
        if !self.read_boolean()? {
            return Ok(None);
        }
        ensure(self, 2, "string length")?;
        let len = self.get_u16() as usize;
        ensure(self, len, "string")?;
        let bytes = self.copy_to_bytes(len);
        Ok(Some(String::from_utf8(bytes.to_vec())?))
    }

    fn read_bytes(&mut self) -> Result<Bytes, DecodeError> {
        let len = self.read_int()?;
        if len < 0 {
            return Err(DecodeError::NegativeLength(len));
        }
        let len = len as usize;
        ensure(self, len, "bytes")?;
        Ok(self.copy_to_bytes(len))
    }
}

/// Write side of the wire primitives.
///
/// Every `write_*` is the exact inverse of the matching `read_*` on
/// [`BufferInput`]. Writes check the remaining capacity first, so a
/// fixed-size sink reports [`EncodeError::Overflow`] and is left untouched
/// by the failed primitive.
pub trait BufferOutput {
    /// Write a single byte.
    fn write_byte(&mut self, value: u8) -> Result<(), EncodeError>;

    /// Write a boolean as `0x00` or `0x01`.
    fn write_boolean(&mut self, value: bool) -> Result<(), EncodeError>;

    /// Write a big-endian `i32`.
    fn write_int(&mut self, value: i32) -> Result<(), EncodeError>;

    /// Write a big-endian `i64`.
    fn write_long(&mut self, value: i64) -> Result<(), EncodeError>;

    /// Write a nullable string.
    fn write_nullable_string(&mut self, value: Option<&str>) -> Result<(), EncodeError>;

    /// Write a length-prefixed byte payload.
    fn write_bytes(&mut self, value: &[u8]) -> Result<(), EncodeError>;

    /// Write raw bytes with no length prefix.
    fn write_slice(&mut self, value: &[u8]) -> Result<(), EncodeError>;

    /// Write a non-null string.
    fn write_string(&mut self, value: &str) -> Result<(), EncodeError> {
        self.write_nullable_string(Some(value))
    }
}

fn reserve<B: BufMut + ?Sized>(buf: &B, needed: usize) -> Result<(), EncodeError> {
    let remaining = buf.remaining_mut();
    if remaining < needed {
        return Err(EncodeError::Overflow { needed, remaining });
    }
    Ok(())
}

impl<B: BufMut + ?Sized> BufferOutput for B {
    fn write_byte(&mut self, value: u8) -> Result<(), EncodeError> {
        reserve(self, 1)?;
        self.put_u8(value);
        Ok(())
    }

    fn write_boolean(&mut self, value: bool) -> Result<(), EncodeError> {
        self.write_byte(u8::from(value))
    }

    fn write_int(&mut self, value: i32) -> Result<(), EncodeError> {
        reserve(self, 4)?;
        self.put_i32(value);
        Ok(())
    }

    fn write_long(&mut self, value: i64) -> Result<(), EncodeError> {
        reserve(self, 8)?;
        self.put_i64(value);
        Ok(())
    }

    fn write_nullable_string(&mut self, value: Option<&str>) -> Result<(), EncodeError> {
        let Some(value) = value else {
            return self.write_boolean(false);
        };
        let len = value.len();
        if len > MAX_STRING_LEN {
            return Err(EncodeError::StringTooLong {
                len,
                max: MAX_STRING_LEN,
            });
        }
        reserve(self, 1 + 2 + len)?;
        self.put_u8(1);
        self.put_u16(len as u16);
        self.put_slice(value.as_bytes());
        Ok(())
    }

    fn write_bytes(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        let len = value.len();
        if len > MAX_BYTES_LEN {
            return Err(EncodeError::BytesTooLong {
                len,
                max: MAX_BYTES_LEN,
            });
        }
        reserve(self, 4 + len)?;
        self.put_i32(len as i32);
        self.put_slice(value);
        Ok(())
    }

    fn write_slice(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        reserve(self, value.len())?;
        self.put_slice(value);
        Ok(())
    }
}
