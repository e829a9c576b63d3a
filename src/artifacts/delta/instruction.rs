//! Delta instructions and their byte encoding
//!
//! ## Encoding
//!
//! ```text
//! Copy: 0x01 | offset (u64 BE) | length (u64 BE)
//! Add:  0x02 | length (u64 BE) | data
//! ```

use crate::errors::{Error, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

const COPY_TAG: u8 = 0x01;
const ADD_TAG: u8 = 0x02;

/// One step of a delta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Reproduce `length` bytes of the base starting at `offset`
    Copy { offset: usize, length: usize },
    /// Emit literal bytes absent from the base
    Add { data: Bytes },
}

impl Instruction {
    pub fn is_copy(&self) -> bool {
        matches!(self, Instruction::Copy { .. })
    }

    pub fn is_add(&self) -> bool {
        matches!(self, Instruction::Add { .. })
    }

    pub(crate) fn encode_to(&self, buffer: &mut BytesMut) {
        match self {
            Instruction::Copy { offset, length } => {
                buffer.put_u8(COPY_TAG);
                buffer.put_u64(*offset as u64);
                buffer.put_u64(*length as u64);
            }
            Instruction::Add { data } => {
                buffer.put_u8(ADD_TAG);
                buffer.put_u64(data.len() as u64);
                buffer.put_slice(data);
            }
        }
    }

    pub(crate) fn decode_from(reader: &mut Bytes) -> Result<Self> {
        if !reader.has_remaining() {
            return Err(Error::InvalidInstruction("missing instruction tag".to_string()));
        }

        match reader.get_u8() {
            COPY_TAG => {
                let offset = read_u64(reader, "copy offset")?;
                let length = read_u64(reader, "copy length")?;
                Ok(Instruction::Copy { offset, length })
            }
            ADD_TAG => {
                let length = read_u64(reader, "add length")?;
                if reader.remaining() < length {
                    return Err(Error::InvalidInstruction(format!(
                        "add data truncated: expected {length} bytes, found {}",
                        reader.remaining()
                    )));
                }
                Ok(Instruction::Add {
                    data: reader.split_to(length),
                })
            }
            unknown => Err(Error::InvalidInstruction(format!(
                "unknown instruction tag {unknown:#04x}"
            ))),
        }
    }
}

fn read_u64(reader: &mut Bytes, field: &str) -> Result<usize> {
    if reader.remaining() < 8 {
        return Err(Error::InvalidInstruction(format!("{field} truncated")));
    }

    usize::try_from(reader.get_u64())
        .map_err(|_| Error::InvalidInstruction(format!("{field} does not fit in memory")))
}
