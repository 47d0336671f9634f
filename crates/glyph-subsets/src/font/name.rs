//! `name` table processing.

use super::Cursor;
use crate::{
    alloc::{String, Vec},
    ParseError,
};

const FULL_NAME_ID: u16 = 4;
const POSTSCRIPT_NAME_ID: u16 = 6;
const MAX_PS_NAME_LEN: usize = 63;

/// Names extracted from the `name` table.
#[derive(Debug, Default)]
pub(super) struct NameTable {
    pub(super) full_name: Option<String>,
    pub(super) ps_name: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct NameRecord {
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    name_id: u16,
    len: usize,
    offset: usize,
}

impl NameRecord {
    /// Lower is better; `None` if the record cannot be decoded.
    fn rank(&self) -> Option<u8> {
        match (self.platform_id, self.encoding_id, self.language_id) {
            (3, 1, 0x409) => Some(0),
            (3, 0 | 1 | 10, _) | (0, _, _) => Some(1),
            (1, 0, _) => Some(2),
            _ => None,
        }
    }

    fn decode(&self, storage: Cursor<'_>) -> Result<String, ParseError> {
        let bytes = storage.range(self.offset..self.offset + self.len)?.bytes;
        Ok(if self.platform_id == 1 {
            // Mac Roman; non-ASCII chars are not used in PostScript names anyway.
            bytes
                .iter()
                .map(|&byte| {
                    if byte.is_ascii() {
                        char::from(byte)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect()
        } else {
            let units = bytes
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]));
            char::decode_utf16(units)
                .map(|ch| ch.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        })
    }
}

impl NameTable {
    pub(super) fn parse(mut cursor: Cursor<'_>) -> Result<Self, ParseError> {
        let table = cursor;
        cursor.skip(2)?; // version
        let count = cursor.read_u16()?;
        let storage_offset = usize::from(cursor.read_u16()?);
        let storage = table.range(storage_offset..table.bytes.len())?;

        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            records.push(NameRecord {
                platform_id: cursor.read_u16()?,
                encoding_id: cursor.read_u16()?,
                language_id: cursor.read_u16()?,
                name_id: cursor.read_u16()?,
                len: usize::from(cursor.read_u16()?),
                offset: usize::from(cursor.read_u16()?),
            });
        }

        let find_name = |name_id: u16| -> Result<Option<String>, ParseError> {
            let best_record = records
                .iter()
                .filter(|record| record.name_id == name_id)
                .filter_map(|record| Some((record.rank()?, record)))
                .min_by_key(|(rank, _)| *rank);
            best_record
                .map(|(_, record)| record.decode(storage))
                .transpose()
        };

        let full_name = find_name(FULL_NAME_ID)?;
        let ps_name = find_name(POSTSCRIPT_NAME_ID)?
            .or_else(|| full_name.clone())
            .map(|name| sanitize_ps_name(&name))
            .filter(|name| !name.is_empty());
        Ok(Self { full_name, ps_name })
    }
}

/// Removes chars that are not allowed in PostScript names.
fn sanitize_ps_name(name: &str) -> String {
    name.chars()
        .filter(|&ch| ch.is_ascii_graphic() && !"[](){}<>/%".contains(ch))
        .take(MAX_PS_NAME_LEN)
        .collect()
}
