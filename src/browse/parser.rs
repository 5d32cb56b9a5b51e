//! Listing record parsers.
//!
//! IEC drives answer a `"$"` request with a tokenized BASIC program whose
//! lines are the listing: each line is a two-byte link, the block count in
//! place of the line number, and the text of the row.  The text has to be
//! picked apart to find the quoted name, the type suffix, and the lock
//! marker; the header and "blocks free" lines are recognized from the same
//! text.  The Ultimate filesystem is simpler, with one structured record per
//! entry, but it reports no sizes and only flags directories, so file types
//! are inferred from the name.

use log::trace;

use crate::browse::backend::{IecBus, UciTarget};
use crate::browse::entry::{Access, DirectoryEntry, EntryType};
use crate::browse::error::BrowseError;
use crate::browse::{DISK_ID_SIZE, NAME_SIZE, PADDING_BYTE};
use crate::petscii::{self, Petscii};
use crate::util;

const QUOTE: u8 = b'"';
/// Marker for locked files.  Drives print it after the type (`PRG<`).
const LOCKED_MARKER: u8 = 0x3c;
/// First character of the "BLOCKS FREE." line.
const BLOCKS_FREE_INITIAL: u8 = b'B';
/// Attribute bit marking a directory in an Ultimate listing record.
const UCI_DIRECTORY_FLAG: u8 = 0x10;
const SUFFIX_SIZE: usize = 3;

/// Read one line of an IEC listing and parse it into `entry`.
pub(crate) fn read_iec_record(
    bus: &mut dyn IecBus,
    line_buffer_len: usize,
    entry: &mut DirectoryEntry,
) -> Result<(), BrowseError> {
    entry.reset();

    // A status already raised means the previous line was the last one.
    if bus.status() != 0 {
        return Err(BrowseError::NoMoreData);
    }

    // A zero link is the end-of-program marker.
    let link = read_u16(bus)?;
    if link == 0 {
        return Err(BrowseError::NoMoreData);
    }
    entry.size_blocks = read_u16(bus)?;

    let mut line: Vec<u8> = Vec::with_capacity(line_buffer_len);
    loop {
        let b = bus.read_byte().map_err(|_| BrowseError::StreamRead)?;
        if b == 0 {
            break;
        }
        if line.len() < line_buffer_len {
            line.push(b);
        }
        if bus.status() != 0 {
            return Err(BrowseError::StreamRead);
        }
    }
    trace!("listing line: {}", util::hex(&line));

    parse_iec_line(&line, entry)
}

fn read_u16(bus: &mut dyn IecBus) -> Result<u16, BrowseError> {
    let lo = bus.read_byte().map_err(|_| BrowseError::StreamRead)?;
    let hi = bus.read_byte().map_err(|_| BrowseError::StreamRead)?;
    Ok((lo as u16) | ((hi as u16) << 8))
}

/// Parse the text of one IEC listing line.  `entry.size_blocks` must
/// already hold the line's block count.
pub(crate) fn parse_iec_line(line: &[u8], entry: &mut DirectoryEntry) -> Result<(), BrowseError> {
    // "BLOCKS FREE." closes the listing.  Nothing else on the line matters.
    if line.first().map(|&b| petscii::fold_case(b)) == Some(BLOCKS_FREE_INITIAL) {
        entry.entry_type = EntryType::FreeSpaceMarker;
        return Ok(());
    }

    if line.len() < 5 {
        return Err(BrowseError::RecordTooShort);
    }

    // The right edge of the content, ignoring trailing blanks.
    let mut len = line.len();
    while len > 0 && (line[len - 1] == b' ' || line[len - 1] == PADDING_BYTE) {
        len -= 1;
    }

    // Name: everything after the first quote, up to the closing quote.
    let mut i = line
        .iter()
        .position(|&b| b == QUOTE)
        .map(|p| p + 1)
        .unwrap_or(line.len());
    let mut name = Petscii::new();
    while i < line.len() && line[i] != QUOTE && name.len() < NAME_SIZE {
        name.push(line[i]);
        i += 1;
    }

    let mut access = Access::ReadWrite;
    let mut end = len;
    if end > 0 && line[end - 1] == LOCKED_MARKER {
        access = Access::ReadOnly;
        end -= 1;
    }

    let file_type = if end >= SUFFIX_SIZE {
        EntryType::from_suffix(&line[end - SUFFIX_SIZE..end])
    } else {
        None
    };

    match file_type {
        Some(file_type) => {
            if end > SUFFIX_SIZE && line[end - SUFFIX_SIZE - 1] == LOCKED_MARKER {
                access = Access::ReadOnly;
            }
            entry.name = name;
            entry.entry_type = file_type;
            entry.access = access;
        }
        None => {
            // No type suffix, so this is the header: `"NAME" ID 2A`.
            if i < len && line[i] == QUOTE {
                i += 1;
            }
            if i < len && line[i] == b' ' {
                i += 1;
            }
            let id_end = (i + DISK_ID_SIZE).min(len);
            let disk_id = if i < id_end {
                Petscii::from_bytes(&line[i..id_end])
            } else {
                Petscii::new()
            };
            name.trim_end();
            entry.name = name;
            entry.entry_type = EntryType::VolumeHeader;
            entry.disk_id = Some(disk_id);
        }
    }
    Ok(())
}

/// Fetch one Ultimate listing record and parse it into `entry`.
pub(crate) fn read_uci_record(
    target: &mut dyn UciTarget,
    entry: &mut DirectoryEntry,
) -> Result<(), BrowseError> {
    entry.reset();
    let record = target.next_record().ok_or(BrowseError::NoMoreData)?;
    trace!("uci record: {}", util::hex(&record));
    parse_uci_record(&record, entry)
}

pub(crate) fn parse_uci_record(record: &[u8], entry: &mut DirectoryEntry) -> Result<(), BrowseError> {
    let attributes = match record.first() {
        Some(&a) => a,
        None => return Err(BrowseError::RecordTooShort),
    };
    let mut entry_type = if attributes & UCI_DIRECTORY_FLAG != 0 {
        Some(EntryType::Directory)
    } else {
        None
    };

    let raw_name = &record[1..record.len().min(1 + NAME_SIZE)];
    let name = Petscii::from_ascii_bytes(raw_name);

    if entry_type.is_none() && name.len() > 4 {
        let bytes = name.as_bytes();
        entry_type = EntryType::from_suffix(&bytes[bytes.len() - SUFFIX_SIZE..]);
    }

    // Names without a recognized suffix are shown as SEQ.
    entry.entry_type = entry_type.unwrap_or(EntryType::Sequential);
    entry.name = name;
    entry.size_blocks = 0;
    Ok(())
}
