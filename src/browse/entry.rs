//! Directory entries as they appear in a browser listing

use std::fmt;

use crate::browse::{BrowseMode, NAME_SIZE};
use crate::petscii::Petscii;

/// The kind of record a listing line describes.  Besides the CBM DOS file
/// types, this covers the CMD/sd2iec extensions (DIR, VRP, LNK) and the two
/// pseudo-records that frame every IEC listing: the header line carrying
/// the disk name and ID, and the trailing "blocks free" line.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum EntryType {
    Program,
    Sequential,
    User,
    Relative,
    CommodoreSpecial,
    Directory,
    VirtualPartition,
    Link,
    Deleted,
    FreeSpaceMarker,
    VolumeHeader,
}

/// Listing suffixes in the order the drive firmware's own tables use.
/// Suffixes are stored as ASCII uppercase, which is also how PETSCII
/// unshifted letters are encoded.
static SUFFIXES: &[(&[u8], EntryType)] = &[
    (b"PRG", EntryType::Program),
    (b"SEQ", EntryType::Sequential),
    (b"USR", EntryType::User),
    (b"DEL", EntryType::Deleted),
    (b"REL", EntryType::Relative),
    (b"CBM", EntryType::CommodoreSpecial),
    (b"DIR", EntryType::Directory),
    (b"VRP", EntryType::VirtualPartition),
    (b"LNK", EntryType::Link),
];

impl EntryType {
    /// Look up the file type for a three-character listing suffix, ignoring
    /// case.
    pub fn from_suffix(suffix: &[u8]) -> Option<EntryType> {
        if suffix.len() != 3 {
            return None;
        }
        SUFFIXES
            .iter()
            .find(|(s, _)| {
                s.iter()
                    .zip(suffix.iter())
                    .all(|(&a, &b)| a == crate::petscii::fold_case(b))
            })
            .map(|&(_, t)| t)
    }

    /// Three-letter label used when printing a listing row.
    pub fn label(&self) -> &'static str {
        match *self {
            EntryType::Program => "PRG",
            EntryType::Sequential => "SEQ",
            EntryType::User => "USR",
            EntryType::Relative => "REL",
            EntryType::CommodoreSpecial => "CBM",
            EntryType::Directory => "DIR",
            EntryType::VirtualPartition => "VRP",
            EntryType::Link => "LNK",
            EntryType::Deleted => "DEL",
            EntryType::FreeSpaceMarker => "FRE",
            EntryType::VolumeHeader => "HDR",
        }
    }
}

impl Default for EntryType {
    fn default() -> EntryType {
        EntryType::Sequential
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Access {
    ReadWrite,
    ReadOnly,
}

impl Default for Access {
    fn default() -> Access {
        Access::ReadWrite
    }
}

/// One parsed listing record.
#[derive(Clone, Default, PartialEq)]
pub struct DirectoryEntry {
    pub name: Petscii,
    pub entry_type: EntryType,
    pub size_blocks: u16,
    pub access: Access,
    /// The disk ID following the name on a header line.  Only present on
    /// `VolumeHeader` records.
    pub disk_id: Option<Petscii>,
}

impl DirectoryEntry {
    pub fn new(name: &Petscii, entry_type: EntryType, size_blocks: u16) -> DirectoryEntry {
        DirectoryEntry {
            name: name.clone(),
            entry_type,
            size_blocks,
            access: Access::ReadWrite,
            disk_id: None,
        }
    }

    /// Reset all fields, in preparation for parsing a fresh record.
    pub fn reset(&mut self) {
        *self = DirectoryEntry::default();
    }

    /// Format the entry as a listing row.  IEC rows lead with the block
    /// count; when a five-digit size meets a full-length name, the type
    /// label loses its first letter so the row keeps its width.  Ultimate
    /// rows carry no block count.
    pub fn row(&self, mode: BrowseMode) -> String {
        let mut label = self.entry_type.label();
        if self.size_blocks >= 10000 && self.name.len() == NAME_SIZE {
            label = &label[1..];
        }
        let lock = match self.access {
            Access::ReadOnly => "<",
            Access::ReadWrite => "",
        };
        match mode {
            BrowseMode::Uci => format!("{:<16} {}{}", self.name, label, lock),
            BrowseMode::Iec if self.size_blocks < 10000 => format!(
                "{:>4} {:<16} {}{}",
                self.size_blocks, self.name, label, lock
            ),
            BrowseMode::Iec => format!(
                "{} {:<15} {}{}",
                self.size_blocks, self.name, label, lock
            ),
        }
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:<4} {:18}{}",
            self.size_blocks,
            format!("\"{}\"", self.name),
            self.entry_type
        )?;
        if self.access == Access::ReadOnly {
            f.write_str("<")?;
        }
        Ok(())
    }
}

impl fmt::Debug for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:?},{},{:?},{:?}",
            self.name, self.size_blocks, self.entry_type, self.access
        )
    }
}
