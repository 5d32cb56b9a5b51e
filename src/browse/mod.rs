//! Directory listings, sorting, and page navigation.
//!
//! A listing session reads records from one of two backends: an IEC drive
//! answering the classic `"$"` directory request, or the Ultimate Command
//! Interface (UCI) filesystem, which hands out one structured record per
//! entry.  Each backend has its own record parser, but both produce the same
//! `DirectoryEntry`.  The entries are linked into a list that lives inside a
//! fixed-capacity arena, and a cursor walks the list a page at a time.

mod arena;
mod error;
mod host;
mod image;
mod parser;

pub mod backend;
pub mod directory;
pub mod drive;
pub mod entry;
pub mod mount;
pub mod session;
pub mod trace;

pub use self::arena::{Arena, DirectoryNode, NodeId, NODE_SIZE};
pub use self::backend::{Backend, DosStatus, IecBus, UciTarget};
pub use self::directory::{Directory, Movement, Progress};
pub use self::drive::DriveType;
pub use self::entry::{Access, DirectoryEntry, EntryType};
pub use self::error::BrowseError;
pub use self::host::HostDirectory;
pub use self::image::{ListingBuilder, ListingImage};
pub use self::mount::MountKind;
pub use self::session::{Browser, Selection};
pub use self::trace::PathTrace;

/// Names in CBM listings are at most 16 characters.
pub const NAME_SIZE: usize = 16;
/// The header line's disk ID field ("ID 2A") is five characters.
pub const DISK_ID_SIZE: usize = 5;
/// For padding filenames, disk name, etc.
pub const PADDING_BYTE: u8 = 0xa0;

/// Lowest and highest IEC device numbers the browser will address.
pub const FIRST_DEVICE: u8 = 8;
pub const LAST_DEVICE: u8 = 30;

/// Which kind of backend a listing came from.  This decides which record
/// parser runs and how rows are presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowseMode {
    /// A drive on the IEC serial bus.
    Iec,
    /// The Ultimate Command Interface filesystem.
    Uci,
}

/// Sizing for a browser session.  The two presets correspond to the 40- and
/// 80-column builds of the menu, which differ in visible rows and in how
/// much memory they can spare for the directory and the line buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Bytes reserved for directory nodes.  The arena holds
    /// `arena_bytes / NODE_SIZE` nodes.
    pub arena_bytes: usize,
    /// Longest IEC listing line that is kept; excess bytes are dropped.
    pub line_buffer_len: usize,
    /// Rows visible in the listing window.
    pub page_height: usize,
}

impl BrowserConfig {
    /// The 40-column build.
    pub fn small() -> BrowserConfig {
        BrowserConfig {
            arena_bytes: 256 * NODE_SIZE,
            line_buffer_len: 81,
            page_height: 19,
        }
    }

    /// The 80-column build.
    pub fn large() -> BrowserConfig {
        BrowserConfig {
            arena_bytes: 512 * NODE_SIZE,
            line_buffer_len: 100,
            page_height: 38,
        }
    }

    pub fn with_page_height(mut self, page_height: usize) -> BrowserConfig {
        self.page_height = page_height.max(1);
        self
    }

    pub fn with_arena_bytes(mut self, arena_bytes: usize) -> BrowserConfig {
        self.arena_bytes = arena_bytes;
        self
    }

    /// Number of nodes the arena can hold.
    pub fn capacity(&self) -> usize {
        self.arena_bytes / NODE_SIZE
    }
}

impl Default for BrowserConfig {
    fn default() -> BrowserConfig {
        BrowserConfig::small()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(BrowserConfig::small().capacity(), 256);
        assert_eq!(BrowserConfig::large().capacity(), 512);
        assert_eq!(BrowserConfig::small().with_page_height(0).page_height, 1);
        assert_eq!(
            BrowserConfig::small()
                .with_arena_bytes(NODE_SIZE * 3 + NODE_SIZE - 1)
                .capacity(),
            3
        );
    }
}
