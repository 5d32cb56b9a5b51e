//! This is a Rust library for browsing the storage attached to a Commodore
//! 64: drives on the IEC serial bus, and the filesystem of an Ultimate
//! cartridge reached through its command interface (UCI).  It is the
//! directory engine of a boot menu, separated from the screen and keyboard
//! handling so it can be driven by any front end.
//!
//! Features:
//!
//! * Parse IEC `"$"` listings, including header and "blocks free" lines,
//!   locked files, and the CMD/sd2iec DIR, VRP, and LNK types.
//! * Parse Ultimate filesystem records, inferring file types from names.
//! * Build listings in stream order or sorted by name while they stream in.
//! * Hold the listing in a fixed-capacity arena, truncating gracefully when
//!   it fills, the way the menu's fixed memory region does.
//! * Move a cursor through the listing a row or a page at a time.
//! * Classify disk images (D64, G64, D71, D81, G71, G81, DNP) and RAM
//!   expansion images (REU) by name.
//! * Send the `CD` variants understood by CMD, sd2iec, VICE, and Ultimate
//!   drives, identify drives from their `UI` status, and trace the path
//!   entered so it can be replayed.
//! * Serve saved listings and host directories as backends, and a sample
//!   `cbrowse` program that browses either from the command line.
//!
//! # Example
//!
//! The following example serves a small listing as if it came from device
//! 8, reads it sorted, and prints the visible rows:
//!
//! ```
//! use std::io;
//! use cbmbrowse::browse::{
//!     Access, Backend, Browser, BrowserConfig, EntryType, ListingBuilder, ListingImage,
//! };
//! use cbmbrowse::Petscii;
//! # fn main() -> io::Result<()> {
//!
//! let listing = ListingBuilder::new()
//!     .header(&Petscii::from("games"), &Petscii::from("gm 2a"))
//!     .file(35, &Petscii::from("zork"), EntryType::Program, Access::ReadWrite)
//!     .file(12, &Petscii::from("elite"), EntryType::Program, Access::ReadWrite)
//!     .blocks_free(617)
//!     .finish();
//! let backend = Backend::iec(ListingImage::from_bytes(&listing, 8), 8);
//!
//! let mut browser = Browser::new(backend, &BrowserConfig::small());
//! browser.set_sorted(true);
//! browser.refresh()?;
//!
//! let directory = browser.directory();
//! for (entry, selected) in directory.visible() {
//!     let marker = if selected { ">" } else { " " };
//!     println!("{}{}", marker, entry.row(browser.mode()));
//! }
//! println!("{} blocks free", directory.free_blocks());
//! # Ok(())
//! # }
//! ```
//!
//! This prints:
//!
//! ```text
//! >  12 elite            PRG
//!    35 zork             PRG
//! 617 blocks free
//! ```
//!
//! # Design
//!
//! 1. A `Backend` is either an `IecBus` with a device number or a
//!    `UciTarget`.  The variant decides which record parser reads the
//!    listing; nothing else in the library checks which one is in use.
//! 2. The parsers fill a `DirectoryEntry` directly inside an arena node.
//!    Failures end the listing rather than skipping a record, since nothing
//!    later in a damaged stream can be trusted.
//! 3. `Directory` links nodes into a doubly linked list by `NodeId` and owns
//!    the cursor.  Rebuilding rewinds the arena, so every `NodeId` from the
//!    previous listing becomes invalid.
//! 4. `Browser` wraps a backend and its directory with the state that lives
//!    across listings: sort order, drive identification, and the path trace.
//!
//! # License
//!
//! Cbmbrowse is distributed under the terms of both the MIT license and the
//! Apache License (Version 2.0).

pub mod browse;

mod petscii;
mod util;

pub use crate::petscii::Petscii;
