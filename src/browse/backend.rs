//! The storage backends a listing can be read from.
//!
//! Both are expressed as traits so the browser can run against real
//! hardware glue, a saved listing, or a test double.

use std::fmt;
use std::io;

use log::debug;

use crate::browse::entry::DirectoryEntry;
use crate::browse::error::BrowseError;
use crate::browse::parser;
use crate::browse::BrowseMode;

/// A drive on the IEC serial bus, as seen through the KERNAL channel
/// routines.
pub trait IecBus {
    /// Open the `"$"` directory listing on `device`.  The two-byte load
    /// address is consumed, so the first byte read belongs to the first
    /// listing line.
    fn open_listing(&mut self, device: u8) -> io::Result<()>;
    /// Read the next byte from the open listing.
    fn read_byte(&mut self) -> io::Result<u8>;
    /// The KERNAL status byte (READST).  Non-zero after end-of-file or a
    /// bus error.
    fn status(&self) -> u8;
    fn close_listing(&mut self, device: u8);
    /// Send a command on the command channel (secondary address 15) and
    /// return the drive's reply.
    fn command(&mut self, device: u8, command: &[u8]) -> io::Result<DosStatus>;
}

/// The Ultimate Command Interface filesystem.
pub trait UciTarget {
    /// Start a listing of the current directory.
    fn open_dir(&mut self) -> io::Result<()>;
    /// Fetch the next listing record: an attribute byte followed by the
    /// ASCII name.  None once the listing is exhausted.
    fn next_record(&mut self) -> Option<Vec<u8>>;
    fn close_dir(&mut self) {}
    /// Change the current directory.  The name is ASCII; `..` moves up and
    /// `/` returns to the root.
    fn change_dir(&mut self, name: &[u8]) -> io::Result<()>;
    fn current_path(&mut self) -> io::Result<String>;
}

/// A drive status reply, e.g. `00, OK,00,00`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DosStatus {
    pub code: u8,
    pub message: String,
}

impl DosStatus {
    /// Parse a status line.  The first two characters must be the decimal
    /// status code.
    pub fn parse(bytes: &[u8]) -> Option<DosStatus> {
        if bytes.len() < 2 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
            return None;
        }
        let text: String = bytes
            .iter()
            .take_while(|&&b| b != b'\r' && b != 0)
            .map(|&b| b as char)
            .collect();
        Some(DosStatus {
            code: (bytes[0] - b'0') * 10 + (bytes[1] - b'0'),
            message: text,
        })
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

impl fmt::Display for DosStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The backend in use for a session.  The variant decides which record
/// parser reads the listing.
pub enum Backend {
    Iec { bus: Box<dyn IecBus>, device: u8 },
    Uci(Box<dyn UciTarget>),
}

impl Backend {
    pub fn iec<B: IecBus + 'static>(bus: B, device: u8) -> Backend {
        Backend::Iec {
            bus: Box::new(bus),
            device,
        }
    }

    pub fn uci<T: UciTarget + 'static>(target: T) -> Backend {
        Backend::Uci(Box::new(target))
    }

    pub fn mode(&self) -> BrowseMode {
        match self {
            Backend::Iec { .. } => BrowseMode::Iec,
            Backend::Uci(_) => BrowseMode::Uci,
        }
    }

    /// The IEC device number, if this is an IEC backend.
    pub fn device(&self) -> Option<u8> {
        match self {
            Backend::Iec { device, .. } => Some(*device),
            Backend::Uci(_) => None,
        }
    }

    pub(crate) fn open_listing(&mut self) -> Result<(), BrowseError> {
        match self {
            Backend::Iec { bus, device } => {
                if let Err(e) = bus.open_listing(*device) {
                    debug!("device {}: cannot open listing: {}", device, e);
                    bus.close_listing(*device);
                    return Err(BrowseError::ListingUnavailable);
                }
            }
            Backend::Uci(target) => {
                if let Err(e) = target.open_dir() {
                    debug!("uci: cannot open listing: {}", e);
                    return Err(BrowseError::ListingUnavailable);
                }
            }
        }
        Ok(())
    }

    /// Parse the next listing record into `entry`.
    pub(crate) fn read_entry(
        &mut self,
        entry: &mut DirectoryEntry,
        line_buffer_len: usize,
    ) -> Result<(), BrowseError> {
        match self {
            Backend::Iec { bus, .. } => parser::read_iec_record(&mut **bus, line_buffer_len, entry),
            Backend::Uci(target) => parser::read_uci_record(&mut **target, entry),
        }
    }

    pub(crate) fn close_listing(&mut self) {
        match self {
            Backend::Iec { bus, device } => bus.close_listing(*device),
            Backend::Uci(target) => target.close_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let status = DosStatus::parse(b"73,SD2IEC V1.0.0ATENTDEAD0-24,00,00\r").unwrap();
        assert_eq!(status.code, 73);
        assert_eq!(status.message, "73,SD2IEC V1.0.0ATENTDEAD0-24,00,00");
        assert!(!status.is_ok());
        assert!(DosStatus::parse(b"00, OK,00,00").unwrap().is_ok());
        assert_eq!(DosStatus::parse(b"7"), None);
        assert_eq!(DosStatus::parse(b"xx,NOPE"), None);
    }
}
