use std::fs::File;
use std::io;
use std::path::Path;

use memmap::{Mmap, MmapOptions};

use crate::browse::backend::{DosStatus, IecBus};
use crate::browse::entry::{Access, EntryType};
use crate::browse::error::BrowseError;
use crate::browse::NAME_SIZE;
use crate::petscii::Petscii;

/// KERNAL status bits.
const STATUS_EOI: u8 = 0x40;
const STATUS_READ_TIMEOUT: u8 = 0x02;

/// Where the listing program is loaded.  The link fields of a generated
/// listing are addresses relative to this.
const LOAD_ADDRESS: u16 = 0x0401;
const REVERSE_ON: u8 = 0x12;

enum Storage {
    Map(Mmap),
    Memory(Box<[u8]>),
}

/// A saved `"$"` listing (as produced by `LOAD"$",8` followed by a save)
/// served as if it were a drive on the bus.  The image answers only on its
/// own device number.
pub struct ListingImage {
    storage: Storage,
    device: u8,
    offset: usize,
    status: u8,
    open: bool,
}

impl ListingImage {
    pub fn open<P: AsRef<Path>>(path: P, device: u8) -> io::Result<ListingImage> {
        let file = File::open(path)?;
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(ListingImage::with_storage(Storage::Map(mmap), device))
    }

    pub fn from_bytes(bytes: &[u8], device: u8) -> ListingImage {
        ListingImage::with_storage(Storage::Memory(bytes.to_vec().into_boxed_slice()), device)
    }

    fn with_storage(storage: Storage, device: u8) -> ListingImage {
        ListingImage {
            storage,
            device,
            offset: 0,
            status: 0,
            open: false,
        }
    }

    pub fn device(&self) -> u8 {
        self.device
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Map(mmap) => &mmap[..],
            Storage::Memory(array) => &array[..],
        }
    }
}

impl IecBus for ListingImage {
    fn open_listing(&mut self, device: u8) -> io::Result<()> {
        if device != self.device {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("device {} not present", device),
            ));
        }
        // Two bytes of load address, then at least one link.
        if self.len() < 4 {
            return Err(BrowseError::ListingUnavailable.into());
        }
        self.offset = 2;
        self.status = 0;
        self.open = true;
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "listing not open"));
        }
        if self.offset >= self.len() {
            self.status = STATUS_EOI | STATUS_READ_TIMEOUT;
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        let byte = self.bytes()[self.offset];
        self.offset += 1;
        if self.offset == self.len() {
            self.status = STATUS_EOI;
        }
        Ok(byte)
    }

    fn status(&self) -> u8 {
        self.status
    }

    fn close_listing(&mut self, _device: u8) {
        self.open = false;
    }

    fn command(&mut self, _device: u8, _command: &[u8]) -> io::Result<DosStatus> {
        Err(BrowseError::Unsupported.into())
    }
}

/// Assemble listing bytes in the layout a drive sends for `"$"`.
pub struct ListingBuilder {
    bytes: Vec<u8>,
    address: u16,
}

impl ListingBuilder {
    pub fn new() -> ListingBuilder {
        ListingBuilder {
            bytes: LOAD_ADDRESS.to_le_bytes().to_vec(),
            address: LOAD_ADDRESS,
        }
    }

    /// Append a raw line: the block count and the text following it.
    pub fn line(mut self, size: u16, text: &[u8]) -> ListingBuilder {
        let length = 2 + 2 + text.len() + 1;
        self.address = self.address.wrapping_add(length as u16);
        self.bytes.extend_from_slice(&self.address.to_le_bytes());
        self.bytes.extend_from_slice(&size.to_le_bytes());
        self.bytes.extend_from_slice(text);
        self.bytes.push(0);
        self
    }

    /// Append the header line, `"NAME            " ID 2A` in reverse video.
    pub fn header(self, name: &Petscii, id: &Petscii) -> ListingBuilder {
        let mut text = vec![REVERSE_ON, b'"'];
        text.extend(pad(name.as_bytes(), NAME_SIZE));
        text.extend_from_slice(b"\" ");
        text.extend(pad(id.as_bytes(), 5));
        self.line(0, &text)
    }

    /// Append a file line.  Names are aligned the way CBM DOS aligns them,
    /// with the leading spaces depending on the width of the block count.
    pub fn file(self, size: u16, name: &Petscii, entry_type: EntryType, access: Access) -> ListingBuilder {
        let indent = match size {
            0..=9 => 3,
            10..=99 => 2,
            100..=999 => 1,
            _ => 0,
        };
        let mut text = vec![b' '; indent];
        text.push(b'"');
        let name = &name.as_bytes()[..name.len().min(NAME_SIZE)];
        text.extend_from_slice(name);
        text.push(b'"');
        text.extend(std::iter::repeat(b' ').take(NAME_SIZE - name.len() + 1));
        text.extend_from_slice(entry_type.label().as_bytes());
        if access == Access::ReadOnly {
            text.push(b'<');
        }
        self.line(size, &text)
    }

    pub fn blocks_free(self, blocks: u16) -> ListingBuilder {
        self.line(blocks, b"BLOCKS FREE.             ")
    }

    /// Terminate the program and return its bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.extend_from_slice(&[0, 0]);
        self.bytes
    }
}

impl Default for ListingBuilder {
    fn default() -> ListingBuilder {
        ListingBuilder::new()
    }
}

fn pad(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut padded: Vec<u8> = bytes.iter().cloned().take(width).collect();
    padded.resize(width, b' ');
    padded
}
