//! A browsing session: one backend, its current directory, and the state
//! that survives between listings.

use std::collections::HashMap;
use std::io;

use log::{debug, info, warn};

use crate::browse::backend::{Backend, DosStatus};
use crate::browse::directory::{Directory, Progress};
use crate::browse::drive::DriveType;
use crate::browse::entry::EntryType;
use crate::browse::error::BrowseError;
use crate::browse::mount::{self, MountKind};
use crate::browse::trace::PathTrace;
use crate::browse::{BrowseMode, BrowserConfig, FIRST_DEVICE, LAST_DEVICE};
use crate::petscii::Petscii;

/// PETSCII left arrow, which CMD-style drives take as "parent directory".
const PARENT_ARROW: u8 = 0x5f;

/// The outcome of selecting an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A program to load and run.
    Run(Petscii),
    /// A RAM expansion image to load.
    MemoryImage(Petscii),
    /// The entry was entered, and the directory now lists its contents.
    Entered(MountKind),
    /// The entry cannot be opened from the browser.
    Nothing,
}

pub struct Browser {
    backend: Backend,
    alternate: Option<Backend>,
    directory: Directory,
    sorted: bool,
    trace: Option<PathTrace>,
    drive_types: HashMap<u8, DriveType>,
    progress: Box<dyn Progress>,
}

impl Browser {
    /// Create a session.  Nothing is read until `refresh()` or a directory
    /// change.
    pub fn new(backend: Backend, config: &BrowserConfig) -> Browser {
        Browser {
            backend,
            alternate: None,
            directory: Directory::new(config),
            sorted: false,
            trace: None,
            drive_types: HashMap::new(),
            progress: Box::new(()),
        }
    }

    /// Park a second backend, reachable through `switch_backend()`.
    pub fn set_alternate(&mut self, backend: Backend) {
        self.alternate = Some(backend);
    }

    pub fn has_alternate(&self) -> bool {
        self.alternate.is_some()
    }

    /// Swap the active backend with the parked one and list the new
    /// backend.  Entering IEC mode probes for the first responding drive.
    /// The path trace belongs to one drive, so it is dropped.
    pub fn switch_backend(&mut self) -> io::Result<BrowseMode> {
        let next = self
            .alternate
            .take()
            .ok_or_else(|| BrowseError::Unsupported.to_io_error())?;
        let previous = std::mem::replace(&mut self.backend, next);
        self.alternate = Some(previous);
        self.trace = None;
        self.directory.clear();

        let mode = self.backend.mode();
        info!("switched to {:?}", mode);
        match mode {
            BrowseMode::Iec => {
                if self.find_first_device().is_none() {
                    return Err(BrowseError::ListingUnavailable.into());
                }
            }
            BrowseMode::Uci => self.refresh()?,
        }
        Ok(mode)
    }

    pub fn set_progress(&mut self, progress: Box<dyn Progress>) {
        self.progress = progress;
    }

    pub fn mode(&self) -> BrowseMode {
        self.backend.mode()
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn set_sorted(&mut self, sorted: bool) {
        self.sorted = sorted;
    }

    /// Read the current directory again.
    pub fn refresh(&mut self) -> io::Result<()> {
        if self
            .directory
            .read(&mut self.backend, self.sorted, &mut *self.progress)
        {
            Ok(())
        } else {
            Err(BrowseError::ListingUnavailable.into())
        }
    }

    /// Flip between sorted and stream order, and read the listing again.
    pub fn toggle_sort(&mut self) -> io::Result<bool> {
        self.sorted = !self.sorted;
        self.refresh()?;
        Ok(self.sorted)
    }

    pub fn device(&self) -> Option<u8> {
        self.backend.device()
    }

    /// Identify the current IEC drive.  The answer is remembered per device.
    pub fn drive_type(&mut self) -> Option<DriveType> {
        let device = self.backend.device()?;
        if let Some(drive) = self.drive_types.get(&device) {
            return Some(*drive);
        }
        let status = match self.command(b"UI") {
            Ok(status) => status,
            Err(e) => {
                debug!("device {}: no identification: {}", device, e);
                return None;
            }
        };
        let drive = DriveType::from_status(&status)?;
        info!("device {}: {} ({})", device, drive, status);
        self.drive_types.insert(device, drive);
        Some(drive)
    }

    /// Send a DOS command to the current IEC drive.
    fn command(&mut self, command: &[u8]) -> io::Result<DosStatus> {
        match &mut self.backend {
            Backend::Iec { bus, device } => bus.command(*device, command),
            Backend::Uci(_) => Err(BrowseError::Unsupported.into()),
        }
    }

    /// Switch to another IEC device.  The directory is emptied; call
    /// `refresh()` to list the new device.
    pub fn set_device(&mut self, new_device: u8) -> io::Result<()> {
        if !(FIRST_DEVICE..=LAST_DEVICE).contains(&new_device) {
            return Err(BrowseError::InvalidDevice.into());
        }
        match &mut self.backend {
            Backend::Iec { device, .. } => *device = new_device,
            Backend::Uci(_) => return Err(BrowseError::Unsupported.into()),
        }
        self.directory.clear();
        Ok(())
    }

    pub fn next_device(&mut self) -> io::Result<u8> {
        let device = self.device().ok_or_else(|| BrowseError::Unsupported.to_io_error())?;
        let next = if device >= LAST_DEVICE { FIRST_DEVICE } else { device + 1 };
        self.set_device(next)?;
        Ok(next)
    }

    pub fn previous_device(&mut self) -> io::Result<u8> {
        let device = self.device().ok_or_else(|| BrowseError::Unsupported.to_io_error())?;
        let previous = if device <= FIRST_DEVICE { LAST_DEVICE } else { device - 1 };
        self.set_device(previous)?;
        Ok(previous)
    }

    /// Probe devices 8 through 30 and stay on the first one that produces a
    /// listing, identifying that drive.  If none does, the original device
    /// is kept.
    pub fn find_first_device(&mut self) -> Option<u8> {
        let original = self.device()?;
        for device in FIRST_DEVICE..=LAST_DEVICE {
            if self.set_device(device).is_err() {
                continue;
            }
            if self
                .directory
                .read(&mut self.backend, self.sorted, &mut *self.progress)
            {
                debug!("first responding device: {}", device);
                self.drive_type();
                return Some(device);
            }
        }
        let _ = self.set_device(original);
        None
    }

    /// Change into `name`, or to the root when `name` is None, and read the
    /// new directory.
    pub fn change_dir(&mut self, name: Option<&Petscii>) -> io::Result<()> {
        match self.backend.mode() {
            BrowseMode::Iec => {
                let drive = self.drive_type();
                let command = iec_cd_command(name, drive);
                let status = self.command(&command)?;
                debug!("{:?}: {}", Petscii::from_bytes(&command), status);
                if !status.is_ok() {
                    return Err(BrowseError::CommandFailed(status.code).into());
                }
            }
            BrowseMode::Uci => {
                let ascii = match name {
                    Some(name) => name.to_ascii_bytes(),
                    None => b"/".to_vec(),
                };
                if let Backend::Uci(target) = &mut self.backend {
                    target.change_dir(&ascii)?;
                }
            }
        }
        self.refresh()
    }

    pub fn root_dir(&mut self) -> io::Result<()> {
        self.change_dir(None)?;
        if let Some(trace) = self.trace.as_mut() {
            trace.clear();
        }
        Ok(())
    }

    pub fn parent_dir(&mut self) -> io::Result<()> {
        let parent = match self.backend.mode() {
            BrowseMode::Uci => Petscii::from_str(".."),
            BrowseMode::Iec => match self.drive_type() {
                Some(DriveType::U64) => Petscii::from_bytes(b".."),
                _ => Petscii::from_bytes(&[PARENT_ARROW]),
            },
        };
        self.change_dir(Some(&parent))?;
        if let Some(trace) = self.trace.as_mut() {
            trace.pop();
        }
        Ok(())
    }

    /// Act on the selected entry: programs and memory images are handed
    /// back to the caller, disk images and directories are entered.
    pub fn select(&mut self) -> io::Result<Selection> {
        let entry = self
            .directory
            .selected_entry()
            .ok_or_else(|| BrowseError::EmptyDirectory.to_io_error())?;
        let name = entry.name.clone();
        let entry_type = entry.entry_type;

        let kind = mount::classify(&name);
        match kind {
            MountKind::MemoryExpansionImage => return Ok(Selection::MemoryImage(name)),
            MountKind::DiskImage => {}
            MountKind::None => match entry_type {
                EntryType::Program => return Ok(Selection::Run(name)),
                EntryType::Directory | EntryType::VirtualPartition | EntryType::Link => {}
                _ => return Ok(Selection::Nothing),
            },
        }

        self.change_dir(Some(&name))?;
        if let Some(trace) = self.trace.as_mut() {
            if let Err(e) = trace.push(&name) {
                warn!("not tracing {:?}: {}", name, e);
            }
        }
        Ok(Selection::Entered(kind))
    }

    /// Start recording the path from the root of the current device.  The
    /// drive is returned to its root first.
    pub fn enable_trace(&mut self) -> io::Result<()> {
        let device = self
            .device()
            .ok_or_else(|| BrowseError::Unsupported.to_io_error())?;
        self.trace = Some(PathTrace::new(device));
        self.root_dir()
    }

    pub fn disable_trace(&mut self) {
        self.trace = None;
    }

    pub fn trace(&self) -> Option<&PathTrace> {
        self.trace.as_ref()
    }

    /// The current path: the Ultimate filesystem's own path, or the traced
    /// `cd` command for an IEC drive.  None when an IEC path is not being
    /// traced.
    pub fn path(&mut self) -> io::Result<Option<String>> {
        if let Backend::Uci(target) = &mut self.backend {
            return target.current_path().map(Some);
        }
        let trace = match self.trace.clone() {
            Some(trace) => trace,
            None => return Ok(None),
        };
        let drive = self.drive_types.get(&trace.device()).cloned();
        Ok(Some(Petscii::from_bytes(&trace.command(drive)).to_string()))
    }
}

/// The DOS command that enters `name` (or the root).  Disk images, the
/// parent arrow, and any directory on a VICE or Ultimate drive use the
/// `CD:` form; CMD-style subdirectories use `CD/NAME/`.
fn iec_cd_command(name: Option<&Petscii>, drive: Option<DriveType>) -> Vec<u8> {
    let name = match name {
        Some(name) => name,
        None => return b"CD//".to_vec(),
    };
    let colon_form = mount::classify(name) == MountKind::DiskImage
        || name.as_bytes() == [PARENT_ARROW]
        || name.as_bytes() == b".."
        || drive.map_or(false, |d| d.uses_colon_cd());
    let mut command = vec![];
    if colon_form {
        command.extend_from_slice(b"CD:");
        command.extend_from_slice(name.as_bytes());
    } else {
        command.extend_from_slice(b"CD/");
        command.extend_from_slice(name.as_bytes());
        command.push(b'/');
    }
    command
}
