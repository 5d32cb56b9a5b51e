use std::fmt;

use crate::browse::backend::DosStatus;
use crate::petscii;

/// The status code a drive answers the `UI` (reset) command with.  The
/// message that follows names the DOS version and, usually, the drive.
pub const DOS_VERSION_STATUS: u8 = 73;

/// Drive models the browser knows how to talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriveType {
    Pi1541,
    D1540,
    D1541,
    D1551,
    D1570,
    D1571,
    D1581,
    D1001,
    D2031,
    D8040,
    Sd2iec,
    Cmd,
    Vice,
    U64,
}

/// Search order for the identification strings.  The first one found in
/// the status message wins, so "Pi1541" must come before "1541".
static DRIVE_TYPES: &[(&str, DriveType)] = &[
    ("Pi1541", DriveType::Pi1541),
    ("1540", DriveType::D1540),
    ("1541", DriveType::D1541),
    ("1551", DriveType::D1551),
    ("1570", DriveType::D1570),
    ("1571", DriveType::D1571),
    ("1581", DriveType::D1581),
    ("1001", DriveType::D1001),
    ("2031", DriveType::D2031),
    ("8040", DriveType::D8040),
    ("sd2iec", DriveType::Sd2iec),
    ("cmd", DriveType::Cmd),
    ("vice", DriveType::Vice),
    ("u64", DriveType::U64),
];

impl DriveType {
    /// Identify a drive from its reply to `UI`.  Replies with any other
    /// status code identify nothing.
    pub fn from_status(status: &DosStatus) -> Option<DriveType> {
        if status.code != DOS_VERSION_STATUS {
            return None;
        }
        DriveType::from_message(status.message.as_bytes())
    }

    /// Find the first known identification string in a status message,
    /// ignoring case.
    pub fn from_message(message: &[u8]) -> Option<DriveType> {
        let haystack: Vec<u8> = message.iter().map(|&b| petscii::fold_case(b)).collect();
        DRIVE_TYPES
            .iter()
            .find(|(needle, _)| {
                let needle: Vec<u8> = needle.bytes().map(|b| b.to_ascii_uppercase()).collect();
                haystack.windows(needle.len()).any(|w| w == &needle[..])
            })
            .map(|&(_, drive)| drive)
    }

    pub fn name(&self) -> &'static str {
        DRIVE_TYPES
            .iter()
            .find(|(_, drive)| drive == self)
            .map(|&(name, _)| name)
            .unwrap_or("")
    }

    /// Drives whose DOS takes `cd:` with a full path rather than the
    /// CMD-style `cd/NAME/`.
    pub fn uses_colon_cd(&self) -> bool {
        matches!(*self, DriveType::Vice | DriveType::U64)
    }
}

impl fmt::Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}
