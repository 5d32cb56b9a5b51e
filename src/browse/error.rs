use std::error;
use std::fmt;
use std::io;

/// Errors that can arise while reading or navigating a directory listing.
/// These are generally converted into `io::Error` at the session boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowseError {
    /// Unknown error
    Unknown,
    /// The directory arena has no room for another node
    OutOfSpace,
    /// The listing stream reported an error in the middle of a record
    StreamRead,
    /// The listing has no further records
    NoMoreData,
    /// A listing record was too short to parse
    RecordTooShort,
    /// The backend refused to open a directory listing
    ListingUnavailable,
    /// The drive answered a DOS command with an error status
    CommandFailed(u8),
    /// The operation is not offered by this backend
    Unsupported,
    /// Device number outside the IEC range
    InvalidDevice,
    /// The path trace is already at its maximum depth
    TraceFull,
    /// No entry is selected
    EmptyDirectory,
}

impl error::Error for BrowseError {}

impl fmt::Display for BrowseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BrowseError::CommandFailed(code) => write!(f, "{} ({:02})", self.message(), code),
            _ => f.write_str(self.message()),
        }
    }
}

impl From<BrowseError> for io::Error {
    fn from(error: BrowseError) -> io::Error {
        use self::BrowseError::*;
        use std::io::ErrorKind::*;
        let kind = match error {
            Unknown => Other,
            OutOfSpace => Other,
            StreamRead => InvalidData,
            NoMoreData => UnexpectedEof,
            RecordTooShort => InvalidData,
            ListingUnavailable => NotFound,
            CommandFailed(_) => Other,
            self::BrowseError::Unsupported => InvalidInput,
            InvalidDevice => InvalidInput,
            TraceFull => Other,
            EmptyDirectory => InvalidInput,
        };
        io::Error::new(kind, error)
    }
}

impl From<io::Error> for BrowseError {
    fn from(error: io::Error) -> BrowseError {
        BrowseError::from_io_error(&error).unwrap_or(BrowseError::Unknown)
    }
}

impl BrowseError {
    /// If the provided `io::Error` contains a `BrowseError`, return the
    /// underlying `BrowseError`.  If not, return None.
    pub fn from_io_error(error: &io::Error) -> Option<BrowseError> {
        error
            .get_ref()
            .and_then(|e| e.downcast_ref::<BrowseError>())
            .cloned()
    }

    /// This is sometimes useful instead of .into() when the compiler doesn't
    /// have enough information to perform type inference.
    pub fn to_io_error(&self) -> io::Error {
        self.clone().into()
    }

    /// Return true for errors that simply end a listing rather than
    /// indicating something wrong with the data.
    pub fn is_end_of_listing(&self) -> bool {
        matches!(*self, BrowseError::NoMoreData | BrowseError::OutOfSpace)
    }

    /// Provide terse descriptions of the errors.
    fn message(&self) -> &str {
        use self::BrowseError::*;
        match *self {
            Unknown => "unknown error",
            OutOfSpace => "directory arena is full",
            StreamRead => "listing stream read error",
            NoMoreData => "no more listing data",
            RecordTooShort => "listing record too short",
            ListingUnavailable => "directory listing unavailable",
            CommandFailed(_) => "drive command failed",
            Unsupported => "operation not supported by this backend",
            InvalidDevice => "invalid device number",
            TraceFull => "path trace is full",
            EmptyDirectory => "no entry selected",
        }
    }
}

impl PartialEq<io::Error> for BrowseError {
    fn eq(&self, other: &io::Error) -> bool {
        match BrowseError::from_io_error(other) {
            Some(ref e) if e == self => true,
            _ => false,
        }
    }
}

impl PartialEq<BrowseError> for io::Error {
    fn eq(&self, other: &BrowseError) -> bool {
        match BrowseError::from_io_error(self) {
            Some(ref e) if e == other => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_round_trip() {
        let io_error: io::Error = BrowseError::ListingUnavailable.into();
        assert_eq!(io_error.kind(), io::ErrorKind::NotFound);
        assert_eq!(
            BrowseError::from_io_error(&io_error),
            Some(BrowseError::ListingUnavailable)
        );
        assert!(io_error == BrowseError::ListingUnavailable);
        let io_error: io::Error = BrowseError::Unsupported.into();
        assert_eq!(io_error.kind(), io::ErrorKind::InvalidInput);
        assert!(io_error == BrowseError::Unsupported);
        let io_error: io::Error = BrowseError::TraceFull.into();
        assert_eq!(io_error.kind(), io::ErrorKind::Other);
        assert!(io_error == BrowseError::TraceFull);
        let plain = io::Error::new(io::ErrorKind::Other, "plain");
        assert_eq!(BrowseError::from(plain), BrowseError::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", BrowseError::CommandFailed(62)),
            "drive command failed (62)"
        );
        assert_eq!(format!("{}", BrowseError::OutOfSpace), "directory arena is full");
    }
}
