use crate::petscii::Petscii;

/// What selecting an entry would mount, judged from its name alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountKind {
    None,
    /// A disk image the drive can enter like a directory.
    DiskImage,
    /// A RAM expansion unit image.
    MemoryExpansionImage,
}

static DISK_IMAGE_EXTENSIONS: &[&[u8]] = &[b"D64", b"G64", b"D71", b"D81", b"G71", b"G81", b"DNP"];
static MEMORY_IMAGE_EXTENSIONS: &[&[u8]] = &[b"REU"];

/// Classify a name by its extension.  The name must be longer than four
/// characters and have a `.` exactly four characters from the end; case is
/// ignored.
pub fn classify(name: &Petscii) -> MountKind {
    let bytes = name.as_bytes();
    if bytes.len() <= 4 || bytes[bytes.len() - 4] != b'.' {
        return MountKind::None;
    }
    if DISK_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with_ignore_case(ext))
    {
        MountKind::DiskImage
    } else if MEMORY_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with_ignore_case(ext))
    {
        MountKind::MemoryExpansionImage
    } else {
        MountKind::None
    }
}

impl MountKind {
    pub fn of(name: &Petscii) -> MountKind {
        classify(name)
    }

    /// Marker shown next to a row in listings.
    pub fn marker(&self) -> &'static str {
        match *self {
            MountKind::None => "",
            MountKind::DiskImage => "[disk]",
            MountKind::MemoryExpansionImage => "[reu]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_images() {
        for name in &["game.d64", "GAME.D64", "x.g64", "boot.d71", "big.d81", "a.g71", "b.g81", "native.dnp"] {
            assert_eq!(classify(&Petscii::from(*name)), MountKind::DiskImage, "{}", name);
        }
        // Raw PETSCII bytes from an IEC listing.
        assert_eq!(classify(&Petscii::from_bytes(b"DEMO.D64")), MountKind::DiskImage);
    }

    #[test]
    fn test_memory_images() {
        assert_eq!(classify(&Petscii::from("ram.reu")), MountKind::MemoryExpansionImage);
        assert_eq!(classify(&Petscii::from("RAM.REU")), MountKind::MemoryExpansionImage);
        assert_eq!(classify(&Petscii::from("save.reu")), MountKind::MemoryExpansionImage);
        assert_eq!(classify(&Petscii::from("game.D71")), MountKind::DiskImage);
    }

    #[test]
    fn test_not_images() {
        assert_eq!(classify(&Petscii::from("a.64")), MountKind::None);
        assert_eq!(classify(&Petscii::from(".d64")), MountKind::None);
        assert_eq!(classify(&Petscii::from("gamed64")), MountKind::None);
        assert_eq!(classify(&Petscii::from("game.d6")), MountKind::None);
        assert_eq!(classify(&Petscii::from("game.prg")), MountKind::None);
        assert_eq!(classify(&Petscii::from("readme.txt")), MountKind::None);
        assert_eq!(classify(&Petscii::new()), MountKind::None);
    }
}
