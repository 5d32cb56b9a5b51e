use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::browse::backend::UciTarget;
use crate::browse::NAME_SIZE;

const DIRECTORY_ATTRIBUTE: u8 = 0x10;

/// A directory tree on the host filesystem, presented the way the Ultimate
/// filesystem presents its storage.  Navigation is confined to `root`.
pub struct HostDirectory {
    root: PathBuf,
    components: Vec<String>,
    records: Vec<Vec<u8>>,
    next: usize,
}

impl HostDirectory {
    pub fn open<P: AsRef<Path>>(root: P) -> io::Result<HostDirectory> {
        let root = root.as_ref().to_path_buf();
        if !fs::metadata(&root)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(HostDirectory {
            root,
            components: vec![],
            records: vec![],
            next: 0,
        })
    }

    fn cwd(&self) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(self.components.iter());
        path
    }

    /// Find the directory `name` refers to.  Listing names are cut to 16
    /// characters, so a name of that length also matches longer names that
    /// start with it.  Symbolic links are never followed.
    fn resolve(&self, name: &str) -> io::Result<String> {
        let cwd = self.cwd();
        let is_dir = fs::symlink_metadata(cwd.join(name))
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        if is_dir {
            return Ok(name.to_string());
        }
        if name.len() == NAME_SIZE {
            for dir_entry in fs::read_dir(&cwd)? {
                let dir_entry = dir_entry?;
                let candidate = dir_entry.file_name().to_string_lossy().into_owned();
                if candidate.starts_with(name) && dir_entry.file_type()?.is_dir() {
                    return Ok(candidate);
                }
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no directory named {}", name),
        ))
    }
}

impl UciTarget for HostDirectory {
    fn open_dir(&mut self) -> io::Result<()> {
        let mut records = vec![];
        for dir_entry in fs::read_dir(self.cwd())? {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let mut record = vec![0u8];
            if dir_entry.file_type()?.is_dir() {
                record[0] |= DIRECTORY_ATTRIBUTE;
            }
            record.extend(name.bytes().filter(|b| b.is_ascii()));
            records.push(record);
        }
        // read_dir() order is arbitrary.
        records.sort_by(|a, b| a[1..].cmp(&b[1..]));
        debug!("{}: {} records", self.cwd().display(), records.len());
        self.records = records;
        self.next = 0;
        Ok(())
    }

    fn next_record(&mut self) -> Option<Vec<u8>> {
        let record = self.records.get(self.next).cloned();
        if record.is_some() {
            self.next += 1;
        }
        record
    }

    fn close_dir(&mut self) {
        self.records.clear();
        self.next = 0;
    }

    fn change_dir(&mut self, name: &[u8]) -> io::Result<()> {
        let name = String::from_utf8_lossy(name).into_owned();
        match name.as_str() {
            "/" => self.components.clear(),
            ".." => {
                self.components.pop();
            }
            "" | "." => {}
            _ if name.contains('/') || name.contains('\\') => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("bad directory name {}", name),
                ));
            }
            _ => {
                let resolved = self.resolve(&name)?;
                self.components.push(resolved);
            }
        }
        Ok(())
    }

    fn current_path(&mut self) -> io::Result<String> {
        let mut path = String::from("/");
        for component in self.components.iter() {
            path.push_str(component);
            path.push('/');
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_records_and_navigation() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("games")).unwrap();
        fs::create_dir(dir.path().join("a_long_directory_name")).unwrap();
        File::create(dir.path().join("intro.prg")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        File::create(dir.path().join("games").join("pacman.d64")).unwrap();

        let mut host = HostDirectory::open(dir.path()).unwrap();
        host.open_dir().unwrap();
        let mut records = vec![];
        while let Some(record) = host.next_record() {
            records.push(record);
        }
        assert_eq!(
            records,
            vec![
                b"\x10a_long_directory_name".to_vec(),
                b"\x10games".to_vec(),
                b"\x00intro.prg".to_vec(),
            ]
        );

        host.change_dir(b"games").unwrap();
        assert_eq!(host.current_path().unwrap(), "/games/");
        host.open_dir().unwrap();
        assert_eq!(host.next_record(), Some(b"\x00pacman.d64".to_vec()));
        assert_eq!(host.next_record(), None);

        host.change_dir(b"..").unwrap();
        host.change_dir(b"..").unwrap();
        assert_eq!(host.current_path().unwrap(), "/");

        host.change_dir(b"a_long_directory").unwrap();
        assert_eq!(host.current_path().unwrap(), "/a_long_directory_name/");
        host.change_dir(b"/").unwrap();
        assert_eq!(host.current_path().unwrap(), "/");
    }

    #[test]
    fn test_bad_directories() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("intro.prg")).unwrap();
        let mut host = HostDirectory::open(dir.path()).unwrap();
        assert!(host.change_dir(b"intro.prg").is_err());
        assert!(host.change_dir(b"missing").is_err());
        assert!(host.change_dir(b"../etc").is_err());
        assert_eq!(host.current_path().unwrap(), "/");
        assert!(HostDirectory::open(dir.path().join("intro.prg")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_stay_inside_root() {
        let outside = tempfile::tempdir().unwrap();
        File::create(outside.path().join("secret.prg")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape_hatch_long_name")).unwrap();

        let mut host = HostDirectory::open(dir.path()).unwrap();
        host.open_dir().unwrap();
        // Listed, but not as a directory.
        assert_eq!(host.next_record(), Some(b"\x00escape".to_vec()));
        assert!(host.change_dir(b"escape").is_err());
        assert!(host.change_dir(b"escape_hatch_lon").is_err());
        assert_eq!(host.current_path().unwrap(), "/");
    }
}
