//! PETSCII strings
//!
//! Names arriving from IEC drives are PETSCII bytes, while names from the
//! Ultimate filesystem are ASCII and are converted on the way in.  Display
//! uses the shifted (lowercase/uppercase) character set, which is how the
//! browser presents directory listings.

use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write;

const PETSCII_POUND: u8 = 0x5c;
const PETSCII_UP_ARROW: u8 = 0x5e;
const PETSCII_LEFT_ARROW: u8 = 0x5f;
const PETSCII_SHIFTED_SPACE: u8 = 0xa0;

/// A sequence of PETSCII bytes.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Petscii(Vec<u8>);

impl Petscii {
    pub fn new() -> Petscii {
        Petscii(vec![])
    }

    pub fn from_bytes(bytes: &[u8]) -> Petscii {
        Petscii(bytes.to_vec())
    }

    /// Convert ASCII bytes (as reported by the Ultimate filesystem) to
    /// PETSCII.  Conversion stops at the first NUL.
    pub fn from_ascii_bytes(bytes: &[u8]) -> Petscii {
        Petscii(
            bytes
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| ascii_to_petscii(b))
                .collect(),
        )
    }

    pub fn from_str(string: &str) -> Petscii {
        Self::from_ascii_bytes(string.as_bytes())
    }

    /// Convert back to ASCII, for handing a name to the Ultimate filesystem.
    pub fn to_ascii_bytes(&self) -> Vec<u8> {
        self.0.iter().map(|&b| petscii_to_ascii(b)).collect()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, byte: u8) {
        self.0.push(byte);
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    /// Remove trailing NUL, space, and shifted-space bytes.
    pub fn trim_end(&mut self) {
        while let Some(&b) = self.0.last() {
            if b == 0 || b == b' ' || b == PETSCII_SHIFTED_SPACE {
                self.0.pop();
            } else {
                break;
            }
        }
    }

    /// Compare the first `limit` bytes of two strings, the way `strncmp()`
    /// would.
    pub fn cmp_prefix(&self, other: &Petscii, limit: usize) -> Ordering {
        let a = &self.0[..self.0.len().min(limit)];
        let b = &other.0[..other.0.len().min(limit)];
        a.cmp(b)
    }

    /// Return true if this string ends with `suffix`, ignoring letter case.
    /// The suffix is given in ASCII uppercase.
    pub fn ends_with_ignore_case(&self, suffix: &[u8]) -> bool {
        if self.0.len() < suffix.len() {
            return false;
        }
        let tail = &self.0[self.0.len() - suffix.len()..];
        tail.iter()
            .zip(suffix.iter())
            .all(|(&a, &b)| fold_case(a) == b)
    }

    /// Render the string with non-printable bytes escaped as `{$xx}`.
    pub fn to_escaped_string(&self) -> String {
        let mut string = String::with_capacity(self.0.len());
        for &b in self.0.iter() {
            match petscii_to_char(b) {
                Some(c) => string.push(c),
                None => {
                    let _ = write!(string, "{{${:02x}}}", b);
                }
            }
        }
        string
    }
}

/// Fold PETSCII letters in either character set half onto 0x41..=0x5A, the
/// same byte values as ASCII uppercase.
pub(crate) fn fold_case(byte: u8) -> u8 {
    match byte {
        0x61..=0x7a => byte - 0x20,
        0xc1..=0xda => byte - 0x80,
        _ => byte,
    }
}

fn ascii_to_petscii(byte: u8) -> u8 {
    match byte {
        b'a'..=b'z' => byte - 0x20,
        b'A'..=b'Z' => byte + 0x80,
        b'_' => PETSCII_LEFT_ARROW,
        b'^' => PETSCII_UP_ARROW,
        _ => byte,
    }
}

fn petscii_to_ascii(byte: u8) -> u8 {
    match byte {
        0x41..=0x5a => byte + 0x20,
        0x61..=0x7a => byte - 0x20,
        0xc1..=0xda => byte - 0x80,
        PETSCII_LEFT_ARROW => b'_',
        PETSCII_UP_ARROW => b'^',
        _ => byte,
    }
}

fn petscii_to_char(byte: u8) -> Option<char> {
    match byte {
        0x20..=0x40 | b'[' | b']' => Some(byte as char),
        0x41..=0x5a => Some((byte + 0x20) as char),
        0x61..=0x7a => Some((byte - 0x20) as char),
        0xc1..=0xda => Some((byte - 0x80) as char),
        PETSCII_POUND => Some('£'),
        PETSCII_UP_ARROW => Some('↑'),
        PETSCII_LEFT_ARROW => Some('←'),
        PETSCII_SHIFTED_SPACE => Some(' '),
        _ => None,
    }
}

impl fmt::Display for Petscii {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Render through a String so width and alignment flags apply.
        let string: String = self
            .0
            .iter()
            .map(|&b| petscii_to_char(b).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        f.pad(&string)
    }
}

impl fmt::Debug for Petscii {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.to_escaped_string())
    }
}

impl<'a> From<&'a str> for Petscii {
    fn from(string: &'a str) -> Petscii {
        Petscii::from_str(string)
    }
}

impl<'a> From<&'a [u8]> for Petscii {
    fn from(bytes: &'a [u8]) -> Petscii {
        Petscii::from_bytes(bytes)
    }
}
