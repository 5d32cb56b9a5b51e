use std::fmt;

/// Write a single-line hex dump of the provided byte slice, followed by its
/// printable characters.  Raw listing records are short enough that this
/// fits comfortably in one log line.
pub fn hexdump(f: &mut fmt::Formatter, buffer: &[u8]) -> fmt::Result {
    for b in buffer {
        write!(f, "{:02x} ", b)?;
    }
    f.write_str("|")?;
    for b in buffer {
        write!(
            f,
            "{}",
            match *b {
                c @ 0x20..=0x7E => c as char,
                _ => '.',
            }
        )?;
    }
    f.write_str("|")
}

pub struct Hex<'a>(pub &'a [u8]);
impl<'a> fmt::Display for Hex<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        hexdump(f, self.0)
    }
}

pub fn hex(bytes: &[u8]) -> Hex {
    Hex(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(format!("{}", hex(b"A\x00b")), "41 00 62 |A.b|");
        assert_eq!(format!("{}", hex(&[])), "||");
    }
}
