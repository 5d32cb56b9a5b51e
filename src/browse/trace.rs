use crate::browse::drive::DriveType;
use crate::browse::error::BrowseError;
use crate::petscii::Petscii;

/// Deepest path the trace records.
pub const MAX_DEPTH: usize = 8;
/// Longest component kept; longer names are truncated.
pub const MAX_COMPONENT: usize = 19;

/// The directories entered since the trace was started, so the path can be
/// replayed later as a single `cd` command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathTrace {
    device: u8,
    components: Vec<Petscii>,
}

impl PathTrace {
    pub fn new(device: u8) -> PathTrace {
        PathTrace {
            device,
            components: Vec::with_capacity(MAX_DEPTH),
        }
    }

    /// The device the traced path belongs to.
    pub fn device(&self) -> u8 {
        self.device
    }

    pub fn components(&self) -> &[Petscii] {
        &self.components
    }

    pub fn depth(&self) -> usize {
        self.components.len()
    }

    pub fn push(&mut self, name: &Petscii) -> Result<(), BrowseError> {
        if self.components.len() >= MAX_DEPTH {
            return Err(BrowseError::TraceFull);
        }
        let bytes = name.as_bytes();
        self.components
            .push(Petscii::from_bytes(&bytes[..bytes.len().min(MAX_COMPONENT)]));
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Petscii> {
        self.components.pop()
    }

    pub fn clear(&mut self) {
        self.components.clear();
    }

    /// Render the trace as the DOS command that changes straight to it.
    pub fn command(&self, drive: Option<DriveType>) -> Vec<u8> {
        let mut command = match drive {
            Some(d) if d.uses_colon_cd() => b"CD:/".to_vec(),
            _ => b"CD//".to_vec(),
        };
        for component in self.components.iter() {
            command.extend_from_slice(component.as_bytes());
            command.push(b'/');
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command() {
        let mut trace = PathTrace::new(9);
        assert_eq!(trace.command(None), b"CD//".to_vec());
        trace.push(&Petscii::from_bytes(b"GAMES")).unwrap();
        trace.push(&Petscii::from_bytes(b"ARCADE")).unwrap();
        assert_eq!(trace.command(Some(DriveType::Sd2iec)), b"CD//GAMES/ARCADE/".to_vec());
        assert_eq!(trace.command(Some(DriveType::U64)), b"CD:/GAMES/ARCADE/".to_vec());
        assert_eq!(trace.device(), 9);
        assert_eq!(trace.pop(), Some(Petscii::from_bytes(b"ARCADE")));
        assert_eq!(trace.command(Some(DriveType::Vice)), b"CD:/GAMES/".to_vec());
    }

    #[test]
    fn test_limits() {
        let mut trace = PathTrace::new(8);
        trace
            .push(&Petscii::from_bytes(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ"))
            .unwrap();
        assert_eq!(trace.components()[0].len(), MAX_COMPONENT);
        for _ in 1..MAX_DEPTH {
            trace.push(&Petscii::from_bytes(b"X")).unwrap();
        }
        assert_eq!(trace.push(&Petscii::from_bytes(b"X")), Err(BrowseError::TraceFull));
        assert_eq!(trace.depth(), MAX_DEPTH);
        trace.clear();
        assert_eq!(trace.depth(), 0);
        assert_eq!(trace.pop(), None);
    }
}
