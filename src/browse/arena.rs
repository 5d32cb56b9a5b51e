use std::ops::{Index, IndexMut};

use crate::browse::entry::DirectoryEntry;
use crate::browse::error::BrowseError;

/// Bytes one node occupies in the firmware's directory region: a 17-byte
/// name, type, access, a two-byte block count, two links, and a flag byte.
/// Arena capacities are expressed in these units so that a region size
/// carries over unchanged.
pub const NODE_SIZE: usize = 26;

/// Handle to a node in an `Arena`.  Handles are only meaningful until the
/// arena is next reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A directory entry linked into the listing.
#[derive(Clone, Default, Debug)]
pub struct DirectoryNode {
    pub entry: DirectoryEntry,
    pub next: Option<NodeId>,
    pub prev: Option<NodeId>,
}

/// A bump allocator for directory nodes.  There is no way to release a
/// single node; `reset()` rewinds the whole arena at once, which invalidates
/// every `NodeId` handed out before.
pub struct Arena {
    nodes: Vec<DirectoryNode>,
    capacity: usize,
}

impl Arena {
    /// Create an arena with room for `capacity` nodes.  The storage is
    /// reserved up front and reused across resets.
    pub fn new(capacity: usize) -> Arena {
        Arena {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Create an arena sized to a byte region, holding as many whole nodes
    /// as fit.
    pub fn with_bytes(bytes: usize) -> Arena {
        Arena::new(bytes / NODE_SIZE)
    }

    /// Rewind the arena to empty.
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Return a fresh, zeroed node, or `OutOfSpace` if the arena is full.
    pub fn allocate(&mut self) -> Result<NodeId, BrowseError> {
        if self.nodes.len() >= self.capacity {
            return Err(BrowseError::OutOfSpace);
        }
        self.nodes.push(DirectoryNode::default());
        Ok(NodeId(self.nodes.len() - 1))
    }

    pub fn get(&self, id: NodeId) -> Option<&DirectoryNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes allocated since the last reset.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Index<NodeId> for Arena {
    type Output = DirectoryNode;

    fn index(&self, id: NodeId) -> &DirectoryNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Arena {
    fn index_mut(&mut self, id: NodeId) -> &mut DirectoryNode {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::entry::EntryType;

    #[test]
    fn test_allocate_until_full() {
        let mut arena = Arena::with_bytes(NODE_SIZE * 3 + 5);
        assert_eq!(arena.capacity(), 3);
        let ids: Vec<NodeId> = (0..3).map(|_| arena.allocate().unwrap()).collect();
        assert_eq!(ids.iter().map(|id| id.index()).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(arena.allocate(), Err(BrowseError::OutOfSpace));
        // Nodes allocated before the failure stay usable.
        assert_eq!(arena.len(), 3);
        assert!(arena.get(ids[2]).is_some());
    }

    #[test]
    fn test_reset_rewinds_and_zeroes() {
        let mut arena = Arena::new(2);
        let id = arena.allocate().unwrap();
        arena[id].entry.name = "dirty".into();
        arena[id].entry.entry_type = EntryType::Program;
        arena[id].next = Some(id);
        arena.reset();
        assert!(arena.is_empty());
        assert!(arena.get(id).is_none());
        let id = arena.allocate().unwrap();
        assert_eq!(id.index(), 0);
        assert!(arena[id].entry.name.is_empty());
        assert_eq!(arena[id].entry.entry_type, EntryType::Sequential);
        assert_eq!(arena[id].next, None);
    }

    #[test]
    fn test_zero_capacity() {
        let mut arena = Arena::new(0);
        assert_eq!(arena.allocate(), Err(BrowseError::OutOfSpace));
    }
}
