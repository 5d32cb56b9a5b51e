//! The current working directory: building it from a listing and moving a
//! cursor through it.

use std::cmp::Ordering;

use log::{debug, trace, warn};

use crate::browse::arena::{Arena, DirectoryNode, NodeId};
use crate::browse::backend::Backend;
use crate::browse::entry::{DirectoryEntry, EntryType};
use crate::browse::{BrowseMode, BrowserConfig, NAME_SIZE};
use crate::petscii::Petscii;

/// Label used when an IEC listing does not open with a header line.
const UNKNOWN_LABEL: &str = "Unknown type";

/// Receives a tick for each record read while a listing is built.
pub trait Progress {
    fn tick(&mut self, records: usize);
}

impl Progress for () {
    fn tick(&mut self, _records: usize) {}
}

/// What a cursor operation changed, so a renderer knows how much to redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    /// Nothing moved.
    None,
    /// The selection moved within the visible page.
    Row,
    /// The visible page changed.
    Page,
}

/// A directory listing held as a doubly linked list of arena nodes, with a
/// selection cursor and the first row of the visible window.
pub struct Directory {
    arena: Arena,
    label: Option<Petscii>,
    free_blocks: u16,
    first: Option<NodeId>,
    last: Option<NodeId>,
    selected: Option<NodeId>,
    first_visible: Option<NodeId>,
    position: usize,
    first_visible_position: usize,
    len: usize,
    page_height: usize,
    line_buffer_len: usize,
}

impl Directory {
    pub fn new(config: &BrowserConfig) -> Directory {
        Directory {
            arena: Arena::with_bytes(config.arena_bytes),
            label: None,
            free_blocks: 0,
            first: None,
            last: None,
            selected: None,
            first_visible: None,
            position: 0,
            first_visible_position: 0,
            len: 0,
            page_height: config.page_height.max(1),
            line_buffer_len: config.line_buffer_len,
        }
    }

    /// Drop the listing.  Every `NodeId` obtained earlier becomes invalid.
    pub fn clear(&mut self) {
        self.arena.reset();
        self.label = None;
        self.free_blocks = 0;
        self.first = None;
        self.last = None;
        self.selected = None;
        self.first_visible = None;
        self.position = 0;
        self.first_visible_position = 0;
        self.len = 0;
    }

    /// Rebuild the directory from the backend's listing.
    ///
    /// Reading stops at the "blocks free" record, at the end of the stream,
    /// when the arena is full, or at the first record that fails to parse.
    /// None of these is an error; whatever was read before is kept.  Returns
    /// false only when the backend would not open a listing at all, in which
    /// case the directory is left empty.
    pub fn read(&mut self, backend: &mut Backend, sorted: bool, progress: &mut dyn Progress) -> bool {
        self.clear();
        if backend.open_listing().is_err() {
            return false;
        }
        let mode = backend.mode();
        let line_buffer_len = self.line_buffer_len;
        let mut records = 0;

        loop {
            let id = match self.arena.allocate() {
                Ok(id) => id,
                Err(e) => {
                    warn!("listing truncated after {} records: {}", records, e);
                    break;
                }
            };
            if let Err(e) = backend.read_entry(&mut self.arena[id].entry, line_buffer_len) {
                if e.is_end_of_listing() {
                    debug!("end of listing after {} records", records);
                } else {
                    warn!("listing stopped after {} records: {}", records, e);
                }
                break;
            }
            records += 1;
            progress.tick(records);
            trace!("record {}: {:?}", records, self.arena[id].entry);

            let entry = &self.arena[id].entry;
            match entry.entry_type {
                EntryType::VolumeHeader if self.label.is_none() => {
                    let mut label = entry.name.clone();
                    label.push(b',');
                    if let Some(disk_id) = &entry.disk_id {
                        label.extend_from_slice(disk_id.as_bytes());
                    }
                    self.label = Some(label);
                    continue;
                }
                EntryType::VolumeHeader => {
                    warn!("extra header line in listing: {:?}", entry.name);
                }
                EntryType::FreeSpaceMarker => {
                    self.free_blocks = entry.size_blocks;
                    break;
                }
                _ => {}
            }
            if mode == BrowseMode::Iec && self.label.is_none() {
                self.label = Some(Petscii::from_str(UNKNOWN_LABEL));
            }

            if sorted {
                self.insert_sorted(id);
            } else {
                self.append(id);
            }
        }
        backend.close_listing();
        debug!("listing read: {} entries, {} blocks free", self.len, self.free_blocks);

        if let Some(first) = self.first {
            self.selected = Some(first);
            self.first_visible = Some(first);
        }
        true
    }

    fn append(&mut self, id: NodeId) {
        match self.last {
            Some(last) => {
                self.arena[last].next = Some(id);
                self.arena[id].prev = Some(last);
            }
            None => self.first = Some(id),
        }
        self.last = Some(id);
        self.len += 1;
    }

    /// Link `id` in front of the first node whose name sorts after it.
    fn insert_sorted(&mut self, id: NodeId) {
        let mut cursor = self.first;
        while let Some(current) = cursor {
            let ordering = self.arena[current]
                .entry
                .name
                .cmp_prefix(&self.arena[id].entry.name, NAME_SIZE);
            if ordering == Ordering::Greater {
                let prev = self.arena[current].prev;
                self.arena[id].prev = prev;
                self.arena[id].next = Some(current);
                self.arena[current].prev = Some(id);
                match prev {
                    Some(prev) => self.arena[prev].next = Some(id),
                    None => self.first = Some(id),
                }
                self.len += 1;
                return;
            }
            cursor = self.arena[current].next;
        }
        self.append(id);
    }

    /// The volume label, `NAME,ID`, taken from the listing's header line.
    pub fn label(&self) -> Option<&Petscii> {
        self.label.as_ref()
    }

    pub fn free_blocks(&self) -> u16 {
        self.free_blocks
    }

    pub fn first(&self) -> Option<NodeId> {
        self.first
    }

    pub fn last(&self) -> Option<NodeId> {
        self.last
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn first_visible(&self) -> Option<NodeId> {
        self.first_visible
    }

    /// Zero-based index of the selected entry.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Number of arena nodes in use, including any discarded header.
    pub fn nodes_used(&self) -> usize {
        self.arena.len()
    }

    pub fn page_height(&self) -> usize {
        self.page_height
    }

    /// Change the visible row count.  The window is realigned so the
    /// selection stays on screen.
    pub fn set_page_height(&mut self, page_height: usize) {
        self.page_height = page_height.max(1);
        if let Some(selected) = self.selected {
            self.align_window(selected);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&DirectoryNode> {
        self.arena.get(id)
    }

    pub fn entry(&self, id: NodeId) -> Option<&DirectoryEntry> {
        self.arena.get(id).map(|node| &node.entry)
    }

    pub fn selected_entry(&self) -> Option<&DirectoryEntry> {
        self.selected.and_then(|id| self.entry(id))
    }

    /// Iterate over all entries in list order.
    pub fn iter(&self) -> Iter {
        Iter {
            arena: &self.arena,
            cursor: self.first,
        }
    }

    /// The rows of the visible window, each flagged with whether it is the
    /// selected one.
    pub fn visible(&self) -> impl Iterator<Item = (&DirectoryEntry, bool)> + '_ {
        let selected = self.selected;
        Iter {
            arena: &self.arena,
            cursor: self.first_visible,
        }
        .take(self.page_height)
        .map(move |(id, entry)| (entry, Some(id) == selected))
    }

    pub fn move_down(&mut self) -> Movement {
        let next = match self.selected.and_then(|id| self.arena[id].next) {
            Some(next) => next,
            None => return Movement::None,
        };
        let page = self.position / self.page_height;
        self.selected = Some(next);
        self.position += 1;
        // The new page starts at the row moved to.
        if self.position / self.page_height != page
            || self.position - self.first_visible_position >= self.page_height
        {
            self.first_visible = Some(next);
            self.first_visible_position = self.position;
            Movement::Page
        } else {
            Movement::Row
        }
    }

    pub fn move_up(&mut self) -> Movement {
        let prev = match self.selected.and_then(|id| self.arena[id].prev) {
            Some(prev) => prev,
            None => return Movement::None,
        };
        let page = self.position / self.page_height;
        self.selected = Some(prev);
        self.position -= 1;
        if self.position / self.page_height != page || self.position < self.first_visible_position {
            self.align_window(prev);
            Movement::Page
        } else {
            Movement::Row
        }
    }

    pub fn page_down(&mut self) -> Movement {
        self.page(|node| node.next, 1)
    }

    pub fn page_up(&mut self) -> Movement {
        self.page(|node| node.prev, -1)
    }

    fn page<F>(&mut self, step: F, direction: isize) -> Movement
    where
        F: Fn(&DirectoryNode) -> Option<NodeId>,
    {
        let mut current = match self.selected {
            Some(id) => id,
            None => return Movement::None,
        };
        let mut moved = 0;
        while moved < self.page_height {
            match step(&self.arena[current]) {
                Some(id) => current = id,
                None => break,
            }
            moved += 1;
        }
        if moved == 0 {
            return Movement::None;
        }
        if direction > 0 {
            self.position += moved;
        } else {
            self.position -= moved;
        }
        self.selected = Some(current);
        self.first_visible = Some(current);
        self.first_visible_position = self.position;
        Movement::Page
    }

    pub fn jump_to_top(&mut self) -> Movement {
        let first = match self.first {
            Some(first) => first,
            None => return Movement::None,
        };
        if self.position == 0 && self.first_visible_position == 0 {
            return Movement::None;
        }
        self.selected = Some(first);
        self.first_visible = Some(first);
        self.position = 0;
        self.first_visible_position = 0;
        Movement::Page
    }

    pub fn jump_to_end(&mut self) -> Movement {
        let mut current = match self.selected {
            Some(id) => id,
            None => return Movement::None,
        };
        let mut position = self.position;
        while let Some(next) = self.arena[current].next {
            current = next;
            position += 1;
        }
        if position == self.position {
            return Movement::None;
        }
        self.selected = Some(current);
        self.position = position;
        self.align_window(current);
        Movement::Page
    }

    /// Point the window at the start of the page holding `selected`, which
    /// must sit at `self.position`.
    fn align_window(&mut self, selected: NodeId) {
        let top_position = self.position / self.page_height * self.page_height;
        let mut top = selected;
        for _ in top_position..self.position {
            match self.arena[top].prev {
                Some(prev) => top = prev,
                None => break,
            }
        }
        self.first_visible = Some(top);
        self.first_visible_position = top_position;
    }
}

/// Iterator over directory entries, following `next` links.
pub struct Iter<'a> {
    arena: &'a Arena,
    cursor: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeId, &'a DirectoryEntry);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.arena.get(id)?;
        self.cursor = node.next;
        Some((id, &node.entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::backend::UciTarget;
    use crate::browse::entry::Access;
    use crate::browse::image::{ListingBuilder, ListingImage};
    use crate::browse::NODE_SIZE;
    use std::io;

    struct Records(Vec<Vec<u8>>, usize);

    impl UciTarget for Records {
        fn open_dir(&mut self) -> io::Result<()> {
            self.1 = 0;
            Ok(())
        }
        fn next_record(&mut self) -> Option<Vec<u8>> {
            let record = self.0.get(self.1).cloned();
            self.1 += 1;
            record
        }
        fn change_dir(&mut self, _name: &[u8]) -> io::Result<()> {
            Ok(())
        }
        fn current_path(&mut self) -> io::Result<String> {
            Ok("/".to_string())
        }
    }

    fn uci(names: &[&str]) -> Backend {
        let records = names
            .iter()
            .map(|name| {
                let mut record = vec![0u8];
                record.extend_from_slice(name.as_bytes());
                record
            })
            .collect();
        Backend::uci(Records(records, 0))
    }

    fn names(directory: &Directory) -> Vec<String> {
        directory
            .iter()
            .map(|(_, entry)| entry.name.to_string())
            .collect()
    }

    fn listing(count: usize) -> Vec<u8> {
        let mut builder = ListingBuilder::new().header(&"disk".into(), &"ab 2a".into());
        for i in 0..count {
            let name = Petscii::from_str(&format!("file{:02}", i));
            builder = builder.file(i as u16, &name, EntryType::Program, Access::ReadWrite);
        }
        builder.blocks_free(321).finish()
    }

    fn built(count: usize, page_height: usize) -> Directory {
        let config = BrowserConfig::small().with_page_height(page_height);
        let mut directory = Directory::new(&config);
        let mut backend = Backend::iec(ListingImage::from_bytes(&listing(count), 8), 8);
        assert!(directory.read(&mut backend, false, &mut ()));
        directory
    }

    #[test]
    fn test_sorted_and_unsorted() {
        let config = BrowserConfig::small();
        let mut directory = Directory::new(&config);
        let stream = ["zebra.prg", "apple.prg", "mango.seq"];

        assert!(directory.read(&mut uci(&stream), true, &mut ()));
        assert_eq!(names(&directory), vec!["apple.prg", "mango.seq", "zebra.prg"]);
        assert_eq!(directory.selected(), directory.first());
        assert_eq!(directory.position(), 0);

        assert!(directory.read(&mut uci(&stream), false, &mut ()));
        assert_eq!(names(&directory), vec!["zebra.prg", "apple.prg", "mango.seq"]);
        assert_eq!(directory.len(), 3);
        let types: Vec<EntryType> = directory.iter().map(|(_, e)| e.entry_type).collect();
        assert_eq!(types, vec![EntryType::Program, EntryType::Program, EntryType::Sequential]);
    }

    #[test]
    fn test_links_are_consistent() {
        let config = BrowserConfig::small();
        let mut directory = Directory::new(&config);
        assert!(directory.read(&mut uci(&["d.prg", "b.prg", "e.prg", "a.prg", "c.prg"]), true, &mut ()));
        let ids: Vec<NodeId> = directory.iter().map(|(id, _)| id).collect();
        for pair in ids.windows(2) {
            assert_eq!(directory.node(pair[0]).unwrap().next, Some(pair[1]));
            assert_eq!(directory.node(pair[1]).unwrap().prev, Some(pair[0]));
        }
        assert_eq!(directory.node(ids[0]).unwrap().prev, None);
        assert_eq!(directory.last(), Some(ids[4]));
    }

    #[test]
    fn test_header_and_free_blocks() {
        let directory = built(3, 19);
        assert_eq!(directory.label(), Some(&Petscii::from("disk,ab 2a")));
        assert_eq!(directory.free_blocks(), 321);
        assert_eq!(directory.len(), 3);
        assert_eq!(directory.nodes_used(), 5);
        assert_eq!(names(&directory), vec!["file00", "file01", "file02"]);
    }

    #[test]
    fn test_unknown_label() {
        let bytes = ListingBuilder::new()
            .file(1, &"solo".into(), EntryType::Program, Access::ReadWrite)
            .blocks_free(10)
            .finish();
        let mut directory = Directory::new(&BrowserConfig::small());
        let mut backend = Backend::iec(ListingImage::from_bytes(&bytes, 8), 8);
        assert!(directory.read(&mut backend, false, &mut ()));
        assert_eq!(directory.label(), Some(&Petscii::from(UNKNOWN_LABEL)));
        assert_eq!(names(&directory), vec!["solo"]);

        // Ultimate listings have no header and get no label.
        directory.read(&mut uci(&["a.prg"]), false, &mut ());
        assert_eq!(directory.label(), None);
    }

    #[test]
    fn test_second_header_is_listed() {
        let bytes = ListingBuilder::new()
            .header(&"first".into(), &"01 2a".into())
            .file(1, &"a".into(), EntryType::Program, Access::ReadWrite)
            .header(&"second".into(), &"02 2a".into())
            .finish();
        let mut directory = Directory::new(&BrowserConfig::small());
        let mut backend = Backend::iec(ListingImage::from_bytes(&bytes, 8), 8);
        assert!(directory.read(&mut backend, false, &mut ()));
        assert_eq!(directory.label(), Some(&Petscii::from("first,01 2a")));
        let types: Vec<EntryType> = directory.iter().map(|(_, e)| e.entry_type).collect();
        assert_eq!(types, vec![EntryType::Program, EntryType::VolumeHeader]);
        assert_eq!(directory.free_blocks(), 0);
    }

    #[test]
    fn test_truncated_listing() {
        let config = BrowserConfig::small().with_arena_bytes(NODE_SIZE * 4);
        let mut directory = Directory::new(&config);
        let mut backend = Backend::iec(ListingImage::from_bytes(&listing(10), 8), 8);
        assert!(directory.read(&mut backend, true, &mut ()));
        assert_eq!(directory.len(), 3);
        assert_eq!(directory.free_blocks(), 0);
        assert_eq!(names(&directory), vec!["file00", "file01", "file02"]);
    }

    #[test]
    fn test_malformed_record_stops_listing() {
        let bytes = ListingBuilder::new()
            .file(1, &"a".into(), EntryType::Program, Access::ReadWrite)
            .line(0, b"\"x\"")
            .file(1, &"b".into(), EntryType::Program, Access::ReadWrite)
            .finish();
        let mut directory = Directory::new(&BrowserConfig::small());
        let mut backend = Backend::iec(ListingImage::from_bytes(&bytes, 8), 8);
        assert!(directory.read(&mut backend, false, &mut ()));
        assert_eq!(names(&directory), vec!["a"]);
    }

    #[test]
    fn test_unavailable_listing() {
        let mut directory = built(2, 19);
        let mut backend = Backend::iec(ListingImage::from_bytes(&listing(2), 8), 9);
        assert!(!directory.read(&mut backend, false, &mut ()));
        assert!(directory.is_empty());
        assert_eq!(directory.selected(), None);
        assert_eq!(directory.move_down(), Movement::None);
        assert_eq!(directory.page_up(), Movement::None);
        assert_eq!(directory.jump_to_end(), Movement::None);
        assert_eq!(directory.jump_to_top(), Movement::None);
    }

    #[test]
    fn test_progress() {
        struct Count(usize);
        impl Progress for Count {
            fn tick(&mut self, records: usize) {
                self.0 = records;
            }
        }
        let mut count = Count(0);
        let mut directory = Directory::new(&BrowserConfig::small());
        let mut backend = Backend::iec(ListingImage::from_bytes(&listing(4), 8), 8);
        directory.read(&mut backend, false, &mut count);
        // Header, four files, and the blocks free line.
        assert_eq!(count.0, 6);
    }

    #[test]
    fn test_move_down_crosses_page() {
        let mut directory = built(5, 3);
        let first = directory.first();
        assert_eq!(directory.move_down(), Movement::Row);
        assert_eq!(directory.move_down(), Movement::Row);
        assert_eq!(directory.first_visible(), first);
        assert_eq!(directory.move_down(), Movement::Page);
        assert_eq!(directory.position(), 3);
        let ids: Vec<NodeId> = directory.iter().map(|(id, _)| id).collect();
        assert_eq!(directory.first_visible(), Some(ids[3]));
        assert_eq!(directory.selected(), Some(ids[3]));
        assert_eq!(directory.move_down(), Movement::Row);
        assert_eq!(directory.move_down(), Movement::None);
        assert_eq!(directory.position(), 4);
    }

    #[test]
    fn test_move_up_aligns_page() {
        let mut directory = built(8, 3);
        let ids: Vec<NodeId> = directory.iter().map(|(id, _)| id).collect();
        for _ in 0..6 {
            directory.move_down();
        }
        assert_eq!(directory.first_visible(), Some(ids[6]));
        assert_eq!(directory.move_up(), Movement::Page);
        assert_eq!(directory.position(), 5);
        assert_eq!(directory.first_visible(), Some(ids[3]));
        assert_eq!(directory.move_up(), Movement::Row);
        assert_eq!(directory.move_up(), Movement::Row);
        assert_eq!(directory.move_up(), Movement::Page);
        assert_eq!(directory.first_visible(), Some(ids[0]));
        assert_eq!(directory.move_up(), Movement::Row);
        assert_eq!(directory.move_up(), Movement::Row);
        assert_eq!(directory.move_up(), Movement::None);
        assert_eq!(directory.position(), 0);
    }

    #[test]
    fn test_paging() {
        let mut directory = built(7, 3);
        let ids: Vec<NodeId> = directory.iter().map(|(id, _)| id).collect();
        assert_eq!(directory.page_up(), Movement::None);
        assert_eq!(directory.page_down(), Movement::Page);
        assert_eq!(directory.position(), 3);
        assert_eq!(directory.page_down(), Movement::Page);
        assert_eq!(directory.position(), 6);
        assert_eq!(directory.first_visible(), Some(ids[6]));
        assert_eq!(directory.page_down(), Movement::None);
        assert_eq!(directory.page_up(), Movement::Page);
        assert_eq!(directory.position(), 3);
        assert_eq!(directory.selected(), Some(ids[3]));
        assert_eq!(directory.first_visible(), Some(ids[3]));

        // Off-page window after paging: moving above it pulls it along.
        directory.page_up();
        directory.move_down();
        assert_eq!(directory.page_down(), Movement::Page);
        assert_eq!(directory.position(), 4);
        assert_eq!(directory.move_up(), Movement::Page);
        assert_eq!(directory.position(), 3);
        assert_eq!(directory.first_visible(), Some(ids[3]));
    }

    #[test]
    fn test_jumps() {
        let mut directory = built(7, 3);
        let ids: Vec<NodeId> = directory.iter().map(|(id, _)| id).collect();
        assert_eq!(directory.jump_to_top(), Movement::None);
        assert_eq!(directory.jump_to_end(), Movement::Page);
        assert_eq!(directory.position(), 6);
        assert_eq!(directory.selected(), Some(ids[6]));
        assert_eq!(directory.first_visible(), Some(ids[6]));
        assert_eq!(directory.jump_to_end(), Movement::None);
        assert_eq!(directory.jump_to_top(), Movement::Page);
        assert_eq!(directory.selected(), Some(ids[0]));
        assert_eq!(directory.first_visible(), Some(ids[0]));
    }

    #[test]
    fn test_visible_rows() {
        let mut directory = built(5, 3);
        directory.move_down();
        let rows: Vec<(String, bool)> = directory
            .visible()
            .map(|(entry, selected)| (entry.name.to_string(), selected))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("file00".to_string(), false),
                ("file01".to_string(), true),
                ("file02".to_string(), false),
            ]
        );
        directory.jump_to_end();
        assert_eq!(directory.visible().count(), 2);

        directory.set_page_height(4);
        assert_eq!(directory.first_visible(), directory.iter().nth(4).map(|(id, _)| id));
        directory.set_page_height(10);
        assert_eq!(directory.first_visible(), directory.first());
        assert_eq!(directory.visible().count(), 5);
    }
}
