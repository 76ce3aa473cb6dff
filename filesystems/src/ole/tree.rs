// Directory tree traversal
// The directory is a forest of binary search trees over one flat entry
// table; every link is a u32 index with NOSTREAM as null.

use crate::ole::constants::NOSTREAM;
use crate::ole::directory::DirectoryEntry;
use crate::ole::string::OleString;
use log::trace;
use std::cmp::Ordering;

/// An index is followed only when it names a real entry; `NOSTREAM` and
/// out-of-range ids both read as an absent link.
fn node(entries: &[DirectoryEntry], id: u32) -> Option<&DirectoryEntry> {
    if id == NOSTREAM {
        return None;
    }
    entries.get(id as usize)
}

/// In-order walk of the sibling tree rooted at one index, yielding entries
/// in comparator order.
pub struct InOrder<'a> {
    entries: &'a [DirectoryEntry],
    stack: Vec<u32>,
    current: u32,
}

impl<'a> InOrder<'a> {
    pub fn new(entries: &'a [DirectoryEntry], root: u32) -> Self {
        Self {
            entries,
            stack: Vec::new(),
            current: root,
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a DirectoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entry) = node(self.entries, self.current) {
            self.stack.push(self.current);
            self.current = entry.left_id;
        }
        let id = self.stack.pop()?;
        let entry = &self.entries[id as usize];
        self.current = entry.right_id;
        Some(entry)
    }
}

/// Key-ordered descent below one tree root. Yields the matching entry's
/// index, or nothing.
pub fn descend(entries: &[DirectoryEntry], root: u32, key: &OleString) -> Option<u32> {
    let mut current = root;
    while let Some(entry) = node(entries, current) {
        match key.compare(&entry.name) {
            Ordering::Less => current = entry.left_id,
            Ordering::Greater => current = entry.right_id,
            Ordering::Equal => {
                trace!("descend: hit '{}' at index {}", entry.name, current);
                return Some(current);
            }
        }
    }
    None
}

/// Lookup-descent as a sequence: at most one yielded entry.
pub struct Lookup<'a> {
    entries: &'a [DirectoryEntry],
    root: u32,
    key: Option<&'a OleString>,
}

impl<'a> Lookup<'a> {
    pub fn new(entries: &'a [DirectoryEntry], root: u32, key: &'a OleString) -> Self {
        Self {
            entries,
            root,
            key: Some(key),
        }
    }
}

impl<'a> Iterator for Lookup<'a> {
    type Item = &'a DirectoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.key.take()?;
        let id = descend(self.entries, self.root, key)?;
        Some(&self.entries[id as usize])
    }
}

/// Segment-by-segment path resolution. Each yielded entry is the match for
/// one path segment; after a hit the next segment is looked up below the
/// hit's child tree. A miss ends the sequence early, so a full resolution
/// yields exactly as many entries as the path has segments.
pub struct ResolvePath<'a, 'b> {
    entries: &'a [DirectoryEntry],
    segments: std::slice::Iter<'b, OleString>,
    next_root: u32,
    done: bool,
}

impl<'a, 'b> ResolvePath<'a, 'b> {
    pub fn new(entries: &'a [DirectoryEntry], segments: &'b [OleString], root: u32) -> Self {
        Self {
            entries,
            segments: segments.iter(),
            next_root: root,
            done: false,
        }
    }
}

impl<'a, 'b> Iterator for ResolvePath<'a, 'b> {
    type Item = &'a DirectoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let segment = match self.segments.next() {
            Some(segment) => segment,
            None => {
                self.done = true;
                return None;
            }
        };
        match descend(self.entries, self.next_root, segment) {
            Some(id) => {
                let entry = &self.entries[id as usize];
                self.next_root = entry.child_id;
                Some(entry)
            }
            None => {
                trace!("resolve: no entry named '{}'", segment);
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::directory::EntryKind;

    fn entry(name: &str, kind: EntryKind, left: u32, right: u32, child: u32) -> DirectoryEntry {
        DirectoryEntry {
            name: OleString::from_path_component(name).unwrap(),
            kind,
            left_id: left,
            right_id: right,
            child_id: child,
            starting_sector: 0,
            creation_time: 0,
            modified_time: 0,
            stream_size: 0,
        }
    }

    const NS: u32 = NOSTREAM;

    /// Root
    /// └── {Dir, a.txt, big.bin} as a BST rooted at "a.txt"
    ///     └── Dir → {Leaf}
    fn arena() -> Vec<DirectoryEntry> {
        vec![
            entry("Root Entry", EntryKind::Root, NS, NS, 2),
            entry("Dir", EntryKind::Storage, NS, NS, 4),
            entry("a.txt", EntryKind::Stream, 1, 3, NS),
            entry("big.bin", EntryKind::Stream, NS, NS, NS),
            entry("Leaf", EntryKind::Stream, NS, NS, NS),
        ]
    }

    fn key(s: &str) -> OleString {
        OleString::from_path_component(s).unwrap()
    }

    #[test]
    fn in_order_follows_comparator_order() {
        let entries = arena();
        let names: Vec<String> = InOrder::new(&entries, entries[0].child_id)
            .map(|e| e.name.to_string())
            .collect();
        // Shorter names first: Dir (3) < a.txt (5) < big.bin (7).
        assert_eq!(names, ["Dir", "a.txt", "big.bin"]);
    }

    #[test]
    fn in_order_of_empty_tree_is_empty() {
        let entries = arena();
        assert_eq!(InOrder::new(&entries, NS).count(), 0);
    }

    #[test]
    fn lookup_yields_at_most_one() {
        let entries = arena();
        let root = entries[0].child_id;

        let needle = key("big.bin");
        let hits: Vec<_> = Lookup::new(&entries, root, &needle).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, key("big.bin"));

        assert_eq!(Lookup::new(&entries, root, &key("missing")).count(), 0);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let entries = arena();
        let root = entries[0].child_id;
        assert_eq!(Lookup::new(&entries, root, &key("BIG.BIN")).count(), 1);
    }

    #[test]
    fn resolve_descends_into_child_trees() {
        let entries = arena();
        let root = entries[0].child_id;
        let segments = [key("Dir"), key("Leaf")];

        let resolved: Vec<_> = ResolvePath::new(&entries, &segments, root).collect();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].name, key("Leaf"));
    }

    #[test]
    fn resolve_stops_short_on_miss() {
        let entries = arena();
        let root = entries[0].child_id;

        let segments = [key("Dir"), key("Missing")];
        assert_eq!(ResolvePath::new(&entries, &segments, root).count(), 1);

        let segments = [key("Missing"), key("Leaf")];
        assert_eq!(ResolvePath::new(&entries, &segments, root).count(), 0);

        // A stream has no child tree to continue into.
        let segments = [key("a.txt"), key("anything")];
        assert_eq!(ResolvePath::new(&entries, &segments, root).count(), 1);
    }

    #[test]
    fn out_of_range_links_read_as_absent() {
        let mut entries = arena();
        entries[1].child_id = 99;
        let segments = [key("Dir"), key("Leaf")];
        assert_eq!(
            ResolvePath::new(&entries, &segments, entries[0].child_id).count(),
            1
        );
    }
}
