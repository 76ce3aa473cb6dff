// Filesystem drivers, one family per module directory.
pub mod ole;

pub use ole::{DirectoryEntry, EntryKind, OleFilesystem, OleHeader, OlePath, OleString};
