// OLE/CFB compound container driver (read-only)
// Mounting loads the header, FAT, directory stream and mini FAT; all
// queries afterwards are pure in-memory traversals.

pub mod constants;
pub mod directory;
pub mod fat;
pub mod header;
pub mod path;
pub mod reader;
pub mod string;
pub mod tree;

pub use directory::{DirectoryEntry, EntryKind};
pub use header::OleHeader;
pub use path::OlePath;
pub use reader::OleFilesystem;
pub use string::OleString;
