//! Inode primitives: the store, the three variants, and shared metadata.

mod dir;
mod file;
mod store;
mod symlink;
mod types;

pub use dir::{DirNode, PARENT_ENTRY, SELF_ENTRY};
pub use file::FileNode;
pub use store::{InodeStore, Node, NodeData};
pub use symlink::SymlinkNode;
pub use types::{now_ms, FileStat, Ino, Metadata, NodeKind, DIR_SIZE, MODE_ALL};
