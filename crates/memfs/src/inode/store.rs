//! Inode ownership: allocation, hard-link counting, lifetime.
//!
//! The store owns every inode and hands out ids from an [`IdPool`], so
//! directory entries and descriptors refer to inodes by number only. An
//! inode is destroyed when its last directory reference is gone *and* no
//! descriptor holds it open; until then unlinked inodes stay readable and
//! writable through any descriptor that still refers to them.

use std::collections::HashMap;

use tracing::trace;

use crate::idpool::IdPool;

use super::dir::DirNode;
use super::file::FileNode;
use super::symlink::SymlinkNode;
use super::types::{FileStat, Ino, Metadata, NodeKind, DIR_SIZE};

/// Variant payload of an inode.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Regular file.
    File(FileNode),
    /// Directory.
    Dir(DirNode),
    /// Symbolic link.
    Symlink(SymlinkNode),
}

/// An inode: shared metadata plus the variant payload.
#[derive(Debug, Clone)]
pub struct Node {
    /// Shared metadata.
    pub meta: Metadata,
    /// Variant payload.
    pub data: NodeData,
    /// Open descriptors currently referencing this inode.
    opens: u32,
}

impl Node {
    /// The variant tag.
    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::File(_) => NodeKind::File,
            NodeData::Dir(_) => NodeKind::Directory,
            NodeData::Symlink(_) => NodeKind::Symlink,
        }
    }

    /// Reported size: byte length, [`DIR_SIZE`], or target length.
    pub fn size(&self) -> u64 {
        match &self.data {
            NodeData::File(f) => f.size(),
            NodeData::Dir(_) => DIR_SIZE,
            NodeData::Symlink(s) => s.size(),
        }
    }

    /// Directory payload, if this is a directory.
    pub fn as_dir(&self) -> Option<&DirNode> {
        match &self.data {
            NodeData::Dir(d) => Some(d),
            _ => None,
        }
    }

    /// Mutable directory payload.
    pub fn as_dir_mut(&mut self) -> Option<&mut DirNode> {
        match &mut self.data {
            NodeData::Dir(d) => Some(d),
            _ => None,
        }
    }

    /// File payload, if this is a regular file.
    pub fn as_file(&self) -> Option<&FileNode> {
        match &self.data {
            NodeData::File(f) => Some(f),
            _ => None,
        }
    }

    /// Mutable file payload.
    pub fn as_file_mut(&mut self) -> Option<&mut FileNode> {
        match &mut self.data {
            NodeData::File(f) => Some(f),
            _ => None,
        }
    }

    /// Symlink payload, if this is a symbolic link.
    pub fn as_symlink(&self) -> Option<&SymlinkNode> {
        match &self.data {
            NodeData::Symlink(s) => Some(s),
            _ => None,
        }
    }

    /// Metadata snapshot for `stat`-family calls.
    pub fn stat(&self) -> FileStat {
        FileStat {
            ino: self.meta.ino,
            kind: self.kind(),
            mode: self.meta.mode,
            uid: self.meta.uid,
            gid: self.meta.gid,
            nlink: self.meta.nlink,
            size: self.size(),
            atime: self.meta.atime,
            mtime: self.meta.mtime,
            ctime: self.meta.ctime,
            birthtime: self.meta.birthtime,
        }
    }
}

/// Owner of all inodes.
#[derive(Debug)]
pub struct InodeStore {
    ids: IdPool,
    nodes: HashMap<Ino, Node>,
    root: Ino,
}

impl InodeStore {
    /// New store holding only the root directory.
    ///
    /// The root is its own parent and carries the directory baseline of
    /// two links.
    pub fn new(shrink_ids: bool) -> Self {
        let mut ids: IdPool = IdPool::with_options(0, crate::idpool::DEFAULT_BLOCK_SIZE, shrink_ids);
        let root: Ino = ids.allocate();
        let mut nodes: HashMap<Ino, Node> = HashMap::new();
        nodes.insert(
            root,
            Node {
                meta: Metadata::new(root, 2),
                data: NodeData::Dir(DirNode::new(root, root)),
                opens: 0,
            },
        );
        Self { ids, nodes, root }
    }

    /// The root directory's inode number.
    pub fn root(&self) -> Ino {
        self.root
    }

    /// Create a regular file holding `data`.
    ///
    /// The link count starts at 1, covering the directory entry the
    /// caller is about to place; placement must use a non-counting insert.
    pub fn create_file(&mut self, data: Vec<u8>) -> Ino {
        self.insert_node(NodeData::File(FileNode::with_data(data)), 1)
    }

    /// Create a directory under `parent`.
    ///
    /// The link count starts at 2: the `.` self entry plus the name the
    /// caller is about to place in the parent.
    pub fn create_dir(&mut self, parent: Ino) -> Ino {
        let ino: Ino = self.ids.allocate();
        let node: Node = Node {
            meta: Metadata::new(ino, 2),
            data: NodeData::Dir(DirNode::new(ino, parent)),
            opens: 0,
        };
        self.nodes.insert(ino, node);
        trace!(ino, parent, "directory inode created");
        ino
    }

    /// Create a symbolic link to `target`. Link count starts at 1.
    pub fn create_symlink(&mut self, target: impl Into<String>) -> Ino {
        self.insert_node(NodeData::Symlink(SymlinkNode::new(target)), 1)
    }

    fn insert_node(&mut self, data: NodeData, nlink: u32) -> Ino {
        let ino: Ino = self.ids.allocate();
        self.nodes.insert(
            ino,
            Node {
                meta: Metadata::new(ino, nlink),
                data,
                opens: 0,
            },
        );
        trace!(ino, "inode created");
        ino
    }

    /// Borrow an inode.
    pub fn get(&self, ino: Ino) -> Option<&Node> {
        self.nodes.get(&ino)
    }

    /// Mutably borrow an inode.
    pub fn get_mut(&mut self, ino: Ino) -> Option<&mut Node> {
        self.nodes.get_mut(&ino)
    }

    /// Count one more directory entry referring to `ino`.
    pub fn link(&mut self, ino: Ino) {
        if let Some(node) = self.nodes.get_mut(&ino) {
            node.meta.nlink += 1;
            node.meta.touch_ctime();
        }
    }

    /// Drop one directory reference; destroys the inode once no entry and
    /// no open descriptor refers to it.
    pub fn unlink(&mut self, ino: Ino) {
        if let Some(node) = self.nodes.get_mut(&ino) {
            node.meta.nlink = node.meta.nlink.saturating_sub(1);
            node.meta.touch_ctime();
        }
        self.maybe_destroy(ino);
    }

    /// Count an open descriptor against `ino`, keeping it alive across
    /// unlink.
    pub fn open_ref(&mut self, ino: Ino) {
        if let Some(node) = self.nodes.get_mut(&ino) {
            node.opens += 1;
        }
    }

    /// Drop a descriptor reference; destroys the inode if it was the last
    /// thing keeping an unlinked inode alive.
    pub fn close_ref(&mut self, ino: Ino) {
        if let Some(node) = self.nodes.get_mut(&ino) {
            node.opens = node.opens.saturating_sub(1);
        }
        self.maybe_destroy(ino);
    }

    fn maybe_destroy(&mut self, ino: Ino) {
        let gone: bool = match self.nodes.get(&ino) {
            Some(node) => node.meta.nlink == 0 && node.opens == 0,
            None => false,
        };
        if gone {
            self.nodes.remove(&ino);
            self.ids.deallocate(ino);
            trace!(ino, "inode destroyed");
        }
    }
}
