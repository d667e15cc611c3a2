//! Integration tests for the path-level operation matrix.
//!
//! Covers directory creation and listing order, hard links, rename
//! semantics, and the boundary behaviors around the root directory.

use memfs::{FileStat, Memfs};

fn fresh() -> Memfs {
    Memfs::new()
}

// =============================================================================
// ROOT AND EMPTY-TREE TESTS
// =============================================================================

mod root {
    use super::*;

    #[test]
    fn test_fresh_filesystem_has_empty_root() {
        let fs: Memfs = fresh();
        assert_eq!(fs.readdir("/").unwrap(), Vec::<String>::new());

        let stat: FileStat = fs.stat("/").unwrap();
        assert!(stat.is_directory());
        assert!(!stat.is_file());
        assert!(!stat.is_symbolic_link());
        assert!(stat.nlink >= 2);
    }

    #[test]
    fn test_mkdir_root_is_eexist() {
        let fs: Memfs = fresh();
        assert_eq!(fs.mkdir("/").unwrap_err().code(), "EEXIST");
    }

    #[test]
    fn test_rmdir_root_is_ebusy() {
        let fs: Memfs = fresh();
        assert_eq!(fs.rmdir("/").unwrap_err().code(), "EBUSY");
    }

    #[test]
    fn test_unlink_root_fails() {
        let fs: Memfs = fresh();
        assert!(fs.unlink("/").is_err());
        assert!(fs.stat("/").is_ok());
    }

    #[test]
    fn test_rename_root_is_ebusy() {
        let fs: Memfs = fresh();
        fs.mkdir("/d").unwrap();
        assert_eq!(fs.rename("/", "/d/root").unwrap_err().code(), "EBUSY");
        assert_eq!(fs.rename("/d", "/").unwrap_err().code(), "EBUSY");
    }
}

// =============================================================================
// DIRECTORY CREATION AND LISTING ORDER
// =============================================================================

mod directories {
    use super::*;

    #[test]
    fn test_mkdir_and_readdir_ordering() {
        let fs: Memfs = fresh();
        fs.mkdir("/first").unwrap();
        fs.mkdir("/first//sub/").unwrap();
        fs.mkdirp("/first/sub2").unwrap();
        fs.mkdir("/backslash\\dir").unwrap();
        fs.mkdirp("/").unwrap();

        assert_eq!(fs.readdir("/").unwrap(), vec!["first", "backslash\\dir"]);
        assert_eq!(fs.readdir("/first/").unwrap(), vec!["sub", "sub2"]);
    }

    #[test]
    fn test_readdir_never_shows_dot_entries() {
        let fs: Memfs = fresh();
        fs.mkdirp("/a/b").unwrap();
        for dir in ["/", "/a", "/a/b"] {
            let names: Vec<String> = fs.readdir(dir).unwrap();
            assert!(!names.contains(&".".to_string()), "{}", dir);
            assert!(!names.contains(&"..".to_string()), "{}", dir);
        }
    }

    #[test]
    fn test_readdir_entries_are_unique() {
        let fs: Memfs = fresh();
        fs.mkdir("/d").unwrap();
        fs.write_file("/d/x", b"1").unwrap();
        fs.write_file("/d/x", b"2").unwrap();
        let names: Vec<String> = fs.readdir("/d").unwrap();
        assert_eq!(names, vec!["x"]);
    }

    #[test]
    fn test_mkdir_existing_is_eexist() {
        let fs: Memfs = fresh();
        fs.mkdir("/d").unwrap();
        assert_eq!(fs.mkdir("/d").unwrap_err().code(), "EEXIST");
        fs.write_file("/f", b"").unwrap();
        assert_eq!(fs.mkdir("/f").unwrap_err().code(), "EEXIST");
    }

    #[test]
    fn test_mkdir_missing_parent_is_enoent() {
        let fs: Memfs = fresh();
        assert_eq!(fs.mkdir("/no/such/dir").unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_mkdirp_is_idempotent() {
        let fs: Memfs = fresh();
        fs.mkdirp("/a/b/c").unwrap();
        let before: Vec<String> = fs.readdir("/a/b").unwrap();
        fs.mkdirp("/a/b/c").unwrap();
        assert_eq!(fs.readdir("/a/b").unwrap(), before);
        assert!(fs.stat("/a/b/c").unwrap().is_directory());
    }

    #[test]
    fn test_mkdirp_through_file_is_enotdir() {
        let fs: Memfs = fresh();
        fs.write_file("/f", b"").unwrap();
        assert_eq!(fs.mkdirp("/f/sub").unwrap_err().code(), "ENOTDIR");
    }

    #[test]
    fn test_rmdir_semantics() {
        let fs: Memfs = fresh();
        fs.mkdirp("/a/b").unwrap();
        assert_eq!(fs.rmdir("/a").unwrap_err().code(), "ENOTEMPTY");
        fs.rmdir("/a/b").unwrap();
        fs.rmdir("/a").unwrap();
        assert!(!fs.exists("/a"));
        assert_eq!(fs.rmdir("/a").unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_rmdir_on_file_is_enotdir() {
        let fs: Memfs = fresh();
        fs.write_file("/f", b"").unwrap();
        assert_eq!(fs.rmdir("/f").unwrap_err().code(), "ENOTDIR");
    }

    #[test]
    fn test_traversal_through_file_is_enoent() {
        let fs: Memfs = fresh();
        fs.write_file("/f", b"").unwrap();
        assert_eq!(fs.stat("/f/below").unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_dot_dot_traversal_uses_real_entries() {
        let fs: Memfs = fresh();
        fs.mkdirp("/a/b").unwrap();
        fs.write_file("/a/f", b"via dotdot").unwrap();
        // No normalisation happens; the walk goes through b's `..` entry.
        assert_eq!(fs.read_file("/a/b/../f").unwrap(), b"via dotdot");
    }
}

// =============================================================================
// HARD LINKS
// =============================================================================

mod links {
    use super::*;

    #[test]
    fn test_hard_link_shares_inode_and_content() {
        let fs: Memfs = fresh();
        fs.mkdir("/test").unwrap();
        fs.write_file("/test/a", b"").unwrap();
        fs.link("/test/a", "/test/b").unwrap();

        let a: FileStat = fs.stat("/test/a").unwrap();
        let b: FileStat = fs.stat("/test/b").unwrap();
        assert_eq!(a.ino, b.ino);
        assert_eq!(fs.read_file("/test/a").unwrap(), fs.read_file("/test/b").unwrap());

        fs.write_file("/test/a", b"shared").unwrap();
        assert_eq!(fs.read_file("/test/b").unwrap(), b"shared");
    }

    #[test]
    fn test_link_bumps_and_unlink_drops_nlink() {
        let fs: Memfs = fresh();
        fs.write_file("/a", b"x").unwrap();
        assert_eq!(fs.stat("/a").unwrap().nlink, 1);
        fs.link("/a", "/b").unwrap();
        assert_eq!(fs.stat("/a").unwrap().nlink, 2);
        fs.unlink("/a").unwrap();
        assert_eq!(fs.stat("/b").unwrap().nlink, 1);
        assert_eq!(fs.read_file("/b").unwrap(), b"x");
    }

    #[test]
    fn test_link_directory_is_eperm() {
        let fs: Memfs = fresh();
        fs.mkdir("/d").unwrap();
        assert_eq!(fs.link("/d", "/e").unwrap_err().code(), "EPERM");
    }

    #[test]
    fn test_link_over_existing_is_eexist() {
        let fs: Memfs = fresh();
        fs.write_file("/a", b"").unwrap();
        fs.write_file("/b", b"").unwrap();
        assert_eq!(fs.link("/a", "/b").unwrap_err().code(), "EEXIST");
    }

    #[test]
    fn test_link_missing_source_or_parent_is_enoent() {
        let fs: Memfs = fresh();
        fs.write_file("/a", b"").unwrap();
        assert_eq!(fs.link("/missing", "/b").unwrap_err().code(), "ENOENT");
        assert_eq!(fs.link("/a", "/no/dir/b").unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_unlink_missing_is_enoent_and_dir_is_eisdir() {
        let fs: Memfs = fresh();
        fs.mkdir("/d").unwrap();
        assert_eq!(fs.unlink("/missing").unwrap_err().code(), "ENOENT");
        assert_eq!(fs.unlink("/d").unwrap_err().code(), "EISDIR");
    }
}

// =============================================================================
// RENAME
// =============================================================================

mod rename {
    use super::*;

    #[test]
    fn test_rename_round_trip_restores_state() {
        let fs: Memfs = fresh();
        fs.mkdir("/d").unwrap();
        fs.write_file("/d/a", b"payload").unwrap();
        fs.write_file("/d/z", b"other").unwrap();
        let before: Vec<String> = fs.readdir("/d").unwrap();

        fs.rename("/d/a", "/d/b").unwrap();
        assert!(!fs.exists("/d/a"));
        assert_eq!(fs.read_file("/d/b").unwrap(), b"payload");

        fs.rename("/d/b", "/d/a").unwrap();
        assert_eq!(fs.readdir("/d").unwrap(), before);
        assert_eq!(fs.read_file("/d/a").unwrap(), b"payload");
    }

    #[test]
    fn test_rename_across_directories() {
        let fs: Memfs = fresh();
        fs.mkdirp("/src").unwrap();
        fs.mkdirp("/dst").unwrap();
        fs.write_file("/src/f", b"moved").unwrap();
        fs.rename("/src/f", "/dst/g").unwrap();
        assert!(!fs.exists("/src/f"));
        assert_eq!(fs.read_file("/dst/g").unwrap(), b"moved");
    }

    #[test]
    fn test_rename_directory_updates_parent_entry() {
        let fs: Memfs = fresh();
        fs.mkdirp("/a/inner").unwrap();
        fs.mkdir("/b").unwrap();
        fs.write_file("/a/inner/f", b"deep").unwrap();
        fs.rename("/a/inner", "/b/inner").unwrap();
        assert_eq!(fs.read_file("/b/inner/f").unwrap(), b"deep");
        // `..` inside the moved directory now reaches the new parent.
        assert_eq!(fs.readdir("/b/inner/..").unwrap(), vec!["inner"]);
    }

    #[test]
    fn test_rename_missing_source_is_enoent() {
        let fs: Memfs = fresh();
        assert_eq!(fs.rename("/nope", "/x").unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_rename_file_over_directory_is_eisdir() {
        let fs: Memfs = fresh();
        fs.write_file("/f", b"").unwrap();
        fs.mkdir("/d").unwrap();
        assert_eq!(fs.rename("/f", "/d").unwrap_err().code(), "EISDIR");
    }

    #[test]
    fn test_rename_directory_over_file_is_enotdir() {
        let fs: Memfs = fresh();
        fs.mkdir("/d").unwrap();
        fs.write_file("/f", b"").unwrap();
        assert_eq!(fs.rename("/d", "/f").unwrap_err().code(), "ENOTDIR");
    }

    #[test]
    fn test_rename_over_nonempty_directory_is_enotempty() {
        let fs: Memfs = fresh();
        fs.mkdir("/a").unwrap();
        fs.mkdirp("/b/kid").unwrap();
        assert_eq!(fs.rename("/a", "/b").unwrap_err().code(), "ENOTEMPTY");
    }

    #[test]
    fn test_rename_over_empty_directory_replaces_it() {
        let fs: Memfs = fresh();
        fs.mkdir("/a").unwrap();
        fs.write_file("/a/f", b"inside").unwrap();
        fs.mkdir("/b").unwrap();
        fs.rename("/a", "/b").unwrap();
        assert!(!fs.exists("/a"));
        assert_eq!(fs.read_file("/b/f").unwrap(), b"inside");
    }

    #[test]
    fn test_rename_over_file_replaces_it() {
        let fs: Memfs = fresh();
        fs.write_file("/a", b"winner").unwrap();
        fs.write_file("/b", b"loser").unwrap();
        fs.rename("/a", "/b").unwrap();
        assert!(!fs.exists("/a"));
        assert_eq!(fs.read_file("/b").unwrap(), b"winner");
    }
}

// =============================================================================
// METADATA NO-OPS AND ACCESS
// =============================================================================

mod metadata {
    use super::*;

    #[test]
    fn test_chmod_chown_accept_and_ignore() {
        let fs: Memfs = fresh();
        fs.write_file("/f", b"").unwrap();
        fs.chmod("/f", 0o400).unwrap();
        fs.chown("/f", 42, 42).unwrap();
        let stat: FileStat = fs.stat("/f").unwrap();
        assert_eq!(stat.mode, 0o777);
        assert_eq!(stat.uid, 0);
        assert_eq!(stat.gid, 0);
    }

    #[test]
    fn test_chmod_missing_is_enoent() {
        let fs: Memfs = fresh();
        assert_eq!(fs.chmod("/nope", 0o777).unwrap_err().code(), "ENOENT");
        assert_eq!(fs.chown("/nope", 0, 0).unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_access_existing_always_passes() {
        let fs: Memfs = fresh();
        fs.write_file("/f", b"").unwrap();
        fs.access("/f", 0).unwrap();
        fs.access("/f", 0o7).unwrap();
        assert_eq!(fs.access("/nope", 0).unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_utimes_sets_times() {
        let fs: Memfs = fresh();
        fs.write_file("/f", b"").unwrap();
        fs.utimes("/f", 1_000, 2_000).unwrap();
        let stat: FileStat = fs.stat("/f").unwrap();
        assert_eq!(stat.atime, 1_000);
        assert_eq!(stat.mtime, 2_000);
    }

    #[test]
    fn test_unrelated_ops_leave_file_bytes_alone() {
        let fs: Memfs = fresh();
        fs.write_file("/keep", b"stable").unwrap();
        fs.mkdirp("/other/deep").unwrap();
        fs.write_file("/other/deep/f", b"noise").unwrap();
        fs.rename("/other/deep/f", "/other/f").unwrap();
        fs.unlink("/other/f").unwrap();
        fs.rmdir("/other/deep").unwrap();
        assert_eq!(fs.read_file("/keep").unwrap(), b"stable");
    }
}
