//! Integration tests for symbolic links: transitive resolution, loop
//! detection, and the lstat/stat split.

use memfs::{FileStat, Memfs};

// =============================================================================
// CREATION AND READLINK
// =============================================================================

mod basics {
    use super::*;

    #[test]
    fn test_symlink_readlink_round_trip() {
        let fs: Memfs = Memfs::new();
        fs.symlink("/anywhere/at/all", "/link").unwrap();
        assert_eq!(fs.read_link("/link").unwrap(), "/anywhere/at/all");
    }

    #[test]
    fn test_readlink_on_non_symlink_is_einval() {
        let fs: Memfs = Memfs::new();
        fs.write_file("/f", b"").unwrap();
        fs.mkdir("/d").unwrap();
        assert_eq!(fs.read_link("/f").unwrap_err().code(), "EINVAL");
        assert_eq!(fs.read_link("/d").unwrap_err().code(), "EINVAL");
        assert_eq!(fs.read_link("/missing").unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_symlink_over_existing_is_eexist() {
        let fs: Memfs = Memfs::new();
        fs.write_file("/f", b"").unwrap();
        assert_eq!(fs.symlink("/t", "/f").unwrap_err().code(), "EEXIST");
    }

    #[test]
    fn test_lstat_sees_the_link_stat_sees_through() {
        let fs: Memfs = Memfs::new();
        fs.write_file("/file", b"1234").unwrap();
        fs.symlink("/file", "/link").unwrap();

        let l: FileStat = fs.lstat("/link").unwrap();
        assert!(l.is_symbolic_link());
        assert_eq!(l.size, 5); // "/file"

        let s: FileStat = fs.stat("/link").unwrap();
        assert!(s.is_file());
        assert_eq!(s.size, 4);
        assert_eq!(s.ino, fs.stat("/file").unwrap().ino);
    }

    #[test]
    fn test_unlink_removes_link_not_target() {
        let fs: Memfs = Memfs::new();
        fs.write_file("/file", b"kept").unwrap();
        fs.symlink("/file", "/link").unwrap();
        fs.unlink("/link").unwrap();
        assert!(!fs.exists("/link"));
        assert_eq!(fs.read_file("/file").unwrap(), b"kept");
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

mod resolution {
    use super::*;

    #[test]
    fn test_transitive_symlink_chain() {
        let fs: Memfs = Memfs::new();
        fs.mkdir("/test").unwrap();
        fs.write_file("/test/hello-world.txt", b"Hello World").unwrap();
        fs.symlink("/test", "/linktotestdir").unwrap();
        fs.symlink("/linktotestdir/hello-world.txt", "/linktofile").unwrap();
        fs.symlink("/linktofile", "/linktolink").unwrap();

        assert_eq!(fs.read_file("/linktolink").unwrap(), b"Hello World");
    }

    #[test]
    fn test_relative_target_resolves_from_link_directory() {
        let fs: Memfs = Memfs::new();
        fs.mkdir("/d").unwrap();
        fs.write_file("/d/real", b"rel").unwrap();
        fs.symlink("real", "/d/alias").unwrap();
        assert_eq!(fs.read_file("/d/alias").unwrap(), b"rel");
    }

    #[test]
    fn test_relative_dot_dot_target() {
        let fs: Memfs = Memfs::new();
        fs.mkdirp("/a/b").unwrap();
        fs.write_file("/a/up.txt", b"up").unwrap();
        fs.symlink("../up.txt", "/a/b/link").unwrap();
        assert_eq!(fs.read_file("/a/b/link").unwrap(), b"up");
    }

    #[test]
    fn test_symlink_to_directory_in_the_middle() {
        let fs: Memfs = Memfs::new();
        fs.mkdir("/real").unwrap();
        fs.write_file("/real/f", b"mid").unwrap();
        fs.symlink("/real", "/alias").unwrap();
        // Mid-path symlinks are always followed, resolve_last or not.
        assert_eq!(fs.read_file("/alias/f").unwrap(), b"mid");
        assert!(fs.lstat("/alias/f").unwrap().is_file());
    }

    #[test]
    fn test_dangling_symlink() {
        let fs: Memfs = Memfs::new();
        fs.symlink("/gone", "/link").unwrap();
        assert_eq!(fs.stat("/link").unwrap_err().code(), "ENOENT");
        assert!(fs.lstat("/link").unwrap().is_symbolic_link());
        assert_eq!(fs.read_file("/link").unwrap_err().code(), "ENOENT");
    }

    #[test]
    fn test_readdir_does_not_follow_final_symlink() {
        let fs: Memfs = Memfs::new();
        fs.mkdir("/dir").unwrap();
        fs.symlink("/dir", "/link").unwrap();
        assert_eq!(fs.readdir("/link").unwrap_err().code(), "ENOTDIR");
        // Going through the link as an intermediate works.
        fs.write_file("/dir/f", b"").unwrap();
        assert_eq!(fs.readdir("/link/.").unwrap(), vec!["f"]);
    }
}

// =============================================================================
// LOOPS
// =============================================================================

mod loops {
    use super::*;

    #[test]
    fn test_self_symlink_is_eloop() {
        let fs: Memfs = Memfs::new();
        fs.symlink("/x", "/x").unwrap();
        assert_eq!(fs.read_file("/x").unwrap_err().code(), "ELOOP");
        assert_eq!(fs.stat("/x").unwrap_err().code(), "ELOOP");
        // The link itself is still visible without following.
        assert!(fs.lstat("/x").unwrap().is_symbolic_link());
    }

    #[test]
    fn test_two_hop_loop_is_eloop() {
        let fs: Memfs = Memfs::new();
        fs.mkdir("/a").unwrap();
        fs.symlink("/a/x", "/x").unwrap();
        fs.symlink("/x", "/a/x").unwrap();
        assert_eq!(fs.read_file("/x/nope").unwrap_err().code(), "ELOOP");
    }

    #[test]
    fn test_loop_detection_resets_between_calls() {
        let fs: Memfs = Memfs::new();
        fs.mkdir("/d").unwrap();
        fs.write_file("/d/f", b"ok").unwrap();
        fs.symlink("/d", "/l1").unwrap();
        fs.symlink("/l1", "/l2").unwrap();
        // The same link traversed by many calls is fine; only revisiting
        // within one resolution trips the detector.
        for _ in 0..8 {
            assert_eq!(fs.read_file("/l2/f").unwrap(), b"ok");
        }
    }
}
