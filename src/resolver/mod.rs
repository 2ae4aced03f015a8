//! Path-to-file resolution for static serving.
//!
//! [`StaticResolver`] decides, per request, which file under the serving root
//! (if any) should be sent back. It is a pure decision function: the HTTP
//! layer owns sockets and responses, this module only maps paths.

use std::io;
use std::path::{Path, PathBuf};

/// Outcome of resolving a request path against the serving root.
///
/// Exactly one variant is produced per request. Filesystem failures other
/// than "not found" are reported separately as `Err` by [`StaticResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Serve the bytes of this file (canonicalized, inside the root).
    File(PathBuf),
    /// Redirect the client to the canonical directory path.
    Redirect(String),
    /// Nothing to serve: missing file, directory without index, or a path
    /// that escaped the root.
    NotFound,
}

/// Resolver bound to a single serving root for the process lifetime.
///
/// Holds no mutable state and performs only reads, so a shared reference can
/// be used from any number of connection tasks concurrently.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    root: PathBuf,
    index_files: Vec<String>,
    redirect_to_slash: bool,
}

impl StaticResolver {
    /// Bind a resolver to `root`.
    ///
    /// The root is canonicalized once here so that every later containment
    /// check compares real paths. Fails if the root does not exist or is not
    /// a directory.
    pub fn new(
        root: impl AsRef<Path>,
        index_files: Vec<String>,
        redirect_to_slash: bool,
    ) -> io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("serving root is not a directory: {}", root.display()),
            ));
        }
        Ok(Self {
            root,
            index_files,
            redirect_to_slash,
        })
    }

    /// The canonicalized serving root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path to a target under the root.
    ///
    /// `Ok(Resolved::NotFound)` covers everything a client can cause:
    /// missing files, malformed encoding, traversal attempts. `Err` is
    /// reserved for filesystem failures other than "not found" (permission
    /// denied, I/O errors) and maps to a 500 at the HTTP layer.
    pub fn resolve(&self, request_path: &str) -> io::Result<Resolved> {
        let Some(decoded) = percent_decode(request_path) else {
            return Ok(Resolved::NotFound);
        };
        let Some(relative) = normalize(&decoded) else {
            return Ok(Resolved::NotFound);
        };
        // An empty path addresses the root directory itself.
        let has_trailing_slash = decoded.ends_with('/') || decoded.is_empty();

        let candidate = self.root.join(relative);
        match stat(&candidate)? {
            Some(meta) if meta.is_dir() => {
                self.resolve_index(&candidate, request_path, has_trailing_slash)
            }
            Some(_) => self.contained(&candidate),
            None => Ok(Resolved::NotFound),
        }
    }

    /// Index-file rule for a directory hit ("html mode", no listings).
    fn resolve_index(
        &self,
        dir: &Path,
        request_path: &str,
        has_trailing_slash: bool,
    ) -> io::Result<Resolved> {
        for index in &self.index_files {
            let index_path = dir.join(index);
            match stat(&index_path)? {
                Some(meta) if meta.is_file() => {
                    if self.redirect_to_slash && !has_trailing_slash {
                        return Ok(Resolved::Redirect(format!("{request_path}/")));
                    }
                    return self.contained(&index_path);
                }
                _ => {}
            }
        }
        Ok(Resolved::NotFound)
    }

    /// Canonicalize and enforce the containment invariant.
    ///
    /// Symlinks are followed; a real path outside the root fails closed as
    /// `NotFound`, including index files that are symlinks pointing out.
    fn contained(&self, candidate: &Path) -> io::Result<Resolved> {
        let Some(real) = io_or_missing(candidate.canonicalize())? else {
            return Ok(Resolved::NotFound);
        };
        if !real.starts_with(&self.root) || !real.is_file() {
            return Ok(Resolved::NotFound);
        }
        Ok(Resolved::File(real))
    }
}

/// `metadata` with "missing" folded into `None`.
fn stat(path: &Path) -> io::Result<Option<std::fs::Metadata>> {
    io_or_missing(std::fs::metadata(path))
}

/// Split "the path is not there" from real filesystem failures.
///
/// `NotADirectory` covers requests like `/file.txt/deeper`, which Linux
/// reports as ENOTDIR rather than ENOENT.
fn io_or_missing<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if matches!(
            e.kind(),
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
        ) =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Decode percent-encoding in a URL path.
///
/// Returns `None` for malformed escapes, embedded NUL bytes, or decoded
/// bytes that are not valid UTF-8; callers treat all of those as not found.
fn percent_decode(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    if out.contains(&0) {
        return None;
    }
    String::from_utf8(out).ok()
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Collapse `.` and `..` into a root-relative path.
///
/// `None` when `..` would climb above the root; the resolver reports that
/// as `NotFound` before touching the filesystem.
fn normalize(path: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolver(root: &TempDir) -> StaticResolver {
        StaticResolver::new(root.path(), vec!["index.html".to_string()], false)
            .expect("resolver on temp root")
    }

    #[test]
    fn serves_existing_file() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("foo.txt"), b"hello").unwrap();

        let r = resolver(&root);
        let expected = r.root().join("foo.txt");
        assert_eq!(r.resolve("/foo.txt").unwrap(), Resolved::File(expected));
    }

    #[test]
    fn nonexistent_path_is_not_found() {
        let root = TempDir::new().unwrap();
        let r = resolver(&root);
        assert_eq!(r.resolve("/missing.txt").unwrap(), Resolved::NotFound);
        assert_eq!(r.resolve("/a/b/c").unwrap(), Resolved::NotFound);
    }

    #[test]
    fn traversal_is_rejected() {
        let root = TempDir::new().unwrap();
        let r = resolver(&root);
        assert_eq!(r.resolve("/../../etc/passwd").unwrap(), Resolved::NotFound);
        assert_eq!(r.resolve("/../secret").unwrap(), Resolved::NotFound);
        assert_eq!(
            r.resolve("/a/../../../etc/passwd").unwrap(),
            Resolved::NotFound
        );
    }

    #[test]
    fn encoded_traversal_is_rejected() {
        let root = TempDir::new().unwrap();
        let r = resolver(&root);
        assert_eq!(
            r.resolve("/%2e%2e/%2e%2e/etc/passwd").unwrap(),
            Resolved::NotFound
        );
        assert_eq!(r.resolve("/..%2f..%2fetc/passwd").unwrap(), Resolved::NotFound);
    }

    #[test]
    fn encoded_names_decode() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("hello world.txt"), b"hi").unwrap();

        let r = resolver(&root);
        let expected = r.root().join("hello world.txt");
        assert_eq!(
            r.resolve("/hello%20world.txt").unwrap(),
            Resolved::File(expected)
        );
    }

    #[test]
    fn malformed_encoding_is_not_found() {
        let root = TempDir::new().unwrap();
        let r = resolver(&root);
        assert_eq!(r.resolve("/bad%zz").unwrap(), Resolved::NotFound);
        assert_eq!(r.resolve("/truncated%2").unwrap(), Resolved::NotFound);
        assert_eq!(r.resolve("/nul%00byte").unwrap(), Resolved::NotFound);
    }

    #[test]
    fn directory_with_index_serves_it() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("docs")).unwrap();
        fs::write(root.path().join("docs/index.html"), b"<html>").unwrap();

        let r = resolver(&root);
        let expected = r.root().join("docs/index.html");

        // Trailing and non-trailing slash behave identically by default.
        assert_eq!(
            r.resolve("/docs/").unwrap(),
            Resolved::File(expected.clone())
        );
        assert_eq!(r.resolve("/docs").unwrap(), Resolved::File(expected));
    }

    #[test]
    fn root_path_serves_root_index() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("index.html"), b"<html>").unwrap();

        let r = resolver(&root);
        let expected = r.root().join("index.html");
        assert_eq!(r.resolve("/").unwrap(), Resolved::File(expected.clone()));
        // Empty path maps to the root directory too.
        assert_eq!(r.resolve("").unwrap(), Resolved::File(expected));
    }

    #[test]
    fn directory_without_index_is_not_found() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("empty")).unwrap();

        let r = resolver(&root);
        assert_eq!(r.resolve("/empty/").unwrap(), Resolved::NotFound);
        assert_eq!(r.resolve("/empty").unwrap(), Resolved::NotFound);
    }

    #[test]
    fn redirect_to_slash_mode() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("docs")).unwrap();
        fs::write(root.path().join("docs/index.html"), b"<html>").unwrap();

        let r = StaticResolver::new(root.path(), vec!["index.html".to_string()], true).unwrap();
        assert_eq!(
            r.resolve("/docs").unwrap(),
            Resolved::Redirect("/docs/".to_string())
        );
        // Already canonical: serve directly.
        let expected = r.root().join("docs/index.html");
        assert_eq!(r.resolve("/docs/").unwrap(), Resolved::File(expected));
    }

    #[test]
    fn index_file_order_is_respected() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("index.html"), b"html").unwrap();
        fs::write(root.path().join("index.htm"), b"htm").unwrap();

        let r = StaticResolver::new(
            root.path(),
            vec!["index.htm".to_string(), "index.html".to_string()],
            false,
        )
        .unwrap();
        let expected = r.root().join("index.htm");
        assert_eq!(r.resolve("/").unwrap(), Resolved::File(expected));
    }

    #[test]
    fn path_through_file_is_not_found() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("foo.txt"), b"hello").unwrap();

        let r = resolver(&root);
        assert_eq!(r.resolve("/foo.txt/deeper").unwrap(), Resolved::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_root_is_served() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("target.txt"), b"data").unwrap();
        std::os::unix::fs::symlink(
            root.path().join("target.txt"),
            root.path().join("link.txt"),
        )
        .unwrap();

        let r = resolver(&root);
        let expected = r.root().join("target.txt");
        assert_eq!(r.resolve("/link.txt").unwrap(), Resolved::File(expected));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_root_fails_closed() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let root = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            root.path().join("leak.txt"),
        )
        .unwrap();

        let r = resolver(&root);
        assert_eq!(r.resolve("/leak.txt").unwrap(), Resolved::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_index_escaping_root_fails_closed() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("index.html"), b"outside").unwrap();

        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("docs")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("index.html"),
            root.path().join("docs/index.html"),
        )
        .unwrap();

        let r = resolver(&root);
        assert_eq!(r.resolve("/docs/").unwrap(), Resolved::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_a_server_error() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let locked = root.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("file.txt"), b"data").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users bypass permission bits; nothing to assert then.
        if fs::metadata(locked.join("file.txt")).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let r = resolver(&root);
        let err = r.resolve("/locked/file.txt").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn missing_root_is_rejected_at_construction() {
        let root = TempDir::new().unwrap();
        let gone = root.path().join("nope");
        assert!(StaticResolver::new(gone, vec!["index.html".to_string()], false).is_err());
    }

    #[test]
    fn normalize_collapses_segments() {
        assert_eq!(normalize("/a/./b//c"), Some(PathBuf::from("a/b/c")));
        assert_eq!(normalize("/a/b/../c"), Some(PathBuf::from("a/c")));
        assert_eq!(normalize(""), Some(PathBuf::new()));
        assert_eq!(normalize("/.."), None);
        assert_eq!(normalize("/a/../.."), None);
    }

    #[test]
    fn percent_decode_basics() {
        assert_eq!(percent_decode("/a%20b"), Some("/a b".to_string()));
        assert_eq!(percent_decode("/plain"), Some("/plain".to_string()));
        assert_eq!(percent_decode("/%41"), Some("/A".to_string()));
        assert_eq!(percent_decode("/%4"), None);
        assert_eq!(percent_decode("/%gg"), None);
        assert_eq!(percent_decode("/%00"), None);
        // Invalid UTF-8 after decoding.
        assert_eq!(percent_decode("/%ff%fe"), None);
    }
}
