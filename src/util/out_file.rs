use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use errors::Result;

/// `<basepath>.<ext>`. Unlike `Path::with_extension`, dots already in the
/// base name are left alone.
pub fn sibling(basepath: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = basepath.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Writes `contents` to `path` by way of a temporary file in the same
/// directory that gets renamed over `path` once everything is on disk. On
/// failure the temporary is removed and `path` is untouched.
///
/// The parent directory is created if it doesn't exist.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = sibling(path, "tmp");
    let res = write_and_sync(&tmp_path, contents)
        .and_then(|()| Ok(fs::rename(&tmp_path, path)?));
    if res.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    res
}

fn write_and_sync(path: &Path, contents: &[u8]) -> Result<()> {
    let mut f = fs::File::create(path)?;
    f.write_all(contents)?;
    f.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::env;
    use std::process;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("nitro-export-{}-{}", name, process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn sibling_appends_extension() {
        let p = sibling(Path::new("out/model.v2"), "imd");
        assert_eq!(p, PathBuf::from("out/model.v2.imd"));
    }

    #[test]
    fn writes_and_leaves_no_temporary() {
        let dir = scratch_dir("atomic");
        let path = dir.join("a.imd");
        write_atomically(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert!(!sibling(&path, "tmp").exists());

        write_atomically(&path, b"again").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"again");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_write_keeps_old_file() {
        let dir = scratch_dir("atomic-fail");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("b.imd");
        fs::write(&path, b"old").unwrap();
        // A directory in the way of the temporary makes the create fail.
        fs::create_dir_all(sibling(&path, "tmp")).unwrap();
        assert!(write_atomically(&path, b"new").is_err());
        assert_eq!(fs::read(&path).unwrap(), b"old");
        let _ = fs::remove_dir_all(&dir);
    }
}
