use std::path::Path;

use anyhow::{Result, bail};

/// Rejects an output path that exists (unless `overwrite`) or whose directory
/// does not. Runs before any parsing.
pub fn check_output(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("Refusing to overwrite existing file {}", path.display());
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    if !parent.is_dir() {
        bail!("Output directory {} does not exist", parent.display());
    }
    Ok(())
}

pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn new_file_in_existing_dir_is_fine() {
        let dir = TempDir::new().unwrap();
        assert!(check_output(&dir.path().join("out.html"), false).is_ok());
    }

    #[test]
    fn existing_file_needs_overwrite() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.html");
        std::fs::write(&out, "old").unwrap();

        let err = check_output(&out, false).unwrap_err();
        assert!(err.to_string().contains("Refusing to overwrite"));
        assert!(check_output(&out, true).is_ok());
    }

    #[test]
    fn missing_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nope").join("out.html");
        let err = check_output(&out, true).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn bare_file_name_uses_current_dir() {
        assert!(check_output(Path::new("roamdoc-test-unlikely-name.html"), false).is_ok());
    }

    #[test]
    fn writes_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.json");
        write_output(Some(&out), "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "{}");
    }
}
