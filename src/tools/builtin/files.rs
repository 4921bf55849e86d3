//! File tools: create, read and modify text files
//!
//! All three run on the blocking pool.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use serde_json::Value;

use crate::tools::{Capability, ToolArgs, ToolSignature};

pub fn create_file_signature() -> ToolSignature {
    ToolSignature::new("create_file")
        .doc(
            "Create a file (and any missing parent directories) with the given content.\n\
             * `file_path` - Path of the file to create\n\
             * `content` - Text to write",
        )
        .param("file_path", "String")
        .param("content", "String")
}

pub fn read_file_signature() -> ToolSignature {
    ToolSignature::new("read_file")
        .doc(
            "Read a text file and return its content.\n\
             * `file_path` - Path of the file to read",
        )
        .param("file_path", "String")
}

pub fn modify_file_signature() -> ToolSignature {
    ToolSignature::new("modify_file")
        .doc(
            "Replace every occurrence of some text in a file.\n\
             * `file_path` - Path of the file to modify\n\
             * `old_content` - Text to replace\n\
             * `new_content` - Replacement text",
        )
        .param("file_path", "String")
        .param("old_content", "String")
        .param("new_content", "String")
}

pub fn create_file() -> Capability {
    Capability::blocking(|args| {
        let path = args.get_str("file_path")?;
        write(Path::new(path), args.get_str("content")?)?;
        Ok(Value::String(format!("Created file: {}", path)))
    })
}

pub fn read_file() -> Capability {
    Capability::blocking(|args| Ok(Value::String(read(Path::new(args.get_str("file_path")?))?)))
}

pub fn modify_file() -> Capability {
    Capability::blocking(|args: ToolArgs| {
        let path = args.get_str("file_path")?;
        let replaced = modify(
            Path::new(path),
            args.get_str("old_content")?,
            args.get_str("new_content")?,
        )?;
        Ok(Value::String(format!(
            "Modified file: {} ({} replacement{})",
            path,
            replaced,
            if replaced == 1 { "" } else { "s" }
        )))
    })
}

fn write(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => anyhow!("file not found: {}", path.display()),
        _ => anyhow!("failed to read {}: {}", path.display(), e),
    })
}

/// Returns the number of replacements made
fn modify(path: &Path, old: &str, new: &str) -> anyhow::Result<usize> {
    if old.is_empty() {
        bail!("old_content must not be empty");
    }

    let content = read(path)?;
    let count = content.matches(old).count();
    if count == 0 {
        bail!("old content not found in {}", path.display());
    }

    fs::write(path, content.replace(old, new))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/notes.txt");

        assert_ok!(write(&path, "hello"));
        assert_eq!(assert_ok!(read(&path)), "hello");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = assert_err!(read(&dir.path().join("nope.txt")));
        assert!(err.to_string().starts_with("file not found"));
    }

    #[test]
    fn test_modify_replaces_all() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("code.rs");
        fs::write(&path, "let x = 1;\nlet y = x + 1;\n").unwrap();

        assert_eq!(modify(&path, "1", "2").unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "let x = 2;\nlet y = x + 2;\n");
    }

    #[test]
    fn test_modify_absent_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("code.rs");
        fs::write(&path, "fn main() {}").unwrap();

        let err = assert_err!(modify(&path, "struct", "enum"));
        assert!(err.to_string().contains("old content not found"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn main() {}");
    }
}
