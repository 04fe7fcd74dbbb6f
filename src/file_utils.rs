use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// File stem used for every artifact of one video: anything that is not
    /// alphanumeric, '_' or '-' becomes '_'
    pub fn sanitize_file_stem(title: &str) -> String {
        title
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect()
    }

    // @generates: <dir>/<stem>.<suffix>
    pub fn artifact_path<P: AsRef<Path>>(dir: P, stem: &str, suffix: &str) -> PathBuf {
        dir.as_ref().join(format!("{}.{}", stem, suffix))
    }

    // @generates: <dir>/<stem>.<language>.srt as written by yt-dlp
    pub fn subtitle_path<P: AsRef<Path>>(dir: P, stem: &str, language: &str) -> PathBuf {
        Self::artifact_path(dir, stem, &format!("{}.srt", language))
    }

    /// Files directly inside `dir` named `<stem>.<anything>.<extension>`
    pub fn find_artifacts<P: AsRef<Path>>(dir: P, stem: &str, extension: &str) -> Result<Vec<PathBuf>> {
        let prefix = format!("{}.", stem);
        let suffix = format!(".{}", extension);
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if name.len() > prefix.len() + suffix.len() && name.starts_with(&prefix) && name.ends_with(&suffix) {
                result.push(entry.path().to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Delete every `<stem>.*.srt` in `dir`, returning how many were removed
    pub fn remove_subtitle_artifacts<P: AsRef<Path>>(dir: P, stem: &str) -> Result<usize> {
        let files = Self::find_artifacts(dir, stem, "srt")?;
        for file in &files {
            fs::remove_file(file)
                .with_context(|| format!("Failed to remove subtitle file: {:?}", file))?;
        }
        Ok(files.len())
    }

    /// Remove a file if it exists
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            fs::remove_file(path).with_context(|| format!("Failed to remove file: {:?}", path))?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Rename a file, replacing the target
    pub fn rename_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        fs::rename(from, to).with_context(|| format!("Failed to rename {:?} to {:?}", from, to))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }
}
