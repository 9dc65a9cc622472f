use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions recognized as XLIFF documents
pub const XLIFF_EXTENSIONS: [&str; 2] = ["xlf", "xliff"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: `<stem>.<lang>.<ext>` inside output_dir
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let extension = input_file
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| "xlf".to_string());

        output_dir
            .as_ref()
            .join(format!("{}.{}.{}", stem, target_language, extension))
    }

    /// Whether a path has an XLIFF extension
    pub fn is_xliff_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                XLIFF_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Whether a file name looks like one of our outputs (`name.<lang>.xlf`)
    pub fn is_generated_output<P: AsRef<Path>>(path: P, target_languages: &[String]) -> bool {
        let stem = match path.as_ref().file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => return false,
        };
        target_languages
            .iter()
            .any(|lang| stem.ends_with(&format!(".{}", lang)))
    }

    /// Find every XLIFF document below a directory, sorted by path
    pub fn find_xliff_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && Self::is_xliff_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to bytes
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating parent directories.
    ///
    /// The content goes to a temporary file in the same directory first, so
    /// an interrupted run never leaves a truncated document behind.
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
        temp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write to file: {:?}", path))?;
        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Detect whether a path is a single document or a folder of them
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }
        if path.is_dir() {
            return Ok(FileType::Directory);
        }
        if Self::is_xliff_file(path) {
            return Ok(FileType::Xliff);
        }

        // Fall back to sniffing the root element
        let head: Vec<u8> = fs::read(path)
            .with_context(|| format!("Failed to read file: {:?}", path))?
            .into_iter()
            .take(1024)
            .collect();
        if String::from_utf8_lossy(&head).contains("<xliff") {
            return Ok(FileType::Xliff);
        }

        Ok(FileType::Unknown)
    }
}

/// Enum representing different input kinds
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// XLIFF 1.2 or 2.x document
    Xliff,
    /// Folder to search for documents
    Directory,
    /// Unknown file type
    Unknown,
}
