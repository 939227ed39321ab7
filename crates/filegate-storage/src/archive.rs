//! Zip and tar.gz archive sinks.
//!
//! Writers are synchronous and meant to run inside `spawn_blocking`.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Parse the `algo` request parameter. Empty, `zip` and `true` select zip.
    pub fn from_algo(algo: Option<&str>) -> AppResult<Self> {
        match algo.unwrap_or_default() {
            "" | "zip" | "true" => Ok(Self::Zip),
            "tar.gz" => Ok(Self::TarGz),
            other => Err(AppError::validation(format!(
                "Unsupported archive format: {other}"
            ))),
        }
    }

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
        }
    }
}

enum Sink {
    Zip(ZipWriter<File>),
    TarGz(tar::Builder<GzEncoder<File>>),
}

/// Streams entries into an archive file.
pub struct ArchiveWriter {
    sink: Sink,
    entries: usize,
}

impl std::fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let format = match self.sink {
            Sink::Zip(_) => ArchiveFormat::Zip,
            Sink::TarGz(_) => ArchiveFormat::TarGz,
        };
        f.debug_struct("ArchiveWriter")
            .field("format", &format)
            .field("entries", &self.entries)
            .finish()
    }
}

impl ArchiveWriter {
    /// Start an archive of `format` writing into `file`.
    pub fn new(format: ArchiveFormat, file: File) -> Self {
        let sink = match format {
            ArchiveFormat::Zip => Sink::Zip(ZipWriter::new(file)),
            ArchiveFormat::TarGz => {
                Sink::TarGz(tar::Builder::new(GzEncoder::new(file, Compression::default())))
            }
        };
        Self { sink, entries: 0 }
    }

    /// Number of entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Add a directory entry named `name/`.
    pub fn add_directory(&mut self, name: &str, modified: Option<SystemTime>) -> AppResult<()> {
        let name = format!("{}/", name.trim_end_matches('/'));
        match &mut self.sink {
            Sink::Zip(zip) => {
                zip.add_directory(name, zip_options())
                    .map_err(|e| AppError::with_source(ErrorKind::Storage, "Zip write failed", e))?;
            }
            Sink::TarGz(tar) => {
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                header.set_mtime(unix_seconds(modified));
                tar.append_data(&mut header, &name, io::empty())
                    .map_err(|e| tar_error(&name, e))?;
            }
        }
        self.entries += 1;
        Ok(())
    }

    /// Copy the file at `real_path` into the archive as `name`.
    ///
    /// Returns `false` without writing anything when the path turns out to
    /// be a directory; any other I/O failure is an error.
    pub fn add_file(&mut self, name: &str, real_path: &Path) -> AppResult<bool> {
        let mut file = match File::open(real_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::IsADirectory => return Ok(false),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open {}", real_path.display()),
                    e,
                ));
            }
        };
        let meta = file.metadata()?;
        if meta.is_dir() {
            return Ok(false);
        }

        match &mut self.sink {
            Sink::Zip(zip) => {
                let options = zip_options().large_file(meta.len() >= u64::from(u32::MAX));
                zip.start_file(name, options)
                    .map_err(|e| AppError::with_source(ErrorKind::Storage, "Zip write failed", e))?;
                io::copy(&mut file, zip).map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to archive {}", real_path.display()),
                        e,
                    )
                })?;
            }
            Sink::TarGz(tar) => {
                tar.append_file(name, &mut file).map_err(|e| tar_error(name, e))?;
            }
        }
        self.entries += 1;
        Ok(true)
    }

    /// Write the archive trailer and return the underlying file.
    pub fn finish(self) -> AppResult<File> {
        match self.sink {
            Sink::Zip(zip) => zip
                .finish()
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Zip finish failed", e)),
            Sink::TarGz(tar) => {
                let encoder = tar.into_inner().map_err(|e| tar_error("trailer", e))?;
                Ok(encoder.finish()?)
            }
        }
    }
}

fn zip_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
}

fn unix_seconds(time: Option<SystemTime>) -> u64 {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn tar_error(name: &str, err: io::Error) -> AppError {
    AppError::with_source(ErrorKind::Storage, format!("Tar write failed for {name}"), err)
}
