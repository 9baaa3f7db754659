// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Sources of [graph descriptions](GraphDescription).
//!
//! The [GraphStore](crate::GraphStore) doesn't fetch anything by itself - it asks a
//! [GraphSource] to turn a descriptor (e.g. a path or a URL) into a [GraphDescription].
//! [FileSource] is the bundled implementation, reading local GPX tracks and JSON
//! graph descriptions, optionally compressed.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

mod gpx;
mod model;

pub use model::{GraphDescription, RawEdge, RawGraph, RawNode};

/// Type-erased error returned by [GraphSource] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An external collaborator able to produce a [GraphDescription] for a descriptor.
///
/// Sources are only consulted when the [GraphStore](crate::GraphStore) doesn't already
/// hold a graph for the requested descriptor. Retrying failed fetches, if desired,
/// is the responsibility of the source.
pub trait GraphSource {
    fn fetch(&self, descriptor: &str) -> Result<GraphDescription, BoxError>;
}

impl<F> GraphSource for F
where
    F: Fn(&str) -> Result<GraphDescription, BoxError>,
{
    fn fetch(&self, descriptor: &str) -> Result<GraphDescription, BoxError> {
        self(descriptor)
    }
}

/// Error which can occur when reading a graph description.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("can't detect format of {0:?} - expected .json or .gpx, optionally followed by .gz or .bz2")]
    UnknownFormat(PathBuf),
}

/// Format of the input file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the file extension
    #[default]
    Unknown,

    /// Force uncompressed [RawGraph] JSON
    Json,

    /// Force [RawGraph] JSON with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    JsonGz,

    /// Force [RawGraph] JSON with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    JsonBz2,

    /// Force uncompressed [GPX](https://www.topografix.com/gpx.asp)
    Gpx,

    /// Force [GPX](https://www.topografix.com/gpx.asp) with gzip compression
    GpxGz,

    /// Force [GPX](https://www.topografix.com/gpx.asp) with bzip2 compression
    GpxBz2,
}

impl FileFormat {
    /// Guesses the format based on the extension(s) of the file name.
    /// Returns [FileFormat::Unknown] if the extension is not recognized.
    pub fn detect<P: AsRef<Path>>(path: P) -> Self {
        let name = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        [
            (".json", Self::Json),
            (".json.gz", Self::JsonGz),
            (".json.bz2", Self::JsonBz2),
            (".gpx", Self::Gpx),
            (".gpx.gz", Self::GpxGz),
            (".gpx.bz2", Self::GpxBz2),
        ]
        .into_iter()
        .find_map(|(suffix, format)| name.ends_with(suffix).then_some(format))
        .unwrap_or(Self::Unknown)
    }
}

/// Parse a [GraphDescription] from a reader in the provided [FileFormat].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
/// [FileFormat::Unknown] can't be used, as there is no file name to guess the format from.
pub fn read_from_io<R: io::Read>(reader: R, format: FileFormat) -> Result<GraphDescription, Error> {
    match format {
        FileFormat::Unknown => Err(Error::UnknownFormat(PathBuf::default())),

        FileFormat::Json => read_json(io::BufReader::new(reader)),

        FileFormat::JsonGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            read_json(io::BufReader::new(d))
        }

        FileFormat::JsonBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            read_json(io::BufReader::new(d))
        }

        FileFormat::Gpx => {
            let b = io::BufReader::new(reader);
            Ok(GraphDescription::PointChain(gpx::read_from_io(b)?))
        }

        FileFormat::GpxGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            let b = io::BufReader::new(d);
            Ok(GraphDescription::PointChain(gpx::read_from_io(b)?))
        }

        FileFormat::GpxBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            let b = io::BufReader::new(d);
            Ok(GraphDescription::PointChain(gpx::read_from_io(b)?))
        }
    }
}

/// Parse a [GraphDescription] from a file at the provided path.
///
/// If `format` is [FileFormat::Unknown], it's detected from the file name.
pub fn read_from_file<P: AsRef<Path>>(
    path: P,
    format: FileFormat,
) -> Result<GraphDescription, Error> {
    let path = path.as_ref();
    let format = match format {
        FileFormat::Unknown => match FileFormat::detect(path) {
            FileFormat::Unknown => return Err(Error::UnknownFormat(path.to_path_buf())),
            detected => detected,
        },
        format => format,
    };

    let f = File::open(path)?;
    read_from_io(f, format)
}

/// Parse a [GraphDescription] from a static buffer in the provided [FileFormat].
pub fn read_from_buffer(data: &[u8], format: FileFormat) -> Result<GraphDescription, Error> {
    match format {
        // Fast paths are available for in-memory uncompressed data
        FileFormat::Gpx => Ok(GraphDescription::PointChain(gpx::read_from_buffer(data)?)),
        FileFormat::Json => Ok(GraphDescription::Explicit(serde_json::from_slice(data)?)),

        // Wrap the buffer in a cursor and use the IO path
        _ => read_from_io(io::Cursor::new(data), format),
    }
}

fn read_json<R: io::BufRead>(reader: R) -> Result<GraphDescription, Error> {
    Ok(GraphDescription::Explicit(serde_json::from_reader(reader)?))
}

/// [GraphSource] reading graph descriptions from local files,
/// treating descriptors as file system paths.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileSource {
    /// Format of the files. Defaults to detecting the format from each file's name.
    pub file_format: FileFormat,
}

impl FileSource {
    pub fn new(file_format: FileFormat) -> Self {
        Self { file_format }
    }
}

impl GraphSource for FileSource {
    fn fetch(&self, descriptor: &str) -> Result<GraphDescription, BoxError> {
        log::debug!("reading graph description from {}", descriptor);
        Ok(read_from_file(descriptor, self.file_format)?)
    }
}
