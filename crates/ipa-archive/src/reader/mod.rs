//! Zip container access for application packages
//!
//! A package is valid when it holds an application bundle directory,
//! `Payload/<Name>.app/` or a top-level `<Name>.app/`. Everything else
//! (manifest, icon) is looked up relative to that directory. Nothing is
//! extracted to disk; entries are read into memory under size caps.

use ipa_core::error::IpaError;
use std::io::{Cursor, Read, Seek};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::manifest::ManifestRecord;
use crate::ArchiveResult;

pub const PAYLOAD_DIR: &str = "Payload";
pub const BUNDLE_SUFFIX: &str = ".app";
pub const MANIFEST_FILE_NAME: &str = "Info.plist";
pub const ICON_MARKER: &str = "AppIcon";

/// Manifests larger than this are ignored
pub const MAX_MANIFEST_BYTES: u64 = 4 * 1024 * 1024;
/// Icon candidates larger than this are skipped
pub const MAX_ICON_BYTES: u64 = 8 * 1024 * 1024;

/// Everything ingest needs from a package archive
#[derive(Debug, Clone, Default)]
pub struct ExtractedPackage {
    pub manifest: ManifestRecord,
    pub icon: Option<Vec<u8>>,
}

/// An opened package archive
pub struct PackageArchive<R: Read + Seek> {
    archive: ZipArchive<R>,
    entries: Vec<String>,
    bundle_dir: String,
}

impl<'a> PackageArchive<Cursor<&'a [u8]>> {
    /// Open a package held in memory
    pub fn from_bytes(bytes: &'a [u8]) -> ArchiveResult<Self> {
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> PackageArchive<R> {
    /// Open a package from any seekable reader.
    ///
    /// Fails when the data is not a zip container or holds no bundle directory.
    pub fn new(reader: R) -> ArchiveResult<Self> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| IpaError::archive(format!("not a zip container: {}", e)))?;
        let entries: Vec<String> = archive.file_names().map(str::to_string).collect();

        let bundle_dir = find_bundle_dir(&entries)
            .ok_or_else(|| IpaError::archive("no application bundle directory (Payload/<App>.app)"))?;
        debug!("Found bundle directory {} among {} entries", bundle_dir, entries.len());

        Ok(Self {
            archive,
            entries,
            bundle_dir,
        })
    }

    /// Entry names in container order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Bundle directory including its trailing `/`
    pub fn bundle_dir(&self) -> &str {
        &self.bundle_dir
    }

    /// Read an entry fully; `None` when absent, a directory, or over `max_bytes`
    pub fn read_entry(&mut self, name: &str, max_bytes: u64) -> ArchiveResult<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(IpaError::archive(format!("cannot read {}: {}", name, e))),
        };
        if file.is_dir() {
            return Ok(None);
        }
        if file.size() > max_bytes {
            warn!("Skipping {} ({} bytes exceeds limit of {})", name, file.size(), max_bytes);
            return Ok(None);
        }

        let mut data = Vec::with_capacity(file.size() as usize);
        (&mut file)
            .take(max_bytes + 1)
            .read_to_end(&mut data)
            .map_err(|e| IpaError::archive(format!("cannot decompress {}: {}", name, e)))?;
        if data.len() as u64 > max_bytes {
            return Ok(None);
        }
        Ok(Some(data))
    }

    /// Location of the bundle manifest.
    ///
    /// The bundle's own `Info.plist` wins; otherwise the first nested one.
    pub fn manifest_path(&self) -> Option<&str> {
        let direct = format!("{}{}", self.bundle_dir, MANIFEST_FILE_NAME);
        let nested_suffix = format!("/{}", MANIFEST_FILE_NAME);

        self.entries
            .iter()
            .find(|name| **name == direct)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|name| name.starts_with(&self.bundle_dir) && name.ends_with(&nested_suffix))
            })
            .map(String::as_str)
    }

    /// Decode the manifest, degrading to an empty record when it is missing or unreadable
    pub fn manifest(&mut self) -> ManifestRecord {
        let Some(path) = self.manifest_path().map(str::to_string) else {
            warn!("No {} in {}", MANIFEST_FILE_NAME, self.bundle_dir);
            return ManifestRecord::empty();
        };

        match self.read_entry(&path, MAX_MANIFEST_BYTES) {
            Ok(Some(bytes)) => ManifestRecord::parse(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring manifest {}: {}", path, e);
                ManifestRecord::empty()
            }),
            Ok(None) => ManifestRecord::empty(),
            Err(e) => {
                warn!("Ignoring manifest {}: {}", path, e);
                ManifestRecord::empty()
            },
        }
    }

    /// PNG entries ordered by preference.
    ///
    /// Files named after the manifest's declared icons come first, then any
    /// name containing `AppIcon`, then other PNGs in the bundle, then PNGs
    /// elsewhere in the container. Ties keep container order.
    pub fn icon_candidates(&self, manifest: &ManifestRecord) -> Vec<String> {
        let mut ranked: Vec<(u8, &String)> = self
            .entries
            .iter()
            .filter(|name| !name.ends_with('/') && name.to_lowercase().ends_with(".png"))
            .map(|name| (self.icon_rank(name, manifest), name))
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, name)| name.clone()).collect()
    }

    fn icon_rank(&self, name: &str, manifest: &ManifestRecord) -> u8 {
        let file_name = name.rsplit('/').next().unwrap_or(name);
        let in_bundle = name.starts_with(&self.bundle_dir);

        if in_bundle
            && manifest
                .icon_files()
                .iter()
                .any(|declared| file_name.starts_with(declared.trim_end_matches(".png")))
        {
            0
        } else if file_name.contains(ICON_MARKER) {
            if in_bundle {
                1
            } else {
                2
            }
        } else if in_bundle {
            3
        } else {
            4
        }
    }

    /// Bytes of the most preferred readable icon
    pub fn icon(&mut self, manifest: &ManifestRecord) -> Option<Vec<u8>> {
        for candidate in self.icon_candidates(manifest) {
            match self.read_entry(&candidate, MAX_ICON_BYTES) {
                Ok(Some(bytes)) if !bytes.is_empty() => {
                    debug!("Selected icon {}", candidate);
                    return Some(bytes);
                },
                Ok(_) => continue,
                Err(e) => warn!("Skipping icon candidate: {}", e),
            }
        }
        None
    }
}

/// Open a package and pull out its manifest and icon
pub fn extract_package(bytes: &[u8]) -> ArchiveResult<ExtractedPackage> {
    let mut archive = PackageArchive::from_bytes(bytes)?;
    let manifest = archive.manifest();
    let icon = archive.icon(&manifest);
    Ok(ExtractedPackage { manifest, icon })
}

fn find_bundle_dir(entries: &[String]) -> Option<String> {
    let payload_prefix = format!("{}/", PAYLOAD_DIR);

    let in_payload = entries.iter().find_map(|name| {
        let rest = name.strip_prefix(&payload_prefix)?;
        let (dir, _) = rest.split_once('/')?;
        is_bundle_name(dir).then(|| format!("{}{}/", payload_prefix, dir))
    });

    in_payload.or_else(|| {
        entries.iter().find_map(|name| {
            let (dir, _) = name.split_once('/')?;
            is_bundle_name(dir).then(|| format!("{}/", dir))
        })
    })
}

fn is_bundle_name(dir: &str) -> bool {
    dir.len() > BUNDLE_SUFFIX.len() && dir.ends_with(BUNDLE_SUFFIX)
}
