//! Common utilities for benchmarks

use camino::Utf8PathBuf;
use criterion::Criterion;
use ipa_catalog::Repository;
use ipa_core::RepositorySettings;
use pprof::criterion::{Output, PProfProfiler};
use std::io::{Cursor, Write};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(50)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Build a package named `name` with an icon and `padding` bytes of filler
/// resources inside the bundle.
pub fn create_package(name: &str, padding: usize) -> Vec<u8> {
    let plist = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><plist version=\"1.0\"><dict>\
         <key>CFBundleDisplayName</key><string>{name}</string>\
         <key>CFBundleIdentifier</key><string>com.bench.{id}</string>\
         <key>CFBundleShortVersionString</key><string>1.2.3</string>\
         <key>CFBundleVersion</key><string>42</string>\
         <key>MinimumOSVersion</key><string>15.0</string>\
         </dict></plist>",
        name = name,
        id = name.to_lowercase()
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let app = format!("Payload/{}.app", name);

    let mut entries: Vec<(String, Vec<u8>)> = vec![
        (format!("{}/Info.plist", app), plist.into_bytes()),
        (format!("{}/AppIcon60x60@2x.png", app), b"\x89PNG\r\n\x1a\nbench".to_vec()),
    ];
    for (index, chunk) in filler(padding).chunks(64 * 1024).enumerate() {
        entries.push((format!("{}/Resources/blob{}.bin", app, index), chunk.to_vec()));
    }

    for (path, data) in entries {
        writer.start_file(path, options).expect("start zip entry");
        writer.write_all(&data).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// A scratch repository holding `count` packages
pub fn create_repository(count: usize, padding: usize) -> (TempDir, Repository) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join("repo")).expect("utf-8 temp dir");
    let repository = Repository::open(RepositorySettings::with_root(root, "https://bench.example"))
        .expect("open repository");

    for index in 0..count {
        let name = format!("App{:04}", index);
        let bytes = create_package(&name, padding);
        std::fs::write(repository.package_path(&format!("{}.ipa", name)), bytes)
            .expect("write package");
    }

    (dir, repository)
}

/// Remove every stored record so the next rebuild ingests from scratch
pub fn clear_records(repository: &Repository) {
    let packages_root = &repository.settings().packages_root;
    if let Ok(entries) = std::fs::read_dir(packages_root) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

fn filler(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}
