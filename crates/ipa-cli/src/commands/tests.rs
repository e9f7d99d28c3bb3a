//! Unit tests for CLI commands.

use super::*;
use ipa_catalog::RecordStatus;
use ipa_core::MetadataPatch;
use std::io::{Cursor, Write};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Create a temporary directory for testing
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test command context whose repository lives under `<tmp>/repo`
fn create_test_context(temp_dir: &TempDir) -> CommandContext {
    let cwd = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap();
    let mut overrides = HashMap::new();
    overrides.insert("root".to_string(), cwd.join("repo").to_string());
    overrides.insert("base_url".to_string(), "https://repo.example".to_string());

    CommandContext {
        cwd,
        output: crate::output::OutputHandler::plain(),
        overrides,
    }
}

fn demo_ipa() -> Vec<u8> {
    let plist = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><plist version=\"1.0\"><dict>\
                 <key>CFBundleDisplayName</key><string>Demo</string>\
                 <key>CFBundleIdentifier</key><string>com.x.demo</string>\
                 <key>CFBundleShortVersionString</key><string>2.1</string>\
                 </dict></plist>";

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let entries: [(&str, &[u8]); 2] = [
        ("Payload/Demo.app/Info.plist", plist.as_bytes()),
        ("Payload/Demo.app/AppIcon.png", b"\x89PNG\r\n\x1a\nicon"),
    ];
    for (name, data) in entries {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Write a package outside the repository and return ingest arguments for it
fn staged(temp_dir: &TempDir, name: &str, bytes: &[u8]) -> ingest::IngestArgs {
    let file = temp_dir.path().join("incoming").join(name);
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, bytes).unwrap();
    ingest::IngestArgs {
        file,
        file_name: None,
        replace_metadata: false,
        strict: false,
        rebuild: false,
    }
}

#[tokio::test]
async fn test_init_writes_config_once() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    init::execute(false, &ctx).await.unwrap();

    let config = std::fs::read_to_string(temp_dir.path().join("ipa-repo.toml")).unwrap();
    assert!(config.contains("https://repo.example"));
    assert!(temp_dir.path().join("repo/packages").is_dir());
    assert!(temp_dir.path().join("repo/images").is_dir());

    let again = init::execute(false, &ctx).await;
    assert!(matches!(again, Err(IpaError::ConfigValidation { .. })));
    init::execute(true, &ctx).await.unwrap();
}

#[tokio::test]
async fn test_settings_use_overrides() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    let settings = ctx.settings().await.unwrap();

    assert_eq!(settings.packages_root, ctx.cwd.join("repo").join("packages"));
    assert_eq!(settings.base_url, "https://repo.example");
}

#[tokio::test]
async fn test_ingest_stores_package_and_record() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    let mut args = staged(&temp_dir, "Demo.ipa", &demo_ipa());
    args.rebuild = true;

    ingest::execute(args, &ctx).await.unwrap();

    let repo = temp_dir.path().join("repo");
    assert!(repo.join("packages/Demo.ipa").is_file());
    assert!(repo.join("packages/Demo.json").is_file());
    assert!(repo.join("images/Demo.png").is_file());

    let catalog = std::fs::read_to_string(repo.join("index.json")).unwrap();
    assert!(catalog.contains("\"bundleIdentifier\": \"com.x.demo\""));
    assert!(catalog.contains("https://repo.example/repo/packages/Demo.ipa"));
}

#[tokio::test]
async fn test_ingest_under_other_name() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    let mut args = staged(&temp_dir, "upload.bin", &demo_ipa());
    args.file_name = Some("Renamed.ipa".to_string());

    ingest::execute(args, &ctx).await.unwrap();

    let repository = ctx.repository().await.unwrap();
    let record = repository.record("Renamed").unwrap().unwrap();
    assert_eq!(record.name, "Demo");
}

#[tokio::test]
async fn test_ingest_rejects_bad_names() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    for name in [".hidden.ipa", "notes.txt"] {
        let args = staged(&temp_dir, name, &demo_ipa());
        let result = ingest::execute(args, &ctx).await;
        assert!(
            matches!(result, Err(IpaError::InvalidPackageName { .. })),
            "{} should be rejected",
            name
        );
    }
}

#[tokio::test]
async fn test_ingest_invalid_archive_stores_defaults() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    let args = staged(&temp_dir, "Broken App.ipa", b"not a zip");

    ingest::execute(args, &ctx).await.unwrap();

    let repository = ctx.repository().await.unwrap();
    let record = repository.record("Broken App").unwrap().unwrap();
    assert_eq!(record.name, "Broken App");
    assert_eq!(record.bundle_identifier, "com.iparepo.broken-app");
    assert!(record.icon_url.is_empty());
}

#[tokio::test]
async fn test_strict_ingest_removes_copy() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    let mut args = staged(&temp_dir, "Broken.ipa", b"not a zip");
    args.strict = true;

    let result = ingest::execute(args, &ctx).await;

    assert!(matches!(result, Err(IpaError::Archive { .. })));
    assert!(!temp_dir.path().join("repo/packages/Broken.ipa").exists());
    assert!(!temp_dir.path().join("repo/packages/Broken.json").exists());
}

#[tokio::test]
async fn test_edit_with_flags() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    ingest::execute(staged(&temp_dir, "Demo.ipa", &demo_ipa()), &ctx).await.unwrap();

    let patch = MetadataPatch {
        name: Some("Demo Pro".to_string()),
        developer_name: Some("Example Co".to_string()),
        ..Default::default()
    };
    edit::execute("Demo", patch, &ctx).await.unwrap();

    let repository = ctx.repository().await.unwrap();
    let record = repository.record("Demo").unwrap().unwrap();
    assert_eq!(record.name, "Demo Pro");
    assert_eq!(record.developer_name, "Example Co");
    assert_eq!(record.bundle_identifier, "com.x.demo");
}

#[tokio::test]
async fn test_edit_rejects_blank_values() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    ingest::execute(staged(&temp_dir, "Demo.ipa", &demo_ipa()), &ctx).await.unwrap();

    let patch = MetadataPatch {
        version: Some("  ".to_string()),
        ..Default::default()
    };
    let result = edit::execute("Demo", patch, &ctx).await;

    assert!(matches!(result, Err(IpaError::InvalidField { .. })));
}

#[tokio::test]
async fn test_unknown_package() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    let patch = MetadataPatch {
        name: Some("Ghost".to_string()),
        ..Default::default()
    };
    let edited = edit::execute("Ghost", patch, &ctx).await;
    assert!(matches!(edited, Err(IpaError::PackageNotFound { .. })));

    let shown = show::execute("Ghost", &ctx).await;
    assert!(matches!(shown, Err(IpaError::PackageNotFound { .. })));
}

#[tokio::test]
async fn test_list_reports_record_status() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    ingest::execute(staged(&temp_dir, "Demo.ipa", &demo_ipa()), &ctx).await.unwrap();

    let packages_root = temp_dir.path().join("repo/packages");
    std::fs::write(packages_root.join("Fresh.ipa"), demo_ipa()).unwrap();
    std::fs::write(packages_root.join("Bad.ipa"), demo_ipa()).unwrap();
    std::fs::write(packages_root.join("Bad.json"), "{ not json").unwrap();

    let listed = list::collect(&ctx).await.unwrap();

    let names: Vec<&str> = listed.iter().map(|p| p.file_name.as_str()).collect();
    assert_eq!(names, vec!["Bad.ipa", "Demo.ipa", "Fresh.ipa"]);
    assert!(matches!(listed[0].status, RecordStatus::Corrupt(_)));
    assert!(matches!(&listed[1].status, RecordStatus::Present(r) if r.name == "Demo"));
    assert_eq!(listed[2].status, RecordStatus::Missing);
}

#[tokio::test]
async fn test_rebuild_skips_corrupt_records() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    ingest::execute(staged(&temp_dir, "Demo.ipa", &demo_ipa()), &ctx).await.unwrap();

    let packages_root = temp_dir.path().join("repo/packages");
    std::fs::write(packages_root.join("Bad.ipa"), demo_ipa()).unwrap();
    std::fs::write(packages_root.join("Bad.json"), "{ \"name\": ").unwrap();

    rebuild::execute(&ctx).await.unwrap();

    let catalog = std::fs::read_to_string(temp_dir.path().join("repo/index.json")).unwrap();
    assert!(catalog.contains("Demo.ipa"));
    assert!(!catalog.contains("Bad.ipa"));
}

#[tokio::test]
async fn test_version_command() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    assert!(dispatch_command(Commands::Version, &ctx).await.is_ok());
}

#[tokio::test]
async fn test_stem_arguments_are_validated() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    let shown = show::execute("../../etc/passwd", &ctx).await;
    assert!(matches!(shown, Err(IpaError::InvalidPackageName { .. })));

    let patch = MetadataPatch {
        name: Some("Escaped".to_string()),
        ..Default::default()
    };
    let edited = edit::execute("../escaped", patch, &ctx).await;
    assert!(matches!(edited, Err(IpaError::InvalidPackageName { .. })));
    assert!(!temp_dir.path().join("repo/escaped.json").exists());
}
