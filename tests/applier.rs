// Filesystem safety of the update applier: the installed file survives any
// failed download byte for byte, and successful updates retire the old
// archive before installing the new one.

use std::path::Path;

use chrono::{TimeZone, Utc};
use httpmock::prelude::*;

use modup::core::applier::UpdateApplier;
use modup::core::config::Disposal;
use modup::core::downloader::Downloader;
use modup::core::error::UpdaterError;
use modup::core::http::build_http_client;
use modup::core::platform::RemoteFile;
use modup::core::scanner::LocalMod;

const OLD_BYTES: &[u8] = b"old jar bytes";
const NEW_BYTES: &[u8] = b"new jar bytes";

fn installed_mod(mods_dir: &Path) -> LocalMod {
    let path = mods_dir.join("examplemod-1.2.0.jar");
    std::fs::write(&path, OLD_BYTES).unwrap();
    LocalMod {
        path,
        file_name: "examplemod-1.2.0.jar".to_string(),
        identifier: "examplemod".to_string(),
        installed_version: Some("1.2.0".to_string()),
    }
}

fn candidate(url: String, sha1: Option<&str>) -> RemoteFile {
    RemoteFile {
        file_id: "f130".to_string(),
        file_name: "examplemod-1.3.0.jar".to_string(),
        version: "1.3.0".to_string(),
        game_versions: vec!["1.20.1".to_string()],
        download_url: Some(url),
        released_at: Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap(),
        sha1: sha1.map(String::from),
    }
}

fn assert_mods_dir_untouched(mods_dir: &Path, local: &LocalMod) {
    assert_eq!(std::fs::read(&local.path).unwrap(), OLD_BYTES);
    assert!(!mods_dir.join("examplemod-1.3.0.jar").exists());
    assert!(!mods_dir.join("examplemod-1.3.0.jar.part").exists());
    assert!(!mods_dir.join("1.20.1").exists());
}

#[tokio::test]
async fn failed_download_leaves_original_byte_identical() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dl/examplemod-1.3.0.jar");
            then.status(500);
        })
        .await;

    let mods_dir = tempfile::tempdir().unwrap();
    let local = installed_mod(mods_dir.path());

    let downloader = Downloader::new(build_http_client().unwrap());
    let applier = UpdateApplier::new(
        &downloader,
        mods_dir.path(),
        Disposal::Backup {
            label: "1.20.1".to_string(),
        },
    );

    let err = applier
        .apply(&local, &candidate(server.url("/dl/examplemod-1.3.0.jar"), None))
        .await
        .unwrap_err();
    assert!(matches!(err, UpdaterError::DownloadFailed { .. }));
    assert_mods_dir_untouched(mods_dir.path(), &local);
}

#[tokio::test]
async fn hash_mismatch_leaves_original_byte_identical() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dl/examplemod-1.3.0.jar");
            then.status(200).body(NEW_BYTES);
        })
        .await;

    let mods_dir = tempfile::tempdir().unwrap();
    let local = installed_mod(mods_dir.path());

    let downloader = Downloader::new(build_http_client().unwrap());
    let applier = UpdateApplier::new(
        &downloader,
        mods_dir.path(),
        Disposal::Backup {
            label: "1.20.1".to_string(),
        },
    );

    let wrong_sha1 = "0000000000000000000000000000000000000000";
    let err = applier
        .apply(
            &local,
            &candidate(server.url("/dl/examplemod-1.3.0.jar"), Some(wrong_sha1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UpdaterError::Sha1Mismatch { .. }));
    assert_mods_dir_untouched(mods_dir.path(), &local);
}

#[tokio::test]
async fn successful_update_backs_up_old_file_and_installs_new_one() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dl/examplemod-1.3.0.jar");
            then.status(200).body(NEW_BYTES);
        })
        .await;

    let mods_dir = tempfile::tempdir().unwrap();
    let local = installed_mod(mods_dir.path());

    let downloader = Downloader::new(build_http_client().unwrap());
    let applier = UpdateApplier::new(
        &downloader,
        mods_dir.path(),
        Disposal::Backup {
            label: "1.20.1".to_string(),
        },
    );

    let installed = applier
        .apply(&local, &candidate(server.url("/dl/examplemod-1.3.0.jar"), None))
        .await
        .unwrap();

    assert_eq!(installed, mods_dir.path().join("examplemod-1.3.0.jar"));
    assert_eq!(std::fs::read(&installed).unwrap(), NEW_BYTES);
    // Old archive relocated to the per-version backup folder.
    assert!(!local.path.exists());
    let backed_up = mods_dir.path().join("1.20.1").join("examplemod-1.2.0.jar");
    assert_eq!(std::fs::read(backed_up).unwrap(), OLD_BYTES);
    assert!(!mods_dir.path().join("examplemod-1.3.0.jar.part").exists());
}

#[tokio::test]
async fn trash_disposal_moves_old_file_into_trash_folder() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/dl/examplemod-1.3.0.jar");
            then.status(200).body(NEW_BYTES);
        })
        .await;

    let mods_dir = tempfile::tempdir().unwrap();
    let local = installed_mod(mods_dir.path());

    let downloader = Downloader::new(build_http_client().unwrap());
    let applier = UpdateApplier::new(&downloader, mods_dir.path(), Disposal::Trash);

    applier
        .apply(&local, &candidate(server.url("/dl/examplemod-1.3.0.jar"), None))
        .await
        .unwrap();

    let trashed = mods_dir.path().join(".trash").join("examplemod-1.2.0.jar");
    assert_eq!(std::fs::read(trashed).unwrap(), OLD_BYTES);
}
