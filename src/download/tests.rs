use super::*;
use std::sync::Mutex;
use tempfile::tempdir;

/// Writes the remote path as file content; fails for paths containing "broken".
struct FakeTransport {
    fetched: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn new() -> Self {
        Self {
            fetched: Mutex::new(Vec::new()),
        }
    }
}

impl Transport for FakeTransport {
    fn fetch(&self, remote_path: &str, destination: &Path) -> Result<(), DownloadError> {
        self.fetched.lock().unwrap().push(remote_path.to_string());
        // Leave a partial file behind either way
        fs::write(destination, remote_path)?;
        if remote_path.contains("broken") {
            return Err(DownloadError::Transport {
                url: remote_path.to_string(),
                message: "connection reset".to_string(),
            });
        }
        Ok(())
    }
}

fn config() -> DownloadConfig {
    DownloadConfig {
        workers: Some(2),
        ..Default::default()
    }
}

#[test]
fn test_local_peak_path() {
    let path = local_peak_path("/data/peak", "MSV000001/ccms_peak/RAW/run.mzML");
    assert_eq!(path, PathBuf::from("/data/peak/MSV000001/run.mzML"));
}

#[test]
fn test_download_skips_existing_and_tolerates_failures() {
    let dir = tempdir().unwrap();
    let peak_dir = dir.path().join("peak");
    let existing = local_peak_path(&peak_dir, "MSV1/a/present.mzML");
    fs::create_dir_all(existing.parent().unwrap()).unwrap();
    fs::write(&existing, "old").unwrap();

    let remote = vec![
        "MSV1/a/present.mzML".to_string(),
        "MSV1/a/new.mzML".to_string(),
        "MSV2/b/broken.mzML".to_string(),
    ];
    let transport = FakeTransport::new();
    let stats = download_peaks(&remote, &peak_dir, &config(), &transport).unwrap();

    assert_eq!(
        stats,
        DownloadStats {
            requested: 3,
            downloaded: 1,
            skipped: 1,
            failed: 1,
        }
    );
    assert_eq!(fs::read_to_string(&existing).unwrap(), "old");
    assert_eq!(
        fs::read_to_string(local_peak_path(&peak_dir, "MSV1/a/new.mzML")).unwrap(),
        "MSV1/a/new.mzML"
    );

    // No completion record and no leftovers for the failed file
    let broken = local_peak_path(&peak_dir, "MSV2/b/broken.mzML");
    assert!(!broken.exists());
    assert!(!part_path(&broken).exists());
}

#[test]
fn test_download_retries_only_missing_files() {
    let dir = tempdir().unwrap();
    let peak_dir = dir.path().join("peak");
    let remote = vec!["MSV1/x/one.mzML".to_string(), "MSV1/x/broken.mzML".to_string()];

    let first = FakeTransport::new();
    download_peaks(&remote, &peak_dir, &config(), &first).unwrap();

    let second = FakeTransport::new();
    let stats = download_peaks(&remote, &peak_dir, &config(), &second).unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(*second.fetched.lock().unwrap(), vec!["MSV1/x/broken.mzML".to_string()]);
}

#[test]
fn test_download_library_peaks_reads_distinct_filenames() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("library.tsv");
    fs::write(
        &raw,
        "annotation\tcharge\tfilename\tmz\tscan\n\
         AAK\t2\tMSV1/p/a.mzML\t400.0\t1\n\
         CCK\t2\tMSV1/p/a.mzML\t410.0\t2\n\
         DDK\t3\tMSV2/p/b.mzML\t420.0\t1\n",
    )
    .unwrap();

    let transport = FakeTransport::new();
    let stats =
        download_library_peaks(&raw, dir.path().join("peak"), &config(), &transport).unwrap();
    assert_eq!(stats.requested, 2);
    assert_eq!(stats.downloaded, 2);
}

#[test]
fn test_wget_url() {
    let transport = WgetTransport::new("ftp://massive.ucsd.edu/", 3);
    assert_eq!(
        transport.url("MSV000001/peak/run.mzML"),
        "ftp://massive.ucsd.edu/MSV000001/peak/run.mzML"
    );
}

#[test]
fn test_num_workers_defaults_to_parallelism() {
    let config = DownloadConfig::default();
    assert!(config.num_workers() >= 1);
    let config = DownloadConfig {
        workers: Some(3),
        ..Default::default()
    };
    assert_eq!(config.num_workers(), 3);
}
