use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::error::{Error, Result};

/// Limit on establishing the connection. The transfer itself is unbounded.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// File name a URL is saved under: the last path segment, query dropped.
pub fn local_name(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("download")
}

/// Download `remote` into `dest_dir` and return the local path.
///
/// The directory is created if needed. A file of the same name already in
/// place is returned as-is, without any freshness check. The body goes to a
/// `.part` file that is renamed only once the transfer completes.
pub fn download_file(remote: &str, dest_dir: &Path) -> Result<PathBuf> {
    download_with(remote, dest_dir, CONNECT_TIMEOUT)
}

fn download_with(remote: &str, dest_dir: &Path, connect_timeout: Duration) -> Result<PathBuf> {
    let url = Url::parse(remote)?;
    let dest_path = dest_dir.join(local_name(&url));

    if dest_path.is_file() {
        log::info!("{} already present, skipping download", dest_path.display());
        return Ok(dest_path);
    }
    fs::create_dir_all(dest_dir).map_err(|e| Error::io(dest_dir, e))?;

    let client = Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(None)
        .build()?;
    let mut resp = client.get(url.as_str()).send()?.error_for_status()?;

    let part_path = dest_path.with_extension(match dest_path.extension() {
        Some(ext) => format!("{}.part", ext.to_string_lossy()),
        None => "part".to_string(),
    });
    let copied = fs::File::create(&part_path)
        .map_err(|e| Error::io(&part_path, e))
        .and_then(|mut file| Ok(resp.copy_to(&mut file)?));

    match copied {
        Ok(bytes) => {
            fs::rename(&part_path, &dest_path).map_err(|e| Error::io(&dest_path, e))?;
            log::info!("downloaded {bytes} bytes to {}", dest_path.display());
            Ok(dest_path)
        }
        Err(err) => {
            let _ = fs::remove_file(&part_path);
            Err(err)
        }
    }
}
