//! Download and extraction of the MIT1003 stimuli archive.
//!
//! `ensure_images` is idempotent: the archive is fetched at most once,
//! and a failed attempt never leaves a target directory behind that a
//! later call would mistake for a completed one. All work happens in a
//! process-unique staging directory that is renamed into place only
//! after the full archive has been extracted.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DEFAULT_STIMULI_URL;
use crate::error::{Error, Result};

const TRANSFER_TIMEOUT: Duration = Duration::from_secs(600);

/// Ensure the stimuli images exist under `target_dir`, downloading and
/// extracting the archive at `source_url` on first use. Returns
/// immediately if `target_dir` already exists.
pub fn ensure_images(target_dir: &Path, source_url: &str) -> Result<()> {
    if target_dir.exists() {
        debug!(dir = %target_dir.display(), "stimuli directory present, skipping fetch");
        return Ok(());
    }

    let staging = staging_dir(target_dir);
    // Leftover from a crashed earlier attempt
    if staging.exists() {
        let _ = fs::remove_dir_all(&staging);
    }

    let result = fetch_into_staging(&staging, target_dir, source_url);
    if result.is_err() {
        let _ = fs::remove_dir_all(&staging);
    }
    result
}

/// Fetch the MIT1003 stimuli into the default location used by the
/// distributed dataset (`mit1003/`).
pub fn ensure_images_default() -> Result<()> {
    ensure_images(Path::new("mit1003"), DEFAULT_STIMULI_URL)
}

fn staging_dir(target_dir: &Path) -> PathBuf {
    let name = target_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "stimuli".to_string());
    target_dir.with_file_name(format!(".{}.partial-{}", name, std::process::id()))
}

fn fetch_into_staging(staging: &Path, target_dir: &Path, source_url: &str) -> Result<()> {
    fs::create_dir_all(staging).map_err(|e| Error::download(source_url, e))?;

    info!(url = source_url, "downloading stimuli archive");
    let archive = staging.join("stimuli.zip");
    download(source_url, &archive)?;

    info!(dir = %target_dir.display(), "extracting stimuli archive");
    let extracted = staging.join("contents");
    extract(&archive, &extracted)?;
    let _ = fs::remove_file(&archive);

    if let Some(parent) = target_dir.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::ExtractionFailed(e.to_string()))?;
        }
    }
    fs::rename(&extracted, target_dir).map_err(|e| Error::ExtractionFailed(e.to_string()))?;
    let _ = fs::remove_dir_all(staging);
    Ok(())
}

fn download(url: &str, dest: &Path) -> Result<()> {
    let agent = ureq::builder().timeout(TRANSFER_TIMEOUT).build();
    let response = agent.get(url).call().map_err(|e| Error::download(url, e))?;

    let mut file = File::create(dest).map_err(|e| Error::download(url, e))?;
    io::copy(&mut response.into_reader(), &mut file).map_err(|e| Error::download(url, e))?;
    Ok(())
}

fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::ExtractionFailed(e.to_string()))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| Error::ExtractionFailed(e.to_string()))?;

    fs::create_dir_all(dest).map_err(|e| Error::ExtractionFailed(e.to_string()))?;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| Error::ExtractionFailed(e.to_string()))?;
        let rel = entry.enclosed_name().ok_or_else(|| {
            Error::ExtractionFailed(format!("unsafe entry name '{}'", entry.name()))
        })?;
        let out = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| Error::ExtractionFailed(e.to_string()))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::ExtractionFailed(e.to_string()))?;
        }
        let mut outfile = File::create(&out).map_err(|e| Error::ExtractionFailed(e.to_string()))?;
        io::copy(&mut entry, &mut outfile).map_err(|e| Error::ExtractionFailed(e.to_string()))?;
    }
    Ok(())
}
