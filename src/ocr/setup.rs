use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::OcrConfig;

/// Resolved locations for running Tesseract.
#[derive(Clone, Debug)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// `None` lets tesseract use its compiled-in data directory
    pub tessdata: Option<PathBuf>,
}

/// Resolves the executable and tessdata directory from config, falling back
/// to `tesseract` on PATH and `TESSDATA_PREFIX`.
pub fn resolve_tesseract(config: &OcrConfig) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable(config.tesseract_path.as_deref())?;
    let tessdata = find_tessdata_dir(config.tessdata_dir.as_deref());

    log::info!(
        "Tesseract: {} (tessdata: {})",
        executable.display(),
        tessdata
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "default".to_string())
    );

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Finds the Tesseract executable, checking the configured path first, then PATH.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        log::warn!(
            "Configured tesseract {} does not exist, trying PATH",
            path.display()
        );
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    Err(anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds a tessdata directory containing `eng.traineddata`.
pub fn find_tessdata_dir(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if has_english_data(path) {
            return Some(path.to_path_buf());
        }
        log::warn!("Configured tessdata {} has no eng.traineddata", path.display());
    }

    let prefix = PathBuf::from(std::env::var_os("TESSDATA_PREFIX")?);
    if has_english_data(&prefix) {
        return Some(prefix);
    }
    let nested = prefix.join("tessdata");
    has_english_data(&nested).then_some(nested)
}

fn has_english_data(dir: &Path) -> bool {
    dir.join("eng.traineddata").exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_configured_executable_wins() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("tesseract");
        std::fs::write(&exe, "").unwrap();
        assert_eq!(find_tesseract_executable(Some(&exe)).unwrap(), exe);
    }

    #[test]
    fn test_configured_tessdata_requires_english_data() {
        let dir = tempdir().unwrap();
        assert!(!has_english_data(dir.path()));
        std::fs::write(dir.path().join("eng.traineddata"), "").unwrap();
        assert_eq!(find_tessdata_dir(Some(dir.path())), Some(dir.path().to_path_buf()));
    }
}
