//! OCR collaborator: recognise the text in a rasterised page.
//!
//! The production engine drives the `tesseract` executable. Each page is
//! PNG-encoded (lossless; JPEG artefacts around glyphs hurt recognition) into
//! a temporary file, and tesseract writes the recognised text to stdout.
//!
//! The child process is spawned with `kill_on_drop`, so when the surrounding
//! request is cancelled or times out the OCR work stops with it.

use crate::error::OcrFault;
use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;
use tokio::process::Command;
use tracing::debug;

/// Recognises text in an image using the given language hints.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &DynamicImage, languages: &[String]) -> Result<String, OcrFault>;
}

/// [`OcrEngine`] that shells out to the tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    cmd: String,
}

impl TesseractCli {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

/// Tesseract `-l` argument: `eng+ind`. Blank entries are dropped.
pub fn language_arg(languages: &[String]) -> String {
    languages
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("+")
}

/// PNG-encode an image in memory.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, OcrFault> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| OcrFault::Encode(e.to_string()))?;
    Ok(buf)
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &DynamicImage, languages: &[String]) -> Result<String, OcrFault> {
        let png = encode_png(image)?;

        let tmp = tempfile::Builder::new()
            .prefix("docsum-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrFault::Io(format!("tempfile: {e}")))?;
        tokio::fs::write(tmp.path(), &png)
            .await
            .map_err(|e| OcrFault::Io(format!("tempfile write: {e}")))?;

        let mut cmd = Command::new(&self.cmd);
        cmd.arg(tmp.path()).arg("stdout");
        let langs = language_arg(languages);
        if !langs.is_empty() {
            cmd.arg("-l").arg(&langs);
        }
        cmd.kill_on_drop(true);

        debug!("Running {} on {} byte page image (lang {})", self.cmd, png.len(), langs);

        let output = cmd.output().await.map_err(|e| OcrFault::Spawn {
            cmd: self.cmd.clone(),
            detail: e.to_string(),
        })?;

        // `tmp` lives until here, so the file outlives the child process.
        drop(tmp);

        if !output.status.success() {
            return Err(OcrFault::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
