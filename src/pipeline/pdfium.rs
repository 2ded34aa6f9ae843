//! PDFium library binding.
//!
//! `Pdfium` is `!Send`, so every blocking task binds its own instance. The OS
//! caches `dlopen`/`LoadLibrary`, which makes repeat binds near-free.
//!
//! Discovery order:
//! 1. `PDFIUM_LIB_PATH`: path to the library file, or a directory holding it
//! 2. The system library search path

use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Bind to a pdfium library, returning a human-readable reason on failure.
pub fn bind_pdfium() -> Result<Pdfium, String> {
    if let Ok(path) = std::env::var("PDFIUM_LIB_PATH") {
        if !path.is_empty() {
            let lib = if Path::new(&path).is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path.clone().into()
            };
            debug!("Binding PDFium from PDFIUM_LIB_PATH: {}", path);
            let bindings = Pdfium::bind_to_library(&lib)
                .map_err(|e| format!("failed to load PDFium from {path}: {e:?}"))?;
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        format!("PDFium library not found; set PDFIUM_LIB_PATH or install libpdfium: {e:?}")
    })?;
    Ok(Pdfium::new(bindings))
}
