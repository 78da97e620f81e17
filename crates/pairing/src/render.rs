//! QR rendering — PNG file for side channels, unicode text for the terminal.

use chaty_core::error::PairingError;
use qrcode::QrCode;
use qrcode::render::unicode;
use std::path::Path;

/// Render the pairing code as a PNG image at `path`.
pub fn render_png(code: &str, path: &Path) -> Result<(), PairingError> {
    let qr = QrCode::new(code.as_bytes()).map_err(|e| PairingError::Render(e.to_string()))?;
    let image = qr
        .render::<image::Luma<u8>>()
        .min_dimensions(256, 256)
        .build();
    image
        .save(path)
        .map_err(|e| PairingError::Render(format!("save {}: {e}", path.display())))?;
    Ok(())
}

/// Render the pairing code as a terminal-displayable unicode block string.
pub fn render_terminal(code: &str) -> Result<String, PairingError> {
    let qr = QrCode::new(code.as_bytes()).map_err(|e| PairingError::Render(e.to_string()))?;
    Ok(qr
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Dark)
        .light_color(unicode::Dense1x2::Light)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_render_is_non_empty() {
        let qr = render_terminal("pairing-code-123").unwrap();
        assert!(!qr.is_empty());
        assert!(qr.lines().count() > 1);
    }

    #[test]
    fn png_render_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.png");
        render_png("pairing-code-123", &path).unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }
}
