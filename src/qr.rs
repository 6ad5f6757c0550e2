//! QR rendering for student identifiers.
//!
//! Symbol encoding is done by `qrcode`; this module only rasterizes the
//! module matrix to a square PNG of the requested width with a fixed quiet
//! zone.

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use serde::Deserialize;
use std::io::Cursor;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::student::Student;

/// Quiet zone, in modules, on every side of the symbol.
pub const QUIET_ZONE_MODULES: usize = 2;

const DARK: Luma<u8> = Luma([0x00]);
const LIGHT: Luma<u8> = Luma([0xFF]);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QrSize {
    /// On-screen preview
    #[default]
    Display,
    /// Downloadable image
    Download,
}

impl QrSize {
    pub fn width_px(self) -> u32 {
        match self {
            QrSize::Display => 256,
            QrSize::Download => 512,
        }
    }
}

/// Encode `text` and return PNG bytes exactly `width_px` pixels square.
pub fn render_png(text: &str, width_px: u32) -> Result<Vec<u8>, AppError> {
    let code = QrCode::new(text.as_bytes()).map_err(|e| AppError::QrRender(e.to_string()))?;
    let image = rasterize(&code, width_px);

    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| AppError::QrRender(e.to_string()))?;
    Ok(png.into_inner())
}

fn rasterize(code: &QrCode, width_px: u32) -> GrayImage {
    let modules = code.width();
    let total = modules + 2 * QUIET_ZONE_MODULES;
    let width = width_px.max(total as u32);

    let module_at = |px: u32| -> Option<usize> {
        let m = (px as usize * total) / width as usize;
        m.checked_sub(QUIET_ZONE_MODULES).filter(|m| *m < modules)
    };

    GrayImage::from_fn(width, width, |x, y| match (module_at(x), module_at(y)) {
        (Some(mx), Some(my)) if code[(mx, my)] == Color::Dark => DARK,
        _ => LIGHT,
    })
}

/// File name offered when the QR image is downloaded.
pub fn download_filename(student: &Student) -> String {
    format!("{}_{}_QR.png", student.name, student.roll_no)
}
