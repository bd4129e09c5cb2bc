use image::{ImageBuffer, Rgba, RgbaImage};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::QrConfig;
use crate::error::{Error, Result};
use crate::qrcode::{QrCode, QrMatrix, Version, MAX_QUIET_ZONE};

/// Bitmap produced for display and sharing.
pub type QrImage = RgbaImage;

/// Largest accepted bitmap side, in pixels.
pub const MAX_QR_IMAGE_SIDE: u32 = 16_384;

/// Colors used to paint dark and light modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QrColors {
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl Default for QrColors {
    fn default() -> Self {
        QrColors::from(&QrConfig::default())
    }
}

impl From<&QrConfig> for QrColors {
    fn from(config: &QrConfig) -> Self {
        Self {
            foreground: config.foreground(),
            background: config.background(),
        }
    }
}

/// Encodes a wallet address into a module matrix, quiet zone included.
///
/// # Errors
///
/// Returns [`Error::EmptyAddress`] for an empty string, [`Error::InvalidQuietZone`] for a
/// quiet zone wider than [`MAX_QUIET_ZONE`], or the encoder's error if the address does
/// not fit in a version 40 symbol.
pub fn encode_address(address: &str, config: &QrConfig) -> Result<QrMatrix> {
    if address.is_empty() {
        return Err(Error::EmptyAddress);
    }
    if config.quiet_zone > MAX_QUIET_ZONE {
        return Err(Error::InvalidQuietZone(config.quiet_zone));
    }
    let qr = QrCode::encode_text(address, config.ecc, Version::MIN, Version::MAX, None, config.boost_ecc)?;
    Ok(qr.to_matrix(config.quiet_zone))
}

/// Rasterizes a module matrix into a square bitmap.
///
/// The side of the bitmap is `size_px` rounded to the nearest integer. Pixel `p` along
/// either axis shows module `p * dimension / side`, so every module covers a contiguous
/// block whose width differs from the others by at most one pixel.
///
/// # Errors
///
/// Returns [`Error::InvalidSize`] if `size_px` is not finite, rounds to fewer pixels
/// than the matrix has modules, or exceeds [`MAX_QR_IMAGE_SIDE`].
///
/// # Example
///
/// ```rust
/// use walletqr::config::QrConfig;
/// use walletqr::render::{encode_address, render_matrix, QrColors};
///
/// let matrix = encode_address("t1Hsc1LR8yKnbbe3twRp88p6vFfC5t7DLbs", &QrConfig::default()).unwrap();
/// let img = render_matrix(&matrix, 320.0, &QrColors::default()).unwrap();
/// assert_eq!(img.dimensions(), (320, 320));
/// ```
pub fn render_matrix(matrix: &QrMatrix, size_px: f32, colors: &QrColors) -> Result<QrImage> {
    let dimension = matrix.dimension();
    let side = size_px.round();
    if !side.is_finite() || side < dimension as f32 || side > MAX_QR_IMAGE_SIDE as f32 {
        return Err(Error::InvalidSize { size: size_px, dimension });
    }
    let side = side as u32;

    let img = ImageBuffer::from_fn(side, side, |x, y| {
        if matrix.get(module_index(x, side, dimension), module_index(y, side, dimension)) {
            colors.foreground
        } else {
            colors.background
        }
    });
    debug!("rendered {}x{} modules into {}px bitmap", dimension, dimension, side);
    Ok(img)
}

/// Encodes and rasterizes an address in one step.
pub fn qr_code_for_address(address: &str, size_px: f32, config: &QrConfig) -> Result<QrImage> {
    let matrix = encode_address(address, config)?;
    render_matrix(&matrix, size_px, &QrColors::from(config))
}

fn module_index(pixel: u32, side: u32, dimension: u32) -> u32 {
    (u64::from(pixel) * u64::from(dimension) / u64::from(side)) as u32
}

/// Returns SVG markup for the matrix, one unit per module.
///
/// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(matrix: &QrMatrix, colors: &QrColors) -> String {
    let dimension = matrix.dimension();
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        dimension
    );
    result += &format!("\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n", hex_color(colors.background));
    result += "\t<path d=\"";
    let mut first = true;
    for (y, row) in matrix.rows().enumerate() {
        for (x, &dark) in row.iter().enumerate() {
            if dark {
                if !first {
                    result += " ";
                }
                first = false;
                result += &format!("M{},{}h1v1h-1z", x, y);
            }
        }
    }
    result += &format!("\" fill=\"{}\"/>\n", hex_color(colors.foreground));
    result += "</svg>\n";
    result
}

fn hex_color(color: Rgba<u8>) -> String {
    let [r, g, b, _] = color.0;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// Draws the matrix with block characters, two columns per module.
pub fn to_terminal_string(matrix: &QrMatrix) -> String {
    let mut result = String::new();
    for row in matrix.rows() {
        for &dark in row {
            let c: char = if dark { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Writes the bitmap as `<directory>/<filename>.png` and returns the path.
///
/// `directory` defaults to "generated" and is created when missing. Without a
/// `filename` a timestamp is used.
pub fn save_png(img: &QrImage, directory: Option<&str>, filename: Option<&str>) -> Result<PathBuf> {
    let directory = directory.unwrap_or("generated");
    let filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            format!("qr-{}", millis)
        }
    };

    if !Path::new(directory).exists() {
        fs::create_dir_all(directory)?;
    }
    let path = Path::new(directory).join(format!("{}.png", filename));
    img.save(&path)?;
    info!("saved QR image to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qrcode::QrCodeEcc;

    const TRANSPARENT: &str = "t1Hsc1LR8yKnbbe3twRp88p6vFfC5t7DLbs";
    const SAPLING: &str = "zs1hwyqs4mfrynq0ysjmhv8wuau5zam0gwpx8ujfv8epgyufkmmsp6t7cfk9y0th9qfqepccck4aqz";
    const UNIFIED: &str = "u1l9f0l4348negsncgr9pxd9d3qaxagmqv3lnexcplmufpq7muffvfaue6ksevfvd7wrz7xrvn95rc5zjtn7ugkmgh5rnxswmcj30y0pw52pn0zjvy38rn2esfgve64rj5pcmazxgpyuj";

    fn decode(img: &QrImage) -> String {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            img.width() as usize,
            img.height() as usize,
            |x, y| img.get_pixel(x as u32, y as u32)[0]
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);
        let (_, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn test_transparent_address_round_trip() {
        let img = qr_code_for_address(TRANSPARENT, 320.0, &QrConfig::default()).unwrap();
        assert_eq!(decode(&img), TRANSPARENT);
    }

    #[test]
    fn test_sapling_address_round_trip() {
        let img = qr_code_for_address(SAPLING, 480.0, &QrConfig::default()).unwrap();
        assert_eq!(decode(&img), SAPLING);
    }

    #[test]
    fn test_unified_address_round_trip() {
        let config = QrConfig::default().with_ecc(QrCodeEcc::Medium);
        let img = qr_code_for_address(UNIFIED, 640.0, &config).unwrap();
        assert_eq!(decode(&img), UNIFIED);
    }

    #[test]
    fn test_numeric_round_trip() {
        let text = "01234567890123";
        assert_eq!(
            QrCode::encode_text(text, QrCodeEcc::Low, Version::MIN, Version::MAX, None, false)
                .unwrap()
                .to_matrix(0)
                .dimension(),
            21
        );
        for ecc in [QrCodeEcc::Low, QrCodeEcc::High] {
            let img = qr_code_for_address(text, 320.0, &QrConfig::default().with_ecc(ecc)).unwrap();
            assert_eq!(decode(&img), text);
        }
    }

    #[test]
    fn test_alphanumeric_round_trip() {
        let text = "HELLO WORLD $%*+-./:";
        for ecc in [QrCodeEcc::Low, QrCodeEcc::Quartile] {
            let img = qr_code_for_address(text, 320.0, &QrConfig::default().with_ecc(ecc)).unwrap();
            assert_eq!(decode(&img), text);
        }
        let long = "ZCASH:T1HSC1LR8YKNBBE3TWRP88P6VFFC5T7DLBS AMOUNT 1.25 ".repeat(3);
        assert!(crate::qrcode::QrSegment::is_alphanumeric(&long));
        let img = qr_code_for_address(&long, 480.0, &QrConfig::default()).unwrap();
        assert_eq!(decode(&img), long);
    }

    #[test]
    fn test_side_is_rounded_size() {
        let matrix = encode_address(TRANSPARENT, &QrConfig::default()).unwrap();
        let colors = QrColors::default();
        assert_eq!(render_matrix(&matrix, 320.4, &colors).unwrap().dimensions(), (320, 320));
        assert_eq!(render_matrix(&matrix, 320.5, &colors).unwrap().dimensions(), (321, 321));
    }

    #[test]
    fn test_modules_map_to_colors() {
        let config = QrConfig::default().with_colors([10, 20, 30, 255], [240, 230, 220, 255]);
        let colors = QrColors::from(&config);
        let matrix = encode_address(TRANSPARENT, &config).unwrap();
        let img = render_matrix(&matrix, 333.0, &colors).unwrap();
        let (side, dim) = (img.width(), matrix.dimension());

        assert_eq!(*img.get_pixel(0, 0), colors.background);
        let finder_center = (matrix.border() + 3) * side;
        let px = (finder_center + dim - 1) / dim;
        assert_eq!(*img.get_pixel(px, px), colors.foreground);

        for (x, y, pixel) in img.enumerate_pixels() {
            let dark = matrix.get(module_index(x, side, dim), module_index(y, side, dim));
            assert_eq!(*pixel == colors.foreground, dark);
        }
    }

    #[test]
    fn test_module_blocks_are_even() {
        let (side, dim) = (320, 37);
        let mut widths = vec![0u32; dim as usize];
        for p in 0..side {
            widths[module_index(p, side, dim) as usize] += 1;
        }
        let min = *widths.iter().min().unwrap();
        let max = *widths.iter().max().unwrap();
        assert!(min >= 1 && max - min <= 1);
        assert_eq!(widths.iter().sum::<u32>(), side);
    }

    #[test]
    fn test_invalid_sizes() {
        let matrix = encode_address(TRANSPARENT, &QrConfig::default()).unwrap();
        let colors = QrColors::default();
        for size in [0.0, -5.0, 10.0, f32::NAN, f32::INFINITY, 16_384.6, 100_000.0, 1.0e10] {
            assert!(matches!(render_matrix(&matrix, size, &colors), Err(Error::InvalidSize { .. })));
        }
        assert!(matches!(
            qr_code_for_address(TRANSPARENT, 1.0e10, &QrConfig::default()),
            Err(Error::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_quiet_zone_limit() {
        let wide = QrConfig::default().with_quiet_zone(MAX_QUIET_ZONE);
        assert_eq!(encode_address(TRANSPARENT, &wide).unwrap().border(), MAX_QUIET_ZONE);
        for quiet_zone in [MAX_QUIET_ZONE + 1, u32::MAX / 2, u32::MAX] {
            let config = QrConfig::default().with_quiet_zone(quiet_zone);
            assert!(matches!(encode_address(TRANSPARENT, &config), Err(Error::InvalidQuietZone(q)) if q == quiet_zone));
        }
    }

    #[test]
    fn test_empty_address() {
        assert!(matches!(encode_address("", &QrConfig::default()), Err(Error::EmptyAddress)));
    }

    #[test]
    fn test_to_svg_string() {
        let matrix = encode_address("HELLO WORLD", &QrConfig::default()).unwrap();
        let svg = to_svg_string(&matrix, &QrColors::default());
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 29 29\""));
        assert!(svg.contains("fill=\"#FFFFFF\""));
        assert!(svg.contains("M4,4h1v1h-1z"));
    }

    #[test]
    fn test_to_terminal_string() {
        let matrix = encode_address("HELLO WORLD", &QrConfig::default()).unwrap();
        let text = to_terminal_string(&matrix);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 29);
        assert!(lines.iter().all(|l| l.chars().count() == 58));
        assert!(lines[0].trim().is_empty());
    }

    #[test]
    fn test_save_png() {
        let dir = std::env::temp_dir().join(format!("walletqr-render-test-{}", std::process::id()));
        let img = qr_code_for_address(TRANSPARENT, 200.0, &QrConfig::default()).unwrap();
        let path = save_png(&img, dir.to_str(), Some("transparent")).unwrap();
        assert_eq!(path, dir.join("transparent.png"));
        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (200, 200));
        fs::remove_dir_all(dir).unwrap();
    }
}
