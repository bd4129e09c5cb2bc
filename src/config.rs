//! Rendering and Receive screen settings.

use image::Rgba;

use crate::qrcode::QrCodeEcc;

/// Side of each QR code on the Receive screen, in density-independent pixels.
pub const DEFAULT_QR_CODE_SIZE_DP: f32 = 320.0;

/// Light modules around the symbol, as recommended by ISO/IEC 18004.
pub const DEFAULT_QUIET_ZONE: u32 = 4;

/// How an address is turned into a QR bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QrConfig {
    pub ecc: QrCodeEcc,
    /// Raise the error correction level when it does not grow the symbol.
    pub boost_ecc: bool,
    pub quiet_zone: u32,
    /// RGBA of dark modules.
    pub foreground: [u8; 4],
    /// RGBA of light modules and the quiet zone.
    pub background: [u8; 4],
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            ecc: QrCodeEcc::Low,
            boost_ecc: true,
            quiet_zone: DEFAULT_QUIET_ZONE,
            foreground: [0, 0, 0, 255],
            background: [255, 255, 255, 255],
        }
    }
}

impl QrConfig {
    pub fn with_ecc(mut self, ecc: QrCodeEcc) -> Self {
        self.ecc = ecc;
        self
    }

    pub fn with_boost_ecc(mut self, boost_ecc: bool) -> Self {
        self.boost_ecc = boost_ecc;
        self
    }

    pub fn with_quiet_zone(mut self, quiet_zone: u32) -> Self {
        self.quiet_zone = quiet_zone;
        self
    }

    pub fn with_colors(mut self, foreground: [u8; 4], background: [u8; 4]) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    pub fn foreground(&self) -> Rgba<u8> {
        Rgba(self.foreground)
    }

    pub fn background(&self) -> Rgba<u8> {
        Rgba(self.background)
    }
}

/// Settings of the Receive screen.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReceiveConfig {
    pub qr_size_dp: f32,
    /// Physical pixels per density-independent pixel.
    pub density: f32,
    pub qr: QrConfig,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            qr_size_dp: DEFAULT_QR_CODE_SIZE_DP,
            density: 1.0,
            qr: QrConfig::default(),
        }
    }
}

impl ReceiveConfig {
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_qr_size_dp(mut self, qr_size_dp: f32) -> Self {
        self.qr_size_dp = qr_size_dp;
        self
    }

    pub fn with_qr(mut self, qr: QrConfig) -> Self {
        self.qr = qr;
        self
    }

    /// QR side in physical pixels, before rounding.
    pub fn qr_size_px(&self) -> f32 {
        self.qr_size_dp * self.density
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReceiveConfig::default();
        assert_eq!(config.qr_size_px(), 320.0);
        assert_eq!(config.qr.ecc, QrCodeEcc::Low);
        assert_eq!(config.qr.quiet_zone, 4);
        assert_eq!(config.qr.foreground(), Rgba([0, 0, 0, 255]));
        assert_eq!(config.qr.background(), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_density_scales_size() {
        let config = ReceiveConfig::default().with_density(2.625);
        assert_eq!(config.qr_size_px(), 840.0);
    }
}
