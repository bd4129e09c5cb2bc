//! # walletqr
//!
//! QR codes for wallet addresses, and the state behind a wallet's "Receive" screen.
//!
//! `walletqr` encodes an address into a QR Code Model 2 symbol (versions 1 to 40, four
//! error correction levels, numeric, alphanumeric or byte mode), rasterizes it into a
//! square bitmap of an exact pixel size, and drives the Receive screen contract: one
//! QR/address block per address variant in a fixed order, a loading state, a debug-only
//! brightness toggle, and copy/share callbacks.
//!
//! ## Example
//!
//! Render an address at the screen's default size:
//!
//! ```rust
//! use walletqr::config::ReceiveConfig;
//! use walletqr::render::qr_code_for_address;
//!
//! let config = ReceiveConfig::default();
//! let img = qr_code_for_address("t1Hsc1LR8yKnbbe3twRp88p6vFfC5t7DLbs", config.qr_size_px(), &config.qr)
//!     .expect("address fits in a QR code");
//! assert_eq!(img.dimensions(), (320, 320));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Core QR code encoding.
//! - [`render`]: Bitmap, SVG and terminal rendering, PNG export.
//! - [`address`]: Wallet address variants.
//! - [`receive`]: Receive screen state.
//! - [`config`]: Rendering and screen settings.

#![forbid(unsafe_code)]

pub mod address;
pub mod config;
pub mod error;
pub mod qrcode;
pub mod receive;
pub mod render;

pub use error::{Error, Result};
