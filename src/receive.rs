//! State of the Receive screen.
//!
//! The screen shows one block per wallet address variant: a title, the QR code and
//! the address text, with copy and share actions. Until the address set arrives a
//! loading indicator is shown instead. A debug-only toolbar action toggles the
//! screen brightness so the code is easier to scan.
//!
//! ```rust
//! use walletqr::address::{AddressKind, WalletAddresses};
//! use walletqr::config::ReceiveConfig;
//! use walletqr::receive::{FnCallbacks, ReceiveContent, ReceiveScreen, VersionInfo};
//!
//! let callbacks = FnCallbacks::new()
//!     .on_address_copy(|address| println!("copied {address}"));
//! let mut screen = ReceiveScreen::new(ReceiveConfig::default(), VersionInfo::default(), callbacks);
//! assert!(matches!(screen.content().unwrap(), ReceiveContent::Loading));
//!
//! screen.set_addresses(Some(WalletAddresses::new(
//!     "u1testaddress",
//!     "zs1testaddress",
//!     "t1testaddress",
//! )));
//! screen.copy_address(AddressKind::Transparent).unwrap();
//! ```

use std::collections::HashMap;

use log::{debug, warn};

use crate::address::{AddressKind, WalletAddresses};
use crate::config::ReceiveConfig;
use crate::error::{Error, Result};
use crate::render::{qr_code_for_address, QrImage};

/// Build flavor facts that change what the screen shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VersionInfo {
    /// Shows the brightness toggle.
    pub is_debuggable: bool,
    /// Shows the legacy Sapling address.
    pub is_testnet: bool,
}

/// Side effects requested by the screen.
pub trait ReceiveCallbacks {
    fn on_settings(&mut self);
    fn on_adjust_brightness(&mut self, brighten: bool);
    fn on_address_copy(&mut self, address: &str);
    fn on_qr_image_share(&mut self, image: &QrImage);
}

/// [`ReceiveCallbacks`] backed by closures; unset actions do nothing.
#[derive(Default)]
pub struct FnCallbacks {
    settings: Option<Box<dyn FnMut()>>,
    adjust_brightness: Option<Box<dyn FnMut(bool)>>,
    address_copy: Option<Box<dyn FnMut(&str)>>,
    qr_image_share: Option<Box<dyn FnMut(&QrImage)>>,
}

impl FnCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_settings(mut self, f: impl FnMut() + 'static) -> Self {
        self.settings = Some(Box::new(f));
        self
    }

    pub fn on_adjust_brightness(mut self, f: impl FnMut(bool) + 'static) -> Self {
        self.adjust_brightness = Some(Box::new(f));
        self
    }

    pub fn on_address_copy(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.address_copy = Some(Box::new(f));
        self
    }

    pub fn on_qr_image_share(mut self, f: impl FnMut(&QrImage) + 'static) -> Self {
        self.qr_image_share = Some(Box::new(f));
        self
    }
}

impl ReceiveCallbacks for FnCallbacks {
    fn on_settings(&mut self) {
        if let Some(f) = self.settings.as_mut() {
            f();
        }
    }

    fn on_adjust_brightness(&mut self, brighten: bool) {
        if let Some(f) = self.adjust_brightness.as_mut() {
            f(brighten);
        }
    }

    fn on_address_copy(&mut self, address: &str) {
        if let Some(f) = self.address_copy.as_mut() {
            f(address);
        }
    }

    fn on_qr_image_share(&mut self, image: &QrImage) {
        if let Some(f) = self.qr_image_share.as_mut() {
            f(image);
        }
    }
}

/// One address variant as laid out on screen.
#[derive(Debug)]
pub struct AddressBlock<'a> {
    pub kind: AddressKind,
    pub title: &'static str,
    pub address: &'a str,
    pub qr_image: &'a QrImage,
    pub content_description: &'static str,
}

#[derive(Debug)]
pub enum ReceiveContent<'a> {
    Loading,
    Addresses(Vec<AddressBlock<'a>>),
}

/// What the platform must do while the screen is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenEffects {
    pub brighten_screen: bool,
    pub disable_screen_timeout: bool,
}

pub struct ReceiveScreen<C> {
    config: ReceiveConfig,
    version_info: VersionInfo,
    callbacks: C,
    brightness: bool,
    addresses: Option<WalletAddresses>,
    /// Generated bitmaps with the address they were generated for.
    qr_cache: HashMap<AddressKind, (String, QrImage)>,
}

impl<C: ReceiveCallbacks> ReceiveScreen<C> {
    pub fn new(config: ReceiveConfig, version_info: VersionInfo, callbacks: C) -> Self {
        Self {
            config,
            version_info,
            callbacks,
            brightness: false,
            addresses: None,
            qr_cache: HashMap::new(),
        }
    }

    /// Supplies the address set; `None` returns the screen to the loading state.
    pub fn set_addresses(&mut self, addresses: Option<WalletAddresses>) {
        debug!("receive addresses {}", if addresses.is_some() { "available" } else { "cleared" });
        self.addresses = addresses;
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn is_brightness_adjusted(&self) -> bool {
        self.brightness
    }

    pub fn is_brightness_control_visible(&self) -> bool {
        self.version_info.is_debuggable
    }

    /// Address variants in display order.
    pub fn visible_kinds(&self) -> Vec<AddressKind> {
        let mut kinds = vec![AddressKind::Unified];
        if self.version_info.is_testnet {
            kinds.push(AddressKind::Sapling);
        }
        kinds.push(AddressKind::Transparent);
        kinds
    }

    /// Lays out the screen body, generating QR bitmaps that are missing or stale.
    pub fn content(&mut self) -> Result<ReceiveContent<'_>> {
        if self.addresses.is_none() {
            return Ok(ReceiveContent::Loading);
        }
        let kinds = self.visible_kinds();
        for &kind in &kinds {
            self.cache_qr(kind)?;
        }

        let blocks = kinds
            .into_iter()
            .filter_map(|kind| {
                self.qr_cache.get(&kind).map(|(address, qr_image)| AddressBlock {
                    kind,
                    title: kind.title(),
                    address: address.as_str(),
                    qr_image,
                    content_description: kind.content_description(),
                })
            })
            .collect();
        Ok(ReceiveContent::Addresses(blocks))
    }

    /// Flips the brightness flag, reporting the new value first.
    ///
    /// Returns `false` without side effects when the control is hidden.
    pub fn toggle_brightness(&mut self) -> bool {
        if !self.is_brightness_control_visible() {
            warn!("brightness toggle ignored: control hidden in this build");
            return false;
        }
        let brighten = !self.brightness;
        self.callbacks.on_adjust_brightness(brighten);
        self.brightness = brighten;
        true
    }

    /// Effects only apply while the addresses are on screen.
    pub fn screen_effects(&self) -> ScreenEffects {
        let active = self.brightness && self.addresses.is_some();
        ScreenEffects {
            brighten_screen: active,
            disable_screen_timeout: active,
        }
    }

    pub fn open_settings(&mut self) {
        self.callbacks.on_settings();
    }

    pub fn copy_address(&mut self, kind: AddressKind) -> Result<()> {
        let address = self.shown_addresses(kind)?.get(kind).address.clone();
        self.callbacks.on_address_copy(&address);
        Ok(())
    }

    pub fn share_qr(&mut self, kind: AddressKind) -> Result<()> {
        self.shown_addresses(kind)?;
        self.cache_qr(kind)?;
        if let Some((_, image)) = self.qr_cache.get(&kind) {
            self.callbacks.on_qr_image_share(image);
        }
        Ok(())
    }

    fn shown_addresses(&self, kind: AddressKind) -> Result<&WalletAddresses> {
        let addresses = self.addresses.as_ref().ok_or(Error::AddressesUnavailable)?;
        if !self.visible_kinds().contains(&kind) {
            warn!("{:?} address requested but not shown", kind);
            return Err(Error::AddressNotShown(kind));
        }
        Ok(addresses)
    }

    fn cache_qr(&mut self, kind: AddressKind) -> Result<()> {
        let addresses = self.addresses.as_ref().ok_or(Error::AddressesUnavailable)?;
        let address = &addresses.get(kind).address;
        let stale = self.qr_cache.get(&kind).map_or(true, |(cached, _)| cached != address);
        if stale {
            let image = qr_code_for_address(address, self.config.qr_size_px(), &self.config.qr)?;
            debug!("generated {:?} QR code ({}px)", kind, image.width());
            self.qr_cache.insert(kind, (address.clone(), image));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        settings: usize,
        brightness: Vec<bool>,
        copied: Vec<String>,
        shared: Vec<(u32, u32)>,
    }

    impl ReceiveCallbacks for Recorder {
        fn on_settings(&mut self) {
            self.settings += 1;
        }

        fn on_adjust_brightness(&mut self, brighten: bool) {
            self.brightness.push(brighten);
        }

        fn on_address_copy(&mut self, address: &str) {
            self.copied.push(address.to_string());
        }

        fn on_qr_image_share(&mut self, image: &QrImage) {
            self.shared.push(image.dimensions());
        }
    }

    fn addresses() -> WalletAddresses {
        WalletAddresses::new(
            "u1l9f0l4348negsncgr9pxd9d3qaxagmqv3lnexcplmufpq7muffvfaue6ksevfvd7wrz7xrvn95rc5zjtn7ugkmgh5rnxswmcj30y0pw52pn0zjvy38rn2esfgve64rj5pcmazxgpyuj",
            "zs1hwyqs4mfrynq0ysjmhv8wuau5zam0gwpx8ujfv8epgyufkmmsp6t7cfk9y0th9qfqepccck4aqz",
            "t1Hsc1LR8yKnbbe3twRp88p6vFfC5t7DLbs"
        )
    }

    fn screen(version_info: VersionInfo) -> ReceiveScreen<Recorder> {
        let mut screen = ReceiveScreen::new(ReceiveConfig::default(), version_info, Recorder::default());
        screen.set_addresses(Some(addresses()));
        screen
    }

    fn kinds(content: &ReceiveContent<'_>) -> Vec<AddressKind> {
        match content {
            ReceiveContent::Loading => Vec::new(),
            ReceiveContent::Addresses(blocks) => blocks.iter().map(|b| b.kind).collect(),
        }
    }

    #[test]
    fn test_loading_until_addresses_arrive() {
        let mut screen = ReceiveScreen::new(ReceiveConfig::default(), VersionInfo::default(), Recorder::default());
        assert!(matches!(screen.content().unwrap(), ReceiveContent::Loading));
        assert!(matches!(screen.copy_address(AddressKind::Unified), Err(Error::AddressesUnavailable)));
        assert!(matches!(screen.share_qr(AddressKind::Unified), Err(Error::AddressesUnavailable)));

        screen.set_addresses(Some(addresses()));
        assert!(matches!(screen.content().unwrap(), ReceiveContent::Addresses(_)));

        screen.set_addresses(None);
        assert!(matches!(screen.content().unwrap(), ReceiveContent::Loading));
    }

    #[test]
    fn test_mainnet_order_skips_sapling() {
        let mut screen = screen(VersionInfo::default());
        let content = screen.content().unwrap();
        assert_eq!(kinds(&content), vec![AddressKind::Unified, AddressKind::Transparent]);
    }

    #[test]
    fn test_testnet_order_includes_sapling() {
        let mut screen = screen(VersionInfo { is_debuggable: false, is_testnet: true });
        let content = screen.content().unwrap();
        assert_eq!(
            kinds(&content),
            vec![AddressKind::Unified, AddressKind::Sapling, AddressKind::Transparent]
        );
    }

    #[test]
    fn test_blocks_carry_address_and_sized_qr() {
        let mut screen = screen(VersionInfo::default());
        let ReceiveContent::Addresses(blocks) = screen.content().unwrap() else {
            panic!("expected addresses");
        };
        let transparent = &blocks[1];
        assert_eq!(transparent.address, "t1Hsc1LR8yKnbbe3twRp88p6vFfC5t7DLbs");
        assert_eq!(transparent.title, "Transparent Address");
        assert_eq!(transparent.content_description, "QR code for transparent address");
        assert_eq!(transparent.qr_image.dimensions(), (320, 320));
    }

    #[test]
    fn test_qr_regenerated_only_when_address_changes() {
        let mut screen = screen(VersionInfo::default());
        screen.content().unwrap();
        let first = screen.qr_cache[&AddressKind::Transparent].1.clone();
        let first_pixels = screen.qr_cache[&AddressKind::Transparent].1.as_raw().as_ptr();
        screen.content().unwrap();
        screen.share_qr(AddressKind::Transparent).unwrap();
        assert_eq!(screen.qr_cache[&AddressKind::Transparent].1.as_raw().as_ptr(), first_pixels);

        let mut updated = addresses();
        updated.transparent.address = "t1VmmGiyjVNeCjxDZzg7vZmd99WyzVby9yC".to_string();
        screen.set_addresses(Some(updated));
        screen.content().unwrap();
        let (address, image) = &screen.qr_cache[&AddressKind::Transparent];
        assert_eq!(address, "t1VmmGiyjVNeCjxDZzg7vZmd99WyzVby9yC");
        assert_ne!(*image, first);
        assert_ne!(image.as_raw().as_ptr(), first_pixels);
    }

    #[test]
    fn test_brightness_toggle_in_debug_build() {
        let mut screen = screen(VersionInfo { is_debuggable: true, is_testnet: false });
        assert!(screen.is_brightness_control_visible());
        assert_eq!(screen.screen_effects(), ScreenEffects::default());

        assert!(screen.toggle_brightness());
        assert!(screen.is_brightness_adjusted());
        assert_eq!(
            screen.screen_effects(),
            ScreenEffects { brighten_screen: true, disable_screen_timeout: true }
        );

        assert!(screen.toggle_brightness());
        assert!(!screen.is_brightness_adjusted());
        assert_eq!(screen.callbacks().brightness, vec![true, false]);
    }

    #[test]
    fn test_brightness_effects_wait_for_addresses() {
        let mut screen = ReceiveScreen::new(
            ReceiveConfig::default(),
            VersionInfo { is_debuggable: true, is_testnet: false },
            Recorder::default()
        );
        assert!(screen.toggle_brightness());
        assert!(!screen.screen_effects().brighten_screen);
        screen.set_addresses(Some(addresses()));
        assert!(screen.screen_effects().brighten_screen);
    }

    #[test]
    fn test_brightness_toggle_hidden_in_release_build() {
        let mut screen = screen(VersionInfo::default());
        assert!(!screen.is_brightness_control_visible());
        assert!(!screen.toggle_brightness());
        assert!(!screen.is_brightness_adjusted());
        assert!(screen.callbacks().brightness.is_empty());
    }

    #[test]
    fn test_copy_and_share() {
        let mut screen = screen(VersionInfo::default());
        screen.copy_address(AddressKind::Unified).unwrap();
        screen.share_qr(AddressKind::Transparent).unwrap();
        screen.open_settings();

        let callbacks = screen.callbacks();
        assert_eq!(callbacks.copied, vec![addresses().unified.address]);
        assert_eq!(callbacks.shared, vec![(320, 320)]);
        assert_eq!(callbacks.settings, 1);
    }

    #[test]
    fn test_sapling_actions_rejected_on_mainnet() {
        let mut screen = screen(VersionInfo::default());
        assert!(matches!(
            screen.copy_address(AddressKind::Sapling),
            Err(Error::AddressNotShown(AddressKind::Sapling))
        ));
        assert!(matches!(screen.share_qr(AddressKind::Sapling), Err(Error::AddressNotShown(_))));
        assert!(screen.callbacks().copied.is_empty());
    }

    #[test]
    fn test_empty_address_fails_content() {
        let mut screen = ReceiveScreen::new(ReceiveConfig::default(), VersionInfo::default(), Recorder::default());
        screen.set_addresses(Some(WalletAddresses::new("", "zs1", "t1")));
        assert!(matches!(screen.content(), Err(Error::EmptyAddress)));
    }

    #[test]
    fn test_fn_callbacks() {
        let copied = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&copied);
        let callbacks = FnCallbacks::new().on_address_copy(move |a| sink.borrow_mut().push(a.to_string()));
        let mut screen = ReceiveScreen::new(ReceiveConfig::default(), VersionInfo::default(), callbacks);
        screen.set_addresses(Some(addresses()));

        screen.copy_address(AddressKind::Transparent).unwrap();
        screen.open_settings();
        assert_eq!(*copied.borrow(), vec!["t1Hsc1LR8yKnbbe3twRp88p6vFfC5t7DLbs".to_string()]);
    }
}
