//! Wallet address variants shown on the Receive screen.

use std::fmt;

/// Encoding of a wallet address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressKind {
    Unified,
    /// Legacy shielded address.
    Sapling,
    Transparent,
}

impl AddressKind {
    /// Header shown above the QR code.
    pub fn title(self) -> &'static str {
        match self {
            AddressKind::Unified => "Unified Address",
            AddressKind::Sapling => "Legacy Shielded Address",
            AddressKind::Transparent => "Transparent Address",
        }
    }

    /// Accessibility label of the QR image.
    pub fn content_description(self) -> &'static str {
        match self {
            AddressKind::Unified => "QR code for unified address",
            AddressKind::Sapling => "QR code for legacy shielded address",
            AddressKind::Transparent => "QR code for transparent address",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalletAddress {
    pub kind: AddressKind,
    pub address: String,
}

impl WalletAddress {
    pub fn new(kind: AddressKind, address: impl Into<String>) -> Self {
        Self { kind, address: address.into() }
    }
}

/// Every address encoding of a single wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalletAddresses {
    pub unified: WalletAddress,
    pub sapling: WalletAddress,
    pub transparent: WalletAddress,
}

impl WalletAddresses {
    pub fn new(
        unified: impl Into<String>,
        sapling: impl Into<String>,
        transparent: impl Into<String>
    ) -> Self {
        Self {
            unified: WalletAddress::new(AddressKind::Unified, unified),
            sapling: WalletAddress::new(AddressKind::Sapling, sapling),
            transparent: WalletAddress::new(AddressKind::Transparent, transparent),
        }
    }

    pub fn get(&self, kind: AddressKind) -> &WalletAddress {
        match kind {
            AddressKind::Unified => &self.unified,
            AddressKind::Sapling => &self.sapling,
            AddressKind::Transparent => &self.transparent,
        }
    }
}
