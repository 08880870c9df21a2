//! Unit device addresses ("CAN IDs") and IPv4 helpers.
//!
//! A unit is addressed by four dot-separated decimal octets such as
//! `"10.0.1.1"`. On the wire the octets form a 32-bit integer whose most
//! significant byte is the first octet, written little-endian, so the bytes
//! appear in reverse order of the dotted form.

use std::{fmt, net::Ipv4Addr, str::FromStr};
use thiserror::Error;

/// Errors produced by the strict address parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("expected 4 dot-separated octets, got {0}")]
    WrongPartCount(usize),
    #[error("invalid octet {0:?}")]
    InvalidOctet(String),
    #[error("invalid IPv4 address {0:?}")]
    InvalidIpv4(String),
}

/// The 32-bit wire address of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceAddress {
    raw: u32,
}

impl DeviceAddress {
    /// Address substituted for malformed input by [`DeviceAddress::parse_lossy`].
    pub const FALLBACK: Self = Self { raw: 0x0000_0101 };
    /// Address answered by every unit, used with broadcast datagrams.
    pub const BROADCAST: Self = Self { raw: 0xFFFF_FFFF };
    /// Size of the address on the wire.
    pub const SIZE: usize = 4;

    /// Create an address from its dotted octets, first octet first.
    pub const fn from_octets(octets: [u8; 4]) -> Self {
        Self {
            raw: u32::from_be_bytes(octets),
        }
    }

    /// The dotted octets, first octet first.
    pub const fn octets(self) -> [u8; 4] {
        self.raw.to_be_bytes()
    }

    /// The raw 32-bit value.
    pub const fn raw(self) -> u32 {
        self.raw
    }

    /// The address as it is written into a frame.
    pub const fn to_wire(self) -> [u8; 4] {
        self.raw.to_le_bytes()
    }

    /// Read an address from the first four bytes of a frame.
    pub const fn from_wire(bytes: [u8; 4]) -> Self {
        Self {
            raw: u32::from_le_bytes(bytes),
        }
    }

    /// Parse a dotted address, substituting [`DeviceAddress::FALLBACK`] for
    /// anything malformed.
    ///
    /// Existing configuration tools rely on this behaviour, so it is kept for
    /// wire compatibility. Prefer [`str::parse`] when failing loudly is
    /// acceptable.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or(Self::FALLBACK)
    }
}

impl From<u32> for DeviceAddress {
    fn from(raw: u32) -> Self {
        Self { raw }
    }
}

impl From<DeviceAddress> for u32 {
    fn from(addr: DeviceAddress) -> Self {
        addr.raw
    }
}

impl FromStr for DeviceAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 4 {
            return Err(AddressError::WrongPartCount(parts.len()));
        }
        let mut octets = [0u8; 4];
        for (octet, part) in octets.iter_mut().zip(&parts) {
            *octet = part
                .parse()
                .map_err(|_| AddressError::InvalidOctet(part.to_string()))?;
        }
        Ok(Self::from_octets(octets))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

/// Parse a dotted IPv4 string into its four bytes.
pub fn ipv4_to_bytes(s: &str) -> Result<[u8; 4], AddressError> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map(|ip| ip.octets())
        .map_err(|_| AddressError::InvalidIpv4(s.to_string()))
}

/// Format four bytes as a dotted IPv4 string.
pub fn ipv4_to_string(bytes: [u8; 4]) -> String {
    Ipv4Addr::from(bytes).to_string()
}
