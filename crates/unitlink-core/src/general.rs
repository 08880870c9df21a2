//! Unit-wide records: identity, network settings and name.

use crate::error::{DecodeError, ValidationError};
use crate::fields::{read_text, take, write_text};
use crate::limits;
use std::net::Ipv4Addr;

/// Fixed-size header of the GET_INFO reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInfoHeader {
    pub fw_major: u8,
    pub fw_minor: u8,
    pub hw_version: u8,
    pub unit_type: u8,
    /// Board barcode, identifying the hardware model firmware must match.
    pub barcode: String,
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub mac: [u8; 6],
}

/// The header along with the variable length unit name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInfo {
    pub header: UnitInfoHeader,
    pub name: String,
}

impl UnitInfoHeader {
    /// The size of the header encoded as bytes.
    pub const SIZE: usize = 38;
}

impl UnitInfo {
    /// The maximum size of the name field in bytes.
    pub const MAX_NAME_SIZE: usize = 26;

    /// Firmware version as a string, e.g. "2.14".
    pub fn firmware_version(&self) -> String {
        format!("{}.{}", self.header.fw_major, self.header.fw_minor)
    }

    /// MAC address formatted as `XX:XX:XX:XX:XX:XX`.
    pub fn mac_string(&self) -> String {
        format_mac(self.header.mac)
    }
}

impl From<[u8; 38]> for UnitInfoHeader {
    fn from(bytes: [u8; 38]) -> Self {
        #[rustfmt::skip]
        let [
            fw_major,                                   // 0
            fw_minor,                                   // 1
            hw_version,                                 // 2
            unit_type,                                  // 3
            b0, b1, b2, b3, b4, b5, b6, b7,             // 4-19: barcode
            b8, b9, b10, b11, b12, b13, b14, b15,
            ip0, ip1, ip2, ip3,                         // 20-23
            nm0, nm1, nm2, nm3,                         // 24-27
            gw0, gw1, gw2, gw3,                         // 28-31
            m0, m1, m2, m3, m4, m5,                     // 32-37
        ] = bytes;

        let barcode = [
            b0, b1, b2, b3, b4, b5, b6, b7, b8, b9, b10, b11, b12, b13, b14, b15,
        ];
        Self {
            fw_major,
            fw_minor,
            hw_version,
            unit_type,
            barcode: read_text(&barcode),
            ip: [ip0, ip1, ip2, ip3].into(),
            netmask: [nm0, nm1, nm2, nm3].into(),
            gateway: [gw0, gw1, gw2, gw3].into(),
            mac: [m0, m1, m2, m3, m4, m5],
        }
    }
}

impl TryFrom<&[u8]> for UnitInfo {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let header = UnitInfoHeader::from(take::<{ UnitInfoHeader::SIZE }>("unit info", bytes)?);
        let rest = &bytes[UnitInfoHeader::SIZE..];
        let name = read_text(&rest[..rest.len().min(Self::MAX_NAME_SIZE)]);
        Ok(UnitInfo { header, name })
    }
}

/// Network settings applied by the cross-subnet IP change broadcast.
///
/// The unit is selected by MAC, since its current IP may be unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub mac: [u8; 6],
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

impl NetworkSettings {
    pub const SIZE: usize = 18;

    pub fn to_payload(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(&self.mac);
        buf.extend_from_slice(&self.ip.octets());
        buf.extend_from_slice(&self.netmask.octets());
        buf.extend_from_slice(&self.gateway.octets());
        buf
    }
}

/// Payload for SET_NAME: the name NUL-padded to 32 bytes.
pub fn name_payload(name: &str) -> Result<Vec<u8>, ValidationError> {
    limits::UNIT_NAME_LEN.check(name.len() as i64)?;
    let mut buf = Vec::with_capacity(limits::UNIT_NAME_LEN.max as usize);
    write_text(&mut buf, name, limits::UNIT_NAME_LEN.max as usize);
    Ok(buf)
}

/// Format a MAC address as `XX:XX:XX:XX:XX:XX`.
pub fn format_mac(mac: [u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}
