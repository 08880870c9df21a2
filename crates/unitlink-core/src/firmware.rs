//! Firmware image parsing and packetisation.
//!
//! An image is text, one colon-prefixed line per record. The first line is
//! normally a header `:<version>,<barcode>` where `version` is four hex
//! characters. Every other line is hex-encoded bytes.

use crate::frame::checksum;
use thiserror::Error;

/// Largest body packet sent in one FIRMWARE frame.
pub const MAX_PACKET_SIZE: usize = 1000;
/// First status byte at or above this value means the new firmware booted.
pub const CONFIRMED_STATUS: u8 = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImageError {
    #[error("firmware image is empty")]
    Empty,
    #[error("line {line}: missing ':' prefix")]
    MissingColon { line: usize },
    #[error("line {line}: invalid hex: {source}")]
    InvalidHex {
        line: usize,
        #[source]
        source: hex::FromHexError,
    },
    #[error("invalid header version {0:?}: expected four hex characters")]
    InvalidVersion(String),
    #[error("line {line}: {len} bytes does not fit in one 1000 byte packet")]
    LineTooLong { line: usize, len: usize },
}

/// The header line naming the firmware version and the board it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    pub version: [u8; 2],
    pub barcode: String,
}

/// A parsed firmware image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    /// `None` when the first line is not a header.
    pub header: Option<ImageHeader>,
    /// Decoded body lines in file order.
    pub lines: Vec<Vec<u8>>,
}

impl FirmwareImage {
    pub fn parse(text: &str) -> Result<Self, ImageError> {
        let mut records = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (first_no, first) = records.next().ok_or(ImageError::Empty)?;
        let first = strip_colon(first_no, first)?;
        let mut lines = Vec::new();
        let header = match first.split_once(',') {
            Some((version, barcode)) => Some(parse_header(version, barcode)?),
            None => {
                lines.push(decode_line(first_no, first)?);
                None
            }
        };
        for (line_no, line) in records {
            lines.push(decode_line(line_no, strip_colon(line_no, line)?)?);
        }
        Ok(FirmwareImage { header, lines })
    }

    /// Whether the image was built for `barcode`. Images without a header
    /// match any board.
    pub fn matches_board(&self, barcode: &str) -> bool {
        match &self.header {
            Some(header) => header.barcode == barcode.trim(),
            None => true,
        }
    }

    /// Body packets: whole lines packed up to [`MAX_PACKET_SIZE`] bytes.
    pub fn packets(&self) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();
        let mut current: Vec<u8> = Vec::with_capacity(MAX_PACKET_SIZE);
        for line in &self.lines {
            if !current.is_empty() && current.len() + line.len() > MAX_PACKET_SIZE {
                packets.push(std::mem::take(&mut current));
            }
            current.extend_from_slice(line);
        }
        if !current.is_empty() {
            packets.push(current);
        }
        packets
    }

    /// Running checksum over every body byte; the header is excluded.
    pub fn checksum(&self) -> u16 {
        self.lines
            .iter()
            .fold(0u16, |sum, line| sum.wrapping_add(checksum(line)))
    }

    /// The final checksum packet, low byte first.
    pub fn checksum_payload(&self) -> [u8; 2] {
        self.checksum().to_le_bytes()
    }

    pub fn body_len(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }
}

/// Whether a status reply shows the unit running the new firmware.
pub fn is_confirmed(payload: &[u8]) -> bool {
    payload.first().is_some_and(|&status| status >= CONFIRMED_STATUS)
}

fn strip_colon(line_no: usize, line: &str) -> Result<&str, ImageError> {
    line.strip_prefix(':')
        .ok_or(ImageError::MissingColon { line: line_no })
}

fn decode_line(line_no: usize, hex_text: &str) -> Result<Vec<u8>, ImageError> {
    let bytes = hex::decode(hex_text).map_err(|source| ImageError::InvalidHex {
        line: line_no,
        source,
    })?;
    if bytes.len() > MAX_PACKET_SIZE {
        return Err(ImageError::LineTooLong {
            line: line_no,
            len: bytes.len(),
        });
    }
    Ok(bytes)
}

fn parse_header(version: &str, barcode: &str) -> Result<ImageHeader, ImageError> {
    let version = version.trim();
    let mut bytes = [0u8; 2];
    if version.len() != 4 || hex::decode_to_slice(version, &mut bytes).is_err() {
        return Err(ImageError::InvalidVersion(version.to_string()));
    }
    Ok(ImageHeader {
        version: bytes,
        barcode: barcode.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = ":0214,PX-DIM8\r\n:0102030405\r\n\r\n:FF00\r\n";

    #[test]
    fn test_parse_header() {
        let image = FirmwareImage::parse(IMAGE).unwrap();
        let header = image.header.as_ref().unwrap();
        assert_eq!(header.version, [0x02, 0x14]);
        assert_eq!(header.barcode, "PX-DIM8");
        assert_eq!(image.lines, [vec![1, 2, 3, 4, 5], vec![0xFF, 0x00]]);
        assert!(image.matches_board("PX-DIM8"));
        assert!(!image.matches_board("PX-REL16"));
    }

    #[test]
    fn test_headerless_image_is_body() {
        let image = FirmwareImage::parse(":0A0B\n:0C\n").unwrap();
        assert_eq!(image.header, None);
        assert_eq!(image.lines, [vec![0x0A, 0x0B], vec![0x0C]]);
        assert!(image.matches_board("anything"));
    }

    #[test]
    fn test_checksum_excludes_header() {
        let image = FirmwareImage::parse(IMAGE).unwrap();
        assert_eq!(image.checksum(), 1 + 2 + 3 + 4 + 5 + 0xFF);
        assert_eq!(image.checksum_payload(), [0x0E, 0x01]);
    }

    #[test]
    fn test_packets_never_split_lines() {
        let line = format!(":{}\n", "AB".repeat(400));
        let text = format!(":0100,B1\n{}", line.repeat(3));
        let image = FirmwareImage::parse(&text).unwrap();
        let packets = image.packets();
        // 400 + 400 would fit, a third line would not.
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].len(), 800);
        assert_eq!(packets[1].len(), 400);
        assert!(packets.iter().all(|p| p.len() <= MAX_PACKET_SIZE));
        assert_eq!(image.body_len(), 1200);
    }

    #[test]
    fn test_errors() {
        assert_eq!(FirmwareImage::parse(" \n"), Err(ImageError::Empty));
        assert_eq!(
            FirmwareImage::parse(":0100,B\n0102\n"),
            Err(ImageError::MissingColon { line: 2 })
        );
        assert!(matches!(
            FirmwareImage::parse(":0100,B\n:0G\n"),
            Err(ImageError::InvalidHex { line: 2, .. })
        ));
        assert!(matches!(
            FirmwareImage::parse(":1,B\n"),
            Err(ImageError::InvalidVersion(_))
        ));
        let long = format!(":{}\n", "00".repeat(MAX_PACKET_SIZE + 1));
        assert!(matches!(
            FirmwareImage::parse(&long),
            Err(ImageError::LineTooLong { line: 1, .. })
        ));
    }

    #[test]
    fn test_confirmation() {
        assert!(is_confirmed(&[10]));
        assert!(is_confirmed(&[0x21, 0]));
        assert!(!is_confirmed(&[9]));
        assert!(!is_confirmed(&[]));
    }
}
