//! Addressable LED strips driven over SPI.

use crate::error::ValidationError;
use crate::limits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgbw {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedColor {
    pub channel: u8,
    pub color: Rgbw,
    /// Percent, 0-100.
    pub brightness: u8,
}

impl LedColor {
    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::LED_CHANNEL.check(self.channel)?;
        limits::LEVEL.check(self.brightness)?;
        let Rgbw { r, g, b, w } = self.color;
        Ok(vec![self.channel, r, g, b, w, self.brightness])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedEffect {
    pub channel: u8,
    pub effect: u8,
    /// 1 (slowest) to 10.
    pub speed: u8,
}

impl LedEffect {
    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::LED_CHANNEL.check(self.channel)?;
        limits::LED_SPEED.check(self.speed)?;
        Ok(vec![self.channel, self.effect, self.speed])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedStripConfig {
    pub channel: u8,
    pub chip: u8,
    pub pixels: u16,
    pub color_order: u8,
}

impl LedStripConfig {
    pub fn to_payload(&self) -> Result<Vec<u8>, ValidationError> {
        limits::LED_CHANNEL.check(self.channel)?;
        limits::LED_PIXELS.check(self.pixels)?;
        let [p0, p1] = self.pixels.to_le_bytes();
        Ok(vec![self.channel, self.chip, p0, p1, self.color_order])
    }
}
