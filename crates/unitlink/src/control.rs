//! Output control and configuration: lighting, AC, curtains, KNX, DMX,
//! LED strips and RS-485.

use crate::core::ac::{AcConfig, AcControl, AcStatus};
use crate::core::curtain::{CurtainConfig, CurtainControl};
use crate::core::dmx::{DmxChannels, DmxFixture};
use crate::core::knx::{self, KnxConfig, KnxWrite};
use crate::core::led::{LedColor, LedEffect, LedStripConfig};
use crate::core::lighting::{GroupConfig, GroupLevel};
use crate::core::rs485::SerialConfig;
use crate::core::{cmds, limits};
use crate::transport::Request;
use crate::{Client, ClientError};

impl Client {
    /// Set a lighting group to `level` percent.
    #[tracing::instrument(skip(self))]
    pub async fn set_level(&self, group: u8, level: u8) -> Result<(), ClientError> {
        let payload = GroupLevel { group, level }.to_payload()?;
        self.request(Request::new(cmds::lighting::SET_LEVEL, &payload))
            .await?;
        Ok(())
    }

    /// Current level of every configured group.
    #[tracing::instrument(skip(self))]
    pub async fn levels(&self) -> Result<Vec<GroupLevel>, ClientError> {
        let collected = self.collect_all(cmds::lighting::GET_LEVELS).await?;
        let levels = collected.decode_each(|payload| Ok::<_, ClientError>(GroupLevel::decode_all(payload)))?;
        Ok(levels)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_group_config(&self, group: &GroupConfig) -> Result<(), ClientError> {
        let payload = group.to_payload(&self.config().protocol)?;
        self.request(Request::new(cmds::lighting::GROUP_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn group_configs(&self) -> Result<Vec<GroupConfig>, ClientError> {
        let protocol = self.config().protocol;
        let collected = self.collect_all(cmds::lighting::GROUP_GET_ALL).await?;
        Ok(collected.decode_each(|payload| GroupConfig::decode_all(payload, &protocol))?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn ac_control(&self, control: &AcControl) -> Result<(), ClientError> {
        let payload = control.to_payload()?;
        self.request(Request::new(cmds::ac::CONTROL, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn ac_status(&self, index: u8) -> Result<AcStatus, ClientError> {
        limits::AC_INDEX.check(index)?;
        let frame = self
            .request(Request::get(cmds::ac::GET_STATUS, &[index]))
            .await?;
        Ok(AcStatus::try_from(&frame.payload[..])?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_ac_config(&self, config: &AcConfig) -> Result<(), ClientError> {
        let payload = config.to_payload()?;
        self.request(Request::new(cmds::ac::CONFIG_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn ac_configs(&self) -> Result<Vec<AcConfig>, ClientError> {
        let collected = self.collect_all(cmds::ac::CONFIG_GET_ALL).await?;
        Ok(collected.decode_each(AcConfig::decode_all)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn curtain_control(&self, control: &CurtainControl) -> Result<(), ClientError> {
        let payload = control.to_payload()?;
        self.request(Request::new(cmds::curtain::CONTROL, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_curtain_config(&self, config: &CurtainConfig) -> Result<(), ClientError> {
        let payload = config.to_payload()?;
        self.request(Request::new(cmds::curtain::CONFIG_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn curtain_configs(&self) -> Result<Vec<CurtainConfig>, ClientError> {
        let collected = self.collect_all(cmds::curtain::CONFIG_GET_ALL).await?;
        Ok(collected.decode_each(CurtainConfig::decode_all)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_knx_config(&self, config: &KnxConfig) -> Result<(), ClientError> {
        let payload = config.to_payload()?;
        self.request(Request::new(cmds::knx::CONFIG_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn knx_configs(&self) -> Result<Vec<KnxConfig>, ClientError> {
        let collected = self.collect_all(cmds::knx::CONFIG_GET_ALL).await?;
        Ok(collected.decode_each(KnxConfig::decode_all)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_knx_config(&self, index: u16) -> Result<(), ClientError> {
        let payload = knx::delete_payload(index)?;
        self.request(Request::new(cmds::knx::CONFIG_DELETE, &payload))
            .await?;
        Ok(())
    }

    /// Write a raw value to a KNX group address through the unit.
    #[tracing::instrument(skip(self))]
    pub async fn knx_write(&self, write: &KnxWrite) -> Result<(), ClientError> {
        let payload = write.to_payload()?;
        self.request(Request::new(cmds::knx::WRITE, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, channels), fields(start = channels.start, count = channels.values.len()))]
    pub async fn set_dmx_channels(&self, channels: &DmxChannels) -> Result<(), ClientError> {
        let payload = channels.to_payload()?;
        self.request(Request::new(cmds::dmx::SET_CHANNELS, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_dmx_fixture(&self, fixture: &DmxFixture) -> Result<(), ClientError> {
        let payload = fixture.to_payload()?;
        self.request(Request::new(cmds::dmx::FIXTURE_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn dmx_fixtures(&self) -> Result<Vec<DmxFixture>, ClientError> {
        let collected = self.collect_all(cmds::dmx::FIXTURE_GET_ALL).await?;
        Ok(collected.decode_each(DmxFixture::decode_all)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_led_color(&self, color: &LedColor) -> Result<(), ClientError> {
        let payload = color.to_payload()?;
        self.request(Request::new(cmds::led::SET_COLOR, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_led_effect(&self, effect: &LedEffect) -> Result<(), ClientError> {
        let payload = effect.to_payload()?;
        self.request(Request::new(cmds::led::SET_EFFECT, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_led_config(&self, config: &LedStripConfig) -> Result<(), ClientError> {
        let payload = config.to_payload()?;
        self.request(Request::new(cmds::led::CONFIG_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_serial_config(&self, config: &SerialConfig) -> Result<(), ClientError> {
        let payload = config.to_payload()?;
        self.request(Request::new(cmds::general::RS485_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn serial_config(&self, port: u8) -> Result<SerialConfig, ClientError> {
        let payload = SerialConfig::request_payload(port)?;
        let frame = self
            .request(Request::get(cmds::general::RS485_GET, &payload))
            .await?;
        Ok(SerialConfig::try_from(&frame.payload[..])?)
    }
}
