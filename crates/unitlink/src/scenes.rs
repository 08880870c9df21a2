//! Scenes, multi-scenes, sequences, schedules and rooms.

use crate::core::cmds::general;
use crate::core::room::Room;
use crate::core::scene::{self, MultiScene, SceneConfig, Sequence};
use crate::core::schedule::{self, Schedule};
use crate::transport::Request;
use crate::{Client, ClientError};

impl Client {
    #[tracing::instrument(skip(self))]
    pub async fn set_scene(&self, scene: &SceneConfig) -> Result<(), ClientError> {
        let payload = scene.to_payload(&self.config().protocol)?;
        self.request(Request::new(general::SCENE_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn trigger_scene(&self, index: u8) -> Result<(), ClientError> {
        let payload = scene::trigger_payload(index)?;
        self.request(Request::new(general::SCENE_TRIGGER, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn scenes(&self) -> Result<Vec<SceneConfig>, ClientError> {
        let protocol = self.config().protocol;
        let collected = self.collect_all(general::SCENE_GET_ALL).await?;
        Ok(collected.decode_each(|payload| SceneConfig::decode_all(payload, &protocol))?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_scene(&self, index: u8) -> Result<(), ClientError> {
        let payload = scene::delete_payload(index)?;
        self.request(Request::new(general::SCENE_DELETE, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_multi_scene(&self, multi: &MultiScene) -> Result<(), ClientError> {
        let payload = multi.to_payload()?;
        self.request(Request::new(general::MULTI_SCENE_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn trigger_multi_scene(&self, index: u8) -> Result<(), ClientError> {
        let payload = MultiScene::trigger_payload(index)?;
        self.request(Request::new(general::MULTI_SCENE_TRIGGER, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_sequence(&self, sequence: &Sequence) -> Result<(), ClientError> {
        let payload = sequence.to_payload()?;
        self.request(Request::new(general::SEQUENCE_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    /// Start or stop a sequence.
    #[tracing::instrument(skip(self))]
    pub async fn run_sequence(&self, index: u8, run: bool) -> Result<(), ClientError> {
        let payload = Sequence::control_payload(index, run)?;
        self.request(Request::new(general::SEQUENCE_CONTROL, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_schedule(&self, schedule: &Schedule) -> Result<(), ClientError> {
        let payload = schedule.to_payload()?;
        self.request(Request::new(general::SCHEDULE_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn schedules(&self) -> Result<Vec<Schedule>, ClientError> {
        let collected = self.collect_all(general::SCHEDULE_GET_ALL).await?;
        Ok(collected.decode_each(Schedule::decode_all)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_schedule(&self, index: u8) -> Result<(), ClientError> {
        let payload = schedule::delete_payload(index)?;
        self.request(Request::new(general::SCHEDULE_DELETE, &payload))
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_room(&self, room: &Room) -> Result<(), ClientError> {
        let payload = room.to_payload()?;
        self.request(Request::new(general::ROOM_SET, &payload).wait_after_busy())
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn rooms(&self) -> Result<Vec<Room>, ClientError> {
        let collected = self.collect_all(general::ROOM_GET_ALL).await?;
        Ok(collected.decode_each(Room::decode_all)?)
    }
}
