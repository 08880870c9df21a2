mod common;

use common::{ok, reply, unsolicited, FakeUnit};
use std::time::Duration;
use unitlink::core::cmds::zigbee as cmds;
use unitlink::core::zigbee::{Endpoint, IeeeAddress, ZigbeeDevice};
use unitlink::{Client, ClientError};

fn device() -> ZigbeeDevice {
    ZigbeeDevice {
        ieee: IeeeAddress([0x00, 0x12, 0x4B, 0x00, 0x1C, 0xA1, 0x7E, 0x01]),
        device_type: 0x01,
        endpoints: vec![Endpoint { id: 1, address: 0x3A2F }],
    }
}

fn quick(unit: &FakeUnit) -> Client {
    let client = unit.client();
    let config = client
        .config()
        .clone()
        .with_zigbee_timeout(Duration::from_millis(300));
    client.with_config(config)
}

#[tokio::test]
async fn test_explore_returns_first_device() {
    let unit = FakeUnit::spawn(|req| {
        if req.command != cmds::OPEN_NETWORK {
            return Vec::new();
        }
        vec![
            ok(req),
            // Too short to hold a device; ignored.
            unsolicited(cmds::NEW_DEVICE, &[1, 2, 3]),
            unsolicited(cmds::NEW_DEVICE, &device().to_bytes()),
        ]
    })
    .await;
    let exploration = quick(&unit).zigbee_explore(60).await.unwrap();

    assert!(exploration.success);
    assert_eq!(exploration.device, Some(device()));
    assert_eq!(unit.commands(), [cmds::OPEN_NETWORK, cmds::CLOSE_NETWORK]);
    assert_eq!(unit.frames()[0].payload, [60]);
}

#[tokio::test]
async fn test_explore_timeout_still_closes() {
    let unit = FakeUnit::spawn(|req| match req.command {
        cmds::OPEN_NETWORK => vec![ok(req)],
        _ => Vec::new(),
    })
    .await;
    let exploration = quick(&unit).zigbee_explore(60).await.unwrap();

    assert!(!exploration.success);
    assert_eq!(exploration.device, None);
    assert_eq!(unit.commands(), [cmds::OPEN_NETWORK, cmds::CLOSE_NETWORK]);
}

#[tokio::test]
async fn test_explore_ignores_device_before_open_ack() {
    let unit = FakeUnit::spawn(|req| match req.command {
        cmds::OPEN_NETWORK => vec![unsolicited(cmds::NEW_DEVICE, &device().to_bytes())],
        _ => Vec::new(),
    })
    .await;
    let exploration = quick(&unit).zigbee_explore(60).await.unwrap();

    assert!(!exploration.success);
    assert_eq!(exploration.device, None);
    assert_eq!(unit.commands(), [cmds::OPEN_NETWORK, cmds::CLOSE_NETWORK]);
}

#[tokio::test]
async fn test_explore_open_rejected() {
    let unit = FakeUnit::spawn(|req| vec![reply(req, &[2])]).await;
    let err = quick(&unit).zigbee_explore(60).await.unwrap_err();
    assert!(err.is_device_error());
}

#[tokio::test]
async fn test_explore_validates_duration() {
    let unit = FakeUnit::silent().await;
    let err = quick(&unit).zigbee_explore(0).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(unit.commands().is_empty());
}

#[tokio::test]
async fn test_devices_across_frames() {
    let unit = FakeUnit::spawn(|req| {
        let mut first = device().to_bytes().to_vec();
        let mut second = device();
        second.ieee.0[7] = 0x02;
        first.extend_from_slice(&second.to_bytes());
        vec![reply(req, &first), reply(req, &device().to_bytes()), ok(req)]
    })
    .await;
    let devices = unit.client().zigbee_devices().await.unwrap();
    assert_eq!(devices.len(), 3);
    assert_eq!(devices[1].ieee.0[7], 0x02);
}
