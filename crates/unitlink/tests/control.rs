mod common;

use common::{error, ok, reply, FakeUnit};
use unitlink::core::cmds::general;
use unitlink::core::room::Room;
use unitlink::core::rs485::{BaudRate, Parity, SerialConfig};
use unitlink::core::scene::{SceneConfig, SceneEntry};
use unitlink::core::ProtocolConfig;

fn scene(index: u8, name: &str) -> SceneConfig {
    SceneConfig {
        index,
        entries: vec![
            SceneEntry { group: 1, level: 100 },
            SceneEntry { group: 4, level: 30 },
        ],
        name: name.to_string(),
    }
}

#[tokio::test]
async fn test_scenes_with_names() {
    let protocol = ProtocolConfig::default().with_send_name(true);
    let unit = FakeUnit::spawn(move |req| match req.command {
        general::SCENE_GET_ALL => {
            let mut first = scene(0, "Evening").to_payload(&protocol).unwrap();
            first.extend(scene(1, "Cleaning").to_payload(&protocol).unwrap());
            let second = scene(2, "").to_payload(&protocol).unwrap();
            vec![reply(req, &first), reply(req, &second), ok(req)]
        }
        _ => vec![ok(req)],
    })
    .await;
    let client = unit.client();
    let client = client
        .clone()
        .with_config(client.config().clone().with_protocol(protocol));

    client.set_scene(&scene(0, "Evening")).await.unwrap();
    let scenes = client.scenes().await.unwrap();

    assert_eq!(scenes, [scene(0, "Evening"), scene(1, "Cleaning"), scene(2, "")]);
    // index, count, two pairs, 20 byte name.
    assert_eq!(unit.frames()[0].payload.len(), 2 + 4 + 20);
}

#[tokio::test]
async fn test_set_room_waits_out_busy() {
    let unit = FakeUnit::spawn(|req| vec![error(req, 12), ok(req)]).await;
    let room = Room {
        index: 3,
        enabled: true,
        groups: vec![1, 2, 3],
        ac: Some(0),
        curtain: None,
    };
    unit.client().set_room(&room).await.unwrap();

    let payload = &unit.frames()[0].payload;
    assert_eq!(payload.len(), Room::SIZE);
    assert_eq!(payload[18..], [0, 0xFF]);
}

#[tokio::test]
async fn test_rooms() {
    let room = Room {
        index: 1,
        enabled: false,
        groups: vec![10, 11],
        ac: None,
        curtain: Some(2),
    };
    let record = room.to_payload().unwrap();
    let unit = FakeUnit::spawn(move |req| vec![reply(req, &record), ok(req)]).await;
    let rooms = unit.client().rooms().await.unwrap();
    assert_eq!(rooms, [room]);
}

#[tokio::test]
async fn test_serial_config() {
    let config = SerialConfig {
        port: 1,
        baud: BaudRate::B19200,
        data_bits: 8,
        parity: Parity::Even,
        stop_bits: 1,
        protocol: 2,
    };
    let record = config.to_payload().unwrap();
    let unit = FakeUnit::spawn(move |req| vec![reply(req, &record)]).await;
    let read = unit.client().serial_config(1).await.unwrap();
    assert_eq!(read, config);
    assert_eq!(unit.frames()[0].payload, [1]);
}
