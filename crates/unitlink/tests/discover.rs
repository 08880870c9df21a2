mod common;

use common::{error, ok, reply, FakeUnit, LOCALHOST};
use futures::StreamExt;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::time::timeout;
use unitlink::core::cmds::general;
use unitlink::core::{DeviceAddress, NetworkSettings};
use unitlink::{discover, ClientError};

const MAC: [u8; 6] = [0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E];

fn info_payload(mac: [u8; 6], name: &str) -> Vec<u8> {
    let mut payload = vec![2, 14, 1, 3];
    let mut barcode = b"PX-DIM8".to_vec();
    barcode.resize(16, 0);
    payload.extend_from_slice(&barcode);
    payload.extend_from_slice(&[192, 168, 1, 40]);
    payload.extend_from_slice(&[255, 255, 255, 0]);
    payload.extend_from_slice(&[192, 168, 1, 1]);
    payload.extend_from_slice(&mac);
    payload.extend_from_slice(name.as_bytes());
    payload.push(0);
    payload
}

#[tokio::test]
async fn test_units_deduplicated_by_mac() {
    let mut other = MAC;
    other[5] = 0x5F;
    let unit = FakeUnit::spawn(move |req| {
        vec![
            reply(req, &info_payload(MAC, "Hall")),
            reply(req, &info_payload(MAC, "Hall")),
            reply(req, &info_payload(other, "Office")),
        ]
    })
    .await;
    let units = discover::units_at(LOCALHOST, unit.addr).await.unwrap();
    let found: Vec<_> = units.take(2).collect().await;

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].name, "Hall");
    assert_eq!(found[0].header.barcode, "PX-DIM8");
    assert_eq!(found[0].firmware_version(), "2.14");
    assert_eq!(found[1].header.mac, other);
    assert_eq!(unit.frames()[0].address, DeviceAddress::BROADCAST);
}

#[tokio::test]
async fn test_units_skips_garbage() {
    let unit = FakeUnit::spawn(|req| {
        vec![
            // Too short to hold the info header.
            reply(req, &[1, 2, 3]),
            reply(req, &info_payload(MAC, "Hall")),
        ]
    })
    .await;
    let mut units = discover::units_at(LOCALHOST, unit.addr).await.unwrap();
    let info = timeout(Duration::from_secs(1), units.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.header.ip, Ipv4Addr::new(192, 168, 1, 40));
    assert_eq!(info.mac_string(), "00:1A:2B:3C:4D:5E");
}

fn settings() -> NetworkSettings {
    NetworkSettings {
        mac: MAC,
        ip: Ipv4Addr::new(10, 0, 0, 20),
        netmask: Ipv4Addr::new(255, 0, 0, 0),
        gateway: Ipv4Addr::new(10, 0, 0, 1),
    }
}

#[tokio::test]
async fn test_change_ip() {
    let unit = FakeUnit::spawn(|req| vec![ok(req)]).await;
    discover::change_ip_at(LOCALHOST, unit.addr, &settings(), Duration::from_millis(300))
        .await
        .unwrap();

    let frames = unit.frames();
    assert_eq!(frames[0].command, general::SET_IP);
    assert_eq!(frames[0].address, DeviceAddress::BROADCAST);
    assert_eq!(frames[0].payload, settings().to_payload());
}

#[tokio::test]
async fn test_change_ip_rejected() {
    let unit = FakeUnit::spawn(|req| vec![error(req, 8)]).await;
    let err = discover::change_ip_at(LOCALHOST, unit.addr, &settings(), Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(err.is_device_error());
}

#[tokio::test]
async fn test_change_ip_timeout() {
    let unit = FakeUnit::silent().await;
    let err = discover::change_ip_at(LOCALHOST, unit.addr, &settings(), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
}
