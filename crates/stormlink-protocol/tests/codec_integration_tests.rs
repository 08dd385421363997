//! Codec integration: Decoder/Encoder behavior against realistic traffic.

use bytes::BytesMut;
use stormlink_protocol::{AttributeKey, Command, IspCodec};
use tokio_util::codec::{Decoder, Encoder};

fn drain(codec: &mut IspCodec, buffer: &mut BytesMut) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = codec.decode(buffer).unwrap() {
        lines.push(line);
    }
    lines
}

#[test]
fn burst_of_status_reports() {
    let mut codec = IspCodec::new();
    let mut buffer = BytesMut::from(
        &b"ssp.procstate.[2]\nssp.power.on\nssp.vol.[-40]\nssp.fs.[48000]\n"[..],
    );

    let lines = drain(&mut codec, &mut buffer);
    assert_eq!(
        lines,
        vec![
            "ssp.procstate.[2]",
            "ssp.power.on",
            "ssp.vol.[-40]",
            "ssp.fs.[48000]",
        ]
    );
}

#[test]
fn fragment_spanning_decode_calls() {
    let mut codec = IspCodec::new();

    let mut first = BytesMut::from(&b"ssp.brand.[ISP"[..]);
    assert!(codec.decode(&mut first).unwrap().is_none());

    let mut second = BytesMut::from(&b" Elite]\nssp.dim"[..]);
    assert_eq!(
        codec.decode(&mut second).unwrap().as_deref(),
        Some("ssp.brand.[ISP Elite]")
    );
    assert!(codec.decode(&mut second).unwrap().is_none());

    let mut third = BytesMut::from(&b".[1]\n"[..]);
    assert_eq!(codec.decode(&mut third).unwrap().as_deref(), Some("ssp.dim.[1]"));
}

#[test]
fn consecutive_terminators_yield_nothing() {
    let mut codec = IspCodec::new();
    let mut buffer = BytesMut::from(&b"\n\n\n"[..]);
    assert!(drain(&mut codec, &mut buffer).is_empty());
}

#[test]
fn encode_full_refresh_sequence() {
    let mut codec = IspCodec::new();
    let mut buffer = BytesMut::new();

    for key in AttributeKey::ALL {
        codec.encode(Command::Query(key), &mut buffer).unwrap();
    }

    let text = String::from_utf8(buffer.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), AttributeKey::ALL.len());
    assert_eq!(lines[0], "ssp.procstate");
    assert!(lines.contains(&"ssp.input.list"));
    assert!(text.ends_with('\n'));
}

#[test]
fn decoded_query_echo_matches_encoded_form() {
    // the device echoes commands in the same textual form it reports
    // status; encoding then decoding must return the identical line
    let mut codec = IspCodec::new();
    let mut buffer = BytesMut::new();

    let cmd = Command::set(AttributeKey::Power, "on");
    codec.encode(cmd.clone(), &mut buffer).unwrap();

    let line = codec.decode(&mut buffer).unwrap().unwrap();
    assert_eq!(line, cmd.encode());
}
