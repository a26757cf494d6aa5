use super::*;

fn sample_handshake() -> OpenHandshake {
    OpenHandshake {
        sid: "eio-1".to_owned(),
        upgrades: Vec::new(),
        ping_interval: 25_000,
        ping_timeout: 20_000,
        max_payload: Some(1_000_000),
    }
}

// =============================================================
// Engine.IO
// =============================================================

#[test]
fn decode_engine_parses_open_handshake() {
    let text = r#"0{"sid":"eio-1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
    let packet = decode_engine(text).expect("open should decode");
    assert_eq!(packet, EnginePacket::Open(sample_handshake()));
}

#[test]
fn decode_engine_open_tolerates_missing_optional_fields() {
    let packet = decode_engine(r#"0{"sid":"s","pingInterval":1,"pingTimeout":2}"#).expect("open");
    let EnginePacket::Open(handshake) = packet else {
        panic!("expected open packet");
    };
    assert!(handshake.upgrades.is_empty());
    assert_eq!(handshake.max_payload, None);
}

#[test]
fn decode_engine_maps_control_packets() {
    assert_eq!(decode_engine("1").expect("close"), EnginePacket::Close);
    assert_eq!(decode_engine("2").expect("ping"), EnginePacket::Ping(None));
    assert_eq!(decode_engine("3probe").expect("pong"), EnginePacket::Pong(Some("probe".to_owned())));
    assert_eq!(decode_engine("5").expect("upgrade"), EnginePacket::Upgrade);
    assert_eq!(decode_engine("6").expect("noop"), EnginePacket::Noop);
}

#[test]
fn decode_engine_keeps_message_body_verbatim() {
    let packet = decode_engine(r#"42["draw",{"x":1}]"#).expect("message");
    assert_eq!(packet, EnginePacket::Message(r#"2["draw",{"x":1}]"#.to_owned()));
}

#[test]
fn decode_engine_rejects_empty_and_unknown() {
    assert!(matches!(decode_engine(""), Err(CodecError::Empty)));
    assert!(matches!(decode_engine("9"), Err(CodecError::UnknownEngineType('9'))));
    assert!(matches!(decode_engine("0not-json"), Err(CodecError::Json(_))));
}

#[test]
fn encode_engine_control_packets() {
    assert_eq!(encode_engine(&EnginePacket::Pong(None)), "3");
    assert_eq!(encode_engine(&EnginePacket::Ping(Some("probe".to_owned()))), "2probe");
    assert_eq!(encode_engine(&EnginePacket::Close), "1");
    assert_eq!(encode_engine(&EnginePacket::Message("40".to_owned())), "440");
}

#[test]
fn encode_engine_open_uses_camel_case_keys() {
    let text = encode_engine(&EnginePacket::Open(sample_handshake()));
    assert!(text.starts_with("0{"));
    assert!(text.contains("\"pingInterval\":25000"));
    assert_eq!(decode_engine(&text).expect("decode"), EnginePacket::Open(sample_handshake()));
}

// =============================================================
// Socket.IO
// =============================================================

#[test]
fn decode_socket_connect_ack_carries_sid() {
    let packet = decode_socket(r#"0{"sid":"abc"}"#).expect("connect");
    assert_eq!(
        packet,
        SocketPacket::Connect {
            namespace: "/".to_owned(),
            data: Some(serde_json::json!({ "sid": "abc" })),
        }
    );
}

#[test]
fn decode_socket_event_splits_name_and_args() {
    let packet = decode_socket(r#"2["chatMessage",{"text":"hi"},7]"#).expect("event");
    let SocketPacket::Event { namespace, ack_id, name, args } = packet else {
        panic!("expected event");
    };
    assert_eq!(namespace, "/");
    assert_eq!(ack_id, None);
    assert_eq!(name, "chatMessage");
    assert_eq!(args, vec![serde_json::json!({ "text": "hi" }), serde_json::json!(7)]);
}

#[test]
fn decode_socket_event_with_namespace_and_ack_id() {
    let packet = decode_socket(r#"2/admin,12["ping"]"#).expect("event");
    let SocketPacket::Event { namespace, ack_id, name, args } = packet else {
        panic!("expected event");
    };
    assert_eq!(namespace, "/admin");
    assert_eq!(ack_id, Some(12));
    assert_eq!(name, "ping");
    assert!(args.is_empty());
}

#[test]
fn decode_socket_disconnect_on_namespace_without_comma() {
    let packet = decode_socket("1/admin").expect("disconnect");
    assert_eq!(packet, SocketPacket::Disconnect { namespace: "/admin".to_owned() });
}

#[test]
fn decode_socket_connect_error_message() {
    let packet = decode_socket(r#"4{"message":"Not authorized"}"#).expect("connect error");
    assert_eq!(
        packet,
        SocketPacket::ConnectError {
            namespace: "/".to_owned(),
            data: serde_json::json!({ "message": "Not authorized" }),
        }
    );
}

#[test]
fn decode_socket_ack_requires_id() {
    assert!(matches!(decode_socket(r#"3["ok"]"#), Err(CodecError::MissingAckId)));
    let packet = decode_socket(r#"35["ok"]"#).expect("ack");
    assert_eq!(
        packet,
        SocketPacket::Ack { namespace: "/".to_owned(), ack_id: 5, args: vec![serde_json::json!("ok")] }
    );
}

#[test]
fn decode_socket_rejects_malformed_events() {
    assert!(matches!(decode_socket("2"), Err(CodecError::MalformedEvent)));
    assert!(matches!(decode_socket("2[]"), Err(CodecError::MalformedEvent)));
    assert!(matches!(decode_socket("2[1,2]"), Err(CodecError::MalformedEvent)));
    assert!(matches!(decode_socket(r#"2{"a":1}"#), Err(CodecError::MalformedEvent)));
}

#[test]
fn decode_socket_rejects_binary_and_unknown_types() {
    assert!(matches!(decode_socket(r#"51-["upload",{"_placeholder":true,"num":0}]"#), Err(CodecError::UnsupportedBinary)));
    assert!(matches!(decode_socket("8"), Err(CodecError::UnknownSocketType('8'))));
    assert!(matches!(decode_socket(""), Err(CodecError::Empty)));
}

#[test]
fn encode_socket_connect_with_auth_payload() {
    let packet = SocketPacket::Connect {
        namespace: "/".to_owned(),
        data: Some(serde_json::json!({ "token": "t-1" })),
    };
    assert_eq!(encode_socket(&packet), r#"0{"token":"t-1"}"#);
    assert_eq!(encode_message(&packet), r#"40{"token":"t-1"}"#);
}

#[test]
fn encode_socket_event_on_default_namespace() {
    let packet = SocketPacket::event("joinRoom", serde_json::json!("room-1"));
    assert_eq!(encode_message(&packet), r#"42["joinRoom","room-1"]"#);
}

#[test]
fn encode_socket_prefixes_custom_namespace_and_ack_id() {
    let packet = SocketPacket::Event {
        namespace: "/draw".to_owned(),
        ack_id: Some(3),
        name: "x".to_owned(),
        args: Vec::new(),
    };
    assert_eq!(encode_socket(&packet), r#"2/draw,3["x"]"#);
}

#[test]
fn encode_socket_disconnect_is_bare_type() {
    let packet = SocketPacket::Disconnect { namespace: "/".to_owned() };
    assert_eq!(encode_message(&packet), "41");
}

#[test]
fn encoded_event_decodes_back_through_both_layers() {
    let packet = SocketPacket::event("draw", serde_json::json!({ "x": 1.5, "y": 2.0 }));
    let text = encode_message(&packet);
    let EnginePacket::Message(body) = decode_engine(&text).expect("engine") else {
        panic!("expected message");
    };
    assert_eq!(decode_socket(&body).expect("socket"), packet);
}
