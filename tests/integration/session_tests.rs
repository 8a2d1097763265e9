//! Command server session behaviour against a mock device backend.

use remoteio::device::DeviceWorker;
use remoteio::protocol::codec::{decode_response, encode_request, encode_response};
use remoteio::protocol::{ChannelId, Level, Request, Response, Unit};
use remoteio::server::session;
use remoteio::transport::{frame_buffer, in_memory_pair, Channel};

use crate::mock_device::{DeviceCall, MockDevice};

#[test]
fn read_request_reaches_the_backend_and_returns_a_reading() {
    let (device, calls) = MockDevice::new();
    let device = device.with_reading(ChannelId::XAcc, 1.25);
    let (handle, worker) = DeviceWorker::spawn(device);

    let frame = encode_request(&Request::Read {
        channel: ChannelId::XAcc,
    });
    let response = session::handle_frame(&frame, &handle, 27);

    assert_eq!(
        response,
        Response::Read {
            channel: ChannelId::XAcc,
            value: 1.25,
            unit: Unit::MetresPerSecondSquared,
        }
    );
    assert_eq!(*calls.lock().unwrap(), vec![DeviceCall::Read(ChannelId::XAcc)]);

    drop(handle);
    worker.join();
}

#[test]
fn malformed_frames_become_error_responses_without_device_calls() {
    let (device, calls) = MockDevice::new();
    let (handle, worker) = DeviceWorker::spawn(device);

    for frame in [
        &b"not json at all"[..],
        br#"{"data":{"value":"x_acc"}}"#,
        br#"{"mode":"frobnicate","data":{}}"#,
        br#"{"mode":"read","data":{"value":"w_acc"}}"#,
        br#"{"mode":"write","data":{"gpio":17,"value":3}}"#,
    ] {
        match session::handle_frame(frame, &handle, 27) {
            Response::Error(_) => {}
            other => panic!("expected an error response, got {other:?}"),
        }
    }
    assert!(calls.lock().unwrap().is_empty());

    drop(handle);
    worker.join();
}

#[test]
fn out_of_range_write_never_touches_hardware() {
    let (device, calls) = MockDevice::new();
    let (handle, worker) = DeviceWorker::spawn(device);

    let frame = encode_request(&Request::Write {
        line: 26,
        level: Level::High,
    });
    match session::handle_frame(&frame, &handle, 10) {
        Response::Error(msg) => assert!(msg.contains("0-10"), "unexpected message: {msg}"),
        other => panic!("expected an error response, got {other:?}"),
    }
    assert!(calls.lock().unwrap().is_empty());

    drop(handle);
    worker.join();
}

#[test]
fn backend_read_failure_names_the_channel() {
    let (device, _calls) = MockDevice::new();
    let device = device.failing_reads();
    let (handle, worker) = DeviceWorker::spawn(device);

    let frame = encode_request(&Request::Read {
        channel: ChannelId::YAngle,
    });
    match session::handle_frame(&frame, &handle, 27) {
        Response::Error(msg) => assert!(msg.contains("y_angle"), "unexpected message: {msg}"),
        other => panic!("expected an error response, got {other:?}"),
    }

    drop(handle);
    worker.join();
}

/// A protocol error mid-session must not end the session: the raw-frame
/// client sends garbage between two valid requests and all three get a
/// response.
#[test]
fn session_survives_protocol_errors() {
    let (mut client_end, server_end) = in_memory_pair();
    let (device, calls) = MockDevice::new();
    let device = device.with_reading(ChannelId::ZAcc, 9.81);
    let (handle, worker) = DeviceWorker::spawn(device);

    let session = std::thread::spawn(move || {
        session::run(server_end, &handle, 27, "test-peer");
    });

    let mut buf = frame_buffer();

    let read = encode_request(&Request::Read {
        channel: ChannelId::ZAcc,
    });
    client_end.send(&read).unwrap();
    let n = client_end.recv(&mut buf).unwrap();
    match decode_response(&buf[..n]).unwrap() {
        Response::Read { value, .. } => assert!((value - 9.81).abs() < 1e-12),
        other => panic!("expected a reading, got {other:?}"),
    }

    client_end.send(b"{{{").unwrap();
    let n = client_end.recv(&mut buf).unwrap();
    assert!(matches!(decode_response(&buf[..n]), Ok(Response::Error(_))));

    let write = encode_request(&Request::Write {
        line: 17,
        level: Level::Low,
    });
    client_end.send(&write).unwrap();
    let n = client_end.recv(&mut buf).unwrap();
    assert_eq!(
        decode_response(&buf[..n]).unwrap(),
        Response::Write {
            line: 17,
            level: Level::Low,
        }
    );
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            DeviceCall::Read(ChannelId::ZAcc),
            DeviceCall::Write { line: 17, level: 0 },
        ]
    );

    // Peer close ends the session cleanly.
    drop(client_end);
    session.join().unwrap();
    worker.join();
}

/// The client helper API over a full in-memory stack.
#[test]
fn client_round_trips_through_a_live_session() {
    let (device, _calls) = MockDevice::new();
    let device = device.with_reading(ChannelId::XAngle, -4.5);
    let mut client = crate::mock_device::spawn_session(device, 27);

    let reading = client.read(ChannelId::XAngle).expect("read should succeed");
    assert!((reading.value + 4.5).abs() < 1e-12);
    assert_eq!(reading.unit, Unit::DegreesPerSecond);

    assert!(client.write(22, Level::High));
    assert!(!client.write(200, Level::High));
}

/// Responses synthesized by the server always carry exactly one of the
/// data or error shapes on the wire.
#[test]
fn error_responses_carry_only_the_error_key() {
    let frame = encode_response(&Response::Error("boom".into()));
    let value: serde_json::Value = serde_json::from_slice(&frame).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    assert_eq!(obj["error"], "boom");
}
