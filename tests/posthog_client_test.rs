//! Integration test: PostHog client against a local HTTP stub
//!
//! The stub accepts one request per connection, records the JSON body and
//! answers with a fixed status.

use chrono::{TimeZone, Utc};
use daily_pulse::ingest::{Ingest, PostHogClient};
use daily_pulse::simulator::{simulate, NewUserCount, SimConfig, TimeWindow};
use daily_pulse::dice::RngDice;
use daily_pulse::{Event, PulseError};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Serves `requests` requests answering with `status`, returning the bodies.
fn spawn_stub(status: u16, requests: usize) -> (String, JoinHandle<Vec<serde_json::Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let host = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut bodies = Vec::new();
        for _ in 0..requests {
            let (stream, _) = listener.accept().unwrap();
            bodies.push(handle_request(stream, status));
        }
        bodies
    });

    (host, handle)
}

fn handle_request(stream: TcpStream, status: u16) -> serde_json::Value {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    assert!(request_line.starts_with("POST /batch/ "), "{}", request_line);

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).unwrap();

    let reply = if status == 200 { "{\"status\":1}" } else { "{\"error\":\"nope\"}" };
    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reply.len(),
        reply
    )
    .unwrap();
    stream.flush().unwrap();

    serde_json::from_slice(&body).unwrap()
}

fn event(i: u32) -> Event {
    let ts = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    Event::new(format!("user_20261018_{}_pro", i), "team_invite", ts).with("plan", "pro")
}

#[test]
fn test_flush_posts_all_batches() {
    let (host, stub) = spawn_stub(200, 3);
    let mut client = PostHogClient::new("phc_stub", &host, 2, Duration::from_secs(5));
    for i in 0..5 {
        client.capture(event(i));
    }

    let report = client.flush().unwrap();
    assert_eq!(report.events, 5);
    assert_eq!(report.batches, 3);
    assert_eq!(client.pending(), 0);

    let bodies = stub.join().unwrap();
    let sizes: Vec<usize> = bodies
        .iter()
        .map(|b| b["batch"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert!(bodies.iter().all(|b| b["api_key"] == "phc_stub"));
    assert_eq!(bodies[0]["batch"][0]["event"], "team_invite");
    assert_eq!(bodies[0]["batch"][0]["properties"]["plan"], "pro");
}

#[test]
fn test_rejected_batch_fails_flush() {
    let (host, stub) = spawn_stub(401, 1);
    let mut client = PostHogClient::new("phc_bad", &host, 100, Duration::from_secs(5));
    client.capture(event(1));

    let err = client.flush().unwrap_err();
    assert!(matches!(err, PulseError::Rejected { status: 401, .. }), "{:?}", err);
    assert_eq!(err.exit_code(), 1);
    stub.join().unwrap();
}

#[test]
fn test_unreachable_host_fails_flush() {
    // Bind then drop to get a port nothing listens on.
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let host = format!("http://127.0.0.1:{}", port);
    let mut client = PostHogClient::new("phc_x", &host, 100, Duration::from_secs(2));
    client.capture(event(1));

    let err = client.flush().unwrap_err();
    assert!(matches!(err, PulseError::Transport(_)), "{:?}", err);
}

#[test]
fn test_full_run_through_http() {
    let config = SimConfig {
        api_key: Some("phc_run".to_string()),
        new_users: NewUserCount::Fixed(4),
        returning_pool_size: 20,
        batch_size: 1000,
        ..Default::default()
    };
    let (host, stub) = spawn_stub(200, 1);
    let config = SimConfig { host, ..config };

    let window = TimeWindow::trailing(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap(), 24);
    let mut client = PostHogClient::from_config(&config).unwrap();
    let summary = simulate(&config, &window, &mut RngDice::seeded(9), &mut client).unwrap();

    let bodies = stub.join().unwrap();
    let sent = bodies[0]["batch"].as_array().unwrap().len() as u64;
    assert_eq!(sent, summary.events_captured);
    assert_eq!(summary.batches_sent, 1);
}
