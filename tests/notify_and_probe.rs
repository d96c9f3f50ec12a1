// tests/notify_and_probe.rs

mod common;
use crate::common::{init_tracing, noon, with_timeout, TestResult};

use std::path::PathBuf;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use backwatch::connectivity::{ConnectivityProbe, HttpProbe};
use backwatch::errors::BackwatchError;
use backwatch::format_ls_line;
use backwatch::notify::{MessageKind, Notification, Notifier, PushbulletNotifier};
use backwatch::session::SessionOutcome;
use backwatch::state::WatchedEntry;

/// Answer exactly one HTTP request with `status`, returning the raw request.
async fn serve_once(status: &'static str) -> std::io::Result<(String, JoinHandle<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/v2/pushes", listener.local_addr()?);

    let handle = tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return String::new();
        };
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }
        let response = format!("HTTP/1.1 {status}\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{{}}");
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&raw).into_owned()
    });

    Ok((url, handle))
}

fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(std::time::Duration::from_secs(3))
        .build()
        .expect("http client")
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..head_end]
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    raw.len() >= head_end + 4 + content_length
}

#[test]
fn notification_bodies() {
    assert_eq!(Notification::success().body(), "Successful Sync");
    assert_eq!(Notification::success().kind, MessageKind::Success);

    let failed = Notification::failure(vec![PathBuf::from("/a"), PathBuf::from("/srv/b c")]);
    assert_eq!(failed.kind, MessageKind::Failure);
    assert_eq!(failed.title(), "backwatch");
    assert_eq!(failed.body(), "Failed Sync\n/a\n/srv/b c");
}

#[tokio::test]
async fn pushbullet_posts_a_note_with_the_token() -> TestResult {
    init_tracing();
    let (url, server) = serve_once("200 OK").await?;

    let notifier = PushbulletNotifier::with_client("o.secret", url, direct_client());
    with_timeout(notifier.send(&Notification::failure(vec![PathBuf::from("/b")]))).await?;

    let request = with_timeout(server).await?;
    let lower = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /v2/pushes"), "request was:\n{request}");
    assert!(lower.contains("access-token: o.secret"));
    assert!(lower.contains("content-type: application/json"));
    assert!(request.contains(r#""type":"note""#));
    assert!(request.contains(r#""title":"backwatch""#));
    assert!(request.contains(r#""body":"Failed Sync\n/b""#));
    Ok(())
}

#[tokio::test]
async fn pushbullet_rejection_is_a_notification_error() -> TestResult {
    init_tracing();
    let (url, server) = serve_once("401 Unauthorized").await?;

    let notifier = PushbulletNotifier::with_client("bad", url, direct_client());
    let result = with_timeout(notifier.send(&Notification::success())).await;
    let _ = with_timeout(server).await;

    match result {
        Err(BackwatchError::NotificationError(msg)) => assert!(msg.contains("401")),
        other => panic!("expected NotificationError, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn probe_is_online_when_anything_answers() -> TestResult {
    init_tracing();
    let (url, server) = serve_once("404 Not Found").await?;

    let probe = HttpProbe::with_client(url, direct_client());
    assert!(with_timeout(probe.is_online()).await);

    let request = with_timeout(server).await?;
    assert!(request.starts_with("HEAD "));
    Ok(())
}

#[tokio::test]
async fn probe_is_offline_when_nothing_listens() -> TestResult {
    init_tracing();
    // Bind then drop, so the port is very likely closed.
    let addr = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;

    let probe = HttpProbe::with_client(format!("http://{addr}/"), direct_client());
    assert!(!with_timeout(probe.is_online()).await);
    Ok(())
}

#[test]
fn ls_lines() {
    let never = WatchedEntry::new("/home/u/docs", "abc123-docs");
    assert_eq!(format_ls_line(&never), "never\t/home/u/docs\tabc123-docs");

    let synced = WatchedEntry::new("/srv/photos", "family-photos").with_last_synced(Some(noon()));
    assert_eq!(
        format_ls_line(&synced),
        "2024-03-01 12:00:00\t/srv/photos\tfamily-photos"
    );
}

#[test]
fn outcome_summaries() {
    assert_eq!(SessionOutcome::UpToDate.to_string(), "up to date");
    assert_eq!(SessionOutcome::Synced { count: 3 }.to_string(), "synced 3 directories");
    let failed = SessionOutcome::Failed {
        failed: vec![PathBuf::from("/a")],
        succeeded: 2,
    };
    assert_eq!(failed.to_string(), "1 failed, 2 succeeded");
    assert!(failed.is_failure());
    assert!(!SessionOutcome::Offline.is_failure());
}
