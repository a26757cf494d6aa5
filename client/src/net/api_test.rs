use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::*;

/// Serve one canned HTTP response and return the raw request it answered.
async fn one_shot_http(status: &'static str, body: &'static str) -> (ClientConfig, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let (mut tcp, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        loop {
            let n = tcp.read(&mut buf).await.expect("read");
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + length || n == 0 {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        tcp.write_all(response.as_bytes()).await.expect("write");
        tcp.shutdown().await.expect("shutdown");
        String::from_utf8_lossy(&request).to_string()
    });
    let config = ClientConfig { base_url: format!("http://{addr}"), ..ClientConfig::default() };
    (config, handle)
}

#[test]
fn rejection_message_uses_server_message() {
    assert_eq!(rejection_message(&json!({ "message": "Account locked" })), "Account locked");
}

#[test]
fn rejection_message_falls_back() {
    assert_eq!(rejection_message(&Value::Null), "Invalid email or password");
    assert_eq!(rejection_message(&json!({ "message": "" })), "Invalid email or password");
    assert_eq!(rejection_message(&json!({ "error": 1 })), "Invalid email or password");
}

#[test]
fn identity_prefers_response_fields() {
    let response = LoginResponse {
        token: "t".to_owned(),
        user: LoginUser { email: "ann@example.com".to_owned(), username: Some("Ann".to_owned()) },
    };
    let me = response.identity("typed@example.com");
    assert_eq!(me.display_name, "Ann");
    assert_eq!(me.email(), "ann@example.com");
}

#[test]
fn identity_falls_back_to_typed_email() {
    let response = LoginResponse { token: "t".to_owned(), user: LoginUser::default() };
    let me = response.identity("bo@example.com");
    assert_eq!(me.display_name, "bo");
    assert_eq!(me.email(), "bo@example.com");
}

#[tokio::test]
async fn login_posts_credentials_and_parses_token() {
    let (config, server) =
        one_shot_http("200 OK", r#"{"token":"tok-1","user":{"email":"ann@example.com"}}"#).await;

    let response = login(&config, "ann@example.com", "pw").await.expect("login");
    assert_eq!(response.token, "tok-1");
    assert_eq!(response.user.email, "ann@example.com");

    let request = server.await.expect("server task");
    assert!(request.starts_with("POST /api/login "), "{request}");
    assert!(request.contains(r#""email":"ann@example.com""#), "{request}");
    assert!(request.contains(r#""password":"pw""#), "{request}");
}

#[tokio::test]
async fn login_rejection_carries_server_message() {
    let (config, server) = one_shot_http("401 Unauthorized", r#"{"message":"Wrong password"}"#).await;

    let err = login(&config, "ann@example.com", "nope").await.expect_err("rejected");
    assert!(
        matches!(err, ApiError::Rejected { status: 401, ref message } if message == "Wrong password"),
        "{err}"
    );
    server.await.expect("server task");
}

#[tokio::test]
async fn login_success_without_token_is_invalid_body() {
    let (config, server) = one_shot_http("200 OK", r#"{"ok":true}"#).await;
    let err = login(&config, "a@b.c", "pw").await.expect_err("no token");
    assert!(matches!(err, ApiError::InvalidBody(_)), "{err}");
    server.await.expect("server task");
}
