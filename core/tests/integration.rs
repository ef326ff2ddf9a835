//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every resource
//! family through `Client` over real HTTP using the default ureq transport.
//! Covers each authentication scheme and the error classification paths.

use std::io::{BufRead, BufReader, Write};
use std::net::SocketAddr;

use serde_json::json;
use swiftype_core::{ApiError, Client, Credentials, SearchOptions};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Answers exactly one request with `status_line` and `body`, bypassing the
/// mock server so payloads it would never produce can be served.
fn serve_once(status_line: &'static str, body: Vec<u8>) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        loop {
            line.clear();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut stream = reader.into_inner();
        let head = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();
    });

    addr
}

fn client(addr: SocketAddr, credentials: Credentials) -> Client {
    Client::builder()
        .host(addr.to_string())
        .credentials(credentials)
        .build()
}

#[test]
fn engine_and_document_lifecycle() {
    let addr = start_server();
    let client = client(addr, Credentials::api_key(mock_server::API_KEY));

    // Step 1: no engines yet.
    let response = client.engines(None, None).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, Some(json!([])));

    // Step 2: create an engine and a document type.
    let engine = client.create_engine("api-test").unwrap();
    assert_eq!(engine.status, 201);
    assert_eq!(engine.body.unwrap()["slug"], "api-test");

    let document_type = client.create_document_type("api-test", "books").unwrap();
    assert_eq!(document_type.body.unwrap()["slug"], "books");

    let fetched = client.document_type("api-test", "books").unwrap();
    assert_eq!(fetched.body.unwrap()["name"], "books");

    // Step 3: single and bulk document creation.
    let created = client
        .create_document("api-test", "books", &json!({"external_id": "1", "title": "Dune"}))
        .unwrap();
    assert_eq!(created.body.unwrap()["external_id"], "1");

    let bulk = client
        .create_documents(
            "api-test",
            "books",
            &[json!({"external_id": "2", "title": "Emma"}), json!({"title": "no id"})],
        )
        .unwrap();
    assert_eq!(bulk.body, Some(json!([true, false])));

    // Step 4: list with and without pagination.
    let all = client.documents("api-test", "books", None, None).unwrap();
    assert_eq!(all.body.unwrap().as_array().unwrap().len(), 2);

    let second_page = client.documents("api-test", "books", Some(2), Some(1)).unwrap();
    assert_eq!(second_page.body.unwrap()[0]["external_id"], "2");

    let single = client.document("api-test", "books", "2").unwrap();
    assert_eq!(single.body.unwrap()["title"], "Emma");

    // Step 5: search sends the query as a GET body.
    let hits = client.search("api-test", "Dune", &SearchOptions::new()).unwrap();
    let body = hits.body.unwrap();
    assert_eq!(body["records"]["books"].as_array().unwrap().len(), 1);

    let mut options = SearchOptions::new();
    options.insert("page".into(), json!(1));
    let everything = client.search("api-test", "*", &options).unwrap();
    assert_eq!(everything.body.unwrap()["records"]["books"].as_array().unwrap().len(), 2);

    // Step 6: destroy returns 204 with no body.
    let destroyed = client.destroy_document("api-test", "books", "1").unwrap();
    assert_eq!(destroyed.status, 204);
    assert!(destroyed.body.is_none());

    let bulk_destroyed = client.destroy_documents("api-test", "books", &["2", "3"]).unwrap();
    assert_eq!(bulk_destroyed.body, Some(json!([true, false])));

    // Step 7: missing resources surface as HTTP errors.
    let err = client.document("api-test", "books", "1").unwrap_err();
    assert_eq!(err.status(), Some(404));

    let removed = client.destroy_document_type("api-test", "books").unwrap();
    assert_eq!(removed.status, 204);
    let removed = client.destroy_engine("api-test").unwrap();
    assert_eq!(removed.status, 204);
    let err = client.engine("api-test").unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn domain_lifecycle() {
    let addr = start_server();
    let client = client(addr, Credentials::api_key(mock_server::API_KEY));
    client.create_engine("crawler-demo").unwrap();

    let created = client
        .create_domain("crawler-demo", "http://www.example.com")
        .unwrap()
        .body
        .unwrap();
    assert_eq!(created["submitted_url"], "http://www.example.com");
    let id = created["id"].as_str().unwrap();

    let listed = client.domains("crawler-demo").unwrap();
    assert_eq!(listed.body.unwrap().as_array().unwrap().len(), 1);

    let fetched = client.domain("crawler-demo", id).unwrap();
    assert_eq!(fetched.body.unwrap()["id"], id);

    let destroyed = client.destroy_domain("crawler-demo", id).unwrap();
    assert_eq!(destroyed.status, 204);
    assert!(destroyed.body.is_none());
}

#[test]
fn duplicate_engine_is_an_http_error_with_raw_body() {
    let addr = start_server();
    let client = client(addr, Credentials::api_key(mock_server::API_KEY));
    client.create_engine("api-test").unwrap();

    match client.create_engine("api-test").unwrap_err() {
        ApiError::Http { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, r#"{"error":"Name has already been taken"}"#);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn bearer_and_basic_credentials_are_accepted() {
    let addr = start_server();

    let bearer = client(addr, Credentials::access_token(mock_server::ACCESS_TOKEN));
    let engine = bearer.create_engine("myusersengine").unwrap();
    assert_eq!(engine.body.unwrap()["name"], "myusersengine");

    let basic = client(
        addr,
        Credentials::basic(mock_server::USERNAME, mock_server::PASSWORD),
    );
    let engines = basic.engines(None, None).unwrap();
    assert_eq!(engines.body.unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn basic_auth_wins_over_a_wrong_api_key() {
    let addr = start_server();
    let credentials = Credentials {
        api_key: Some("not-the-key".to_string()),
        ..Credentials::basic(mock_server::USERNAME, mock_server::PASSWORD)
    };
    let client = client(addr, credentials);
    assert_eq!(client.engines(None, None).unwrap().status, 200);
}

#[test]
fn rejected_credentials_are_authorization_required() {
    let addr = start_server();
    let client = client(addr, Credentials::api_key("wrong-key"));
    let err = client.engines(None, None).unwrap_err();
    assert!(matches!(err, ApiError::AuthorizationRequired));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(addr, Credentials::api_key(mock_server::API_KEY));
    let err = client.engines(None, None).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn responses_larger_than_ten_mebibytes_are_parsed() {
    let items = vec!["abcdefghij"; 900_000];
    let body = serde_json::to_vec(&items).unwrap();
    assert!(body.len() > 10 * 1024 * 1024);

    let addr = serve_once("200 OK", body);
    let client = client(addr, Credentials::api_key(mock_server::API_KEY));
    let response = client.engines(None, None).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body.unwrap().as_array().unwrap().len(), 900_000);
}

#[test]
fn non_utf8_error_page_keeps_its_status() {
    let addr = serve_once("500 Internal Server Error", b"<html>caf\xe9</html>".to_vec());
    let client = client(addr, Credentials::api_key(mock_server::API_KEY));
    match client.engines(None, None).unwrap_err() {
        ApiError::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "<html>caf\u{fffd}</html>");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_utf8_success_body_is_malformed() {
    let addr = serve_once("200 OK", b"[\"caf\xe9\"]".to_vec());
    let client = client(addr, Credentials::api_key(mock_server::API_KEY));
    let err = client.engines(None, None).unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
}
