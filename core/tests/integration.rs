//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `Client` with the
//! default `UreqTransport` over real HTTP. The `/echo` route reflects what
//! the server received, which lets the tests check URL, header and body
//! composition from the server's side.

use std::net::SocketAddr;
use std::sync::OnceLock;

use mock_server::Echo;
use restclient_core::{
    AuthorizationType, Client, ClientError, ContentType, Decode, DecodeError, Payload,
    ResponseType, TransportError, TransportErrorKind,
};
use serde_json::json;

/// Start one mock server for the whole test binary.
fn server() -> SocketAddr {
    static ADDR: OnceLock<SocketAddr> = OnceLock::new();
    *ADDR.get_or_init(|| {
        let _ = env_logger::builder().is_test(true).try_init();

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
    })
}

fn client() -> Client {
    let mut client = Client::new();
    client.set_base_url(&format!("http://{}", server()));
    client
}

fn payload(value: serde_json::Value) -> Payload {
    value.as_object().cloned().unwrap()
}

fn echoed(response: &restclient_core::ResponsePayload) -> Echo {
    serde_json::from_slice(response.body()).unwrap()
}

#[test]
fn get_sends_query_and_headers() {
    let mut client = client();
    client
        .set_endpoint("/echo")
        .add_header("X-Trace", "abc")
        .set_authorization(AuthorizationType::Bearer, "token");

    let response = client
        .get("/users", &payload(json!({"page": 2, "q": "a b"})))
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.content_type(), "application/json");

    let echo = echoed(&response);
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.path, "/echo/users");
    assert_eq!(echo.query.as_deref(), Some("page=2&q=a+b"));
    assert_eq!(echo.headers["x-trace"], "abc");
    assert_eq!(echo.headers["authorization"], "Bearer token");
    assert!(!echo.headers.contains_key("content-type"));
}

#[test]
fn post_put_patch_encode_bodies() {
    let mut client = client();
    let body = payload(json!({"a": 1, "b": "x"}));

    let response = client
        .post("/echo", &body, ContentType::Json, &Payload::new())
        .unwrap();
    let echo = echoed(&response);
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.body, r#"{"a":1,"b":"x"}"#);

    let response = client
        .put("/echo", &body, ContentType::FormEncoded, &Payload::new())
        .unwrap();
    let echo = echoed(&response);
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.headers["content-type"], "application/x-www-form-urlencoded");
    assert_eq!(echo.body, "a=1&b=x");

    let response = client
        .patch("/echo", &body, ContentType::Xml, &payload(json!({"v": 1})))
        .unwrap();
    let echo = echoed(&response);
    assert_eq!(echo.method, "PATCH");
    assert_eq!(echo.query.as_deref(), Some("v=1"));
    assert_eq!(echo.headers["content-type"], "application/xml");
    assert_eq!(
        echo.body,
        "<?xml version=\"1.0\"?>\n<root><a>1</a><b>x</b></root>\n"
    );
}

#[test]
fn delete_carries_no_content_type() {
    let mut client = client();
    client
        .post("/echo", &payload(json!({"a": 1})), ContentType::Json, &Payload::new())
        .unwrap();

    let response = client.delete("/echo/items/7", &Payload::new()).unwrap();
    let echo = echoed(&response);
    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.path, "/echo/items/7");
    assert!(!echo.headers.contains_key("content-type"));
}

#[test]
fn decodes_json_xml_and_text() {
    let mut client = client();

    let response = client.get("/json", &Payload::new()).unwrap();
    assert_eq!(response.content_type(), "application/json");
    let decoder = response.decode().unwrap();
    assert_eq!(decoder.as_object().unwrap(), json!({"x": 1, "items": ["a", "b"]}));
    assert_eq!(decoder.as_string().unwrap(), r#"{"x":1,"items":["a","b"]}"#);

    let response = client.get("/xml", &Payload::new()).unwrap();
    let map = response.decode().unwrap().as_map().unwrap();
    assert_eq!(map["user"]["name"], "Ann");
    assert_eq!(map["user"]["@attributes"]["id"], "7");

    let response = client.get("/html", &Payload::new()).unwrap();
    assert_eq!(response.content_type(), "text/html");
    let decoder = response.decode().unwrap();
    assert!(matches!(
        decoder.as_map(),
        Err(DecodeError::UnsupportedOperation { .. })
    ));
    assert_eq!(decoder.as_string().unwrap(), "<p>hello</p>");
}

#[test]
fn octet_stream_has_no_decoder() {
    let mut client = client();
    let response = client.get("/binary", &Payload::new()).unwrap();
    assert_eq!(&response.body()[..], &[0u8, 1, 2, 3]);
    assert!(matches!(
        response.decode(),
        Err(DecodeError::UnsupportedContentType(ct)) if ct == "application/octet-stream"
    ));
}

#[test]
fn forced_response_type_decodes_untyped_body() {
    let mut client = client();

    let response = client.get("/untyped", &Payload::new()).unwrap();
    assert_eq!(response.content_type(), "");
    assert!(response.decode().is_err());

    client.set_response_type(ResponseType::Json.mime());
    let response = client.get("/untyped", &Payload::new()).unwrap();
    assert_eq!(
        response.decode().unwrap().as_object().unwrap(),
        json!({"untyped": true})
    );
}

#[test]
fn response_headers_reset_between_calls() {
    let mut client = client();
    client.add_header("X-Persist", "yes");

    let first = client.get("/headers/first", &Payload::new()).unwrap();
    assert_eq!(first.header("x-first").unwrap(), "first");
    assert_eq!(first.headers().status_line(), Some("HTTP/1.1 200 OK"));

    let second = client.get("/headers/second", &Payload::new()).unwrap();
    assert_eq!(second.header("x-second").unwrap(), "second");
    assert!(matches!(
        second.header("x-first"),
        Err(ClientError::HeaderNotFound(_))
    ));
    assert_eq!(client.response_headers().get("x-first"), None);
    assert_eq!(client.header("X-Persist").unwrap(), "yes");
}

#[test]
fn error_statuses_are_data() {
    let mut client = client();
    let response = client.get("/status/404", &Payload::new()).unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.decode().unwrap().as_string().unwrap(), "404 Not Found");
}

#[test]
fn redirects_are_returned_not_followed() {
    let mut client = client();

    let response = client.get("/redirect", &Payload::new()).unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.header("location").unwrap(), "/text");
    assert_ne!(&response.body()[..], b"just text");

    let response = client
        .post("/redirect", &payload(json!({"a": 1})), ContentType::Json, &Payload::new())
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.header("location").unwrap(), "/text");
}

#[test]
fn bodies_over_ten_mebibytes_are_read_whole() {
    let mut client = client();
    let response = client.get("/large", &Payload::new()).unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body().len(), mock_server::LARGE_BODY_LEN);
    assert!(response.body().len() > 10 * 1024 * 1024);
    assert_eq!(
        response.decode().unwrap().as_string().unwrap().len(),
        mock_server::LARGE_BODY_LEN
    );
}

#[test]
fn request_timeout_is_a_transport_error() {
    let mut client = client();
    client.set_request_timeout(1);

    let err = client.get("/slow", &Payload::new()).unwrap_err();
    assert!(
        matches!(
            err,
            ClientError::Transport(TransportError { kind: TransportErrorKind::Timeout, .. })
        ),
        "{err}"
    );
}

#[test]
fn connection_refused_is_a_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut client = Client::new();
    client.set_base_url(&format!("http://{addr}")).set_connect_timeout(2);

    let err = client.get("/", &Payload::new()).unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err}");
}
