// tests/oba_client.rs

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tripwatch::arrivals::{ArrivalSource, ObaArrivalSource};
use tripwatch::config::ArrivalsSection;
use tripwatch::errors::TripwatchError;
use tripwatch_test_utils::{init_tracing, with_timeout};

/// Serve one canned HTTP response and hand back the request line.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.expect("read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (base_url, handle)
}

fn source_for(base_url: String) -> ObaArrivalSource {
    ObaArrivalSource::new(&ArrivalsSection {
        base_url,
        api_key: "KEY".to_string(),
        timeout_secs: 5,
    })
    .expect("valid arrivals config")
}

#[tokio::test]
async fn decodes_arrivals_for_a_stop() {
    init_tracing();

    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"code":200,"text":"OK","data":{"entry":{"arrivalsAndDepartures":[
            {"tripId":"1_100","predictedArrivalTime":1717400880000,"scheduledArrivalTime":1717400820000,"routeShortName":"44"},
            {"tripId":"1_200","predictedArrivalTime":0,"scheduledArrivalTime":1717401000000,"routeShortName":""}
        ]}}}"#,
    )
    .await;
    let source = source_for(base_url);

    let arrivals = with_timeout(Duration::from_secs(10), source.query("1_75403"))
        .await
        .expect("query succeeds");

    assert_eq!(arrivals.len(), 2);
    assert_eq!(arrivals[0].trip_id, "1_100");
    assert_eq!(arrivals[0].best_arrival_ms(), 1_717_400_880_000);
    assert_eq!(arrivals[0].route_short_name.as_deref(), Some("44"));
    assert_eq!(arrivals[1].best_arrival_ms(), 1_717_401_000_000);
    assert_eq!(arrivals[1].route_short_name, None);

    let request_line = server.await.expect("server task");
    assert!(
        request_line
            .starts_with("GET /api/where/arrivals-and-departures-for-stop/1_75403.json?key=KEY "),
        "unexpected request: {request_line}"
    );
}

#[tokio::test]
async fn missing_data_section_is_an_empty_list() {
    let (base_url, server) = serve_once("200 OK", r#"{"code":200,"text":"OK"}"#).await;
    let source = source_for(base_url);

    let arrivals = source.query("stop").await.expect("query succeeds");

    assert!(arrivals.is_empty());
    server.await.expect("server task");
}

#[tokio::test]
async fn non_ok_body_code_is_an_error() {
    let (base_url, server) =
        serve_once("200 OK", r#"{"code":401,"text":"permission denied"}"#).await;
    let source = source_for(base_url);

    let err = source.query("stop").await.expect_err("code 401 must fail");

    assert!(matches!(err, TripwatchError::ArrivalsError(_)), "unexpected error: {err}");
    assert!(err.to_string().contains("permission denied"));
    server.await.expect("server task");
}

#[tokio::test]
async fn http_error_status_is_an_error() {
    let (base_url, server) = serve_once("503 Service Unavailable", "{}").await;
    let source = source_for(base_url);

    let err = source.query("stop").await.expect_err("503 must fail");

    assert!(matches!(err, TripwatchError::ArrivalsError(_)), "unexpected error: {err}");
    server.await.expect("server task");
}

#[test]
fn base_url_must_parse() {
    let err = ObaArrivalSource::new(&ArrivalsSection {
        base_url: "not a url".to_string(),
        api_key: "KEY".to_string(),
        timeout_secs: 5,
    })
    .expect_err("invalid base url");

    assert!(matches!(err, TripwatchError::ConfigError(_)));
}
