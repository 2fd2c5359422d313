//! HttpFetcher against a one-shot local HTTP server.

use pdftemplate_core::{
    base64_to_bytes, resolve_base_pdf, AssetError, BasePdf, Fetcher, HttpFetcher,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves a single response and returns the base URL.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: &'static [u8],
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            content_type,
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(body).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{}", addr)
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
}

#[tokio::test]
async fn fetched_pdf_becomes_data_uri() {
    let url = serve_once("200 OK", "application/pdf", b"%PDF-1.7 test").await;
    let fetcher = fetcher();

    let base = BasePdf::from(format!("{}/base.pdf", url));
    let resolved = resolve_base_pdf(&base, Some(&fetcher as &dyn Fetcher))
        .await
        .unwrap();

    let BasePdf::DataUri(uri) = resolved else {
        panic!("expected a data-URI");
    };
    assert!(uri.starts_with("data:application/pdf;base64,"));
    assert_eq!(base64_to_bytes(&uri).unwrap(), b"%PDF-1.7 test");
}

#[tokio::test]
async fn html_response_is_not_a_pdf() {
    let url = serve_once("200 OK", "text/html; charset=utf-8", b"<html></html>").await;
    let fetcher = fetcher();

    let err = resolve_base_pdf(&BasePdf::from(url), Some(&fetcher as &dyn Fetcher))
        .await
        .unwrap_err();
    assert!(matches!(err, AssetError::NotAPdf { ref media_type } if media_type == "text/html"));
}

#[tokio::test]
async fn error_status_is_a_fetch_failure() {
    let url = serve_once("404 Not Found", "text/plain", b"missing").await;
    let err = fetcher().fetch(&url).await.unwrap_err();
    assert!(matches!(err, AssetError::NetworkFetch { .. }));
}
