//! Integration tests for the file client and fetch pipeline.
//!
//! These tests run real downloads against mock HTTP servers.

use font_cache_core::download::{DownloadError, FontFileClient, font_file_path};
use font_cache_core::{FetchPipeline, VariantCandidate, VariantUrl};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn font_response(content_type: &str, body: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", content_type)
        .set_body_bytes(body.to_vec())
}

fn variant(id: &str, subsets: &[&str], urls: Vec<VariantUrl>) -> VariantCandidate {
    VariantCandidate {
        id: id.to_string(),
        subsets: subsets.iter().map(ToString::to_string).collect(),
        urls,
    }
}

#[tokio::test]
async fn test_download_writes_body_to_destination() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roboto.woff2"))
        .respond_with(font_response("font/woff2", b"wOF2 body bytes"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let dest = temp_dir.path().join("roboto.woff2");
    let url = format!("{}/roboto.woff2", mock_server.uri());

    let written = FontFileClient::new()
        .download(&url, &dest, "woff2")
        .await
        .expect("download should succeed");

    assert_eq!(written, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), b"wOF2 body bytes");
}

#[tokio::test]
async fn test_download_overwrites_existing_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roboto.ttf"))
        .respond_with(font_response("font/ttf", b"fresh"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let dest = temp_dir.path().join("roboto.ttf");
    std::fs::write(&dest, b"stale content that is longer").unwrap();

    let url = format!("{}/roboto.ttf", mock_server.uri());
    FontFileClient::new()
        .download(&url, &dest, "ttf")
        .await
        .expect("download should succeed");

    assert_eq!(std::fs::read(&dest).unwrap(), b"fresh");
}

#[tokio::test]
async fn test_download_404_exhausts_every_attempt() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.woff2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(5)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let dest = temp_dir.path().join("missing.woff2");
    let url = format!("{}/missing.woff2", mock_server.uri());

    let error = FontFileClient::new()
        .download(&url, &dest, "woff2")
        .await
        .expect_err("404 should fail");

    assert_eq!(error.attempts(), Some(5));
    assert!(matches!(
        error.last_failure(),
        DownloadError::HttpStatus { status: 404, .. }
    ));
    assert!(!dest.exists(), "no file should be written for a 404");
}

#[tokio::test]
async fn test_download_rejects_octet_stream_for_woff2() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roboto.woff2"))
        .respond_with(font_response("application/octet-stream", b"not a font"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let dest = temp_dir.path().join("roboto.woff2");
    let url = format!("{}/roboto.woff2", mock_server.uri());

    let error = FontFileClient::new()
        .download(&url, &dest, "woff2")
        .await
        .expect_err("content type mismatch should fail");

    match error.last_failure() {
        DownloadError::ContentTypeMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, "woff2");
            assert_eq!(actual, "application/octet-stream");
        }
        other => panic!("expected content type mismatch, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_download_rejects_missing_content_type() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roboto.woff2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let dest = temp_dir.path().join("roboto.woff2");
    let url = format!("{}/roboto.woff2", mock_server.uri());

    let error = FontFileClient::new()
        .download(&url, &dest, "woff2")
        .await
        .expect_err("missing content type should fail");

    assert!(matches!(
        error.last_failure(),
        DownloadError::MissingContentType { .. }
    ));
}

#[tokio::test]
async fn test_pipeline_omits_failed_file_and_keeps_sibling() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regular.woff2"))
        .respond_with(font_response("font/woff2", b"woff2 bytes"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/regular.ttf"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let pipeline = FetchPipeline::new(FontFileClient::new(), temp_dir.path(), 4).unwrap();
    let variants = vec![variant(
        "regular",
        &["latin", "latin-ext"],
        vec![
            VariantUrl::new(format!("{}/regular.woff2", mock_server.uri()), "woff2"),
            VariantUrl::new(format!("{}/regular.ttf", mock_server.uri()), "ttf"),
        ],
    )];

    let report = pipeline.fetch_files("roboto", "v30", &variants).await;
    let (files, failures) = report.into_parts();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].variant, "regular");
    assert_eq!(files[0].format, "woff2");
    assert_eq!(
        files[0].path,
        font_file_path(
            temp_dir.path(),
            "roboto",
            "v30",
            &["latin", "latin-ext"],
            "regular",
            "woff2"
        )
    );
    assert_eq!(std::fs::read(&files[0].path).unwrap(), b"woff2 bytes");

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].format, "ttf");
    assert_eq!(failures[0].error.attempts(), Some(5));
}

#[tokio::test]
async fn test_pipeline_orders_files_by_variant_then_format() {
    let mock_server = MockServer::start().await;
    for (file, content_type) in [
        ("/bold.woff2", "font/woff2"),
        ("/bold.ttf", "font/ttf"),
        ("/regular.woff2", "font/woff2"),
        ("/regular.ttf", "font/ttf"),
    ] {
        Mock::given(method("GET"))
            .and(path(file))
            .respond_with(font_response(content_type, file.as_bytes()))
            .mount(&mock_server)
            .await;
    }

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let pipeline = FetchPipeline::new(FontFileClient::new(), temp_dir.path(), 2).unwrap();
    let base = mock_server.uri();
    let variants = vec![
        variant(
            "regular",
            &["latin"],
            vec![
                VariantUrl::new(format!("{base}/regular.woff2"), "woff2"),
                VariantUrl::new(format!("{base}/regular.ttf"), "ttf"),
            ],
        ),
        variant(
            "bold",
            &["latin"],
            vec![
                VariantUrl::new(format!("{base}/bold.woff2"), "woff2"),
                VariantUrl::new(format!("{base}/bold.ttf"), "ttf"),
            ],
        ),
    ];

    let files = pipeline
        .fetch_files("roboto", "v30", &variants)
        .await
        .into_files();

    let order: Vec<(&str, &str)> = files
        .iter()
        .map(|file| (file.variant.as_str(), file.format.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("bold", "ttf"),
            ("bold", "woff2"),
            ("regular", "ttf"),
            ("regular", "woff2"),
        ]
    );
}

#[tokio::test]
async fn test_pipeline_all_files_failing_yields_empty_files() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let client = FontFileClient::new()
        .with_retry_policy(font_cache_core::RetryPolicy::with_max_attempts(2));
    let pipeline = FetchPipeline::new(client, temp_dir.path(), 2).unwrap();
    let variants = vec![variant(
        "regular",
        &["latin"],
        vec![VariantUrl::new(format!("{}/regular.woff2", mock_server.uri()), "woff2")],
    )];

    let report = pipeline.fetch_files("roboto", "v30", &variants).await;

    assert!(report.all_failed());
    assert_eq!(report.files().count(), 0);
    assert_eq!(report.failures().count(), 1);
}
