//! Integration tests for the checker
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full check cycle end-to-end through the real HTTP fetcher.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use weaver::checker::{Fetch, HttpFetcher};
use weaver::config::{CheckerConfig, Config, ExceptionRule};
use weaver::{Checker, LinkResult, LinkStatus, RunOutcome};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration fast enough for local servers
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.checker.max_rate = 100.0;
    config
}

fn create_checker(config: &Config) -> Checker {
    let mut checker = Checker::new(config).expect("Failed to build checker");
    checker.set_output(std::io::sink());
    checker
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

fn rows(results: &[LinkResult]) -> Vec<(String, LinkStatus, String)> {
    results
        .iter()
        .map(|r| (r.link.clone(), r.status, r.referrer.clone()))
        .collect()
}

fn row(link: &str, status: LinkStatus, referrer: &str) -> (String, LinkStatus, String) {
    (link.to_string(), status, referrer.to_string())
}

/// Collects output lines for assertions
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Starts a TLS server presenting a self-signed certificate
async fn start_self_signed_server() -> SocketAddr {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .expect("Failed to generate certificate");
    let chain = vec![rustls::Certificate(
        cert.serialize_der().expect("Failed to serialize certificate"),
    )];
    let key = rustls::PrivateKey(cert.serialize_private_key_der());

    let tls = rustls::ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(chain, key)
        .expect("Failed to build TLS config");
    let acceptor = tokio_rustls::TlsAcceptor::from(Arc::new(tls));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // The client aborts the handshake
                let _ = acceptor.accept(stream).await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn test_ok_and_missing_children() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/ok">ok</a> <a href="/bogus">bogus</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/ok", "<html><body>fine</body></html>").await;

    let mut checker = create_checker(&create_test_config());
    let outcome = checker
        .check(&format!("{}/", base), &CancellationToken::new())
        .await;

    assert_eq!(outcome, RunOutcome::Completed);
    let seed = format!("{}/", base);
    assert_eq!(
        rows(checker.results()),
        vec![
            row(&seed, LinkStatus::Ok, "START"),
            row(&format!("{}/ok", base), LinkStatus::Ok, &seed),
            row(&format!("{}/bogus", base), LinkStatus::Error, &seed),
        ]
    );
    assert_eq!(checker.results()[0].message, "200 OK");
    assert_eq!(checker.results()[2].message, "404 Not Found");
}

#[tokio::test]
async fn test_seed_without_path_is_normalized() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>home</p>").await;

    let mut checker = create_checker(&create_test_config());
    checker.check(&server.uri(), &CancellationToken::new()).await;

    assert_eq!(checker.results().len(), 1);
    assert_eq!(checker.results()[0].link, format!("{}/", server.uri()));
    assert_eq!(checker.base_url().map(|u| u.path()), Some("/"));
}

#[tokio::test]
async fn test_cyclic_links_fetched_once() {
    let server = MockServer::start().await;

    // Every mock expects exactly one request; verified when the server drops
    mount_page(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
    mount_page(
        &server,
        "/a",
        r#"<a href="/">home</a><a href="/b">b</a><a href="/a#top">self</a>"#,
    )
    .await;
    mount_page(&server, "/b", r#"<a href="/a">a</a><a href="b">relative self</a>"#).await;

    let mut checker = create_checker(&create_test_config());
    checker
        .check(&format!("{}/", server.uri()), &CancellationToken::new())
        .await;

    assert_eq!(checker.results().len(), 3);
    assert_eq!(checker.visited_count(), 3);
    assert!(checker.results().iter().all(|r| r.status == LinkStatus::Ok));
}

#[tokio::test]
async fn test_offsite_links_checked_but_not_crawled() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;

    mount_page(
        &site,
        "/",
        &format!(r#"<a href="{}/landing">elsewhere</a>"#, other.uri()),
    )
    .await;
    mount_page(&other, "/landing", r#"<a href="/deeper">deeper</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html(""))
        .expect(0)
        .mount(&other)
        .await;

    let mut checker = create_checker(&create_test_config());
    checker
        .check(&format!("{}/", site.uri()), &CancellationToken::new())
        .await;

    assert_eq!(checker.results().len(), 2);
    assert_eq!(
        checker.results()[1].link,
        format!("{}/landing", other.uri())
    );
    assert_eq!(checker.results()[1].status, LinkStatus::Ok);
}

#[tokio::test]
async fn test_mailto_and_fragments_ignored() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r##"<a href="mailto:webmaster@example.com">mail</a>
            <a href="#section">jump</a>
            <a href="javascript:void(0)">js</a>
            <a href="/contact">contact</a>"##,
    )
    .await;
    mount_page(&server, "/contact", "").await;

    let mut checker = create_checker(&create_test_config());
    checker
        .check(&format!("{}/", server.uri()), &CancellationToken::new())
        .await;

    let links: Vec<_> = checker.results().iter().map(|r| r.link.as_str()).collect();
    assert_eq!(
        links,
        vec![
            format!("{}/", server.uri()),
            format!("{}/contact", server.uri())
        ]
    );
}

#[tokio::test]
async fn test_unsupported_scheme_link_is_error() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="httq://invalid_scheme.html">typo</a>"#).await;

    let mut checker = create_checker(&create_test_config());
    let seed = format!("{}/", server.uri());
    checker.check(&seed, &CancellationToken::new()).await;

    assert_eq!(checker.results().len(), 2);
    let result = &checker.results()[1];
    assert_eq!(result.link, "httq://invalid_scheme.html");
    assert_eq!(result.status, LinkStatus::Error);
    assert_eq!(result.referrer, seed);
    assert_eq!(
        result.message,
        "Get \"httq://invalid_scheme.html\": unsupported protocol scheme \"httq\""
    );
}

#[tokio::test]
async fn test_unparseable_link_is_error_and_siblings_continue() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="http:// /">broken</a><a href="/next">next</a>"#,
    )
    .await;
    mount_page(&server, "/next", "").await;

    let mut checker = create_checker(&create_test_config());
    let seed = format!("{}/", server.uri());
    checker.check(&seed, &CancellationToken::new()).await;

    assert_eq!(
        rows(checker.results()),
        vec![
            row(&seed, LinkStatus::Ok, "START"),
            row("http:// /", LinkStatus::Error, &seed),
            row(&format!("{}/next", server.uri()), LinkStatus::Ok, &seed),
        ]
    );
}

#[tokio::test]
async fn test_redirect_is_followed_and_recorded_under_requested_url() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/old">old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/new", r#"<a href="/from-new">child</a>"#).await;
    mount_page(&server, "/from-new", "").await;

    let mut checker = create_checker(&create_test_config());
    let seed = format!("{}/", server.uri());
    checker.check(&seed, &CancellationToken::new()).await;

    let old = format!("{}/old", server.uri());
    assert_eq!(checker.results()[1].link, old);
    assert_eq!(checker.results()[1].status, LinkStatus::Ok);
    assert_eq!(
        checker.results()[2].link,
        format!("{}/from-new", server.uri())
    );
    assert_eq!(checker.results()[2].referrer, old);
}

#[tokio::test]
async fn test_non_html_response_not_parsed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/report.pdf">report</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(br#"<a href="/hidden">x</a>"#.to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let mut checker = create_checker(&create_test_config());
    checker
        .check(&format!("{}/", server.uri()), &CancellationToken::new())
        .await;

    assert_eq!(checker.results().len(), 2);
}

#[tokio::test]
async fn test_throttled_request_retried_at_half_rate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", "<p>ok</p>").await;

    let mut checker = create_checker(&create_test_config());
    checker
        .check(&format!("{}/", server.uri()), &CancellationToken::new())
        .await;

    assert_eq!(checker.results().len(), 1);
    assert_eq!(checker.results()[0].status, LinkStatus::Ok);
    assert_eq!(checker.rate_limit(), 50.0);
}

#[tokio::test]
async fn test_rate_ramps_back_after_cooldown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", "<p>ok</p>").await;

    let mut config = create_test_config();
    config.checker.cooldown_secs = 0;
    let mut checker = create_checker(&config);
    checker
        .check(&format!("{}/", server.uri()), &CancellationToken::new())
        .await;

    // Halved to 50, then one ramp step of x1.5
    assert_eq!(checker.rate_limit(), 75.0);
}

#[tokio::test]
async fn test_throttle_retries_give_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.checker.max_throttle_retries = 2;
    let mut checker = create_checker(&config);
    checker
        .check(&format!("{}/", server.uri()), &CancellationToken::new())
        .await;

    assert_eq!(checker.results().len(), 1);
    assert_eq!(checker.results()[0].status, LinkStatus::Warning);
    assert_eq!(
        checker.results()[0].message,
        "429 Too Many Requests (gave up after 2 retries)"
    );
}

#[tokio::test]
async fn test_exception_rule_skips_known_host() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/members">members</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config
        .exceptions
        .push(ExceptionRule::new(&["127.0.0.1"], &[403], "Members only"));
    let output = SharedBuffer::default();
    let mut checker = create_checker(&config);
    checker.set_output(output.clone());
    checker
        .check(&format!("{}/", server.uri()), &CancellationToken::new())
        .await;

    assert_eq!(checker.results()[1].status, LinkStatus::Skipped);
    assert_eq!(checker.results()[1].message, "Members only");

    // Skipped links are only echoed in verbose mode
    assert_eq!(output.contents(), "");
}

#[tokio::test]
async fn test_cancelled_run_fetches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut checker = create_checker(&create_test_config());
    let outcome = checker.check(&format!("{}/", server.uri()), &cancel).await;

    assert_eq!(outcome, RunOutcome::Cancelled);
    assert!(checker.results().is_empty());
}

#[tokio::test]
async fn test_reduce_rate_limit() {
    let mut checker = create_checker(&create_test_config());
    checker.set_rate_limit(4.0);
    assert_eq!(checker.reduce_rate_limit(), 2.0);
    assert_eq!(checker.rate_limit(), 2.0);
}

#[tokio::test]
async fn test_output_lines() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/missing">m</a><a href="/fine">f</a>"#).await;
    mount_page(&server, "/fine", "").await;

    let seed = format!("{}/", server.uri());

    let quiet = SharedBuffer::default();
    let mut checker = create_checker(&create_test_config());
    checker.set_output(quiet.clone());
    checker.check(&seed, &CancellationToken::new()).await;

    assert_eq!(
        quiet.contents(),
        format!(
            "[ERROR] 404 Not Found {}/missing (referrer: {})\n",
            server.uri(),
            seed
        )
    );

    // A second server so the expect(1) mocks stay satisfied
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/fine">f</a>"#).await;
    mount_page(&server, "/fine", "").await;
    let seed = format!("{}/", server.uri());

    let verbose = SharedBuffer::default();
    let mut checker = create_checker(&create_test_config());
    checker.set_output(verbose.clone());
    checker.set_verbose(true);
    checker.check(&seed, &CancellationToken::new()).await;

    let contents = verbose.contents();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("[OK] 200 OK {} (referrer: START)", seed),
            format!("[OK] 200 OK {}/fine (referrer: {})", server.uri(), seed),
        ]
    );
}

#[tokio::test]
async fn test_self_signed_certificate_is_certificate_error() {
    let addr = start_self_signed_server().await;
    let fetcher = HttpFetcher::from_config(&CheckerConfig::default()).expect("Failed to build");
    let url = url::Url::parse(&format!("https://{}/", addr)).unwrap();

    let error = fetcher
        .fetch(&url)
        .await
        .expect_err("Self-signed certificate was accepted");

    assert!(error.is_certificate(), "unexpected error: {:?}", error);
}

#[tokio::test]
async fn test_self_signed_seed_is_single_warning() {
    let addr = start_self_signed_server().await;
    let seed = format!("https://{}/", addr);

    let mut checker = create_checker(&create_test_config());
    let outcome = checker.check(&seed, &CancellationToken::new()).await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(
        rows(checker.results()),
        vec![row(&seed, LinkStatus::Warning, "START")]
    );
}
