//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog (maker list, paginated
//! product listings, detail pages) and run the full crawl against it.

use catalog_sweep::config::{load_config, Config};
use catalog_sweep::crawler::{run_crawl, Traverser};
use catalog_sweep::SweepError;
use std::fs;
use std::io::Write;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = format!("{}/", base_url);
    config.crawler.max_connections = 3;
    config.crawler.max_attempts = 2;
    config.crawler.retry_delay_ms = 10; // Very short for testing
    config.crawler.timeout_ms = 5_000;
    config.output.directory = output_dir.to_path_buf();
    config
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_response(body))
        .mount(server)
        .await;
}

/// Builds a detail page; consecutive rows of one section share a table
fn detail_page(title: &str, rows: &[(&str, &str, &str)]) -> String {
    let mut html = format!(
        r#"<html><body><h1 class="specs-phone-name-title">{}</h1><div id="specs-list">"#,
        title
    );
    let mut current: Option<&str> = None;
    for (section, label, value) in rows {
        let header = if current != Some(*section) {
            if current.is_some() {
                html.push_str("</table>");
            }
            html.push_str("<table>");
            current = Some(*section);
            format!("<th>{}</th>", section)
        } else {
            String::new()
        };
        html.push_str(&format!(
            r#"<tr>{}<td class="ttl">{}</td><td class="nfo">{}</td></tr>"#,
            header, label, value
        ));
    }
    if current.is_some() {
        html.push_str("</table>");
    }
    html.push_str("</div></body></html>");
    html
}

/// Mounts a catalog with two makers:
///
/// - Acme: a two-page listing with products p1, p2 (page 1) and p3 (page 2)
/// - Zeta: an empty listing
///
/// The three detail pages share some attribute names and not others, giving
/// four distinct attribute columns.
async fn mount_catalog(server: &MockServer) {
    mount_page(
        server,
        "/makers.php3",
        r#"<html><body><div class="st-text"><table><tr>
            <td><a href="acme-phones-1.php">Acme<br><span>3 devices</span></a></td>
            <td><a href="zeta-phones-9.php">Zeta<br><span>0 devices</span></a></td>
        </tr></table></div></body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/acme-phones-1.php",
        r#"<html><body>
            <div class="makers"><ul>
                <li><a href="acme_p1-1.php"><img src="p1.jpg"><strong><span>Acme P1</span></strong></a></li>
                <li><a href="acme_p2-2.php"><img src="p2.jpg"><strong><span>Acme P2</span></strong></a></li>
            </ul></div>
            <div class="nav-pages"><strong>1</strong><a href="acme-phones-f-1-0-p2.php">2</a></div>
        </body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/acme-phones-f-1-0-p2.php",
        r#"<html><body>
            <div class="makers"><ul>
                <li><a href="acme_p3-3.php"><strong><span>Acme P3</span></strong></a></li>
            </ul></div>
            <div class="nav-pages"><a href="acme-phones-1.php">1</a><strong>2</strong></div>
        </body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/zeta-phones-9.php",
        r#"<html><body><div class="makers"><ul></ul></div></body></html>"#.to_string(),
    )
    .await;

    mount_page(
        server,
        "/acme_p1-1.php",
        detail_page(
            "Acme P1",
            &[
                ("Network", "Technology", "GSM / LTE"),
                ("Body", "Weight", "150 g"),
            ],
        ),
    )
    .await;

    mount_page(
        server,
        "/acme_p3-3.php",
        detail_page(
            "Acme P3",
            &[
                ("Network", "Technology", "GSM"),
                ("Misc", "&nbsp;", "Black, White"),
            ],
        ),
    )
    .await;
}

async fn mount_p2(server: &MockServer) {
    mount_page(
        server,
        "/acme_p2-2.php",
        detail_page(
            "Acme P2",
            &[
                ("Body", "Weight", "170 g"),
                ("Body", "Dimensions", "150 x 70 x 8 mm"),
            ],
        ),
    )
    .await;
}

fn row_by_title<'a>(rows: &'a [Vec<String>], title: &str) -> &'a [String] {
    rows.iter()
        .find(|row| row[0] == title)
        .unwrap_or_else(|| panic!("no row titled {}", title))
}

#[tokio::test]
async fn test_full_crawl_merges_schemas() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    mount_p2(&mock_server).await;

    let out = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), out.path());

    let report = Traverser::new(&config)
        .expect("Failed to create traverser")
        .run()
        .await
        .expect("Crawl failed");

    let table = &report.table;
    assert_eq!(table.len(), 3);
    assert_eq!(table.header[0], "Brand and Model");
    // 4 distinct attribute names plus the title column
    assert_eq!(table.width(), 5);
    for name in ["Network - Technology", "Body - Weight", "Body - Dimensions", "Misc"] {
        assert!(table.column(name).is_some(), "missing column {}", name);
    }

    let mut unique = table.header.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), table.header.len());

    for row in &table.rows {
        assert_eq!(row.len(), table.width());
    }

    let weight = table.column("Body - Weight").unwrap();
    let dimensions = table.column("Body - Dimensions").unwrap();
    let misc = table.column("Misc").unwrap();

    let p1 = row_by_title(&table.rows, "Acme P1");
    assert_eq!(p1[weight], "150 g");
    assert_eq!(p1[dimensions], "");

    let p2 = row_by_title(&table.rows, "Acme P2");
    assert_eq!(p2[dimensions], "150 x 70 x 8 mm");

    let p3 = row_by_title(&table.rows, "Acme P3");
    assert_eq!(p3[misc], "Black, White");
    assert_eq!(p3[weight], "");

    assert_eq!(report.maker_urls.len(), 2);
    assert_eq!(report.product_urls.len(), 3);
    assert_eq!(report.stats.listings_fetched, 3);
    assert_eq!(report.stats.rows_extracted, 3);
    assert_eq!(report.stats.failed, 0);
}

#[tokio::test]
async fn test_run_crawl_writes_export() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    mount_p2(&mock_server).await;

    let out = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), out.path());
    config.output.separator = "\t".to_string();
    config.output.prefix = "acme".to_string();

    let summary = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.columns, 5);
    assert!(summary.maker_list_path.is_none());
    assert!(summary.product_list_path.is_none());

    let file_name = summary
        .export_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    assert!(file_name.starts_with("acme "));
    assert!(file_name.ends_with(".tsv"));

    let content = fs::read_to_string(&summary.export_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Brand and Model\t"));
    assert!(lines.iter().all(|line| line.split('\t').count() == 5));
    // only the export in the directory
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_brand_filter_regex_and_literal() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    mount_p2(&mock_server).await;
    let out = tempfile::tempdir().unwrap();

    for brand in ["/^acme$/i", "ACM"] {
        let mut config = create_test_config(&mock_server.uri(), out.path());
        config.filter.brand = brand.to_string();

        let report = Traverser::new(&config).unwrap().run().await.unwrap();

        assert_eq!(report.maker_urls.len(), 1, "filter {}", brand);
        assert!(report.maker_urls[0].path().ends_with("/acme-phones-1.php"));
        assert_eq!(report.table.len(), 3);
    }

    // case-sensitive pattern without the i flag
    let mut config = create_test_config(&mock_server.uri(), out.path());
    config.filter.brand = "/^acme$/".to_string();
    let report = Traverser::new(&config).unwrap().run().await.unwrap();
    assert!(report.maker_urls.is_empty());
    assert!(report.table.is_empty());
}

#[tokio::test]
async fn test_model_filter() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    mount_p2(&mock_server).await;
    let out = tempfile::tempdir().unwrap();

    let mut config = create_test_config(&mock_server.uri(), out.path());
    config.filter.model = "/P[13]$/".to_string();

    let report = Traverser::new(&config).unwrap().run().await.unwrap();

    assert_eq!(report.product_urls.len(), 2);
    let mut titles: Vec<&str> = report.table.rows.iter().map(|r| r[0].as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Acme P1", "Acme P3"]);
    // P2's columns never registered
    assert!(report.table.column("Body - Dimensions").is_none());
}

#[tokio::test]
async fn test_best_effort_skips_failed_page() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    // Every attempt fails
    Mock::given(method("GET"))
        .and(path("/acme_p2-2.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), out.path());

    let summary = run_crawl(config).await.expect("Best-effort crawl should succeed");

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.stats.failed, 1);
    assert!(summary.export_path.exists());
}

#[tokio::test]
async fn test_fail_fast_aborts_without_export() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/acme_p2-2.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), out.path());
    config.crawler.fail_fast = true;
    config.output.dump_lists = true;

    let result = run_crawl(config).await;

    match result {
        Err(SweepError::Aborted { url, .. }) => assert!(url.ends_with("/acme_p2-2.php")),
        other => panic!("Expected an aborted crawl, got {:?}", other),
    }
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_dump_lists() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    mount_p2(&mock_server).await;

    let out = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), out.path());
    config.output.dump_lists = true;

    let summary = run_crawl(config).await.unwrap();

    let makers_path = summary.maker_list_path.expect("maker list written");
    let products_path = summary.product_list_path.expect("product list written");

    let makers = fs::read_to_string(&makers_path).unwrap();
    let mut maker_lines: Vec<&str> = makers.lines().collect();
    maker_lines.sort();
    assert_eq!(maker_lines.len(), 2);
    assert!(maker_lines[0].ends_with("/acme-phones-1.php"));
    assert!(maker_lines[1].ends_with("/zeta-phones-9.php"));

    let products = fs::read_to_string(&products_path).unwrap();
    assert_eq!(products.lines().count(), 3);
    assert!(makers_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("makers "));
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    mount_p2(&mock_server).await;

    let out = tempfile::tempdir().unwrap();
    let config_content = format!(
        r#"
[crawler]
max-connections = 2
max-attempts = 1
retry-delay-ms = 0

[filter]
model = "p1"

[output]
directory = {:?}
separator = ";"
prefix = "from-file"

[site]
base-url = "{}/"
"#,
        out.path().to_str().unwrap(),
        mock_server.uri()
    );

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).expect("Failed to load config");
    let summary = run_crawl(config).await.unwrap();

    assert_eq!(summary.rows, 1);
    assert!(summary
        .export_path
        .to_string_lossy()
        .ends_with(".txt"));

    let content = fs::read_to_string(&summary.export_path).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().starts_with("Brand and Model;"));
    assert!(lines.next().unwrap().starts_with("Acme P1;"));
}
