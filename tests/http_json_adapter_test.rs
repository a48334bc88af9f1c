use httpmock::prelude::*;
use serde_json::json;
use small_fdw::app::adapters::HttpJsonAdapter;
use small_fdw::backends::ReqwestFetcher;
use small_fdw::{
    Adapter, AdapterOptions, AdapterRegistry, ErrorCategory, ForeignScan, ForeignTableOptions,
    Lifecycle, Pull, Row,
};

fn forecast_options(url: String) -> AdapterOptions {
    AdapterOptions::new()
        .with("url", url)
        .with("fields", "deg,speed")
}

#[test]
fn test_forecast_list_is_projected_in_order() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/forecast");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "list": [
                    {"deg": 10, "speed": 3.2},
                    {"deg": 20, "speed": 1.1}
                ]
            }));
    });

    let fetcher = ReqwestFetcher::new().unwrap();
    let mut adapter =
        HttpJsonAdapter::fetch(&forecast_options(server.url("/forecast")), &fetcher).unwrap();

    assert_eq!(adapter.pull().unwrap(), Pull::Row(Row::new(["10", "3.2"])));
    assert_eq!(adapter.pull().unwrap(), Pull::Row(Row::new(["20", "1.1"])));
    assert_eq!(adapter.pull().unwrap(), Pull::EndOfData);
    assert_eq!(adapter.pull().unwrap(), Pull::EndOfData);
    assert_eq!(adapter.state(), Lifecycle::Exhausted);

    // Pulling never goes back to the network.
    api_mock.assert_hits(1);
}

#[test]
fn test_headers_and_query_are_forwarded() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/forecast")
            .header("X-Api-Key", "secret")
            .query_param("q", "Lyon")
            .query_param("units", "metric");
        then.status(200).json_body(json!({
            "list": [{"deg": 5, "speed": 0.4}]
        }));
    });

    let options = forecast_options(server.url("/forecast"))
        .with("header.X-Api-Key", "secret")
        .with("query.q", "Lyon")
        .with("query.units", "metric")
        .with("timeout_seconds", "5");

    let fetcher = ReqwestFetcher::new().unwrap();
    let mut adapter = HttpJsonAdapter::fetch(&options, &fetcher).unwrap();

    api_mock.assert();
    assert_eq!(adapter.pull().unwrap(), Pull::Row(Row::new(["5", "0.4"])));
}

#[test]
fn test_nested_fields_and_custom_list_field() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/obs");
        then.status(200).json_body(json!({
            "data": {
                "items": [
                    {"wind": {"deg": 270}, "station": "LYN", "note": null},
                    {"wind": {"deg": 90}, "station": "PAR", "note": "gusty"}
                ]
            }
        }));
    });

    let options = AdapterOptions::new()
        .with("url", server.url("/obs"))
        .with("list_field", "data.items")
        .with("fields", "station,wind.deg,note");

    let fetcher = ReqwestFetcher::new().unwrap();
    let mut adapter = HttpJsonAdapter::fetch(&options, &fetcher).unwrap();

    let names: Vec<&str> = adapter.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["station", "wind_deg", "note"]);

    assert_eq!(
        adapter.pull().unwrap(),
        Pull::Row(Row::new(["LYN", "270", ""]))
    );
    assert_eq!(
        adapter.pull().unwrap(),
        Pull::Row(Row::new(["PAR", "90", "gusty"]))
    );
    assert!(adapter.pull().unwrap().is_end());
}

#[test]
fn test_server_error_fails_construction() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/forecast");
        then.status(500).body("upstream exploded");
    });

    let fetcher = ReqwestFetcher::new().unwrap();
    let err = HttpJsonAdapter::fetch(&forecast_options(server.url("/forecast")), &fetcher)
        .err()
        .unwrap();

    assert_eq!(err.category(), ErrorCategory::Source);
    assert!(err.to_string().contains("500"));
}

#[test]
fn test_invalid_json_is_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/forecast");
        then.status(200).body("<html>maintenance</html>");
    });

    let fetcher = ReqwestFetcher::new().unwrap();
    let err = HttpJsonAdapter::fetch(&forecast_options(server.url("/forecast")), &fetcher)
        .err()
        .unwrap();
    assert_eq!(err.category(), ErrorCategory::Parse);
}

#[test]
fn test_missing_list_is_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/forecast");
        then.status(200).json_body(json!({"cod": "200", "cnt": 0}));
    });

    let fetcher = ReqwestFetcher::new().unwrap();
    let err = HttpJsonAdapter::fetch(&forecast_options(server.url("/forecast")), &fetcher)
        .err()
        .unwrap();
    assert_eq!(err.category(), ErrorCategory::Parse);
}

#[test]
fn test_unreachable_host_is_source_error() {
    let fetcher = ReqwestFetcher::new().unwrap();
    // Port 9 (discard) is not expected to be listening locally.
    let err = HttpJsonAdapter::fetch(
        &forecast_options("http://127.0.0.1:9/forecast".to_string()),
        &fetcher,
    )
    .err()
    .unwrap();
    assert_eq!(err.category(), ErrorCategory::Source);
}

#[test]
fn test_malformed_record_is_reported_and_skipped() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/forecast");
        then.status(200).json_body(json!({
            "list": [
                {"deg": 10, "speed": 3.2},
                {"deg": 15},
                "garbage",
                {"deg": 20, "speed": 1.1}
            ]
        }));
    });

    let fetcher = ReqwestFetcher::new().unwrap();
    let mut adapter =
        HttpJsonAdapter::fetch(&forecast_options(server.url("/forecast")), &fetcher).unwrap();

    assert!(adapter.pull().is_ok());
    assert_eq!(adapter.pull().unwrap_err().category(), ErrorCategory::Parse);
    assert_eq!(adapter.pull().unwrap_err().category(), ErrorCategory::Parse);
    assert_eq!(adapter.pull().unwrap(), Pull::Row(Row::new(["20", "1.1"])));
    assert!(adapter.pull().unwrap().is_end());
}

#[test]
fn test_pages_are_followed_up_to_max_pages() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET).path("/forecast").query_param("q", "Lyon");
        then.status(200).json_body(json!({
            "list": [{"deg": 1, "speed": 1.0}],
            "next": server.url("/forecast/2")
        }));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path("/forecast/2");
        then.status(200).json_body(json!({
            "list": [{"deg": 2, "speed": 2.5}],
            "next": server.url("/forecast/3")
        }));
    });
    let third = server.mock(|when, then| {
        when.method(GET).path("/forecast/3");
        then.status(200).json_body(json!({
            "list": [{"deg": 3, "speed": 3.5}],
            "next": null
        }));
    });

    let options = forecast_options(server.url("/forecast"))
        .with("query.q", "Lyon")
        .with("next_field", "next")
        .with("max_pages", "2");

    let fetcher = ReqwestFetcher::new().unwrap();
    let mut adapter = HttpJsonAdapter::fetch(&options, &fetcher).unwrap();

    first.assert_hits(1);
    second.assert_hits(1);
    third.assert_hits(0);

    let mut rows = Vec::new();
    while let Pull::Row(row) = adapter.pull().unwrap() {
        rows.push(row);
    }
    assert_eq!(rows, vec![Row::new(["1", "1.0"]), Row::new(["2", "2.5"])]);
}

#[test]
fn test_scan_through_registry() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/forecast");
        then.status(200).json_body(json!({
            "list": [
                {"deg": 10, "speed": 3.2},
                {"deg": 20, "speed": 1.1}
            ]
        }));
    });

    let registry = AdapterRegistry::with_builtins();
    let table = ForeignTableOptions::from_options(
        forecast_options(server.url("/forecast")).with("wrapper_class", "HttpJson"),
    )
    .unwrap();

    let mut scan = ForeignScan::begin(&registry, &table).unwrap();
    assert_eq!(scan.class_name(), "HttpJson");
    let rows: Vec<Row> = scan.by_ref().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(scan.rows_emitted(), 2);

    let summary = scan.finish().unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.pulls, 3);
}

#[test]
fn test_missing_url_fails_before_any_request() {
    let registry = AdapterRegistry::with_builtins();
    let table = ForeignTableOptions::from_options(
        AdapterOptions::new()
            .with("wrapper_class", "HttpJson")
            .with("fields", "deg"),
    )
    .unwrap();

    let err = ForeignScan::begin(&registry, &table).err().unwrap();
    assert_eq!(err.phase, small_fdw::ScanPhase::Construct);
    assert!(err.error.is_config());
}
