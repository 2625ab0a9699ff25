//! Loading map versions against a mock listing endpoint.

#![cfg(not(target_arch = "wasm32"))]

use std::time::Duration;

use chrono::Utc;
use mapconsole_business::BusinessConfig;
use mapconsole_business::maps::{
    Field, ListParams, MapListCompute, MapStatus, NotificationLevel, VersionTable, cancel_load,
    load_maps, register_maps, reload_maps, sync_maps,
};
use mapconsole_states::StateCtx;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAPS_PATH: &str = "/management/maps";

async fn setup() -> (MockServer, StateCtx) {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;
    let mut ctx = StateCtx::new();
    register_maps(&mut ctx, BusinessConfig::new(server.uri()));
    (server, ctx)
}

/// Pump updates the way the UI does each frame until the table stops loading.
async fn settle(ctx: &mut StateCtx) {
    for _ in 0..200 {
        ctx.sync_updates();
        sync_maps(ctx, Utc::now());
        if !ctx.state::<VersionTable>().is_loading() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("load did not finish");
}

fn keys(ctx: &StateCtx) -> Vec<String> {
    ctx.state::<VersionTable>()
        .rows()
        .iter()
        .map(|row| row.map_version_id.clone())
        .collect()
}

#[tokio::test]
async fn test_load_shows_row_with_status_label() {
    let (server, mut ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path(MAPS_PATH))
        .and(query_param("page", "1"))
        .and(query_param("results", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"mapVersionId": "v1", "mapFileName": "a.map", "mapStatus": 0}],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    load_maps(&mut ctx, ListParams::default());
    assert!(ctx.state::<VersionTable>().is_loading());
    settle(&mut ctx).await;

    let table = ctx.state::<VersionTable>();
    assert_eq!(table.rows().len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.map_file_name.as_deref(), Some("a.map"));
    assert_eq!(row.map_status, Some(MapStatus::Online));
    assert_eq!(row.map_status.map(MapStatus::label), Some("已上线"));
    assert_eq!(table.pagination().total, 1);
}

#[tokio::test]
async fn test_query_uses_wire_names() {
    let (server, mut ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path(MAPS_PATH))
        .and(query_param("page", "3"))
        .and(query_param("results", "20"))
        .and(query_param("sortField", "createdAt"))
        .and(query_param("sortOrder", "ascend"))
        .and(query_param("mapStatus", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"mapVersionId": 7, "mapFilePath": "/m", "mapFileName": "seven.map"}],
            "totalCount": 41
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = ListParams::new(20)
        .with_filter("mapStatus", Some("2".to_string()))
        .with_page(3)
        .toggle_sort(Field::CreatedAt);
    load_maps(&mut ctx, params);
    settle(&mut ctx).await;

    assert_eq!(keys(&ctx), vec!["7"]);
    let pagination = ctx.state::<VersionTable>().pagination();
    assert_eq!(pagination.current, 3);
    assert_eq!(pagination.total, 41);
    assert_eq!(pagination.page_count(), 3);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_rows() {
    let (server, mut ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path(MAPS_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"mapVersionId": "v1"}, {"mapVersionId": "v2"}],
            "total": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(MAPS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    load_maps(&mut ctx, ListParams::default());
    settle(&mut ctx).await;
    load_maps(&mut ctx, ListParams::default().with_page(2));
    settle(&mut ctx).await;

    assert_eq!(keys(&ctx), vec!["v1", "v2"]);
    let table = ctx.state::<VersionTable>();
    assert_eq!(table.notifications().len(), 1);
    assert_eq!(table.notifications()[0].level, NotificationLevel::Error);
    assert!(table.notifications()[0].message.contains("500"));
    assert!(ctx.state::<MapListCompute>().error_message().is_some());
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let (server, mut ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path(MAPS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    load_maps(&mut ctx, ListParams::default());
    settle(&mut ctx).await;

    let table = ctx.state::<VersionTable>();
    assert!(table.rows().is_empty());
    assert!(table.notifications()[0].message.contains("unexpected response body"));
}

#[tokio::test]
async fn test_superseded_load_never_reaches_table() {
    let (server, mut ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path(MAPS_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!({"data": [{"mapVersionId": "slow"}], "total": 1})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(MAPS_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"mapVersionId": "fast"}], "total": 11})),
        )
        .mount(&server)
        .await;

    let first = load_maps(&mut ctx, ListParams::default());
    load_maps(&mut ctx, ListParams::default().with_page(2));
    assert!(first.is_cancelled());
    settle(&mut ctx).await;

    tokio::time::sleep(Duration::from_millis(400)).await;
    ctx.sync_updates();
    sync_maps(&mut ctx, Utc::now());

    assert_eq!(keys(&ctx), vec!["fast"]);
    assert_eq!(ctx.state::<VersionTable>().pagination().current, 2);
}

#[tokio::test]
async fn test_reload_repeats_last_params_and_cancel_stops_spinner() {
    let (server, mut ctx) = setup().await;
    Mock::given(method("GET"))
        .and(path(MAPS_PATH))
        .and(query_param("page", "4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({"data": [{"mapVersionId": "v40"}], "total": 40})),
        )
        .mount(&server)
        .await;

    load_maps(&mut ctx, ListParams::default().with_page(4));
    settle(&mut ctx).await;
    assert_eq!(keys(&ctx), vec!["v40"]);

    reload_maps(&mut ctx);
    assert_eq!(ctx.state::<VersionTable>().params().page, 4);
    assert!(cancel_load(&mut ctx));
    assert!(!ctx.state::<VersionTable>().is_loading());

    tokio::time::sleep(Duration::from_millis(300)).await;
    ctx.sync_updates();
    assert!(!sync_maps(&mut ctx, Utc::now()));
}
