use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::{Request, StatusCode}, Router};
use http_body_util::BodyExt;
use leakpath_core::{LeakOptions, ShipGrid};
use leakpath_service::{build_router, load_grid, AppState, ShipHost};
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::ServiceExt; // for `oneshot`

/// 5^3 armor shell with a standard door in the +X wall at (4,2,2); block 0 is the door.
fn grid_json(door_closed: f32) -> Value {
    json!({
        "name": "shuttle",
        "definitions": [
            { "id": "armor", "mount_points": [
                { "normal": "forward", "start": [0, 0], "end": [1, 1] },
                { "normal": "backward", "start": [0, 0], "end": [1, 1] },
                { "normal": "left", "start": [0, 0], "end": [1, 1] },
                { "normal": "right", "start": [0, 0], "end": [1, 1] },
                { "normal": "up", "start": [0, 0], "end": [1, 1] },
                { "normal": "down", "start": [0, 0], "end": [1, 1] }
            ]},
            { "id": "door", "door": "standard", "mount_points": [
                { "normal": "left", "start": [0, 0], "end": [1, 1] },
                { "normal": "right", "start": [0, 0], "end": [1, 1] }
            ]}
        ],
        "blocks": [
            { "definition": "door", "position": [4, 2, 2], "orientation": { "forward": "left", "up": "up" }, "closed_ratio": door_closed }
        ],
        "boxes": [
            { "definition": "armor", "min": [0, 0, 0], "max": [4, 4, 4], "hollow": true, "skip_occupied": true }
        ]
    })
}

fn write_grid_file(v: &Value) -> tempfile::TempPath {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(v.to_string().as_bytes()).unwrap();
    tmp.into_temp_path()
}

fn app_with(grid: ShipGrid) -> (Router, Arc<ShipHost>) { app_with_options(grid, LeakOptions::default()) }

fn app_with_options(grid: ShipGrid, options: LeakOptions) -> (Router, Arc<ShipHost>) {
    let host = Arc::new(ShipHost::new(grid, options));
    (build_router(AppState { host: Arc::clone(&host) }), host)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let v = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, v)
}

async fn wait_for_leak(app: &Router) -> Value {
    for _ in 0..2_000 {
        let (_, v) = call(app, "GET", "/leak", None).await;
        if v["state"] != "running" {
            return v;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("leak search did not finish");
}

#[tokio::test]
async fn health_and_version() {
    let (app, _) = app_with(ShipGrid::new("empty"));
    let (status, v) = call(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");

    let (status, v) = call(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["core_version"], leakpath_core::version());
}

#[tokio::test]
async fn grid_loaded_from_file_reports_summary() {
    let path = write_grid_file(&grid_json(1.0));
    let grid = load_grid(&path).unwrap();
    let (app, _) = app_with(grid);
    let (status, v) = call(&app, "GET", "/grid", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["name"], "shuttle");
    assert_eq!(v["blocks"], 98);
    assert_eq!(v["bounds"], json!({ "min": [0, 0, 0], "max": [4, 4, 4] }));
}

#[tokio::test]
async fn door_toggle_flips_leak_result() {
    let (app, _) = app_with(ShipGrid::new("empty"));
    let (status, _) = call(&app, "PUT", "/grid", Some(grid_json(1.0))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, v) = call(&app, "POST", "/leak/start", Some(json!({ "start": [2, 2, 2] }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(v["state"] == "running" || v["state"] == "idle");
    let v = wait_for_leak(&app).await;
    assert_eq!(v["state"], "idle");
    assert_eq!(v["notice"], "No leaks!");
    assert_eq!(v["status"], "Ready");

    let (status, _) = call(&app, "POST", "/blocks/0/door", Some(json!({ "closed_ratio": 0.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    call(&app, "POST", "/leak/start", Some(json!({ "start": [2, 2, 2] }))).await;
    let v = wait_for_leak(&app).await;
    assert_eq!(v["state"], "draw");
    assert_eq!(v["status"], "Leak found");
    assert_eq!(v["segments"].as_array().map(Vec::len), Some(3));
    assert_eq!(v["segments"][2]["end"], json!([5, 2, 2]));
    assert_eq!(v["ticks_remaining"], 30);

    let (_, v) = call(&app, "POST", "/leak/cancel", None).await;
    assert_eq!(v["state"], "idle");
    assert!(v["segments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sealing_the_door_clears_the_drawn_path_on_tick() {
    let options = LeakOptions { seal_check_interval_ticks: 2, ..LeakOptions::default() };
    let (app, host) = app_with_options(ShipGrid::new("empty"), options);
    call(&app, "PUT", "/grid", Some(grid_json(0.0))).await;
    call(&app, "POST", "/leak/start", Some(json!({ "start": [2, 2, 2] }))).await;
    assert_eq!(wait_for_leak(&app).await["state"], "draw");

    call(&app, "POST", "/blocks/0/door", Some(json!({ "closed_ratio": 1.0 }))).await;
    host.tick();
    assert_eq!(call(&app, "GET", "/leak", None).await.1["state"], "draw");
    host.tick();
    assert_eq!(host.ticks(), 2);
    let (_, v) = call(&app, "GET", "/leak", None).await;
    assert_eq!(v["state"], "idle");
    assert_eq!(v["notice"], Value::Null);
}

#[tokio::test]
async fn bad_requests_use_error_envelope() {
    let (app, _) = app_with(ShipGrid::new("empty"));
    call(&app, "PUT", "/grid", Some(grid_json(1.0))).await;

    let (status, v) = call(&app, "POST", "/blocks/1/door", Some(json!({ "closed_ratio": 0.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"]["code"], "bad_request");

    let (status, v) = call(&app, "POST", "/blocks/999/door", Some(json!({ "closed_ratio": 0.0 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"]["code"], "not_found");

    let (status, _) = call(&app, "POST", "/blocks/0/door", Some(json!({ "closed_ratio": 3.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let dup = json!({ "definitions": [{ "id": "a" }, { "id": "a" }] });
    let (status, v) = call(&app, "PUT", "/grid", Some(dup)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"]["message"].as_str().unwrap().contains("twice"));
}

#[tokio::test]
async fn start_outside_grid_is_no_leak() {
    let (app, _) = app_with(ShipGrid::new("empty"));
    call(&app, "PUT", "/grid", Some(grid_json(0.0))).await;
    let (_, v) = call(&app, "POST", "/leak/start", Some(json!({ "start": [50, 0, 0] }))).await;
    assert_eq!(v["state"], "idle");
    assert_eq!(v["notice"], "No leaks!");
}

#[tokio::test]
async fn replacing_the_grid_closes_the_old_one() {
    let (app, host) = app_with(ShipGrid::new("empty"));
    call(&app, "PUT", "/grid", Some(grid_json(0.0))).await;
    let old = host.grid();
    call(&app, "PUT", "/grid", Some(grid_json(1.0))).await;
    assert!(!leakpath_core::CubeGrid::is_live(&*old));
    assert!(leakpath_core::CubeGrid::is_live(&*host.grid()));
}

#[tokio::test]
async fn oversized_or_out_of_range_grids_are_rejected() {
    let (app, host) = app_with(ShipGrid::new("empty"));
    let huge = json!({
        "definitions": [{ "id": "armor" }],
        "boxes": [{ "definition": "armor", "min": [-1000000000, -1000000000, -1000000000], "max": [1000000000, 1000000000, 1000000000] }]
    });
    let (status, v) = call(&app, "PUT", "/grid", Some(huge)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"]["message"].as_str().unwrap().contains("coordinate range"));

    let wide = json!({
        "definitions": [{ "id": "armor" }],
        "boxes": [{ "definition": "armor", "min": [0, 0, 0], "max": [999, 999, 999] }]
    });
    let (status, v) = call(&app, "PUT", "/grid", Some(wide)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"]["message"].as_str().unwrap().contains("exceeds the limit"));

    let edge = json!({
        "definitions": [{ "id": "grate", "airtight": false }],
        "blocks": [{ "definition": "grate", "position": [2147483647, 0, 0] }]
    });
    let (status, _) = call(&app, "PUT", "/grid", Some(edge)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(host.grid().name(), "empty");
}
