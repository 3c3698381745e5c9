use connection_router::config::Config;
use connection_router::route_dump::{ConnectionDump, RouteDump};
use connection_router::routing::{Point, validate_tolerance};
use connection_router::scene::{Scene, SceneConnection, route_scene};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HitTestRequest {
    #[serde(flatten)]
    connection: SceneConnection,
    /// Pointer position to test against the routed path.
    point: Option<Point>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HitTestResponse {
    /// `[left, top, right, bottom]`
    hit_rects: Vec<[f32; 4]>,
    hit: Option<bool>,
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn route_one(connection: SceneConnection, config: &Config) -> Result<ConnectionDump, String> {
    let scene = Scene {
        connections: vec![connection],
    };
    let routed = route_scene(&scene, config, None).map_err(|error| error.to_string())?;
    RouteDump::from_routed(&routed)
        .connections
        .into_iter()
        .next()
        .ok_or_else(|| "connection produced no route".to_string())
}

fn route_json(json: &str) -> Result<String, String> {
    let connection: SceneConnection = serde_json::from_str(json).map_err(|error| error.to_string())?;
    let dump = route_one(connection, &Config::default())?;
    serde_json::to_string(&dump).map_err(|error| error.to_string())
}

fn hit_test_json(json: &str, tolerance: f32) -> Result<String, String> {
    validate_tolerance(tolerance).map_err(|error| error.to_string())?;
    let request: HitTestRequest = serde_json::from_str(json).map_err(|error| error.to_string())?;
    let mut config = Config::default();
    config.routing.hit_tolerance = tolerance;
    let dump = route_one(request.connection, &config)?;
    let hit = request.point.map(|point| {
        dump.hit_rects.iter().any(|&[left, top, right, bottom]| {
            point.x >= left && point.x <= right && point.y >= top && point.y <= bottom
        })
    });
    let response = HitTestResponse {
        hit_rects: dump.hit_rects,
        hit,
    };
    serde_json::to_string(&response).map_err(|error| error.to_string())
}

/// Route one connection. Takes a scene connection as JSON and returns the
/// waypoints, segments, SVG path data and hit rects as JSON.
#[wasm_bindgen]
pub fn route_connection(json: &str) -> Result<String, JsValue> {
    route_json(json).map_err(to_js)
}

/// Hit-test geometry for one connection at `tolerance`. When the request
/// carries a `point`, the response also says whether it lands on the path.
#[wasm_bindgen]
pub fn hit_test_connection(json: &str, tolerance: f32) -> Result<String, JsValue> {
    hit_test_json(json, tolerance).map_err(to_js)
}
