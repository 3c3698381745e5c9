use crate::render::path_data;
use crate::routing::{PathSegment, needs_loopback_routing};
use crate::scene::RoutedConnection;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub connections: Vec<ConnectionDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDump {
    pub id: Option<String>,
    pub style: String,
    pub branch: Option<String>,
    pub loopback: bool,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub waypoints: Vec<[f32; 2]>,
    pub segments: Vec<PathSegment>,
    pub path_data: String,
    /// `[left, top, right, bottom]`
    pub hit_rects: Vec<[f32; 4]>,
}

impl RouteDump {
    pub fn from_routed(routed: &[RoutedConnection]) -> Self {
        let connections = routed
            .iter()
            .map(|conn| ConnectionDump {
                id: conn.id.clone(),
                style: conn.style.as_str().to_string(),
                branch: conn.branch.map(|branch| format!("{branch:?}")),
                loopback: needs_loopback_routing(&conn.params),
                start: conn.path.start.into(),
                end: conn.path.end().into(),
                waypoints: conn.waypoints.iter().map(|p| [p.x, p.y]).collect(),
                segments: conn.path.segments.clone(),
                path_data: path_data(&conn.path),
                hit_rects: conn
                    .hit_rects
                    .iter()
                    .map(|rect| {
                        let b = rect.bounds;
                        [b.left, b.top, b.right, b.bottom]
                    })
                    .collect(),
            })
            .collect();
        RouteDump { connections }
    }
}

/// Pretty JSON to `path`, or stdout when no path is given.
pub fn write_route_dump(path: Option<&Path>, routed: &[RoutedConnection]) -> anyhow::Result<()> {
    let dump = RouteDump::from_routed(routed);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
