use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Route parameter defaults ────────────────────────────────────────
/// Stub length a path travels straight out of its port.
pub const DEFAULT_PORT_OFFSET: f32 = 10.0;
/// Clearance kept from node bounds when routing around them.
pub const DEFAULT_BACK_EDGE_GAP: f32 = 20.0;
/// Bezier pull as a fraction of the axis distance between the endpoints.
pub const DEFAULT_CURVATURE: f32 = 0.25;
pub const DEFAULT_CORNER_RADIUS: f32 = 0.0;
/// Pointer slop around a drawn path.
pub const DEFAULT_HIT_TOLERANCE: f32 = 5.0;

/// Smallest canvas an SVG is rendered on.
pub const DEFAULT_MIN_CANVAS: f32 = 200.0;

// ── Numeric tolerances ──────────────────────────────────────────────
/// Collinearity slack for routing decisions.
pub const COLLINEAR_TOLERANCE: f32 = 1.0;
/// Collinearity slack for the waypoint optimisation pass. Tighter than
/// `COLLINEAR_TOLERANCE` so constructed corners survive.
pub const OPTIMIZE_TOLERANCE: f32 = 0.5;
/// Secondary-axis slack for treating a vector as axis-aligned.
pub const AXIS_TOLERANCE: f32 = 0.01;
/// Cross-product slack in segment/segment orientation tests.
pub const INTERSECTION_EPSILON: f32 = 1e-4;
/// Rounded corners smaller than this stay sharp.
pub const MIN_CORNER_RADIUS: f32 = 1.0;
/// Hit-test subdivision budget as a multiple of the tolerance.
pub const HIT_BUDGET_FACTOR: f32 = 3.0;

/// The tunable thresholds used by the routing engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tolerances {
    pub collinear: f32,
    pub optimize: f32,
    pub axis: f32,
    pub intersection_epsilon: f32,
    pub min_corner_radius: f32,
    pub hit_budget_factor: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            collinear: COLLINEAR_TOLERANCE,
            optimize: OPTIMIZE_TOLERANCE,
            axis: AXIS_TOLERANCE,
            intersection_epsilon: INTERSECTION_EPSILON,
            min_corner_radius: MIN_CORNER_RADIUS,
            hit_budget_factor: HIT_BUDGET_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub offset: f32,
    pub back_edge_gap: f32,
    pub curvature: f32,
    pub corner_radius: f32,
    pub hit_tolerance: f32,
    pub tolerances: Tolerances,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            offset: DEFAULT_PORT_OFFSET,
            back_edge_gap: DEFAULT_BACK_EDGE_GAP,
            curvature: DEFAULT_CURVATURE,
            corner_radius: DEFAULT_CORNER_RADIUS,
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
            tolerances: Tolerances::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Minimum canvas width. Larger scenes grow the canvas; smaller ones are
    /// centred in it.
    pub width: f32,
    /// Minimum canvas height.
    pub height: f32,
    pub background: String,
    pub padding: f32,
    pub show_hit_rects: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_MIN_CANVAS,
            height: DEFAULT_MIN_CANVAS,
            background: "#FFFFFF".to_string(),
            padding: 24.0,
            show_hit_rects: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub routing: RoutingConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            routing: RoutingConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    line_color: Option<String>,
    line_width: Option<NumberOrString>,
    node_fill: Option<String>,
    node_border: Option<String>,
    port_color: Option<String>,
    hit_rect_fill: Option<String>,
    hit_rect_stroke: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TolerancesFile {
    collinear: Option<NumberOrString>,
    optimize: Option<NumberOrString>,
    axis: Option<NumberOrString>,
    intersection_epsilon: Option<NumberOrString>,
    min_corner_radius: Option<NumberOrString>,
    hit_budget_factor: Option<NumberOrString>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    offset: Option<NumberOrString>,
    back_edge_gap: Option<NumberOrString>,
    curvature: Option<NumberOrString>,
    corner_radius: Option<NumberOrString>,
    hit_tolerance: Option<NumberOrString>,
    tolerances: Option<TolerancesFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<NumberOrString>,
    height: Option<NumberOrString>,
    padding: Option<NumberOrString>,
    show_hit_rects: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    routing: Option<RoutingConfigFile>,
    render: Option<RenderConfigFile>,
}

fn overlay(target: &mut f32, value: Option<NumberOrString>) {
    if let Some(v) = value.as_ref().and_then(NumberOrString::as_f32) {
        *target = v;
    }
}

/// Load a JSON5 config file over the defaults. `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "blueprint" || theme_name == "dark" {
            config.theme = Theme::blueprint();
        } else {
            tracing::warn!(theme = theme_name, "unknown theme, keeping default");
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.line_width.as_ref().and_then(NumberOrString::as_f32) {
            config.theme.line_width = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.port_color {
            config.theme.port_color = v;
        }
        if let Some(v) = vars.hit_rect_fill {
            config.theme.hit_rect_fill = v;
        }
        if let Some(v) = vars.hit_rect_stroke {
            config.theme.hit_rect_stroke = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v.clone();
            config.render.background = v;
        }
    }

    if let Some(routing) = parsed.routing {
        overlay(&mut config.routing.offset, routing.offset);
        overlay(&mut config.routing.back_edge_gap, routing.back_edge_gap);
        overlay(&mut config.routing.curvature, routing.curvature);
        overlay(&mut config.routing.corner_radius, routing.corner_radius);
        overlay(&mut config.routing.hit_tolerance, routing.hit_tolerance);
        if let Some(tol) = routing.tolerances {
            let t = &mut config.routing.tolerances;
            overlay(&mut t.collinear, tol.collinear);
            overlay(&mut t.optimize, tol.optimize);
            overlay(&mut t.axis, tol.axis);
            overlay(&mut t.intersection_epsilon, tol.intersection_epsilon);
            overlay(&mut t.min_corner_radius, tol.min_corner_radius);
            overlay(&mut t.hit_budget_factor, tol.hit_budget_factor);
        }
    }

    if let Some(render) = parsed.render {
        overlay(&mut config.render.width, render.width);
        overlay(&mut config.render.height, render.height);
        overlay(&mut config.render.padding, render.padding);
        if let Some(v) = render.show_hit_rects {
            config.render.show_hit_rects = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.routing.offset, DEFAULT_PORT_OFFSET);
        assert_eq!(config.routing.tolerances, Tolerances::default());
    }

    #[test]
    fn overlays_routing_and_tolerances() {
        let config = parse_config(
            r#"{
                // comments are fine, this is JSON5
                routing: {
                    offset: 14,
                    backEdgeGap: "32",
                    tolerances: { collinear: 2.5 },
                },
                render: { showHitRects: true },
            }"#,
        )
        .unwrap();
        assert_eq!(config.routing.offset, 14.0);
        assert_eq!(config.routing.back_edge_gap, 32.0);
        assert_eq!(config.routing.tolerances.collinear, 2.5);
        assert_eq!(config.routing.tolerances.optimize, OPTIMIZE_TOLERANCE);
        assert!(config.render.show_hit_rects);
    }

    #[test]
    fn theme_switch_updates_background() {
        let config = parse_config(r#"{ "theme": "blueprint" }"#).unwrap();
        assert_eq!(config.render.background, Theme::blueprint().background);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_config("{ routing: ").is_err());
    }
}
