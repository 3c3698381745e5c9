use crate::config::{DEFAULT_MIN_CANVAS, RenderConfig};
use crate::routing::{ConnectionPath, PathSegment, Rect};
use crate::scene::RoutedConnection;
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

const PORT_RADIUS: f32 = 3.0;

/// SVG path `d` attribute for a routed connection.
pub fn path_data(path: &ConnectionPath) -> String {
    let mut d = format!("M {:.2} {:.2}", path.start.x, path.start.y);
    for segment in &path.segments {
        // Writing into a String cannot fail.
        let _ = match *segment {
            PathSegment::Straight { end, .. } => write!(d, " L {:.2} {:.2}", end.x, end.y),
            PathSegment::Quadratic { control, end, .. } => write!(
                d,
                " Q {:.2} {:.2} {:.2} {:.2}",
                control.x, control.y, end.x, end.y
            ),
            PathSegment::Cubic {
                control1,
                control2,
                end,
                ..
            } => write!(
                d,
                " C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
                control1.x, control1.y, control2.x, control2.y, end.x, end.y
            ),
        };
    }
    d
}

pub fn render_svg(routed: &[RoutedConnection], theme: &Theme, config: &RenderConfig) -> String {
    let extent = routed
        .iter()
        .filter_map(RoutedConnection::extent)
        .chain(
            routed
                .iter()
                .filter(|_| config.show_hit_rects)
                .flat_map(|conn| conn.hit_rects.iter().map(|rect| rect.bounds)),
        )
        .reduce(|acc, rect| acc.union(&rect))
        .unwrap_or(Rect::new(0.0, 0.0, DEFAULT_MIN_CANVAS, DEFAULT_MIN_CANVAS))
        .inflate(config.padding);
    // Grow to the requested canvas, keeping the drawing centred.
    let width = extent.width().max(config.width);
    let height = extent.height().max(config.height);
    let extent = Rect::from_xywh(
        extent.left - (width - extent.width()) / 2.0,
        extent.top - (height - extent.height()) / 2.0,
        width,
        height,
    );

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{:.2} {:.2} {width:.2} {height:.2}\">",
        extent.left, extent.top,
    ));
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        extent.left, extent.top, config.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    let mut drawn_nodes: Vec<Rect> = Vec::new();
    for conn in routed {
        for rect in conn.params.source_bounds.iter().chain(&conn.params.target_bounds) {
            if drawn_nodes.contains(rect) {
                continue;
            }
            drawn_nodes.push(*rect);
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                theme.node_fill,
                theme.node_border
            ));
        }
    }

    if config.show_hit_rects {
        for conn in routed {
            for hit in &conn.hit_rects {
                let b = hit.bounds;
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"0.5\"/>",
                    b.left,
                    b.top,
                    b.width(),
                    b.height(),
                    theme.hit_rect_fill,
                    theme.hit_rect_stroke
                ));
            }
        }
    }

    for conn in routed {
        let id_attr = conn
            .id
            .as_deref()
            .map(|id| format!(" id=\"{}\"", escape_xml(id)))
            .unwrap_or_default();
        svg.push_str(&format!(
            "<path{id_attr} class=\"connection {}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" marker-end=\"url(#arrow)\"/>",
            conn.style.as_str(),
            path_data(&conn.path),
            theme.line_color,
            theme.line_width
        ));
        for port in [conn.path.start, conn.path.end()] {
            svg.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{PORT_RADIUS}\" fill=\"{}\"/>",
                port.x, port.y, theme.port_color
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
