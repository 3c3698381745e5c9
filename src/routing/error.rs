use super::types::{Point, Rect, RouteParameters};

pub type Result<T> = std::result::Result<T, ParamError>;

/// Input rejected before routing. Routing itself never fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("{field} must have finite coordinates, got ({x}, {y})")]
    NonFinitePoint { field: &'static str, x: f32, y: f32 },

    #[error("{field} must have finite edges")]
    NonFiniteRect { field: &'static str },

    #[error("hit tolerance must be finite and not negative, got {0}")]
    InvalidTolerance(f32),
}

fn check_scalar(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParamError::NonFinite { field, value })
    }
}

fn check_point(field: &'static str, point: Point) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(ParamError::NonFinitePoint {
            field,
            x: point.x,
            y: point.y,
        })
    }
}

fn check_rect(field: &'static str, rect: Option<&Rect>) -> Result<()> {
    match rect {
        Some(rect) if !rect.is_finite() => Err(ParamError::NonFiniteRect { field }),
        _ => Ok(()),
    }
}

/// Reject NaN and infinite inputs. Out-of-range curvature and corner radius
/// are passed through untouched.
pub fn validate(params: &RouteParameters) -> Result<()> {
    check_point("start", params.start)?;
    check_point("end", params.end)?;
    check_scalar("curvature", params.curvature)?;
    check_scalar("cornerRadius", params.corner_radius)?;
    check_scalar("offset", params.offset)?;
    check_scalar("backEdgeGap", params.back_edge_gap)?;
    if let Some(clearance) = params.node_clearance {
        check_scalar("nodeClearance", clearance)?;
    }
    for point in params.control_points.iter().flatten() {
        check_point("controlPoints", *point)?;
    }
    check_rect("sourceBounds", params.source_bounds.as_ref())?;
    check_rect("targetBounds", params.target_bounds.as_ref())?;
    Ok(())
}

pub fn validate_tolerance(tolerance: f32) -> Result<()> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(ParamError::InvalidTolerance(tolerance))
    }
}
