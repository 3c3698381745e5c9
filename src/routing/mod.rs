mod bezier;
mod error;
pub(crate) mod geometry;
mod hit_test;
mod segments;
mod style;
pub(crate) mod types;
mod waypoints;

pub use bezier::{bezier, control_offset};
pub use error::{ParamError, Result, validate, validate_tolerance};
pub use geometry::{collinear, path_length, segment_intersects_rect, union};
pub use hit_test::{hit_rects, hit_rects_with};
pub use segments::{to_segments, to_segments_with};
pub use style::{
    BezierStrategy, ConnectionStyle, PathStrategy, StepStrategy, StraightStrategy,
    UserEditedStrategy, connection_path, connection_path_with, produce_segments,
    produce_segments_with, strategy_for,
};
pub use types::*;
pub use waypoints::{
    RouteBranch, needs_loopback_routing, optimize_waypoints, route, route_traced, route_with,
    select_branch,
};
