#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod render;
pub mod route_dump;
pub mod routing;
pub mod scene;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use routing::{
    ConnectionPath, ConnectionStyle, HitRect, Orientation, PathSegment, Point, Rect,
    RouteParameters, connection_path, route,
};
