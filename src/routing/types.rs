use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_BACK_EDGE_GAP, DEFAULT_CORNER_RADIUS, DEFAULT_CURVATURE, DEFAULT_PORT_OFFSET,
};

/// A canvas-space coordinate. Serialised as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Unit vector in the same direction, or zero for a degenerate vector.
    pub fn normalized(self) -> Point {
        let len = self.length();
        if len <= f32::EPSILON {
            return Point::default();
        }
        Point::new(self.x / len, self.y / len)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32; 2]> for Point {
    fn from(value: [f32; 2]) -> Self {
        Point::new(value[0], value[1])
    }
}

impl From<Point> for [f32; 2] {
    fn from(value: Point) -> Self {
        [value.x, value.y]
    }
}

impl From<(f32, f32)> for Point {
    fn from(value: (f32, f32)) -> Self {
        Point::new(value.0, value.1)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// The direction a port faces, outward from its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Left,
    Right,
    Top,
    Bottom,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Left,
        Orientation::Right,
        Orientation::Top,
        Orientation::Bottom,
    ];

    pub fn unit(self) -> Point {
        match self {
            Orientation::Left => Point::new(-1.0, 0.0),
            Orientation::Right => Point::new(1.0, 0.0),
            Orientation::Top => Point::new(0.0, -1.0),
            Orientation::Bottom => Point::new(0.0, 1.0),
        }
    }

    /// Left and Right face along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Orientation::Left | Orientation::Right)
    }

    pub fn opposite(self) -> Orientation {
        match self {
            Orientation::Left => Orientation::Right,
            Orientation::Right => Orientation::Left,
            Orientation::Top => Orientation::Bottom,
            Orientation::Bottom => Orientation::Top,
        }
    }

    /// Next side when walking around a rectangle clockwise (y grows downward).
    pub fn clockwise(self) -> Orientation {
        match self {
            Orientation::Top => Orientation::Right,
            Orientation::Right => Orientation::Bottom,
            Orientation::Bottom => Orientation::Left,
            Orientation::Left => Orientation::Top,
        }
    }

    pub fn counter_clockwise(self) -> Orientation {
        match self {
            Orientation::Top => Orientation::Left,
            Orientation::Left => Orientation::Bottom,
            Orientation::Bottom => Orientation::Right,
            Orientation::Right => Orientation::Top,
        }
    }

    /// The two sides perpendicular to this one.
    pub fn perpendicular(self) -> [Orientation; 2] {
        if self.is_horizontal() {
            [Orientation::Top, Orientation::Bottom]
        } else {
            [Orientation::Left, Orientation::Right]
        }
    }

    /// Signed distance from `from` to `to` along this orientation's axis.
    pub fn axis_distance(self, from: Point, to: Point) -> f32 {
        if self.is_horizontal() {
            to.x - from.x
        } else {
            to.y - from.y
        }
    }
}

/// Axis-aligned box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Smallest box containing every point.
    pub fn bounding(points: &[Point]) -> Option<Rect> {
        let (first, rest) = points.split_first()?;
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for point in rest {
            rect = rect.include(*point);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn inflate(&self, amount: f32) -> Rect {
        Rect::new(
            self.left - amount,
            self.top - amount,
            self.right + amount,
            self.bottom + amount,
        )
    }

    pub fn include(&self, point: Point) -> Rect {
        Rect::new(
            self.left.min(point.x),
            self.top.min(point.y),
            self.right.max(point.x),
            self.bottom.max(point.y),
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// Coordinate of the given side: x for Left/Right, y for Top/Bottom.
    pub fn side(&self, side: Orientation) -> f32 {
        match side {
            Orientation::Left => self.left,
            Orientation::Right => self.right,
            Orientation::Top => self.top,
            Orientation::Bottom => self.bottom,
        }
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite() && self.right.is_finite() && self.bottom.is_finite()
    }
}

fn default_curvature() -> f32 {
    DEFAULT_CURVATURE
}

fn default_offset() -> f32 {
    DEFAULT_PORT_OFFSET
}

fn default_back_edge_gap() -> f32 {
    DEFAULT_BACK_EDGE_GAP
}

fn default_corner_radius() -> f32 {
    DEFAULT_CORNER_RADIUS
}

/// Everything the engine needs to route one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParameters {
    pub start: Point,
    pub end: Point,
    pub source_orientation: Orientation,
    pub target_orientation: Orientation,
    #[serde(default = "default_curvature")]
    pub curvature: f32,
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f32,
    /// Length of the straight stub leaving each port before the first turn.
    #[serde(default = "default_offset")]
    pub offset: f32,
    /// Clearance kept from node bounds when routing around them.
    #[serde(default = "default_back_edge_gap")]
    pub back_edge_gap: f32,
    #[serde(default)]
    pub control_points: Option<Vec<Point>>,
    #[serde(default)]
    pub source_bounds: Option<Rect>,
    #[serde(default)]
    pub target_bounds: Option<Rect>,
    /// Bezier control-point clearance from the node's own bounds; falls back to `offset`.
    #[serde(default)]
    pub node_clearance: Option<f32>,
}

impl RouteParameters {
    pub fn new(
        start: Point,
        source_orientation: Orientation,
        end: Point,
        target_orientation: Orientation,
    ) -> Self {
        Self {
            start,
            end,
            source_orientation,
            target_orientation,
            curvature: DEFAULT_CURVATURE,
            corner_radius: DEFAULT_CORNER_RADIUS,
            offset: DEFAULT_PORT_OFFSET,
            back_edge_gap: DEFAULT_BACK_EDGE_GAP,
            control_points: None,
            source_bounds: None,
            target_bounds: None,
            node_clearance: None,
        }
    }

    pub fn with_bounds(mut self, source: Option<Rect>, target: Option<Rect>) -> Self {
        self.source_bounds = source;
        self.target_bounds = target;
        self
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_back_edge_gap(mut self, gap: f32) -> Self {
        self.back_edge_gap = gap;
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_curvature(mut self, curvature: f32) -> Self {
        self.curvature = curvature;
        self
    }

    pub fn with_control_points(mut self, points: Vec<Point>) -> Self {
        self.control_points = Some(points);
        self
    }

    /// End of the source stub.
    pub fn source_extension(&self) -> Point {
        self.start + self.source_orientation.unit() * self.offset
    }

    /// End of the target stub.
    pub fn target_extension(&self) -> Point {
        self.end + self.target_orientation.unit() * self.offset
    }

    pub fn node_clearance(&self) -> f32 {
        self.node_clearance.unwrap_or(self.offset)
    }
}

/// One drawable primitive. The start point is implied by the previous segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PathSegment {
    Straight {
        end: Point,
        hit_test: bool,
    },
    Quadratic {
        control: Point,
        end: Point,
        hit_test: bool,
    },
    Cubic {
        control1: Point,
        control2: Point,
        end: Point,
        hit_test: bool,
    },
}

impl PathSegment {
    pub fn straight(end: Point) -> Self {
        PathSegment::Straight {
            end,
            hit_test: true,
        }
    }

    pub fn quadratic(control: Point, end: Point) -> Self {
        PathSegment::Quadratic {
            control,
            end,
            hit_test: true,
        }
    }

    pub fn cubic(control1: Point, control2: Point, end: Point) -> Self {
        PathSegment::Cubic {
            control1,
            control2,
            end,
            hit_test: true,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            PathSegment::Straight { end, .. }
            | PathSegment::Quadratic { end, .. }
            | PathSegment::Cubic { end, .. } => end,
        }
    }

    pub fn contributes_to_hit_test(&self) -> bool {
        match *self {
            PathSegment::Straight { hit_test, .. }
            | PathSegment::Quadratic { hit_test, .. }
            | PathSegment::Cubic { hit_test, .. } => hit_test,
        }
    }

    pub fn with_hit_test(self, enabled: bool) -> Self {
        match self {
            PathSegment::Straight { end, .. } => PathSegment::Straight {
                end,
                hit_test: enabled,
            },
            PathSegment::Quadratic { control, end, .. } => PathSegment::Quadratic {
                control,
                end,
                hit_test: enabled,
            },
            PathSegment::Cubic {
                control1,
                control2,
                end,
                ..
            } => PathSegment::Cubic {
                control1,
                control2,
                end,
                hit_test: enabled,
            },
        }
    }
}

/// Tolerance-inflated box approximating part of a path's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRect {
    pub bounds: Rect,
}

impl HitRect {
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
    }
}

/// A routed connection ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPath {
    pub start: Point,
    pub segments: Vec<PathSegment>,
}

impl ConnectionPath {
    pub fn end(&self) -> Point {
        self.segments.last().map(PathSegment::end).unwrap_or(self.start)
    }

    pub fn hit_rects(&self, tolerance: f32) -> Vec<HitRect> {
        super::hit_test::hit_rects(self.start, &self.segments, tolerance)
    }

    /// True when `point` falls inside any of the path's hit rectangles.
    pub fn hit(&self, point: Point, tolerance: f32) -> bool {
        self.hit_rects(tolerance).iter().any(|rect| rect.contains(point))
    }
}
