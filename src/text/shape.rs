//! 2D outline paths and their conversion to fillable shapes

use glam::Vec2;

const EPSILON: f32 = 1e-6;

/// One drawing command of an outline path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Vec2),
    Quadratic { control: Vec2, to: Vec2 },
    Cubic { control1: Vec2, control2: Vec2, to: Vec2 },
}

impl Segment {
    fn end(&self) -> Vec2 {
        match *self {
            Segment::Line(to) | Segment::Quadratic { to, .. } | Segment::Cubic { to, .. } => to,
        }
    }
}

/// A connected run of segments started by a move
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    pub start: Vec2,
    pub segments: Vec<Segment>,
}

impl SubPath {
    pub fn new(start: Vec2) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    fn current_point(&self) -> Vec2 {
        self.segments.last().map_or(self.start, Segment::end)
    }

    /// Flatten into a closed polyline.
    ///
    /// Curves are sampled at `divisions` steps, lines contribute only their
    /// end point. Repeated points and the closing duplicate of the start
    /// point are dropped.
    pub fn points(&self, divisions: u32) -> Vec<Vec2> {
        let divisions = divisions.max(1);
        let mut points = vec![self.start];
        let mut push = |p: Vec2| {
            if points.last().map_or(true, |last| last.distance_squared(p) > EPSILON * EPSILON) {
                points.push(p);
            }
        };

        let mut from = self.start;
        for segment in &self.segments {
            match *segment {
                Segment::Line(to) => push(to),
                Segment::Quadratic { control, to } => {
                    for d in 1..=divisions {
                        push(quadratic_bezier(d as f32 / divisions as f32, from, control, to));
                    }
                }
                Segment::Cubic {
                    control1,
                    control2,
                    to,
                } => {
                    for d in 1..=divisions {
                        push(cubic_bezier(
                            d as f32 / divisions as f32,
                            from,
                            control1,
                            control2,
                            to,
                        ));
                    }
                }
            }
            from = segment.end();
        }

        if points.len() > 2 && points[0].distance_squared(points[points.len() - 1]) <= EPSILON * EPSILON {
            points.pop();
        }
        points
    }
}

fn quadratic_bezier(t: f32, p0: Vec2, p1: Vec2, p2: Vec2) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}

fn cubic_bezier(t: f32, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k * k) + p1 * (3.0 * k * k * t) + p2 * (3.0 * k * t * t) + p3 * (t * t * t)
}

/// A glyph outline made of several sub-paths (outer contours and holes)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePath {
    pub sub_paths: Vec<SubPath>,
}

impl ShapePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, point: Vec2) {
        self.sub_paths.push(SubPath::new(point));
    }

    /// The sub-path drawing commands are appended to, if any was started
    pub fn current_mut(&mut self) -> Option<&mut SubPath> {
        self.sub_paths.last_mut()
    }

    pub fn current_point(&self) -> Option<Vec2> {
        self.sub_paths.last().map(SubPath::current_point)
    }

    /// Split the outline into solids with their holes.
    ///
    /// Clockwise contours are solids, the others holes. A hole belongs to
    /// the smallest solid containing it; a hole outside every solid stays
    /// with the solid drawn before it. When no contour is clockwise, each
    /// contour becomes a solid of its own.
    pub fn to_shapes(&self, divisions: u32) -> Vec<Shape> {
        let contours: Vec<Vec<Vec2>> = self
            .sub_paths
            .iter()
            .map(|path| path.points(divisions))
            .filter(|points| points.len() >= 3 && signed_area(points).abs() > EPSILON * EPSILON)
            .collect();

        if contours.len() <= 1 {
            return contours.into_iter().map(Shape::new).collect();
        }

        let is_solid: Vec<bool> = contours.iter().map(|c| is_clockwise(c)).collect();
        if !is_solid.iter().any(|&s| s) {
            return contours.into_iter().map(Shape::new).collect();
        }

        let mut shapes: Vec<Shape> = Vec::new();
        // index into `shapes` for every solid contour, in drawing order
        let mut solid_slot: Vec<Option<usize>> = vec![None; contours.len()];
        for (i, contour) in contours.iter().enumerate() {
            if is_solid[i] {
                solid_slot[i] = Some(shapes.len());
                shapes.push(Shape::new(contour.clone()));
            }
        }

        for (i, hole) in contours.iter().enumerate() {
            if is_solid[i] {
                continue;
            }
            let containing = shapes
                .iter()
                .enumerate()
                .filter(|(_, shape)| point_in_polygon(hole[0], &shape.contour))
                .min_by(|(_, a), (_, b)| {
                    signed_area(&a.contour)
                        .abs()
                        .total_cmp(&signed_area(&b.contour).abs())
                })
                .map(|(slot, _)| slot);
            let preceding = solid_slot[..i].iter().rev().flatten().next().copied();
            let slot = containing.or(preceding).unwrap_or(0);
            shapes[slot].holes.push(hole.clone());
        }

        shapes
    }
}

/// A fillable polygon with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub contour: Vec<Vec2>,
    pub holes: Vec<Vec<Vec2>>,
}

impl Shape {
    pub fn new(contour: Vec<Vec2>) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Vec<Vec2>) -> Self {
        self.holes.push(hole);
        self
    }
}

/// Signed polygon area, positive for counter-clockwise winding
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    let mut prev = points[n - 1];
    for &p in points {
        area += prev.x * p.y - p.x * prev.y;
        prev = p;
    }
    area * 0.5
}

pub fn is_clockwise(points: &[Vec2]) -> bool {
    signed_area(points) < 0.0
}

/// Even-odd point in polygon test
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
