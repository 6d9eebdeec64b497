use itertools::Itertools;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::InputShapeError;

pub type Polygon = Vec<Point2<f64>>;

/// Axis-aligned detection box in pixels, anchored at its top-left corner.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Center of a box in integer pixels, the spatial key used for association.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Centroid {
    pub x: i32,
    pub y: i32,
}

impl Centroid {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

impl BoxRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rejects boxes with a negative extent or whose far corner does not fit
    /// in `i32` pixel coordinates.
    pub fn validate(&self) -> Result<(), InputShapeError> {
        if self.width < 0 || self.height < 0 {
            return Err(InputShapeError::NegativeExtent {
                width: self.width,
                height: self.height,
            });
        }
        if self.x.checked_add(self.width).is_none() || self.y.checked_add(self.height).is_none() {
            return Err(InputShapeError::CoordinateOverflow {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn centroid(&self) -> Centroid {
        Centroid {
            x: self.x + self.width.div_euclid(2),
            y: self.y + self.height.div_euclid(2),
        }
    }

    pub fn area(&self) -> i64 {
        (self.width.max(0) as i64) * (self.height.max(0) as i64)
    }

    /// Radius within which a historical centroid counts as the same object.
    pub fn acceptance_radius(&self) -> f64 {
        self.width.max(self.height).max(0) as f64 / 2.0
    }
}

/// Corners of `bbox` in top-left, top-right, bottom-right, bottom-left order.
pub fn box_to_polygon(bbox: &BoxRect) -> Polygon {
    let x_1 = bbox.x as f64;
    let y_1 = bbox.y as f64;
    let x_2 = x_1 + bbox.width as f64;
    let y_2 = y_1 + bbox.height as f64;

    vec![
        Point2::new(x_1, y_1),
        Point2::new(x_2, y_1),
        Point2::new(x_2, y_2),
        Point2::new(x_1, y_2),
    ]
}

/// Shoelace area, positive for counter-clockwise winding in a y-up frame.
pub fn signed_area(polygon: &[Point2<f64>]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    polygon
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| cross(a, b))
        .sum::<f64>()
        / 2.0
}

/// Intersection over union of two polygons.
///
/// Returns `None` when the union has no area, which happens for degenerate
/// inputs such as collinear vertices or fewer than three points. Callers
/// treat that as zero overlap.
///
/// Neither polygon needs to be convex: each one is split into a fan of
/// signed triangles around a shared origin, and the pairwise convex
/// triangle intersections are summed with the product of their signs.
pub fn polygon_iou(poly_a: &[Point2<f64>], poly_b: &[Point2<f64>]) -> Option<f64> {
    let area_a = signed_area(poly_a);
    let area_b = signed_area(poly_b);

    let intersection = intersection_area(poly_a, poly_b, area_a, area_b);
    let union = area_a.abs() + area_b.abs() - intersection;

    if !union.is_finite() || union <= f64::EPSILON {
        return None;
    }

    let iou = intersection / union;
    if !iou.is_finite() {
        return None;
    }
    Some(iou.clamp(0.0, 1.0))
}

fn intersection_area(
    poly_a: &[Point2<f64>],
    poly_b: &[Point2<f64>],
    area_a: f64,
    area_b: f64,
) -> f64 {
    if area_a == 0.0 || area_b == 0.0 {
        return 0.0;
    }
    let origin = poly_a[0];
    let fan_a = signed_fan(poly_a, &origin);
    let fan_b = signed_fan(poly_b, &origin);

    let mut total = 0.0;
    for (sign_a, tri_a) in fan_a.iter() {
        for (sign_b, tri_b) in fan_b.iter() {
            let clipped = clip_convex(tri_a, tri_b);
            total += sign_a * sign_b * signed_area(&clipped).abs();
        }
    }

    (total * area_a.signum() * area_b.signum()).max(0.0)
}

/// Counter-clockwise triangles `(origin, p_i, p_i+1)` tagged with the sign
/// of their original winding. Zero-area triangles are dropped.
fn signed_fan(polygon: &[Point2<f64>], origin: &Point2<f64>) -> Vec<(f64, [Point2<f64>; 3])> {
    polygon
        .iter()
        .circular_tuple_windows()
        .filter_map(|(a, b)| {
            let a = Point2::from(a - origin);
            let b = Point2::from(b - origin);
            let c = cross(&a, &b);
            if c == 0.0 {
                return None;
            }
            let zero = Point2::origin();
            if c > 0.0 {
                Some((1.0, [zero, a, b]))
            } else {
                Some((-1.0, [zero, b, a]))
            }
        })
        .collect()
}

/// Sutherland-Hodgman clip of `subject` by the counter-clockwise convex `clip`.
fn clip_convex(subject: &[Point2<f64>], clip: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut output: Vec<Point2<f64>> = subject.to_vec();

    for (edge_start, edge_end) in clip.iter().circular_tuple_windows() {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        for (current, next) in input.iter().circular_tuple_windows() {
            let current_inside = side(edge_start, edge_end, current) >= 0.0;
            let next_inside = side(edge_start, edge_end, next) >= 0.0;
            if current_inside {
                output.push(*current);
                if !next_inside {
                    output.extend(segment_intersection(edge_start, edge_end, current, next));
                }
            } else if next_inside {
                output.extend(segment_intersection(edge_start, edge_end, current, next));
            }
        }
    }

    output
}

fn side(edge_start: &Point2<f64>, edge_end: &Point2<f64>, p: &Point2<f64>) -> f64 {
    let edge = edge_end - edge_start;
    let rel = p - edge_start;
    edge.x * rel.y - edge.y * rel.x
}

fn segment_intersection(
    edge_start: &Point2<f64>,
    edge_end: &Point2<f64>,
    p: &Point2<f64>,
    q: &Point2<f64>,
) -> Option<Point2<f64>> {
    let side_p = side(edge_start, edge_end, p);
    let side_q = side(edge_start, edge_end, q);
    let denom = side_p - side_q;
    if denom == 0.0 {
        return None;
    }
    let t = side_p / denom;
    Some(p + (q - p) * t)
}

fn cross(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}
