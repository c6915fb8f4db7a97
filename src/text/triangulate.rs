//! Polygon-with-holes triangulation by hole bridging and ear clipping

use glam::Vec2;

use super::shape::signed_area;

const EPSILON: f32 = 1e-9;

fn cross2(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Triangulate a contour with holes.
///
/// Returned indices address the concatenation `contour ++ holes[0] ++
/// holes[1] ++ ...`, and every triangle is counter-clockwise regardless of
/// the input winding.
pub fn triangulate_shape(contour: &[Vec2], holes: &[Vec<Vec2>]) -> Vec<[u32; 3]> {
    let mut points: Vec<Vec2> = contour.to_vec();
    for hole in holes {
        points.extend_from_slice(hole);
    }

    let mut polygon: Vec<u32> = (0..contour.len() as u32).collect();
    if signed_area(contour) < 0.0 {
        polygon.reverse();
    }

    // holes must run clockwise inside a counter-clockwise outline
    let mut hole_rings = Vec::with_capacity(holes.len());
    let mut start = contour.len() as u32;
    for hole in holes {
        let end = start + hole.len() as u32;
        if hole.len() >= 3 {
            let mut ring: Vec<u32> = (start..end).collect();
            if signed_area(hole) > 0.0 {
                ring.reverse();
            }
            hole_rings.push(ring);
        }
        start = end;
    }

    // rightmost holes first so later bridges never cross earlier ones
    hole_rings.sort_by(|a, b| {
        let max_x = |ring: &Vec<u32>| {
            ring.iter()
                .map(|&i| points[i as usize].x)
                .fold(f32::NEG_INFINITY, f32::max)
        };
        max_x(b).total_cmp(&max_x(a))
    });

    for ring in &hole_rings {
        bridge_hole(&points, &mut polygon, ring);
    }

    ear_clip(&points, polygon)
}

/// Splice a hole into the outline through a mutually visible vertex pair
fn bridge_hole(points: &[Vec2], polygon: &mut Vec<u32>, ring: &[u32]) {
    let Some((m_pos, _)) = ring
        .iter()
        .enumerate()
        .max_by(|(_, &a), (_, &b)| points[a as usize].x.total_cmp(&points[b as usize].x))
    else {
        return;
    };
    let m = points[ring[m_pos] as usize];

    let Some(p_pos) = find_bridge_vertex(points, polygon, m) else {
        log::debug!("no visible bridge vertex for hole at {:?}, hole dropped", m);
        return;
    };

    let mut spliced = Vec::with_capacity(polygon.len() + ring.len() + 2);
    spliced.extend_from_slice(&polygon[..=p_pos]);
    spliced.extend(ring[m_pos..].iter().chain(&ring[..=m_pos]).copied());
    spliced.extend_from_slice(&polygon[p_pos..]);
    *polygon = spliced;
}

/// Position in `polygon` of a vertex visible from `m` along +x
fn find_bridge_vertex(points: &[Vec2], polygon: &[u32], m: Vec2) -> Option<usize> {
    let n = polygon.len();
    let mut best: Option<(f32, usize)> = None;

    for i in 0..n {
        let a = points[polygon[i] as usize];
        let b = points[polygon[(i + 1) % n] as usize];
        if (a.y > m.y) == (b.y > m.y) && a.y != m.y && b.y != m.y {
            continue;
        }
        if (a.y - b.y).abs() <= EPSILON {
            // edge along the ray; its nearer endpoint is a hit
            for (pos, p) in [(i, a), ((i + 1) % n, b)] {
                if p.x >= m.x && best.map_or(true, |(x, _)| p.x < x) {
                    best = Some((p.x, pos));
                }
            }
            continue;
        }
        let t = (m.y - a.y) / (b.y - a.y);
        if !(0.0..=1.0).contains(&t) {
            continue;
        }
        let x = a.x + t * (b.x - a.x);
        if x < m.x {
            continue;
        }
        if best.map_or(true, |(bx, _)| x < bx) {
            let pos = if a.x > b.x { i } else { (i + 1) % n };
            best = Some((x, pos));
        }
    }

    let (hit_x, mut p_pos) = best?;
    let hit = Vec2::new(hit_x, m.y);
    let p = points[polygon[p_pos] as usize];
    if p == hit {
        return Some(p_pos);
    }

    // a reflex vertex inside (m, hit, p) would block the bridge, take the
    // one closest in angle to the ray instead
    let mut best_angle = f32::NEG_INFINITY;
    let mut best_dist = f32::INFINITY;
    for i in 0..n {
        let q = points[polygon[i] as usize];
        if i == p_pos || q == p || q.x < m.x {
            continue;
        }
        let prev = points[polygon[(i + n - 1) % n] as usize];
        let next = points[polygon[(i + 1) % n] as usize];
        let reflex = cross2(q - prev, next - q) <= 0.0;
        if !reflex || !point_in_triangle(q, m, hit, p) {
            continue;
        }
        let dir = q - m;
        let dist = dir.length();
        if dist <= EPSILON {
            continue;
        }
        let cos = dir.x / dist;
        if cos > best_angle || (cos == best_angle && dist < best_dist) {
            best_angle = cos;
            best_dist = dist;
            p_pos = i;
        }
    }
    Some(p_pos)
}

/// Inside or on the border of triangle `abc`, for either winding
fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = cross2(b - a, p - a);
    let d2 = cross2(c - b, p - b);
    let d3 = cross2(a - c, p - c);
    let has_neg = d1 < -EPSILON || d2 < -EPSILON || d3 < -EPSILON;
    let has_pos = d1 > EPSILON || d2 > EPSILON || d3 > EPSILON;
    !(has_neg && has_pos)
}

fn ear_clip(points: &[Vec2], mut polygon: Vec<u32>) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));
    let pos = |i: u32| points[i as usize];

    while polygon.len() > 3 {
        let n = polygon.len();
        let mut clipped = false;

        for i in 0..n {
            let (ip, ic, inx) = (polygon[(i + n - 1) % n], polygon[i], polygon[(i + 1) % n]);
            let (a, b, c) = (pos(ip), pos(ic), pos(inx));
            if cross2(b - a, c - a) <= EPSILON {
                continue;
            }
            let blocked = polygon.iter().any(|&j| {
                let q = pos(j);
                q != a && q != b && q != c && point_in_triangle(q, a, b, c)
            });
            if blocked {
                continue;
            }
            triangles.push([ip, ic, inx]);
            polygon.remove(i);
            clipped = true;
            break;
        }

        if clipped {
            continue;
        }

        // no ear left: drop a degenerate vertex, or give up with a fan
        let degenerate = (0..n).find(|&i| {
            let (a, b, c) = (
                pos(polygon[(i + n - 1) % n]),
                pos(polygon[i]),
                pos(polygon[(i + 1) % n]),
            );
            cross2(b - a, c - a).abs() <= EPSILON
        });
        match degenerate {
            Some(i) => {
                polygon.remove(i);
            }
            None => {
                log::debug!("ear clipping stalled with {} vertices, fanning the rest", n);
                for k in 1..n - 1 {
                    triangles.push([polygon[0], polygon[k], polygon[k + 1]]);
                }
                return triangles;
            }
        }
    }

    if polygon.len() == 3 {
        let (a, b, c) = (pos(polygon[0]), pos(polygon[1]), pos(polygon[2]));
        if cross2(b - a, c - a) > EPSILON {
            triangles.push([polygon[0], polygon[1], polygon[2]]);
        }
    }
    triangles
}
