//! Ring clipping and triangulation for source-domain handling.
//!
//! Leaf quads whose inverse projection pokes outside the valid source domain
//! are clipped here (Sutherland–Hodgman against the domain rectangle) and the
//! clipped ring is fanned back into triangles.

use crate::extent::Extent;

/// Cross product of (b − a) × (p − a).
pub(crate) fn cross(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// Clip a clockwise ring against an axis-aligned rectangle
/// (Sutherland–Hodgman).
///
/// The rectangle is traversed as four directed edges in the same clockwise
/// winding; a vertex is inside a half-plane when `cross(edge, p) <= 0`, so
/// vertices exactly on a clip edge are kept. The ring is ping-ponged between
/// two scratch buffers, one pass per edge. The result may be empty.
pub fn clip_ring(ring: &[(f64, f64)], rect: &Extent) -> Vec<(f64, f64)> {
    let corners = rect.corners_cw();
    let mut input: Vec<(f64, f64)> = ring.to_vec();
    let mut output: Vec<(f64, f64)> = Vec::with_capacity(ring.len() + 4);

    for i in 0..4 {
        if input.is_empty() {
            break;
        }
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        output.clear();

        let mut s = *input.last().unwrap();
        for &e in &input {
            let e_inside = cross(a, b, e) <= 0.0;
            let s_inside = cross(a, b, s) <= 0.0;
            if e_inside {
                if !s_inside {
                    output.push(line_intersection(s, e, a, b));
                }
                output.push(e);
            } else if s_inside {
                output.push(line_intersection(s, e, a, b));
            }
            s = e;
        }
        std::mem::swap(&mut input, &mut output);
    }
    input
}

/// Intersection of the line through `s`,`e` with the line through `a`,`b`
/// (the standard two-line formula).
///
/// The clip edges are axis-aligned, so a zero denominator only occurs for a
/// segment parallel to the edge, which the inside tests never feed here; `s`
/// is still a well-defined fallback.
fn line_intersection(
    s: (f64, f64),
    e: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
) -> (f64, f64) {
    let d1 = (s.0 - e.0, s.1 - e.1);
    let d2 = (a.0 - b.0, a.1 - b.1);
    let denom = d1.0 * d2.1 - d1.1 * d2.0;
    if denom == 0.0 {
        return s;
    }
    let c1 = s.0 * e.1 - s.1 * e.0;
    let c2 = a.0 * b.1 - a.1 * b.0;
    (
        (c1 * d2.0 - d1.0 * c2) / denom,
        (c1 * d2.1 - d1.1 * c2) / denom,
    )
}

/// Triangulate a ring into a flat triangle list.
///
/// N=3 passes through, N=4 splits along the 0–2 diagonal, N≥5 ear-clips.
/// Rings with fewer than three vertices yield nothing.
pub fn fan_triangles(ring: &[(f64, f64)]) -> Vec<[(f64, f64); 3]> {
    match ring.len() {
        0..=2 => Vec::new(),
        3 => vec![[ring[0], ring[1], ring[2]]],
        4 => vec![
            [ring[0], ring[1], ring[2]],
            [ring[0], ring[2], ring[3]],
        ],
        _ => ear_clip(ring),
    }
}

/// O(N²) ear clipping. Adequate for the small rings clipping produces
/// (N ≤ 8 in practice).
fn ear_clip(ring: &[(f64, f64)]) -> Vec<[(f64, f64); 3]> {
    let mut verts: Vec<(f64, f64)> = ring.to_vec();
    let mut out = Vec::with_capacity(verts.len() - 2);
    let winding = signed_area(&verts).signum();

    while verts.len() > 3 {
        let n = verts.len();
        let mut clipped = false;
        for i in 0..n {
            let prev = verts[(i + n - 1) % n];
            let cur = verts[i];
            let next = verts[(i + 1) % n];
            // An ear is convex w.r.t. the ring's winding...
            let area2 = cross(prev, cur, next);
            if area2 * winding <= 0.0 {
                continue;
            }
            // ...and contains no other ring vertex
            let mut blocked = false;
            for (j, &p) in verts.iter().enumerate() {
                if j == i || j == (i + n - 1) % n || j == (i + 1) % n {
                    continue;
                }
                if point_in_triangle(p, prev, cur, next) {
                    blocked = true;
                    break;
                }
            }
            if blocked {
                continue;
            }
            out.push([prev, cur, next]);
            verts.remove(i);
            clipped = true;
            break;
        }
        if !clipped {
            // numerically degenerate ring; fall back to a plain fan
            for i in 1..verts.len() - 1 {
                out.push([verts[0], verts[i], verts[i + 1]]);
            }
            return out;
        }
    }
    out.push([verts[0], verts[1], verts[2]]);
    out
}

/// Twice the signed shoelace area (negative for clockwise rings in y-up
/// coordinates).
fn signed_area(ring: &[(f64, f64)]) -> f64 {
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let p = ring[i];
        let q = ring[(i + 1) % ring.len()];
        sum += p.0 * q.1 - q.0 * p.1;
    }
    sum
}

/// Strict containment: points on the triangle boundary do not count.
fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let d0 = cross(a, b, p);
    let d1 = cross(b, c, p);
    let d2 = cross(c, a, p);
    (d0 > 0.0 && d1 > 0.0 && d2 > 0.0) || (d0 < 0.0 && d1 < 0.0 && d2 < 0.0)
}
