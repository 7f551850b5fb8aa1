use glam::Vec2;

/// A resolving contact between two convex point sets.
///
/// `point_a` and `point_b` are world-space witness points, one on each hull.
/// Their difference `point_a - point_b` is the penetration vector: its length
/// is the overlap depth, and translating the first hull by its negation
/// separates the hulls to touching.
#[derive(Copy, Clone, Debug)]
pub struct Contact {
    pub point_a: Vec2,
    pub point_b: Vec2,
}

/// A point on the Minkowski difference A - B, remembering which vertex of
/// each hull produced it so witness points can be reconstructed.
#[derive(Copy, Clone, Debug)]
struct SupportPoint {
    diff: Vec2,
    a: Vec2,
    b: Vec2,
}

const MAX_ITERATIONS: usize = 32;

fn furthest_in_dir(pts: &[Vec2], dir: Vec2) -> Vec2 {
    let mut max_pt = pts[0];
    let mut max_dist = dir.dot(pts[0]);
    for pt in &pts[1..] {
        let dist = dir.dot(*pt);
        if dist > max_dist {
            max_dist = dist;
            max_pt = *pt;
        }
    }
    max_pt
}

fn support(verts_a: &[Vec2], verts_b: &[Vec2], dir: Vec2) -> SupportPoint {
    let a = furthest_in_dir(verts_a, dir);
    let b = furthest_in_dir(verts_b, -dir);
    SupportPoint { diff: a - b, a, b }
}

fn centroid(pts: &[Vec2]) -> Vec2 {
    pts.iter().copied().fold(Vec2::ZERO, |acc, p| acc + p) / pts.len() as f32
}

/// Perpendicular of `e` on the side of `towards`.
fn perp_towards(e: Vec2, towards: Vec2) -> Vec2 {
    let n = e.perp();
    if n.dot(towards) >= 0.0 {
        n
    } else {
        -n
    }
}

/// GJK intersection test. Returns a simplex (triangle on the Minkowski
/// difference) enclosing the origin when the hulls overlap.
fn gjk_intersect(verts_a: &[Vec2], verts_b: &[Vec2]) -> Option<[SupportPoint; 3]> {
    let mut dir = centroid(verts_b) - centroid(verts_a);
    if dir.length_squared() < 1e-12 {
        dir = Vec2::X;
    }

    let mut simplex = Vec::with_capacity(3);
    simplex.push(support(verts_a, verts_b, dir));
    dir = -simplex[0].diff;

    for _ in 0..MAX_ITERATIONS {
        if dir.length_squared() < 1e-12 {
            // origin lies on the simplex itself; nudge the search so the
            // degenerate (touching) case still builds a full triangle
            dir = Vec2::X;
        }

        let p = support(verts_a, verts_b, dir);
        if p.diff.dot(dir) < 0.0 {
            // support never crossed the origin, hulls are separated
            return None;
        }
        simplex.push(p);

        if simplex.len() == 2 {
            let a = simplex[1].diff;
            let b = simplex[0].diff;
            let ab = b - a;
            let ao = -a;
            if ab.dot(ao) > 0.0 {
                dir = perp_towards(ab, ao);
            } else {
                simplex.remove(0);
                dir = ao;
            }
        } else {
            let a = simplex[2].diff;
            let b = simplex[1].diff;
            let c = simplex[0].diff;
            let ab = b - a;
            let ac = c - a;
            let ao = -a;

            let ab_out = -perp_towards(ab, ac);
            let ac_out = -perp_towards(ac, ab);
            if ab_out.dot(ao) > 0.0 {
                simplex.remove(0);
                dir = ab_out;
            } else if ac_out.dot(ao) > 0.0 {
                simplex.remove(1);
                dir = ac_out;
            } else {
                return Some([simplex[0], simplex[1], simplex[2]]);
            }
        }
    }

    None
}

fn edge_witness(p1: &SupportPoint, p2: &SupportPoint) -> Contact {
    let e = p2.diff - p1.diff;
    let len_sq = e.length_squared();
    let t = if len_sq < 1e-12 {
        0.0
    } else {
        ((-p1.diff).dot(e) / len_sq).clamp(0.0, 1.0)
    };
    Contact {
        point_a: p1.a.lerp(p2.a, t),
        point_b: p1.b.lerp(p2.b, t),
    }
}

/// EPA: expand the GJK simplex along the Minkowski difference boundary until
/// the edge nearest the origin is found, then rebuild witness points on it.
fn penetration_witness(
    verts_a: &[Vec2],
    verts_b: &[Vec2],
    simplex: [SupportPoint; 3],
) -> Contact {
    let mut poly = simplex.to_vec();

    // counter-clockwise winding so edge outward normals are (e.y, -e.x)
    let area = (poly[1].diff - poly[0].diff).perp_dot(poly[2].diff - poly[0].diff);
    if area < 0.0 {
        poly.swap(1, 2);
    }

    let mut iterations = 0;
    loop {
        let mut best = 0;
        let mut best_dist = f32::MAX;
        let mut best_normal = Vec2::X;
        for i in 0..poly.len() {
            let j = (i + 1) % poly.len();
            let e = poly[j].diff - poly[i].diff;
            if e.length_squared() < 1e-12 {
                continue;
            }
            let n = Vec2::new(e.y, -e.x).normalize();
            let dist = n.dot(poly[i].diff);
            if dist < best_dist {
                best = i;
                best_dist = dist;
                best_normal = n;
            }
        }

        let next = (best + 1) % poly.len();
        iterations += 1;
        if iterations >= MAX_ITERATIONS {
            return edge_witness(&poly[best], &poly[next]);
        }

        let p = support(verts_a, verts_b, best_normal);
        if best_normal.dot(p.diff) - best_dist < 1e-4 {
            // no support further out than the current edge, it is the hull
            // boundary nearest the origin
            return edge_witness(&poly[best], &poly[next]);
        }
        poly.insert(next, p);
    }
}

/// Contact query between two convex world-space vertex sets.
///
/// Returns `None` when the hulls do not overlap; otherwise a [`Contact`]
/// whose witness-point difference is the penetration vector.
pub fn find_contact(verts_a: &[Vec2], verts_b: &[Vec2]) -> Option<Contact> {
    if verts_a.is_empty() || verts_b.is_empty() {
        return None;
    }

    let simplex = gjk_intersect(verts_a, verts_b)?;
    Some(penetration_witness(verts_a, verts_b, simplex))
}
