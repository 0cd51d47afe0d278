//! Contact detection and bounce response
//!
//! Contacts come from an exhaustive pairwise scan. Populations are tens of
//! entities, so the O(n²) scan stays cheap at the authority's tick rate.

use glam::Vec2;

use super::state::Entity;

/// Whether two entities overlap (strictly closer than the sum of radii)
#[inline]
pub fn in_contact(a: &Entity, b: &Entity) -> bool {
    let reach = a.radius + b.radius;
    a.pos.distance_squared(b.pos) < reach * reach
}

/// All contacting pairs `(i, j)` with `i < j`, ascending by `i` then `j`
pub fn detect_contacts(entities: &[Entity]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in entities.iter().enumerate() {
        for (j, b) in entities.iter().enumerate().skip(i + 1) {
            if in_contact(a, b) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Push two entities apart along the line joining their centres.
///
/// Each entity keeps its own speed; only the direction changes. Coincident
/// centres split along +x.
pub fn bounce_apart(a: &mut Entity, b: &mut Entity) {
    let axis = (b.pos - a.pos).normalize_or(Vec2::X);
    let speed_a = a.speed();
    let speed_b = b.speed();
    a.vel = -axis * speed_a;
    b.vel = axis * speed_b;
}
