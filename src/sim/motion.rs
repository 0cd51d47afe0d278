//! Per-tick motion and wall containment
//!
//! Walls reflect velocity; they never clamp position. An entity may end a
//! tick past the wall by at most its speed on that axis and is carried back
//! inside by the reflected velocity on the following ticks.

use super::state::{Arena, Entity};

/// Move one entity by one tick and reflect it off the walls
#[inline]
pub fn advance(entity: &mut Entity, arena: &Arena) {
    entity.pos += entity.vel;

    let r = entity.radius;
    entity.vel.x = contain_axis(entity.pos.x, entity.vel.x, r, arena.width - r);
    entity.vel.y = contain_axis(entity.pos.y, entity.vel.y, r, arena.height - r);
}

/// Reflected velocity component for one axis.
///
/// Only a component still heading out of `[lo, hi]` is negated, so an entity
/// that is already returning is left alone until it is back inside.
#[inline]
fn contain_axis(pos: f32, vel: f32, lo: f32, hi: f32) -> f32 {
    if (pos < lo && vel < 0.0) || (pos > hi && vel > 0.0) {
        -vel
    } else {
        vel
    }
}

/// Put a redirected entity back on course after a bounce.
///
/// A bounce can hand an entity that is already past a wall a velocity that
/// points further out, or one too slow on that axis to cover the overshoot.
/// Such an axis is pointed inward, and the position is set back onto the
/// band edge when the overshoot exceeds the inward speed. Speed is unchanged.
pub fn resettle(entity: &mut Entity, arena: &Arena) {
    let r = entity.radius;
    (entity.pos.x, entity.vel.x) = settle_axis(entity.pos.x, entity.vel.x, r, arena.width - r);
    (entity.pos.y, entity.vel.y) = settle_axis(entity.pos.y, entity.vel.y, r, arena.height - r);
}

fn settle_axis(pos: f32, vel: f32, lo: f32, hi: f32) -> (f32, f32) {
    let speed = vel.abs();
    if pos < lo {
        (if lo - pos > speed { lo } else { pos }, speed)
    } else if pos > hi {
        (if pos - hi > speed { hi } else { pos }, -speed)
    } else {
        (pos, vel)
    }
}

/// Move every entity of a population
pub fn advance_all(entities: &mut [Entity], arena: &Arena) {
    for entity in entities.iter_mut() {
        advance(entity, arena);
    }
}
