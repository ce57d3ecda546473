//! Hitbox overlap queries.

use std::fmt::Debug;

use glam::Vec3;
use hypercube_core::Hitbox;

/// Collaborator answering whether an attack hitbox touches a target.
pub trait OverlapQuery: Debug {
    /// Reports whether a target of the given radius at `target` overlaps the hitbox.
    fn overlaps(&self, hitbox: &Hitbox, target: Vec3, target_radius: f32) -> bool;
}

/// Ground-plane box projected forward from the attacker.
///
/// The box spans `length` along the attacker's flattened facing and `width`
/// across it; targets are treated as circles of `target_radius`. Height is
/// ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardBoxOverlap;

impl OverlapQuery for ForwardBoxOverlap {
    fn overlaps(&self, hitbox: &Hitbox, target: Vec3, target_radius: f32) -> bool {
        let forward = flatten(hitbox.facing).normalize_or_zero();
        if forward == Vec3::ZERO {
            return false;
        }
        let right = Vec3::new(-forward.y, forward.x, 0.0);
        let offset = flatten(target - hitbox.origin);

        let along = offset.dot(forward);
        let across = offset.dot(right).abs();
        along >= -target_radius
            && along <= hitbox.length + target_radius
            && across <= hitbox.width / 2.0 + target_radius
    }
}

pub(crate) fn flatten(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, vector.y, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hitbox() -> Hitbox {
        Hitbox {
            origin: Vec3::ZERO,
            facing: Vec3::X,
            length: 100.0,
            width: 40.0,
        }
    }

    #[test]
    fn target_in_front_overlaps() {
        assert!(ForwardBoxOverlap.overlaps(&hitbox(), Vec3::new(60.0, 10.0, 0.0), 5.0));
    }

    #[test]
    fn target_behind_misses() {
        assert!(!ForwardBoxOverlap.overlaps(&hitbox(), Vec3::new(-30.0, 0.0, 0.0), 5.0));
    }

    #[test]
    fn radius_extends_reach() {
        let target = Vec3::new(110.0, 0.0, 0.0);
        assert!(!ForwardBoxOverlap.overlaps(&hitbox(), target, 5.0));
        assert!(ForwardBoxOverlap.overlaps(&hitbox(), target, 15.0));
    }

    #[test]
    fn height_is_ignored() {
        assert!(ForwardBoxOverlap.overlaps(&hitbox(), Vec3::new(50.0, 0.0, 96.0), 1.0));
    }

    #[test]
    fn vertical_facing_never_overlaps() {
        let upward = Hitbox {
            facing: Vec3::Z,
            ..hitbox()
        };
        assert!(!ForwardBoxOverlap.overlaps(&upward, Vec3::new(10.0, 0.0, 0.0), 50.0));
    }
}
