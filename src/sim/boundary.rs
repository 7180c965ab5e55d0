//! Boundary topologies: nine ways a boid's position (and, for flip
//! topologies, the orthogonal velocity component of a wrapped neighbor) is
//! corrected against the canvas extent.

use serde::{Deserialize, Serialize};

/// One of the nine boundary topologies named in §6 of the design document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BoundaryMode {
    #[default]
    Plane = 0,
    CylinderX = 1,
    CylinderY = 2,
    Torus = 3,
    MobiusX = 4,
    MobiusY = 5,
    KleinX = 6,
    KleinY = 7,
    ProjectivePlane = 8,
}

/// Per-axis wrap/flip/bounce behavior for a topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyRules {
    pub wrap_x: bool,
    pub wrap_y: bool,
    pub flip_on_wrap_x: bool,
    pub flip_on_wrap_y: bool,
    pub bounce_x: bool,
    pub bounce_y: bool,
}

impl BoundaryMode {
    pub fn all() -> &'static [BoundaryMode] {
        &[
            BoundaryMode::Plane,
            BoundaryMode::CylinderX,
            BoundaryMode::CylinderY,
            BoundaryMode::Torus,
            BoundaryMode::MobiusX,
            BoundaryMode::MobiusY,
            BoundaryMode::KleinX,
            BoundaryMode::KleinY,
            BoundaryMode::ProjectivePlane,
        ]
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn rules(self) -> TopologyRules {
        use BoundaryMode::*;
        match self {
            Plane => TopologyRules {
                wrap_x: false,
                wrap_y: false,
                flip_on_wrap_x: false,
                flip_on_wrap_y: false,
                bounce_x: true,
                bounce_y: true,
            },
            CylinderX => TopologyRules {
                wrap_x: true,
                wrap_y: false,
                flip_on_wrap_x: false,
                flip_on_wrap_y: false,
                bounce_x: false,
                bounce_y: true,
            },
            CylinderY => TopologyRules {
                wrap_x: false,
                wrap_y: true,
                flip_on_wrap_x: false,
                flip_on_wrap_y: false,
                bounce_x: true,
                bounce_y: false,
            },
            Torus => TopologyRules {
                wrap_x: true,
                wrap_y: true,
                flip_on_wrap_x: false,
                flip_on_wrap_y: false,
                bounce_x: false,
                bounce_y: false,
            },
            MobiusX => TopologyRules {
                wrap_x: true,
                wrap_y: false,
                flip_on_wrap_x: true,
                flip_on_wrap_y: false,
                bounce_x: false,
                bounce_y: true,
            },
            MobiusY => TopologyRules {
                wrap_x: false,
                wrap_y: true,
                flip_on_wrap_x: false,
                flip_on_wrap_y: true,
                bounce_x: true,
                bounce_y: false,
            },
            KleinX => TopologyRules {
                wrap_x: true,
                wrap_y: true,
                flip_on_wrap_x: true,
                flip_on_wrap_y: false,
                bounce_x: false,
                bounce_y: false,
            },
            KleinY => TopologyRules {
                wrap_x: true,
                wrap_y: true,
                flip_on_wrap_x: false,
                flip_on_wrap_y: true,
                bounce_x: false,
                bounce_y: false,
            },
            ProjectivePlane => TopologyRules {
                wrap_x: true,
                wrap_y: true,
                flip_on_wrap_x: true,
                flip_on_wrap_y: true,
                bounce_x: false,
                bounce_y: false,
            },
        }
    }

    /// True if either axis wraps — the ghost-instance render condition.
    pub fn wraps_any_axis(self) -> bool {
        let r = self.rules();
        r.wrap_x || r.wrap_y
    }
}

/// Apply boundary correction to a position/velocity pair in place, following
/// the invariant-5 contract: position stays in `[0,W)×[0,H)` afterward for
/// every topology.
pub fn apply_boundary(
    pos: &mut glam::Vec2,
    vel: &mut glam::Vec2,
    mode: BoundaryMode,
    world: glam::Vec2,
) {
    let rules = mode.rules();

    if rules.bounce_x {
        if pos.x < 0.0 {
            pos.x = 0.0;
            vel.x = vel.x.abs();
        } else if pos.x >= world.x {
            pos.x = world.x - 1e-4;
            vel.x = -vel.x.abs();
        }
    } else if rules.wrap_x {
        let crossed_low = pos.x < 0.0;
        let crossed_high = pos.x >= world.x;
        if crossed_low || crossed_high {
            pos.x = crate::utils::math::wrap(pos.x, world.x);
            if rules.flip_on_wrap_x {
                vel.y = -vel.y;
            }
        }
    }

    if rules.bounce_y {
        if pos.y < 0.0 {
            pos.y = 0.0;
            vel.y = vel.y.abs();
        } else if pos.y >= world.y {
            pos.y = world.y - 1e-4;
            vel.y = -vel.y.abs();
        }
    } else if rules.wrap_y {
        let crossed_low = pos.y < 0.0;
        let crossed_high = pos.y >= world.y;
        if crossed_low || crossed_high {
            pos.y = crate::utils::math::wrap(pos.y, world.y);
            if rules.flip_on_wrap_y {
                vel.x = -vel.x;
            }
        }
    }
}

/// Shortest delta from `from` to `to` under the topology's wrap rules. For
/// non-flip wraps this reduces axis differences greater than half-extent by
/// the full extent; flip wraps use the same magnitude reduction (the sign
/// flip of the orthogonal velocity is applied separately by the caller when
/// the neighbor's contribution is consumed, per §4.3).
pub fn wrapped_delta(
    from: glam::Vec2,
    to: glam::Vec2,
    world: glam::Vec2,
    mode: BoundaryMode,
) -> glam::Vec2 {
    let rules = mode.rules();
    let mut delta = to - from;

    if rules.wrap_x {
        if delta.x > world.x * 0.5 {
            delta.x -= world.x;
        } else if delta.x < -world.x * 0.5 {
            delta.x += world.x;
        }
    }
    if rules.wrap_y {
        if delta.y > world.y * 0.5 {
            delta.y -= world.y;
        } else if delta.y < -world.y * 0.5 {
            delta.y += world.y;
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_bounces_and_reverses_velocity() {
        let mut pos = glam::Vec2::new(-5.0, 50.0);
        let mut vel = glam::Vec2::new(-3.0, 0.0);
        apply_boundary(&mut pos, &mut vel, BoundaryMode::Plane, glam::Vec2::new(800.0, 600.0));
        assert!(pos.x >= 0.0);
        assert!(vel.x >= 0.0);
    }

    // E3: wrap correctness on torus.
    #[test]
    fn torus_wrap_matches_expected_trajectory() {
        let world = glam::Vec2::new(800.0, 600.0);
        let mut pos = glam::Vec2::new(1.0, 300.0);
        let vel = glam::Vec2::new(-4.0, 0.0);
        for k in 1..=5 {
            pos += vel * (1.0 / 60.0) * 60.0;
            let mut v = vel;
            apply_boundary(&mut pos, &mut v, BoundaryMode::Torus, world);
            let expected_x = crate::utils::math::euclidean_mod(1 - 4 * k, 800) as f32;
            assert!((pos.x - expected_x).abs() < 1e-2, "frame {k}: {} vs {}", pos.x, expected_x);
            assert!((pos.y - 300.0).abs() < 1e-6);
        }
    }

    // E4: flip wrap on mobius-X, one frame.
    #[test]
    fn mobius_x_flip_wrap_reverses_orthogonal_velocity() {
        let world = glam::Vec2::new(800.0, 600.0);
        let mut pos = glam::Vec2::new(1.0, 100.0);
        let mut vel = glam::Vec2::new(-4.0, 2.5);
        pos += vel * (1.0 / 60.0) * 60.0; // -> (-3.0, 102.5)
        apply_boundary(&mut pos, &mut vel, BoundaryMode::MobiusX, world);
        assert!((pos.x - 797.0).abs() < 1e-3);
        assert!((pos.y - 102.5).abs() < 1e-6);
        assert!((vel.y + 2.5).abs() < 1e-6, "vel.y should reverse on X-wrap, got {}", vel.y);
    }

    #[test]
    fn mobius_y_flip_wrap_reverses_orthogonal_velocity() {
        let world = glam::Vec2::new(800.0, 600.0);
        let mut pos = glam::Vec2::new(100.0, 1.0);
        let mut vel = glam::Vec2::new(2.5, -4.0);
        pos += vel * (1.0 / 60.0) * 60.0; // -> (102.5, -3.0)
        apply_boundary(&mut pos, &mut vel, BoundaryMode::MobiusY, world);
        assert!((pos.y - 597.0).abs() < 1e-3);
        assert!((pos.x - 102.5).abs() < 1e-6);
        assert!((vel.x + 2.5).abs() < 1e-6, "vel.x should reverse on Y-wrap, got {}", vel.x);
    }

    #[test]
    fn all_nine_topologies_keep_positions_in_bounds() {
        let world = glam::Vec2::new(200.0, 150.0);
        for &mode in BoundaryMode::all() {
            for &(x, y) in &[(-10.0, -10.0), (210.0, 160.0), (100.0, 75.0)] {
                let mut pos = glam::Vec2::new(x, y);
                let mut vel = glam::Vec2::new(1.0, 1.0);
                apply_boundary(&mut pos, &mut vel, mode, world);
                assert!(pos.x >= 0.0 && pos.x < world.x, "{mode:?} x out of bounds: {pos:?}");
                assert!(pos.y >= 0.0 && pos.y < world.y, "{mode:?} y out of bounds: {pos:?}");
            }
        }
    }

    #[test]
    fn wrapped_delta_takes_shortest_path_on_torus() {
        let world = glam::Vec2::new(100.0, 100.0);
        let delta = wrapped_delta(
            glam::Vec2::new(90.0, 50.0),
            glam::Vec2::new(10.0, 50.0),
            world,
            BoundaryMode::Torus,
        );
        assert!((delta.x - 20.0).abs() < 1e-3);
    }
}
