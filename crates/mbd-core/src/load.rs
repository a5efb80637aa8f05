//! External loads: forces and torques applied to bodies

use glam::DVec3;

use crate::assembly::{AssemblyError, FrameId};

/// Norm below which a direction/axis vector is rejected as zero.
const EPS_DIRECTION: f64 = 1e-10;

fn normalize_direction(v: DVec3) -> Result<DVec3, AssemblyError> {
    let norm = v.length();
    if norm < EPS_DIRECTION {
        return Err(AssemblyError::InvalidDirection(norm));
    }
    Ok(v / norm)
}

/// An external force applied to a body at a frame's origin.
///
/// The direction is stored unit-length; the sign of the input magnitude is
/// discarded (magnitude is always ≥ 0, orientation lives in the direction).
#[derive(Debug, Clone)]
pub struct Force {
    pub name: String,
    pub body_id: i64,
    /// Application point, shared through the assembly's frame store
    pub frame: FrameId,
    /// Magnitude in Newtons
    pub magnitude: f64,
    /// Unit direction in world coordinates
    pub direction: DVec3,
}

impl Force {
    pub fn new(
        name: impl Into<String>,
        body_id: i64,
        frame: FrameId,
        magnitude: f64,
        direction: DVec3,
    ) -> Result<Self, AssemblyError> {
        Ok(Self {
            name: name.into(),
            body_id,
            frame,
            magnitude: magnitude.abs(),
            direction: normalize_direction(direction)?,
        })
    }

    /// Force vector: magnitude times unit direction
    pub fn vector(&self) -> DVec3 {
        self.magnitude * self.direction
    }
}

/// An external torque (moment) applied to a body.
///
/// Identical in shape to [`Force`] with a rotation axis in place of a
/// direction; magnitude is in Newton-meters.
#[derive(Debug, Clone)]
pub struct Torque {
    pub name: String,
    pub body_id: i64,
    pub frame: FrameId,
    /// Magnitude in N·m
    pub magnitude: f64,
    /// Unit rotation axis in world coordinates
    pub axis: DVec3,
}

impl Torque {
    pub fn new(
        name: impl Into<String>,
        body_id: i64,
        frame: FrameId,
        magnitude: f64,
        axis: DVec3,
    ) -> Result<Self, AssemblyError> {
        Ok(Self {
            name: name.into(),
            body_id,
            frame,
            magnitude: magnitude.abs(),
            axis: normalize_direction(axis)?,
        })
    }

    /// Torque vector: magnitude times unit axis
    pub fn vector(&self) -> DVec3 {
        self.magnitude * self.axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_direction_is_rejected() {
        let err = Force::new("f", 0, FrameId::WORLD, 10.0, DVec3::ZERO).unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidDirection(_)));
    }

    #[test]
    fn direction_is_normalized_and_magnitude_untouched() {
        let force = Force::new("f", 0, FrameId::WORLD, 5.0, DVec3::new(0.0, 0.0, 5.0)).unwrap();
        assert_relative_eq!(force.direction.z, 1.0, epsilon = 1e-12);
        assert_eq!(force.magnitude, 5.0);
        assert_relative_eq!(force.vector().z, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn negative_magnitude_is_folded_into_abs() {
        let torque = Torque::new("t", 0, FrameId::WORLD, -2.5, DVec3::X).unwrap();
        assert_eq!(torque.magnitude, 2.5);
        assert_relative_eq!(torque.axis.x, 1.0, epsilon = 1e-12);
    }
}
