//! Coordinate frames and rotation algebra

use glam::{DMat3, DVec3};

/// Norm below which a vector is treated as having no direction.
pub(crate) const EPS_DEGENERATE: f64 = 1e-8;

/// |dot| threshold above which the X-axis reference switches from world X
/// to world Y during frame construction.
const PARALLEL_THRESHOLD: f64 = 0.99;

/// A coordinate frame: origin plus orientation, both in world coordinates.
///
/// Column i of `rotation` is axis i (X, Y, Z) expressed in world coordinates.
/// The rotation is orthonormal with determinant +1; every constructor in this
/// module guarantees it rather than assuming it from input.
///
/// Frames are always stored in world coordinates. The preprocessor never
/// moves bodies, so no local-to-global transform chain exists anywhere.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    /// Origin in meters, world frame
    pub origin: DVec3,
    pub rotation: DMat3,
}

impl Frame {
    /// Identity frame at the world origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: DVec3::ZERO,
            rotation: DMat3::IDENTITY,
        }
    }

    pub fn at(name: impl Into<String>, origin: DVec3, rotation: DMat3) -> Self {
        Self {
            name: name.into(),
            origin,
            rotation,
        }
    }

    /// X-axis direction (first column of the rotation matrix)
    pub fn x_axis(&self) -> DVec3 {
        self.rotation.x_axis
    }

    /// Y-axis direction (second column of the rotation matrix)
    pub fn y_axis(&self) -> DVec3 {
        self.rotation.y_axis
    }

    /// Z-axis direction (third column of the rotation matrix)
    pub fn z_axis(&self) -> DVec3 {
        self.rotation.z_axis
    }

    /// Euler angles in degrees, extrinsic XYZ convention
    pub fn euler_deg(&self) -> [f64; 3] {
        euler_xyz_deg(&self.rotation)
    }

    /// Set the rotation from Euler angles in degrees (extrinsic XYZ)
    pub fn set_euler_deg(&mut self, angles_deg: [f64; 3]) {
        self.rotation = rotation_from_euler_xyz_deg(angles_deg[0], angles_deg[1], angles_deg[2]);
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new("Frame")
    }
}

/// Build a frame from a face measurement: origin at the face center, Z-axis
/// along the face normal.
///
/// The X-axis is chosen deterministically by projecting world X onto the
/// plane perpendicular to Z, switching the reference to world Y when the
/// normal is near-parallel to world X. Repeated construction from the same
/// normal is reproducible; the only discontinuity is the hard threshold at
/// |dot| = 0.99.
pub fn frame_from_normal(origin: DVec3, normal: DVec3, name: impl Into<String>) -> Frame {
    let z_axis = if normal.length() < EPS_DEGENERATE {
        DVec3::Z
    } else {
        normal.normalize()
    };

    let mut target = DVec3::X;
    if target.dot(z_axis).abs() > PARALLEL_THRESHOLD {
        target = DVec3::Y;
    }

    // Project the reference onto the plane: v - (v . n) n
    let mut x_axis = target - target.dot(z_axis) * z_axis;

    if x_axis.length() < EPS_DEGENERATE {
        // Degenerate projection: force orthogonality with a cross product
        let mut seed = DVec3::X;
        if seed.dot(z_axis).abs() > 0.9 {
            seed = DVec3::Y;
        }
        x_axis = z_axis.cross(seed);
    }

    let x_axis = x_axis.normalize();
    let y_axis = z_axis.cross(x_axis);

    Frame::at(name, origin, DMat3::from_cols(x_axis, y_axis, z_axis))
}

/// Build a frame from an edge measurement: origin at the edge midpoint,
/// Z-axis along the edge direction. Same axis-selection strategy as
/// [`frame_from_normal`].
pub fn frame_from_direction(midpoint: DVec3, direction: DVec3, name: impl Into<String>) -> Frame {
    frame_from_normal(midpoint, direction, name)
}

/// Build a frame at a vertex. Vertices carry no inherent orientation, so the
/// rotation is identity (aligned with the world frame).
pub fn frame_from_point(point: DVec3, name: impl Into<String>) -> Frame {
    Frame::at(name, point, DMat3::IDENTITY)
}

/// Extract Euler angles in degrees from a rotation matrix, extrinsic XYZ
/// convention.
///
/// The round-trip with [`rotation_from_euler_xyz_deg`] holds to floating
/// tolerance for matrices produced by this library's own constructors. It is
/// not guaranteed for arbitrary orthonormal matrices with numerical noise
/// near the singular configuration (`sy` close to zero), where the Z angle
/// collapses to 0 by convention.
pub fn euler_xyz_deg(r: &DMat3) -> [f64; 3] {
    // r.col(c)[row]; columns are the frame axes
    let sy = (r.x_axis.x * r.x_axis.x + r.x_axis.y * r.x_axis.y).sqrt();

    if sy >= 1e-6 {
        let x = r.y_axis.z.atan2(r.z_axis.z);
        let y = (-r.x_axis.z).atan2(sy);
        let z = r.x_axis.y.atan2(r.x_axis.x);
        [x.to_degrees(), y.to_degrees(), z.to_degrees()]
    } else {
        // Gimbal lock: X and Z rotations are no longer independent
        let x = (-r.z_axis.y).atan2(r.y_axis.y);
        let y = (-r.x_axis.z).atan2(sy);
        [x.to_degrees(), y.to_degrees(), 0.0]
    }
}

/// Build a rotation matrix from Euler angles in degrees, extrinsic XYZ
/// convention: `R = Rz(z) * Ry(y) * Rx(x)`.
pub fn rotation_from_euler_xyz_deg(x_deg: f64, y_deg: f64, z_deg: f64) -> DMat3 {
    DMat3::from_rotation_z(z_deg.to_radians())
        * DMat3::from_rotation_y(y_deg.to_radians())
        * DMat3::from_rotation_x(x_deg.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_right_handed_orthonormal(r: &DMat3) {
        assert_relative_eq!(r.x_axis.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.y_axis.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.z_axis.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.x_axis.dot(r.y_axis), 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.y_axis.dot(r.z_axis), 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.z_axis.dot(r.x_axis), 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn frame_from_normal_is_orthonormal_for_normal_sweep() {
        let normals = [
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(0.0, 0.0, -1.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(-0.3, 0.7, 0.2),
            DVec3::new(0.9999, 0.01, 0.0),
            DVec3::new(5.0, -2.0, 11.0),
        ];
        for n in normals {
            let frame = frame_from_normal(DVec3::ZERO, n, "f");
            assert_right_handed_orthonormal(&frame.rotation);
        }
    }

    #[test]
    fn frame_from_normal_z_matches_normal() {
        let n = DVec3::new(1.0, 2.0, 3.0);
        let frame = frame_from_normal(DVec3::ZERO, n, "f");
        let expected = n.normalize();
        assert_relative_eq!(frame.z_axis().x, expected.x, epsilon = 1e-12);
        assert_relative_eq!(frame.z_axis().y, expected.y, epsilon = 1e-12);
        assert_relative_eq!(frame.z_axis().z, expected.z, epsilon = 1e-12);
    }

    #[test]
    fn frame_from_normal_x_projection_is_deterministic() {
        // Z well away from world X: frame X is the projection of world X
        let frame = frame_from_normal(DVec3::ZERO, DVec3::Z, "f");
        assert_relative_eq!(frame.x_axis().x, 1.0, epsilon = 1e-12);

        // Repeated construction yields an identical basis
        let again = frame_from_normal(DVec3::ZERO, DVec3::Z, "f");
        assert_eq!(frame.rotation, again.rotation);
    }

    #[test]
    fn frame_from_normal_switches_reference_near_world_x() {
        // Normal parallel to world X: the projected reference must be world Y
        let frame = frame_from_normal(DVec3::ZERO, DVec3::X, "f");
        assert_right_handed_orthonormal(&frame.rotation);
        assert_relative_eq!(frame.x_axis().y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn frame_from_normal_zero_normal_falls_back_to_world_z() {
        let frame = frame_from_normal(DVec3::new(1.0, 2.0, 3.0), DVec3::ZERO, "f");
        assert_relative_eq!(frame.z_axis().z, 1.0, epsilon = 1e-12);
        assert_right_handed_orthonormal(&frame.rotation);
    }

    #[test]
    fn frame_from_point_is_identity() {
        let p = DVec3::new(0.5, -0.5, 2.0);
        let frame = frame_from_point(p, "vertex");
        assert_eq!(frame.origin, p);
        assert_eq!(frame.rotation, DMat3::IDENTITY);
    }

    #[test]
    fn euler_round_trip_for_constructed_rotations() {
        let cases = [
            [0.0, 0.0, 0.0],
            [30.0, 0.0, 0.0],
            [0.0, 45.0, 0.0],
            [0.0, 0.0, 60.0],
            [10.0, 20.0, 30.0],
            [-170.0, 45.0, 120.0],
            [5.0, -80.0, -5.0],
        ];
        for [x, y, z] in cases {
            let r = rotation_from_euler_xyz_deg(x, y, z);
            let angles = euler_xyz_deg(&r);
            let back = rotation_from_euler_xyz_deg(angles[0], angles[1], angles[2]);
            for c in 0..3 {
                let a = r.col(c);
                let b = back.col(c);
                assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
                assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
                assert_relative_eq!(a.z, b.z, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn euler_round_trip_for_frame_from_normal() {
        let normals = [
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(-0.2, 0.9, 0.1),
            DVec3::new(0.0, 0.0, -1.0),
        ];
        for n in normals {
            let r = frame_from_normal(DVec3::ZERO, n, "f").rotation;
            let angles = euler_xyz_deg(&r);
            let back = rotation_from_euler_xyz_deg(angles[0], angles[1], angles[2]);
            for c in 0..3 {
                let a = r.col(c);
                let b = back.col(c);
                assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
                assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
                assert_relative_eq!(a.z, b.z, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn gimbal_lock_zeros_the_z_angle() {
        // Pitch of exactly 90 degrees puts the extraction in the singular branch
        let r = rotation_from_euler_xyz_deg(25.0, 90.0, 40.0);
        let angles = euler_xyz_deg(&r);
        assert_eq!(angles[2], 0.0);
        assert_relative_eq!(angles[1], 90.0, epsilon = 1e-9);
    }

    #[test]
    fn set_euler_updates_rotation() {
        let mut frame = Frame::new("f");
        frame.set_euler_deg([0.0, 0.0, 90.0]);
        // World X rotated 90 degrees about Z lands on world Y
        assert_relative_eq!(frame.x_axis().y, 1.0, epsilon = 1e-12);
    }
}
