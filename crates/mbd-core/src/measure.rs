//! Measurement records supplied by the external geometry kernel
//!
//! The kernel enumerates faces, edges, and vertices of each solid and hands
//! back plain measurements. This crate never touches the kernel itself; these
//! records are its only interface. Linear quantities arrive already scaled to
//! meters, while per-body bulk measurements ([`RawBodyMeasurement`]) stay in
//! kernel units until the physics normalizer resolves them.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, frame_from_direction, frame_from_normal, frame_from_point};

/// Face measurement: area, center, and outward normal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceMeasurement {
    pub index: usize,
    /// Surface area in m²
    pub area: f64,
    /// Face center in meters, world frame
    pub center: DVec3,
    /// Unit normal at the face center
    pub normal: DVec3,
}

impl FaceMeasurement {
    /// Derive a frame at the face center with Z along the normal.
    pub fn frame(&self, name: impl Into<String>) -> Frame {
        frame_from_normal(self.center, self.normal, name)
    }
}

/// Edge measurement: length, midpoint, and direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeMeasurement {
    pub index: usize,
    /// Edge length in meters
    pub length: f64,
    /// Midpoint in meters, world frame
    pub midpoint: DVec3,
    /// Unit direction along the edge
    pub direction: DVec3,
}

impl EdgeMeasurement {
    /// Derive a frame at the edge midpoint with Z along the direction.
    pub fn frame(&self, name: impl Into<String>) -> Frame {
        frame_from_direction(self.midpoint, self.direction, name)
    }
}

/// Vertex measurement: a bare point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexMeasurement {
    pub index: usize,
    /// Position in meters, world frame
    pub point: DVec3,
}

impl VertexMeasurement {
    /// Derive a world-aligned frame at the vertex.
    pub fn frame(&self, name: impl Into<String>) -> Frame {
        frame_from_point(self.point, name)
    }
}

/// Raw bulk measurement for one body, in kernel units with unit density.
///
/// `center_of_mass` and `inertia_tensor` are `None` when the kernel failed to
/// produce them; the inertia tensor is symmetric and taken about the COM.
#[derive(Debug, Clone, Default)]
pub struct RawBodyMeasurement {
    /// Volume in kernel units³
    pub volume: f64,
    /// COM in kernel units
    pub center_of_mass: Option<DVec3>,
    /// Inertia about the COM in kernel units⁵ (unit density)
    pub inertia_tensor: Option<DMat3>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn face_frame_uses_center_and_normal() {
        let face = FaceMeasurement {
            index: 0,
            area: 2.0,
            center: DVec3::new(1.0, 0.0, 0.5),
            normal: DVec3::new(0.0, 1.0, 0.0),
        };
        let frame = face.frame("face_0");
        assert_eq!(frame.origin, face.center);
        assert_relative_eq!(frame.z_axis().y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn vertex_frame_is_world_aligned() {
        let vertex = VertexMeasurement {
            index: 3,
            point: DVec3::new(-1.0, 2.0, 0.0),
        };
        let frame = vertex.frame("v3");
        assert_eq!(frame.rotation, glam::DMat3::IDENTITY);
        assert_eq!(frame.origin, vertex.point);
    }
}
