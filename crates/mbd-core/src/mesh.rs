//! Wavefront OBJ side export for tessellated body meshes
//!
//! Tessellation itself is done by an external collaborator; this module only
//! consumes ready triangle lists and writes them next to the assembly JSON.

use std::fmt::Write as _;
use std::path::Path;

use glam::DVec3;

use crate::body::RigidBody;
use crate::frame::Frame;

/// A tessellated body surface in kernel units, world frame.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub vertices: Vec<DVec3>,
    /// 0-based vertex indices, one triple per triangle
    pub triangles: Vec<[u32; 3]>,
}

/// Coordinate system for written mesh vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshCoordinates {
    /// Vertices in meters, global world frame
    #[default]
    World,
    /// Vertices in meters, translated to the body COM and rotated into the
    /// body's local frame
    ComLocal,
}

/// Mesh-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(String),
}

/// Stable, collision-free mesh filename for a body.
pub fn mesh_filename(body: &RigidBody) -> String {
    format!("{}_{}.obj", body.name, body.id)
}

/// Write a mesh as a Wavefront OBJ triangle file.
///
/// Vertices are scaled to meters. `local_frame` selects COM-centered local
/// coordinates (the frame origin is the COM); `None` writes world-frame
/// coordinates. The header records counts and the coordinate system so the
/// consumer can tell which convention was used.
pub fn write_obj(
    mesh: &TriangleMesh,
    path: &Path,
    object_name: &str,
    unit_scale: f64,
    local_frame: Option<&Frame>,
) -> Result<(), MeshError> {
    let mut out = String::new();

    let coord_system = match local_frame {
        Some(_) => "Body local frame (COM-centered)",
        None => "Global world frame",
    };

    let _ = writeln!(out, "# OBJ file exported from Multi-Body Dynamics Preprocessor");
    let _ = writeln!(out, "# Object: {object_name}");
    let _ = writeln!(out, "# Vertices: {}", mesh.vertices.len());
    let _ = writeln!(out, "# Faces: {}", mesh.triangles.len());
    let _ = writeln!(out, "# Coordinate system: {coord_system}");
    let _ = writeln!(out);
    let _ = writeln!(out, "o {object_name}");
    let _ = writeln!(out);

    for v in &mesh.vertices {
        let world = *v * unit_scale;
        let p = match local_frame {
            // Inverse rotation of an orthonormal matrix is its transpose
            Some(frame) => frame.rotation.transpose() * (world - frame.origin),
            None => world,
        };
        let _ = writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z);
    }

    let _ = writeln!(out);

    for t in &mesh.triangles {
        // OBJ face indices are 1-based
        let _ = writeln!(out, "f {} {} {}", t[0] + 1, t[1] + 1, t[2] + 1);
    }

    std::fs::write(path, out).map_err(|e| MeshError::Io(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DMat3;

    fn unit_triangle() -> TriangleMesh {
        TriangleMesh {
            vertices: vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1000.0, 0.0, 0.0),
                DVec3::new(0.0, 1000.0, 0.0),
            ],
            triangles: vec![[0, 1, 2]],
        }
    }

    #[test]
    fn mesh_filename_is_name_and_id() {
        let body = RigidBody::new(7, "Crank");
        assert_eq!(mesh_filename(&body), "Crank_7.obj");
    }

    #[test]
    fn obj_output_scales_and_indexes_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        write_obj(&unit_triangle(), &path, "tri", 0.001, None).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Vertices: 3"));
        assert!(text.contains("# Faces: 1"));
        assert!(text.contains("# Coordinate system: Global world frame"));
        assert!(text.contains("v 1.000000 0.000000 0.000000"));
        assert!(text.contains("f 1 2 3"));
    }

    #[test]
    fn com_local_output_recenters_vertices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri_local.obj");
        // COM at the second vertex (in meters)
        let local = Frame::at("local", DVec3::new(1.0, 0.0, 0.0), DMat3::IDENTITY);
        write_obj(&unit_triangle(), &path, "tri", 0.001, Some(&local)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Coordinate system: Body local frame (COM-centered)"));
        assert!(text.contains("v -1.000000 0.000000 0.000000"));
        assert!(text.contains("v 0.000000 0.000000 0.000000"));
    }
}
