//! Assembly export
//!
//! Emits the JSON document (plus sibling OBJ meshes) consumed by the
//! downstream physics simulator. Every numeric field is already SI and
//! world-frame; the exporter performs no transform of its own beyond the
//! unit normalization done upstream, because bodies are static in the
//! preprocessor. The document layout is a stable contract: field names and
//! nesting must not drift.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::body::RigidBody;
use crate::frame::Frame;
use crate::joint::{Joint, motor_units};
use crate::load::{Force, Torque};
use crate::mesh::{MeshCoordinates, TriangleMesh, mesh_filename, write_obj};

/// Export errors, fatal to the single export call. The in-memory assembly
/// is never touched and no partial JSON is written.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("mesh export failed: {0}")]
    Mesh(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Export options
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Write OBJ meshes alongside the JSON and record their relative URIs
    pub export_meshes: bool,
    /// Coordinate system for written mesh vertices
    pub mesh_coordinates: MeshCoordinates,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            export_meshes: true,
            mesh_coordinates: MeshCoordinates::World,
        }
    }
}

/// Top-level document shape. Field order is part of the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyDocument {
    pub metadata: Metadata,
    pub ground_body: BodyData,
    pub bodies: Vec<BodyData>,
    pub joints: Vec<JointData>,
    pub frames: BTreeMap<String, FrameData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forces: Vec<ForceData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub torques: Vec<TorqueData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub description: String,
    pub coordinate_system: String,
    /// Always 1.0: all exported data is normalized to meters
    pub unit_scale: f64,
    /// Meters per unit of the loaded source file
    pub original_unit_scale: f64,
    pub units: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyData {
    pub id: i64,
    pub name: String,
    pub volume: f64,
    pub contact_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_file: Option<String>,
    /// [0, 0, 0] when not calculated; the consumer must treat the all-zero
    /// case as "uncalculated", not as a literal zero
    pub center_of_mass: [f64; 3],
    /// All-zero 3×3 when not calculated (same caveat as `center_of_mass`)
    pub inertia_tensor: [[f64; 3]; 3],
    pub local_frame: Option<FrameData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameData {
    pub name: String,
    pub origin: [f64; 3],
    /// Row-major
    pub rotation_matrix: [[f64; 3]; 3],
    pub euler_angles_deg: [f64; 3],
    pub x_axis: [f64; 3],
    pub y_axis: [f64; 3],
    pub z_axis: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointData {
    pub name: String,
    #[serde(rename = "type")]
    pub joint_type: String,
    pub axis: String,
    pub body1_id: i64,
    pub body1_name: String,
    pub body2_id: i64,
    pub body2_name: String,
    pub motorized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor_units: Option<String>,
    pub frame_world: Option<FrameData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceData {
    pub name: String,
    pub body_id: i64,
    pub body_name: String,
    /// Newtons
    pub magnitude: f64,
    /// Unit vector, world frame
    pub direction: [f64; 3],
    pub frame_world: Option<FrameData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorqueData {
    pub name: String,
    pub body_id: i64,
    pub body_name: String,
    /// Newton-meters
    pub magnitude: f64,
    /// Unit vector, world frame
    pub axis: [f64; 3],
    pub frame_world: Option<FrameData>,
}

fn vec3(v: glam::DVec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

fn mat3_rows(m: &glam::DMat3) -> [[f64; 3]; 3] {
    // Columns of the matrix are the frame axes; the wire format is row-major
    [
        [m.x_axis.x, m.y_axis.x, m.z_axis.x],
        [m.x_axis.y, m.y_axis.y, m.z_axis.y],
        [m.x_axis.z, m.y_axis.z, m.z_axis.z],
    ]
}

impl FrameData {
    /// Serialize a frame. The axis vectors are recomputed from the rotation
    /// matrix (redundant with it, included for consumer convenience) so the
    /// two representations can never disagree.
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            name: frame.name.clone(),
            origin: vec3(frame.origin),
            rotation_matrix: mat3_rows(&frame.rotation),
            euler_angles_deg: frame.euler_deg(),
            x_axis: vec3(frame.x_axis()),
            y_axis: vec3(frame.y_axis()),
            z_axis: vec3(frame.z_axis()),
        }
    }
}

fn body_data(assembly: &Assembly, body: &RigidBody, mesh_uri: Option<String>) -> BodyData {
    BodyData {
        id: body.id,
        name: body.name.clone(),
        volume: body.volume,
        contact_enabled: body.contact_enabled,
        mesh_file: mesh_uri,
        center_of_mass: body.center_of_mass.map(vec3).unwrap_or([0.0; 3]),
        inertia_tensor: body
            .inertia_tensor
            .as_ref()
            .map(mat3_rows)
            .unwrap_or([[0.0; 3]; 3]),
        local_frame: body
            .local_frame
            .and_then(|id| assembly.frame(id))
            .map(FrameData::from_frame),
    }
}

fn joint_data(assembly: &Assembly, joint: &Joint) -> JointData {
    let body_name = |id: i64| {
        assembly
            .body(id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    let (motor_type, motor_value, units) = match &joint.motor {
        Some(motor) => (
            Some(motor.motor_type.as_str().to_string()),
            Some(motor.value),
            Some(motor_units(motor.motor_type, joint.joint_type).to_string()),
        ),
        None => (None, None, None),
    };

    JointData {
        name: joint.name.clone(),
        joint_type: joint.joint_type.as_str().to_string(),
        axis: joint.axis.as_str().to_string(),
        body1_id: joint.body1_id,
        body1_name: body_name(joint.body1_id),
        body2_id: joint.body2_id,
        body2_name: body_name(joint.body2_id),
        motorized: joint.is_motorized(),
        motor_type,
        motor_value,
        motor_units: units,
        frame_world: assembly.frame(joint.frame).map(FrameData::from_frame),
    }
}

fn force_data(assembly: &Assembly, force: &Force) -> ForceData {
    ForceData {
        name: force.name.clone(),
        body_id: force.body_id,
        body_name: assembly
            .body(force.body_id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        magnitude: force.magnitude,
        direction: vec3(force.direction),
        frame_world: assembly.frame(force.frame).map(FrameData::from_frame),
    }
}

fn torque_data(assembly: &Assembly, torque: &Torque) -> TorqueData {
    TorqueData {
        name: torque.name.clone(),
        body_id: torque.body_id,
        body_name: assembly
            .body(torque.body_id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        magnitude: torque.magnitude,
        axis: vec3(torque.axis),
        frame_world: assembly.frame(torque.frame).map(FrameData::from_frame),
    }
}

/// Build the full document without touching the filesystem.
pub fn build_document(
    assembly: &Assembly,
    original_unit_scale: f64,
    mesh_uris: &BTreeMap<i64, String>,
) -> AssemblyDocument {
    AssemblyDocument {
        metadata: Metadata {
            version: "1.0".to_string(),
            description: "Multi-Body Dynamics Assembly Export".to_string(),
            coordinate_system: "global_world_frame".to_string(),
            unit_scale: 1.0,
            original_unit_scale,
            units: "meters".to_string(),
        },
        ground_body: body_data(assembly, assembly.ground(), None),
        bodies: assembly
            .bodies()
            .map(|b| body_data(assembly, b, mesh_uris.get(&b.id).cloned()))
            .collect(),
        joints: assembly.joints().map(|j| joint_data(assembly, j)).collect(),
        frames: assembly
            .user_frames()
            .map(|(name, frame)| (name.to_string(), FrameData::from_frame(frame)))
            .collect(),
        forces: assembly.forces().map(|f| force_data(assembly, f)).collect(),
        torques: assembly.torques().map(|t| torque_data(assembly, t)).collect(),
    }
}

/// Export the assembly to `output_path` with meshes in a sibling `meshes/`
/// directory.
///
/// `meshes` maps body ids to tessellated surfaces in kernel units; bodies
/// without an entry get no `mesh_file`. Directory or write failures abort
/// the whole call; the JSON is serialized in memory first so a failed
/// export never leaves a partial document behind.
pub fn export_assembly(
    assembly: &Assembly,
    original_unit_scale: f64,
    output_path: &Path,
    meshes: &BTreeMap<i64, TriangleMesh>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let output_dir = match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&output_dir).map_err(|e| ExportError::Io(e.to_string()))?;

    let mut mesh_uris: BTreeMap<i64, String> = BTreeMap::new();

    if options.export_meshes && !meshes.is_empty() {
        let mesh_rel_dir = "meshes";
        let meshes_dir = output_dir.join(mesh_rel_dir);
        std::fs::create_dir_all(&meshes_dir).map_err(|e| ExportError::Io(e.to_string()))?;

        for body in assembly.bodies() {
            let Some(mesh) = meshes.get(&body.id) else {
                tracing::debug!("skipping body '{}' (no mesh)", body.name);
                continue;
            };

            let filename = mesh_filename(body);
            let local_frame = match options.mesh_coordinates {
                MeshCoordinates::World => None,
                MeshCoordinates::ComLocal => body.local_frame.and_then(|id| assembly.frame(id)),
            };
            write_obj(
                mesh,
                &meshes_dir.join(&filename),
                &body.name,
                original_unit_scale,
                local_frame,
            )
            .map_err(|e| ExportError::Mesh(e.to_string()))?;

            mesh_uris.insert(body.id, format!("{mesh_rel_dir}/{filename}"));
        }
        tracing::info!("exported {} mesh(es) to {}", mesh_uris.len(), meshes_dir.display());
    }

    let document = build_document(assembly, original_unit_scale, &mesh_uris);
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    std::fs::write(output_path, json).map_err(|e| ExportError::Io(e.to_string()))?;

    tracing::info!("assembly exported to {}", output_path.display());
    Ok(())
}
