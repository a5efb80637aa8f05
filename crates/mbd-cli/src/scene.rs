//! Scene description input format
//!
//! The CLI consumes a JSON scene description: bodies with raw kernel
//! measurements in model units, plus frames, joints, and loads. Building
//! turns it into a normalized [`Assembly`] (SI, world frame) ready for
//! export.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use glam::{DMat3, DVec3};
use serde::Deserialize;

use mbd_core::assembly::{Assembly, FrameId};
use mbd_core::body::RigidBody;
use mbd_core::frame::{frame_from_normal, frame_from_point};
use mbd_core::joint::{JointAxis, JointType, MotorType};
use mbd_core::measure::RawBodyMeasurement;
use mbd_core::mesh::TriangleMesh;
use mbd_core::physics::{PropertyFailure, apply_measurements};
use mbd_core::units::unit_scale_for;

#[derive(Debug, Deserialize)]
pub struct SceneDescription {
    pub name: String,
    /// Model length unit (METRE, MM, CM, INCH, FT); defaults to millimeters,
    /// the common CAD kernel default
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default)]
    pub bodies: Vec<BodyEntry>,
    #[serde(default)]
    pub frames: Vec<FrameEntry>,
    #[serde(default)]
    pub joints: Vec<JointEntry>,
    #[serde(default)]
    pub forces: Vec<ForceEntry>,
    #[serde(default)]
    pub torques: Vec<TorqueEntry>,
}

fn default_units() -> String {
    "MM".to_string()
}

#[derive(Debug, Deserialize)]
pub struct BodyEntry {
    pub id: i64,
    pub name: Option<String>,
    /// Raw kernel volume in model units³
    pub volume: Option<f64>,
    /// Raw kernel COM in model units, world frame
    pub center_of_mass: Option<[f64; 3]>,
    /// Raw geometric inertia about the COM in model units⁵, row-major
    pub inertia_tensor: Option<[[f64; 3]; 3]>,
    #[serde(default = "default_true")]
    pub contact_enabled: bool,
    /// Tessellated surface in model units, world frame
    pub mesh: Option<MeshEntry>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct MeshEntry {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

#[derive(Debug, Deserialize)]
pub struct FrameEntry {
    pub name: String,
    /// Model units, world frame
    pub origin: [f64; 3],
    /// Face normal; omitted for point-derived frames (identity rotation)
    pub normal: Option<[f64; 3]>,
    /// Body this frame was measured on; it cascades away with that body
    pub body_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct JointEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub joint_type: String,
    #[serde(default = "default_axis")]
    pub axis: String,
    pub body1_id: i64,
    pub body2_id: i64,
    /// Frame name; omitted means the world frame
    pub frame: Option<String>,
    pub motor: Option<MotorEntry>,
}

fn default_axis() -> String {
    "+Z".to_string()
}

#[derive(Debug, Deserialize)]
pub struct MotorEntry {
    #[serde(rename = "type")]
    pub motor_type: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct ForceEntry {
    pub name: String,
    pub body_id: i64,
    pub frame: Option<String>,
    /// Newtons
    pub magnitude: f64,
    pub direction: [f64; 3],
}

#[derive(Debug, Deserialize)]
pub struct TorqueEntry {
    pub name: String,
    pub body_id: i64,
    pub frame: Option<String>,
    /// Newton-meters
    pub magnitude: f64,
    pub axis: [f64; 3],
}

/// Everything the exporter needs, produced from one scene description.
#[derive(Debug)]
pub struct BuiltScene {
    pub assembly: Assembly,
    /// Meters per model unit
    pub unit_scale: f64,
    /// Meshes still in model units; the OBJ writer scales them
    pub meshes: BTreeMap<i64, TriangleMesh>,
    pub failures: Vec<PropertyFailure>,
}

fn mat3_from_rows(rows: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(rows[0][0], rows[1][0], rows[2][0]),
        DVec3::new(rows[0][1], rows[1][1], rows[2][1]),
        DVec3::new(rows[0][2], rows[1][2], rows[2][2]),
    )
}

fn resolve_frame(assembly: &Assembly, name: Option<&str>, owner: &str) -> Result<FrameId> {
    match name {
        None => Ok(FrameId::WORLD),
        Some(n) => assembly
            .user_frame_id(n)
            .with_context(|| format!("'{owner}' references unknown frame '{n}'")),
    }
}

/// Build a normalized assembly from a scene description.
pub fn build_scene(scene: &SceneDescription) -> Result<BuiltScene> {
    let unit_scale = unit_scale_for(&scene.units);
    let mut assembly = Assembly::new(scene.name.clone());
    let mut meshes = BTreeMap::new();
    let mut measurements = BTreeMap::new();

    for entry in &scene.bodies {
        let mut body = match &entry.name {
            Some(name) => RigidBody::new(entry.id, name.clone()),
            None => RigidBody::numbered(entry.id),
        };
        body.contact_enabled = entry.contact_enabled;
        assembly
            .add_body(body)
            .with_context(|| format!("adding body {}", entry.id))?;

        if let Some(volume) = entry.volume {
            measurements.insert(
                entry.id,
                RawBodyMeasurement {
                    volume,
                    center_of_mass: entry.center_of_mass.map(DVec3::from_array),
                    inertia_tensor: entry.inertia_tensor.as_ref().map(mat3_from_rows),
                },
            );
        }

        if let Some(mesh) = &entry.mesh {
            meshes.insert(
                entry.id,
                TriangleMesh {
                    vertices: mesh.vertices.iter().map(|v| DVec3::from_array(*v)).collect(),
                    triangles: mesh.triangles.clone(),
                },
            );
        }
    }

    // Normalizes to SI and creates body local frames
    let failures = apply_measurements(&mut assembly, &measurements, unit_scale);

    for entry in &scene.frames {
        let origin = DVec3::from_array(entry.origin) * unit_scale;
        let frame = match entry.normal {
            Some(normal) => frame_from_normal(origin, DVec3::from_array(normal), &entry.name),
            None => frame_from_point(origin, &entry.name),
        };
        assembly
            .add_frame(frame, entry.body_id)
            .with_context(|| format!("adding frame '{}'", entry.name))?;
    }

    for entry in &scene.joints {
        let joint_type: JointType = entry
            .joint_type
            .parse()
            .with_context(|| format!("joint '{}'", entry.name))?;
        let axis: JointAxis = entry
            .axis
            .parse()
            .with_context(|| format!("joint '{}'", entry.name))?;
        let frame = resolve_frame(&assembly, entry.frame.as_deref(), &entry.name)?;

        assembly
            .add_joint(&entry.name, joint_type, entry.body1_id, entry.body2_id, frame, axis)
            .with_context(|| format!("adding joint '{}'", entry.name))?;

        if let Some(motor) = &entry.motor {
            let motor_type: MotorType = motor
                .motor_type
                .parse()
                .with_context(|| format!("motor on joint '{}'", entry.name))?;
            assembly
                .add_motor(&entry.name, motor_type, motor.value)
                .with_context(|| format!("motor on joint '{}'", entry.name))?;
        }
    }

    for entry in &scene.forces {
        let frame = resolve_frame(&assembly, entry.frame.as_deref(), &entry.name)?;
        assembly
            .add_force(
                &entry.name,
                entry.body_id,
                frame,
                entry.magnitude,
                DVec3::from_array(entry.direction),
            )
            .with_context(|| format!("adding force '{}'", entry.name))?;
    }

    for entry in &scene.torques {
        let frame = resolve_frame(&assembly, entry.frame.as_deref(), &entry.name)?;
        assembly
            .add_torque(
                &entry.name,
                entry.body_id,
                frame,
                entry.magnitude,
                DVec3::from_array(entry.axis),
            )
            .with_context(|| format!("adding torque '{}'", entry.name))?;
    }

    if scene.joints.is_empty() {
        tracing::warn!("scene '{}' defines no joints", scene.name);
    }

    Ok(BuiltScene {
        assembly,
        unit_scale,
        meshes,
        failures,
    })
}
