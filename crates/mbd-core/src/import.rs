//! Assembly import
//!
//! Reads a previously exported JSON document back into an [`Assembly`].
//! Import is best effort where the wire format is lossy: a body whose
//! `local_frame` is null is restored as uncalculated even though its
//! `center_of_mass` field reads `[0, 0, 0]`, an all-zero inertia tensor is
//! restored as "not calculated", and the frame-to-body associations used
//! for cascade deletion are not part of the document and come back empty.

use std::path::Path;

use glam::{DMat3, DVec3};

use crate::assembly::{Assembly, AssemblyError, FrameId};
use crate::body::{GROUND_ID, RigidBody};
use crate::export::{AssemblyDocument, BodyData, FrameData};
use crate::frame::Frame;
use crate::joint::{Joint, JointAxis, JointType, MotorType};
use crate::load::{Force, Torque};

/// Import errors, each naming the stage that failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("invalid document: {0}")]
    Invalid(String),
}

impl From<AssemblyError> for ImportError {
    fn from(e: AssemblyError) -> Self {
        ImportError::Invalid(e.to_string())
    }
}

fn frame_from_data(data: &FrameData) -> Frame {
    let r = &data.rotation_matrix;
    // Wire rows back to glam columns
    let rotation = DMat3::from_cols(
        DVec3::new(r[0][0], r[1][0], r[2][0]),
        DVec3::new(r[0][1], r[1][1], r[2][1]),
        DVec3::new(r[0][2], r[1][2], r[2][2]),
    );
    Frame::at(data.name.clone(), DVec3::from_array(data.origin), rotation)
}

fn inertia_from_rows(rows: &[[f64; 3]; 3]) -> Option<DMat3> {
    if rows.iter().flatten().all(|v| *v == 0.0) {
        // Indistinguishable on the wire from a true zero tensor; restored
        // as uncalculated
        return None;
    }
    Some(DMat3::from_cols(
        DVec3::new(rows[0][0], rows[1][0], rows[2][0]),
        DVec3::new(rows[0][1], rows[1][1], rows[2][1]),
        DVec3::new(rows[0][2], rows[1][2], rows[2][2]),
    ))
}

/// Restore a frame referenced by a joint or load. A null `frame_world`
/// (frame deleted before export) becomes a dangling id that resolves to
/// nothing, same as it did in the source assembly.
fn restore_frame_ref(assembly: &mut Assembly, data: Option<&FrameData>) -> FrameId {
    match data {
        Some(fd) => assembly.insert_frame(frame_from_data(fd)),
        None => {
            let id = FrameId(assembly.next_frame_id);
            assembly.next_frame_id += 1;
            id
        }
    }
}

fn restore_body(assembly: &mut Assembly, data: &BodyData) -> Result<(), ImportError> {
    if data.id == GROUND_ID {
        return Err(ImportError::Invalid(format!(
            "body '{}' uses the reserved ground id {GROUND_ID}",
            data.name
        )));
    }

    let mut body = RigidBody::new(data.id, data.name.clone());
    body.volume = data.volume;
    body.contact_enabled = data.contact_enabled;

    match &data.local_frame {
        Some(frame) => {
            // A present local frame implies the COM was calculated
            body.center_of_mass = Some(DVec3::from_array(data.center_of_mass));
            body.inertia_tensor = inertia_from_rows(&data.inertia_tensor);
            let fid = assembly.insert_frame(frame_from_data(frame));
            body.local_frame = Some(fid);
        }
        None => {
            body.center_of_mass = None;
            body.inertia_tensor = None;
        }
    }

    assembly.add_body(body)?;
    Ok(())
}

/// Load an assembly document from disk.
///
/// Returns the rebuilt assembly together with the source file's unit scale
/// (`metadata.original_unit_scale`, meters per model unit).
pub fn import_assembly(path: &Path) -> Result<(Assembly, f64), ImportError> {
    let text = std::fs::read_to_string(path).map_err(|e| ImportError::Io(e.to_string()))?;
    let document: AssemblyDocument =
        serde_json::from_str(&text).map_err(|e| ImportError::Parse(e.to_string()))?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Assembly")
        .to_string();
    let mut assembly = Assembly::new(name);

    for body in &document.bodies {
        restore_body(&mut assembly, body)?;
    }

    for (name, frame_data) in &document.frames {
        let mut frame = frame_from_data(frame_data);
        frame.name = name.clone();
        // Body association is not on the wire, so restored user frames no
        // longer cascade away with any body
        assembly.add_frame(frame, None)?;
    }

    for joint in &document.joints {
        let joint_type: JointType = joint.joint_type.parse()?;
        let axis: JointAxis = joint.axis.parse()?;
        for id in [joint.body1_id, joint.body2_id] {
            if assembly.body(id).is_none() {
                return Err(ImportError::Invalid(format!(
                    "joint '{}' references unknown body id {id}",
                    joint.name
                )));
            }
        }
        let frame = restore_frame_ref(&mut assembly, joint.frame_world.as_ref());

        // Inserted directly rather than through add_joint: a null
        // frame_world round-trips as a dangling frame id, which the
        // live-frame check on the interactive path would reject
        let mut restored =
            Joint::new(joint.name.clone(), joint_type, joint.body1_id, joint.body2_id, frame, axis);

        if joint.motorized {
            let motor_type: MotorType = joint
                .motor_type
                .as_deref()
                .ok_or_else(|| {
                    ImportError::Invalid(format!("joint '{}' is motorized but has no motor_type", joint.name))
                })?
                .parse()?;
            let value = joint.motor_value.ok_or_else(|| {
                ImportError::Invalid(format!("joint '{}' is motorized but has no motor_value", joint.name))
            })?;
            restored.add_motor(motor_type, value)?;
        }

        assembly.joints.insert(joint.name.clone(), restored);
    }

    for force in &document.forces {
        let frame = restore_frame_ref(&mut assembly, force.frame_world.as_ref());
        let restored = Force::new(
            force.name.clone(),
            force.body_id,
            frame,
            force.magnitude,
            DVec3::from_array(force.direction),
        )?;
        assembly.forces.insert(force.name.clone(), restored);
    }

    for torque in &document.torques {
        let frame = restore_frame_ref(&mut assembly, torque.frame_world.as_ref());
        let restored = Torque::new(
            torque.name.clone(),
            torque.body_id,
            frame,
            torque.magnitude,
            DVec3::from_array(torque.axis),
        )?;
        assembly.torques.insert(torque.name.clone(), restored);
    }

    tracing::info!(
        "imported assembly '{}': {} bodies, {} joints, {} frames",
        assembly.name,
        assembly.body_count(),
        assembly.joints.len(),
        assembly.user_frames.len()
    );

    Ok((assembly, document.metadata.original_unit_scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportOptions, export_assembly};
    use crate::frame::frame_from_point;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn sample_assembly() -> Assembly {
        let mut assembly = Assembly::new("sample");

        let mut crank = RigidBody::new(0, "Crank");
        crank.volume = 1.5e-4;
        crank.center_of_mass = Some(DVec3::new(0.1, 0.0, 0.02));
        crank.inertia_tensor = Some(DMat3::from_diagonal(DVec3::new(1e-6, 2e-6, 3e-6)));
        assembly.add_body(crank).unwrap();

        // Uncalculated body
        assembly.add_body(RigidBody::new(1, "Bracket")).unwrap();

        assembly.init_local_frames();

        let pivot = assembly
            .add_frame(frame_from_point(DVec3::new(0.0, 0.0, 0.05), "pivot"), None)
            .unwrap();
        assembly
            .add_joint("drive", JointType::Revolute, 0, GROUND_ID, pivot, JointAxis::PosZ)
            .unwrap();
        assembly.add_motor("drive", MotorType::Velocity, 3.0).unwrap();

        assembly
            .add_force("gravity_comp", 0, pivot, 9.81, DVec3::new(0.0, 0.0, 2.0))
            .unwrap();
        assembly
            .add_torque("friction", 0, pivot, 0.1, DVec3::Z)
            .unwrap();

        assembly
    }

    #[test]
    fn export_import_round_trip_preserves_the_system() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assembly.json");

        let original = sample_assembly();
        export_assembly(&original, 0.001, &path, &BTreeMap::new(), &ExportOptions::default())
            .unwrap();

        let (restored, unit_scale) = import_assembly(&path).unwrap();
        assert_eq!(unit_scale, 0.001);
        assert_eq!(restored.body_count(), 2);

        let crank = restored.body(0).unwrap();
        assert_relative_eq!(crank.volume, 1.5e-4, epsilon = 1e-12);
        let com = crank.center_of_mass.unwrap();
        assert_relative_eq!(com.x, 0.1, epsilon = 1e-12);
        let inertia = crank.inertia_tensor.unwrap();
        assert_relative_eq!(inertia.y_axis.y, 2e-6, epsilon = 1e-15);
        let local = restored.frame(crank.local_frame.unwrap()).unwrap();
        assert_relative_eq!(local.origin.x, 0.1, epsilon = 1e-12);

        // Uncalculated state survives the zero-filled wire encoding
        let bracket = restored.body(1).unwrap();
        assert!(bracket.center_of_mass.is_none());
        assert!(bracket.inertia_tensor.is_none());
        assert!(bracket.local_frame.is_none());

        let drive = restored.joint("drive").unwrap();
        assert_eq!(drive.joint_type, JointType::Revolute);
        assert_eq!(drive.axis, JointAxis::PosZ);
        assert_eq!(drive.body2_id, GROUND_ID);
        assert!(drive.is_motorized());
        let motor = drive.motor.as_ref().unwrap();
        assert_eq!(motor.motor_type, MotorType::Velocity);
        assert_eq!(motor.value, 3.0);
        let joint_frame = restored.frame(drive.frame).unwrap();
        assert_relative_eq!(joint_frame.origin.z, 0.05, epsilon = 1e-12);

        assert!(restored.user_frame_id("pivot").is_some());

        let force = restored.force("gravity_comp").unwrap();
        assert_relative_eq!(force.magnitude, 9.81, epsilon = 1e-12);
        assert_relative_eq!(force.direction.z, 1.0, epsilon = 1e-12);
        let torque = restored.torque("friction").unwrap();
        assert_relative_eq!(torque.magnitude, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn dangling_frame_reference_stays_dangling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assembly.json");

        let mut original = sample_assembly();
        original.remove_frame("pivot").unwrap();
        export_assembly(&original, 1.0, &path, &BTreeMap::new(), &ExportOptions::default())
            .unwrap();

        let (restored, _) = import_assembly(&path).unwrap();
        let drive = restored.joint("drive").unwrap();
        assert!(restored.frame(drive.frame).is_none());
        // The rest of the joint survives alongside the dangling reference
        assert_eq!(drive.axis, JointAxis::PosZ);
        assert!(drive.is_motorized());
    }

    #[test]
    fn unknown_joint_axis_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assembly.json");

        let original = sample_assembly();
        export_assembly(&original, 1.0, &path, &BTreeMap::new(), &ExportOptions::default())
            .unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        value["joints"][0]["axis"] = serde_json::json!("+W");
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        assert!(matches!(import_assembly(&path), Err(ImportError::Invalid(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(import_assembly(&path), Err(ImportError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            import_assembly(Path::new("/nonexistent/assembly.json")),
            Err(ImportError::Io(_))
        ));
    }
}
