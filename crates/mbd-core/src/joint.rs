//! Joint, joint axis, and motor types

use std::str::FromStr;

use glam::DVec3;

use crate::assembly::{AssemblyError, FrameId};

/// Kinematic joint type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointType {
    #[default]
    Fixed,
    Revolute,
    Prismatic,
    Cylindrical,
    Spherical,
}

impl JointType {
    /// Motors are an add-on for single-DOF driven joints only
    pub fn supports_motor(&self) -> bool {
        matches!(self, JointType::Revolute | JointType::Prismatic)
    }

    /// Wire name used by the export contract
    pub fn as_str(&self) -> &'static str {
        match self {
            JointType::Fixed => "FIXED",
            JointType::Revolute => "REVOLUTE",
            JointType::Prismatic => "PRISMATIC",
            JointType::Cylindrical => "CYLINDRICAL",
            JointType::Spherical => "SPHERICAL",
        }
    }

    pub fn all() -> &'static [JointType] {
        &[
            JointType::Fixed,
            JointType::Revolute,
            JointType::Prismatic,
            JointType::Cylindrical,
            JointType::Spherical,
        ]
    }
}

impl FromStr for JointType {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FIXED" => Ok(JointType::Fixed),
            "REVOLUTE" => Ok(JointType::Revolute),
            "PRISMATIC" => Ok(JointType::Prismatic),
            "CYLINDRICAL" => Ok(JointType::Cylindrical),
            "SPHERICAL" => Ok(JointType::Spherical),
            other => Err(AssemblyError::InvalidReference(format!(
                "unknown joint type '{other}'"
            ))),
        }
    }
}

/// Canonical joint axis, expressed relative to the joint frame.
///
/// The closed enum makes non-canonical axes unrepresentable inside the
/// model; free-form input is validated at the parse boundary by `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointAxis {
    PosX,
    NegX,
    PosY,
    NegY,
    #[default]
    PosZ,
    NegZ,
}

impl JointAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            JointAxis::PosX => "+X",
            JointAxis::NegX => "-X",
            JointAxis::PosY => "+Y",
            JointAxis::NegY => "-Y",
            JointAxis::PosZ => "+Z",
            JointAxis::NegZ => "-Z",
        }
    }

    /// Axis direction in joint-frame coordinates
    pub fn vector(&self) -> DVec3 {
        match self {
            JointAxis::PosX => DVec3::X,
            JointAxis::NegX => -DVec3::X,
            JointAxis::PosY => DVec3::Y,
            JointAxis::NegY => -DVec3::Y,
            JointAxis::PosZ => DVec3::Z,
            JointAxis::NegZ => -DVec3::Z,
        }
    }
}

impl FromStr for JointAxis {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "+X" | "X" => Ok(JointAxis::PosX),
            "-X" => Ok(JointAxis::NegX),
            "+Y" | "Y" => Ok(JointAxis::PosY),
            "-Y" => Ok(JointAxis::NegY),
            "+Z" | "Z" => Ok(JointAxis::PosZ),
            "-Z" => Ok(JointAxis::NegZ),
            other => Err(AssemblyError::InvalidJointAxis(other.to_string())),
        }
    }
}

/// Motor actuation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorType {
    /// Speed target: rad/s (revolute) or m/s (prismatic)
    Velocity,
    /// Torque/force target: N·m (revolute) or N (prismatic)
    Torque,
    /// Position target: rad (revolute) or m (prismatic)
    Position,
}

impl MotorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorType::Velocity => "VELOCITY",
            MotorType::Torque => "TORQUE",
            MotorType::Position => "POSITION",
        }
    }
}

impl FromStr for MotorType {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VELOCITY" => Ok(MotorType::Velocity),
            "TORQUE" => Ok(MotorType::Torque),
            "POSITION" => Ok(MotorType::Position),
            other => Err(AssemblyError::InvalidReference(format!(
                "unknown motor type '{other}'"
            ))),
        }
    }
}

/// Physical unit label for a motor value, fixed per motor type and joint type.
pub fn motor_units(motor_type: MotorType, joint_type: JointType) -> &'static str {
    let revolute = joint_type == JointType::Revolute;
    match motor_type {
        MotorType::Velocity => {
            if revolute {
                "rad/s"
            } else {
                "m/s"
            }
        }
        MotorType::Torque => {
            if revolute {
                "N·m"
            } else {
                "N"
            }
        }
        MotorType::Position => {
            if revolute {
                "rad"
            } else {
                "m"
            }
        }
    }
}

/// Motor actuation attached to a joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motor {
    pub motor_type: MotorType,
    pub value: f64,
}

/// A kinematic joint between two bodies.
///
/// The joint carries a single frame in world coordinates (not one per body);
/// bodies never move in the preprocessor, so no per-body transform is needed.
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub joint_type: JointType,
    /// First body id (-1 for ground)
    pub body1_id: i64,
    /// Second body id (-1 for ground)
    pub body2_id: i64,
    /// Joint frame, shared through the assembly's frame store
    pub frame: FrameId,
    /// Rotation/translation axis relative to the joint frame
    pub axis: JointAxis,
    pub motor: Option<Motor>,
}

impl Joint {
    pub fn new(
        name: impl Into<String>,
        joint_type: JointType,
        body1_id: i64,
        body2_id: i64,
        frame: FrameId,
        axis: JointAxis,
    ) -> Self {
        Self {
            name: name.into(),
            joint_type,
            body1_id,
            body2_id,
            frame,
            axis,
            motor: None,
        }
    }

    pub fn is_motorized(&self) -> bool {
        self.motor.is_some()
    }

    /// Attach a motor. Only revolute and prismatic joints can be driven, and
    /// a joint holds at most one motor.
    pub fn add_motor(&mut self, motor_type: MotorType, value: f64) -> Result<(), AssemblyError> {
        if !self.joint_type.supports_motor() {
            return Err(AssemblyError::UnsupportedJointType(self.joint_type));
        }
        if self.motor.is_some() {
            return Err(AssemblyError::AlreadyMotorized(self.name.clone()));
        }
        self.motor = Some(Motor { motor_type, value });
        Ok(())
    }

    /// Detach the motor. No-op when none is present.
    pub fn remove_motor(&mut self) {
        self.motor = None;
    }

    /// Human-readable motor summary for logs and listings
    pub fn motor_description(&self) -> String {
        match &self.motor {
            None => "No motor".to_string(),
            Some(motor) => format!(
                "{}: {} {}",
                motor.motor_type.as_str(),
                motor.value,
                motor_units(motor.motor_type, self.joint_type)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_round_trips_through_strings() {
        for axis in [
            JointAxis::PosX,
            JointAxis::NegX,
            JointAxis::PosY,
            JointAxis::NegY,
            JointAxis::PosZ,
            JointAxis::NegZ,
        ] {
            assert_eq!(axis.as_str().parse::<JointAxis>().unwrap(), axis);
        }
    }

    #[test]
    fn non_canonical_axis_is_rejected() {
        let err = "+W".parse::<JointAxis>().unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidJointAxis(_)));
    }

    #[test]
    fn motor_on_fixed_joint_is_rejected() {
        let mut joint = Joint::new(
            "j",
            JointType::Fixed,
            -1,
            0,
            FrameId::WORLD,
            JointAxis::PosZ,
        );
        let err = joint.add_motor(MotorType::Velocity, 1.0).unwrap_err();
        assert!(matches!(err, AssemblyError::UnsupportedJointType(_)));
    }

    #[test]
    fn second_motor_is_rejected() {
        let mut joint = Joint::new(
            "j",
            JointType::Revolute,
            -1,
            0,
            FrameId::WORLD,
            JointAxis::PosZ,
        );
        joint.add_motor(MotorType::Velocity, 3.0).unwrap();
        let err = joint.add_motor(MotorType::Torque, 1.0).unwrap_err();
        assert!(matches!(err, AssemblyError::AlreadyMotorized(_)));
    }

    #[test]
    fn remove_motor_is_idempotent() {
        let mut joint = Joint::new(
            "j",
            JointType::Prismatic,
            -1,
            0,
            FrameId::WORLD,
            JointAxis::PosX,
        );
        joint.remove_motor();
        joint.add_motor(MotorType::Position, 0.5).unwrap();
        joint.remove_motor();
        joint.remove_motor();
        assert!(!joint.is_motorized());
    }

    #[test]
    fn motor_unit_table() {
        assert_eq!(motor_units(MotorType::Velocity, JointType::Revolute), "rad/s");
        assert_eq!(motor_units(MotorType::Velocity, JointType::Prismatic), "m/s");
        assert_eq!(motor_units(MotorType::Torque, JointType::Revolute), "N·m");
        assert_eq!(motor_units(MotorType::Torque, JointType::Prismatic), "N");
        assert_eq!(motor_units(MotorType::Position, JointType::Revolute), "rad");
        assert_eq!(motor_units(MotorType::Position, JointType::Prismatic), "m");
    }
}
