//! Assembly: the aggregate root owning bodies, joints, loads, and frames

mod graph;

use std::collections::{BTreeMap, HashMap};

use crate::body::{GROUND_ID, RigidBody};
use crate::frame::Frame;
use crate::joint::{Joint, JointType};
use crate::load::{Force, Torque};

/// Stable handle into the assembly's frame store.
///
/// Joints, forces, torques, and body local frames all reference frames by id
/// rather than holding copies, so an in-place edit through
/// [`Assembly::frame_mut`] is visible to every entity pointing at the frame.
/// That shared-mutation behavior is intentional: moving a user frame moves
/// everything attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub(crate) u32);

impl FrameId {
    /// The fixed global coordinate system; all stored frames are expressed
    /// in it.
    pub const WORLD: FrameId = FrameId(0);
}

/// Errors raised by assembly mutations.
///
/// Invariant violations are rejected synchronously at the offending call; no
/// invalid entity is ever partially inserted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    #[error("name already in use: {0}")]
    DuplicateName(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("direction vector is zero (norm {0:.3e})")]
    InvalidDirection(f64),

    #[error("invalid joint axis '{0}' (expected one of +X, -X, +Y, -Y, +Z, -Z)")]
    InvalidJointAxis(String),

    #[error("motors are only supported on revolute and prismatic joints, not {}", .0.as_str())]
    UnsupportedJointType(JointType),

    #[error("joint '{0}' already has a motor")]
    AlreadyMotorized(String),
}

/// Container for the multi-body system.
///
/// All entity collections are owned exclusively by the assembly and mutated
/// only through its API. Name-keyed collections enforce global key
/// uniqueness at insertion. Collections are ordered maps so that iteration
/// (and therefore export) order is deterministic.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub name: String,
    /// All bodies including the ground singleton at id -1
    pub(crate) bodies: BTreeMap<i64, RigidBody>,
    /// Frame store; id 0 is the world frame, other entries are body local
    /// frames and user frames
    pub(crate) frames: HashMap<FrameId, Frame>,
    /// User-created frames by name (local frames and the world frame are
    /// deliberately not part of this mapping)
    pub(crate) user_frames: BTreeMap<String, FrameId>,
    /// Which body a user frame was derived from, for cascade deletion
    pub(crate) frame_to_body: HashMap<FrameId, i64>,
    pub(crate) joints: BTreeMap<String, Joint>,
    pub(crate) forces: BTreeMap<String, Force>,
    pub(crate) torques: BTreeMap<String, Torque>,
    pub(crate) next_frame_id: u32,
}

impl Assembly {
    /// Empty assembly holding only the ground body and the world frame.
    pub fn new(name: impl Into<String>) -> Self {
        let mut frames = HashMap::new();
        frames.insert(FrameId::WORLD, Frame::new("World"));

        let mut bodies = BTreeMap::new();
        bodies.insert(GROUND_ID, RigidBody::ground());

        Self {
            name: name.into(),
            bodies,
            frames,
            user_frames: BTreeMap::new(),
            frame_to_body: HashMap::new(),
            joints: BTreeMap::new(),
            forces: BTreeMap::new(),
            torques: BTreeMap::new(),
            next_frame_id: 1,
        }
    }

    pub fn body(&self, id: i64) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: i64) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    pub fn ground(&self) -> &RigidBody {
        &self.bodies[&GROUND_ID]
    }

    /// Non-ground bodies in id order
    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.values().filter(|b| !b.is_ground())
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len() - 1
    }

    pub fn world_frame(&self) -> &Frame {
        &self.frames[&FrameId::WORLD]
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get(&id)
    }

    /// Mutable access to a frame. Edits are visible to every joint, force,
    /// or torque referencing the frame.
    pub fn frame_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.frames.get_mut(&id)
    }

    pub fn user_frame_id(&self, name: &str) -> Option<FrameId> {
        self.user_frames.get(name).copied()
    }

    /// User-created frames in name order
    pub fn user_frames(&self) -> impl Iterator<Item = (&str, &Frame)> {
        self.user_frames
            .iter()
            .filter_map(|(name, id)| self.frames.get(id).map(|f| (name.as_str(), f)))
    }

    /// Body a user frame was derived from, if any
    pub fn frame_body(&self, id: FrameId) -> Option<i64> {
        self.frame_to_body.get(&id).copied()
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.get(name)
    }

    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.values()
    }

    pub fn force(&self, name: &str) -> Option<&Force> {
        self.forces.get(name)
    }

    pub fn forces(&self) -> impl Iterator<Item = &Force> {
        self.forces.values()
    }

    pub fn torque(&self, name: &str) -> Option<&Torque> {
        self.torques.get(name)
    }

    pub fn torques(&self) -> impl Iterator<Item = &Torque> {
        self.torques.values()
    }
}

impl Default for Assembly {
    fn default() -> Self {
        Self::new("Assembly")
    }
}
