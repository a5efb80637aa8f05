//! Mutation operations for Assembly (add, remove, cascade)

use glam::DVec3;

use super::{Assembly, AssemblyError, FrameId};
use crate::body::{GROUND_ID, RigidBody};
use crate::frame::Frame;
use crate::joint::{Joint, JointAxis, JointType, MotorType};
use crate::load::{Force, Torque};

impl Assembly {
    /// Register a frame in the store without exposing it by name.
    /// Used for body local frames and for frames carried by imported joints.
    pub(crate) fn insert_frame(&mut self, frame: Frame) -> FrameId {
        let id = FrameId(self.next_frame_id);
        self.next_frame_id += 1;
        self.frames.insert(id, frame);
        id
    }

    /// Add a body to the assembly.
    pub fn add_body(&mut self, body: RigidBody) -> Result<i64, AssemblyError> {
        if self.bodies.contains_key(&body.id) {
            return Err(AssemblyError::DuplicateName(format!(
                "body id {} ('{}')",
                body.id, body.name
            )));
        }
        let id = body.id;
        self.bodies.insert(id, body);
        Ok(id)
    }

    /// Add a user frame, optionally associated with a body (frames derived
    /// from a body's faces/edges/vertices cascade away with that body).
    pub fn add_frame(&mut self, frame: Frame, body_id: Option<i64>) -> Result<FrameId, AssemblyError> {
        if self.user_frames.contains_key(&frame.name) {
            return Err(AssemblyError::DuplicateName(frame.name.clone()));
        }
        if let Some(bid) = body_id
            && !self.bodies.contains_key(&bid)
        {
            return Err(AssemblyError::InvalidReference(format!("unknown body id {bid}")));
        }

        let name = frame.name.clone();
        let id = self.insert_frame(frame);
        self.user_frames.insert(name, id);
        if let Some(bid) = body_id {
            self.frame_to_body.insert(id, bid);
        }
        Ok(id)
    }

    /// Connect two bodies with a joint.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        joint_type: JointType,
        body1_id: i64,
        body2_id: i64,
        frame: FrameId,
        axis: JointAxis,
    ) -> Result<(), AssemblyError> {
        let name = name.into();
        if self.joints.contains_key(&name) {
            return Err(AssemblyError::DuplicateName(name));
        }
        if body1_id == body2_id {
            return Err(AssemblyError::InvalidReference(format!(
                "joint '{name}' connects body {body1_id} to itself"
            )));
        }
        for id in [body1_id, body2_id] {
            if !self.bodies.contains_key(&id) {
                return Err(AssemblyError::InvalidReference(format!("unknown body id {id}")));
            }
        }
        if !self.frames.contains_key(&frame) {
            return Err(AssemblyError::InvalidReference(format!(
                "joint '{name}' references a missing frame"
            )));
        }

        let joint = Joint::new(name.clone(), joint_type, body1_id, body2_id, frame, axis);
        self.joints.insert(name, joint);
        Ok(())
    }

    /// Attach a motor to a joint.
    pub fn add_motor(
        &mut self,
        joint_name: &str,
        motor_type: MotorType,
        value: f64,
    ) -> Result<(), AssemblyError> {
        let joint = self
            .joints
            .get_mut(joint_name)
            .ok_or_else(|| AssemblyError::InvalidReference(format!("unknown joint '{joint_name}'")))?;
        joint.add_motor(motor_type, value)
    }

    /// Detach a joint's motor. Idempotent: a joint without a motor is a no-op.
    pub fn remove_motor(&mut self, joint_name: &str) -> Result<(), AssemblyError> {
        let joint = self
            .joints
            .get_mut(joint_name)
            .ok_or_else(|| AssemblyError::InvalidReference(format!("unknown joint '{joint_name}'")))?;
        joint.remove_motor();
        Ok(())
    }

    /// Apply an external force to a body.
    pub fn add_force(
        &mut self,
        name: impl Into<String>,
        body_id: i64,
        frame: FrameId,
        magnitude: f64,
        direction: DVec3,
    ) -> Result<(), AssemblyError> {
        let name = name.into();
        if self.forces.contains_key(&name) {
            return Err(AssemblyError::DuplicateName(name));
        }
        self.check_load_refs(&name, body_id, frame)?;

        let force = Force::new(name.clone(), body_id, frame, magnitude, direction)?;
        self.forces.insert(name, force);
        Ok(())
    }

    /// Apply an external torque to a body.
    pub fn add_torque(
        &mut self,
        name: impl Into<String>,
        body_id: i64,
        frame: FrameId,
        magnitude: f64,
        axis: DVec3,
    ) -> Result<(), AssemblyError> {
        let name = name.into();
        if self.torques.contains_key(&name) {
            return Err(AssemblyError::DuplicateName(name));
        }
        self.check_load_refs(&name, body_id, frame)?;

        let torque = Torque::new(name.clone(), body_id, frame, magnitude, axis)?;
        self.torques.insert(name, torque);
        Ok(())
    }

    fn check_load_refs(&self, name: &str, body_id: i64, frame: FrameId) -> Result<(), AssemblyError> {
        if !self.bodies.contains_key(&body_id) {
            return Err(AssemblyError::InvalidReference(format!("unknown body id {body_id}")));
        }
        if !self.frames.contains_key(&frame) {
            return Err(AssemblyError::InvalidReference(format!(
                "load '{name}' references a missing frame"
            )));
        }
        Ok(())
    }

    /// Remove a body and everything that references it: joints on the body,
    /// forces and torques applied to it, user frames derived from it, and
    /// the body's own local frame.
    pub fn remove_body(&mut self, id: i64) -> Result<RigidBody, AssemblyError> {
        if id == GROUND_ID {
            return Err(AssemblyError::InvalidReference(
                "the ground body cannot be removed".to_string(),
            ));
        }
        let body = self
            .bodies
            .remove(&id)
            .ok_or_else(|| AssemblyError::InvalidReference(format!("unknown body id {id}")))?;

        self.joints.retain(|_, j| j.body1_id != id && j.body2_id != id);
        self.forces.retain(|_, f| f.body_id != id);
        self.torques.retain(|_, t| t.body_id != id);

        // User frames derived from the body, tracked by the explicit
        // association map rather than by name pattern
        let orphaned: Vec<FrameId> = self
            .frame_to_body
            .iter()
            .filter(|(_, bid)| **bid == id)
            .map(|(fid, _)| *fid)
            .collect();
        for fid in orphaned {
            self.frames.remove(&fid);
            self.frame_to_body.remove(&fid);
            self.user_frames.retain(|_, existing| *existing != fid);
        }

        if let Some(local) = body.local_frame {
            self.frames.remove(&local);
        }

        tracing::debug!("removed body {id} ('{}') with cascading references", body.name);
        Ok(body)
    }

    /// Remove a joint. Pure map removal, no cascade.
    pub fn remove_joint(&mut self, name: &str) -> Option<Joint> {
        self.joints.remove(name)
    }

    /// Remove a force. Pure map removal, no cascade.
    pub fn remove_force(&mut self, name: &str) -> Option<Force> {
        self.forces.remove(name)
    }

    /// Remove a torque. Pure map removal, no cascade.
    pub fn remove_torque(&mut self, name: &str) -> Option<Torque> {
        self.torques.remove(name)
    }

    /// Remove a user frame. Pure map removal: entities still holding the id
    /// resolve it to nothing from then on (and export `frame_world: null`).
    pub fn remove_frame(&mut self, name: &str) -> Option<Frame> {
        let id = self.user_frames.remove(name)?;
        self.frame_to_body.remove(&id);
        self.frames.remove(&id)
    }

    /// Create or refresh local frames for bodies whose COM is known.
    ///
    /// A body without a COM keeps `local_frame = None`, which downstream
    /// code treats as a valid "not calculated" state.
    pub fn init_local_frames(&mut self) {
        let targets: Vec<(i64, DVec3)> = self
            .bodies
            .values()
            .filter(|b| !b.is_ground())
            .filter_map(|b| b.center_of_mass.map(|com| (b.id, com)))
            .collect();

        for (id, com) in targets {
            let existing = self.bodies[&id].local_frame;
            match existing {
                Some(fid) => {
                    if let Some(frame) = self.frames.get_mut(&fid) {
                        frame.origin = com;
                    }
                }
                None => {
                    let name = format!("{}_local", self.bodies[&id].name);
                    let fid = self.insert_frame(Frame::at(name, com, glam::DMat3::IDENTITY));
                    if let Some(body) = self.bodies.get_mut(&id) {
                        body.local_frame = Some(fid);
                    }
                }
            }
        }
    }
}
