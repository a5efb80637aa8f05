//! Rigid body definition

use glam::{DMat3, DVec3};

use crate::assembly::FrameId;

/// Reserved id of the immovable ground body.
pub const GROUND_ID: i64 = -1;

/// A rigid body in the assembly.
///
/// Physical properties start unresolved and are filled in by the physics
/// normalizer; `center_of_mass == None` / `inertia_tensor == None` is a
/// valid, checkable state meaning "not calculated", never an error.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub id: i64,
    pub name: String,
    /// Volume in m³ (0.0 until calculated)
    pub volume: f64,
    /// Center of mass in meters, world frame
    pub center_of_mass: Option<DVec3>,
    /// Inertia tensor about the COM in kg·m², world-aligned, unit density
    pub inertia_tensor: Option<DMat3>,
    /// Frame at the COM with identity rotation, created once the COM is known.
    /// For the ground body this is the shared world frame.
    pub local_frame: Option<FrameId>,
    pub visible: bool,
    pub contact_enabled: bool,
}

impl RigidBody {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            volume: 0.0,
            center_of_mass: None,
            inertia_tensor: None,
            local_frame: None,
            visible: true,
            contact_enabled: true,
        }
    }

    /// Body with the default `Body_{id}` name.
    pub fn numbered(id: i64) -> Self {
        Self::new(id, format!("Body_{id}"))
    }

    /// The ground singleton: null geometry, COM fixed at the world origin,
    /// local frame shared with the world frame.
    pub(crate) fn ground() -> Self {
        Self {
            id: GROUND_ID,
            name: "Ground".to_string(),
            volume: 0.0,
            center_of_mass: Some(DVec3::ZERO),
            inertia_tensor: None,
            local_frame: Some(FrameId::WORLD),
            visible: true,
            contact_enabled: true,
        }
    }

    pub fn is_ground(&self) -> bool {
        self.id == GROUND_ID
    }
}
