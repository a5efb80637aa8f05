//! Multi-Body Dynamics Preprocessor Core
//!
//! This crate contains the core data structures for assembly preprocessing:
//! - Frame: coordinate frames and rotation algebra
//! - RigidBody / Joint / Force / Torque: the assembly entities
//! - Assembly: aggregate root owning all entities and shared frames
//! - Physics: unit-normalized volume, COM, and inertia resolution
//! - Export/Import: the JSON contract consumed by the downstream simulator

pub mod assembly;
pub mod body;
pub mod export;
pub mod frame;
pub mod import;
pub mod joint;
pub mod load;
pub mod measure;
pub mod mesh;
pub mod physics;
pub mod units;

pub use assembly::*;
pub use body::*;
pub use export::*;
pub use frame::*;
pub use import::*;
pub use joint::*;
pub use load::*;
pub use measure::*;
pub use mesh::*;
pub use physics::*;
pub use units::*;
