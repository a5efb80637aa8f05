//! Physical-property normalization
//!
//! Raw kernel measurements arrive in model units; everything the exporter
//! sees must be SI. Volume scales with length³, linear quantities with
//! length¹, and geometric inertia with length⁵ (density is implicitly
//! 1 kg/m³ until a caller multiplies by a material density).

use std::collections::BTreeMap;

use crate::assembly::Assembly;
use crate::measure::RawBodyMeasurement;
use crate::units::unit_name_for;

/// Per-body property resolution failure. Non-fatal: a failed body is
/// reported and left uncalculated while its siblings proceed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("calculated volume is non-positive: {0}")]
    NonPositiveVolume(f64),
}

/// A reported failure for one body in a batch run.
#[derive(Debug, Clone)]
pub struct PropertyFailure {
    pub body_id: i64,
    pub error: PropertyError,
}

/// SI-resolved physical properties for one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyProperties {
    /// m³
    pub volume: f64,
    /// meters, world frame
    pub center_of_mass: Option<glam::DVec3>,
    /// kg·m² about the COM, world-aligned
    pub inertia_tensor: Option<glam::DMat3>,
}

/// Scale one raw measurement to SI.
///
/// `unit_scale` is meters per kernel unit. A non-positive raw volume marks
/// the whole measurement as failed; a missing COM or inertia is not an
/// error, it simply stays unresolved.
pub fn resolve_properties(
    raw: &RawBodyMeasurement,
    unit_scale: f64,
) -> Result<BodyProperties, PropertyError> {
    if raw.volume <= 0.0 {
        return Err(PropertyError::NonPositiveVolume(raw.volume));
    }

    Ok(BodyProperties {
        volume: raw.volume * unit_scale.powi(3),
        center_of_mass: raw.center_of_mass.map(|c| c * unit_scale),
        inertia_tensor: raw.inertia_tensor.map(|i| i * unit_scale.powi(5)),
    })
}

/// Resolve measurements for every body in the assembly.
///
/// Bodies are independent: one failure never aborts the batch. Failed (or
/// unmeasured) bodies keep volume 0, COM `None`, inertia `None`, and each
/// failure is returned for the caller to surface. Bodies with a resolved
/// COM get their local frame (COM origin, identity rotation) created or
/// refreshed.
pub fn apply_measurements(
    assembly: &mut Assembly,
    measurements: &BTreeMap<i64, RawBodyMeasurement>,
    unit_scale: f64,
) -> Vec<PropertyFailure> {
    tracing::info!(
        "normalizing {} measurement(s) at {} m/unit ({})",
        measurements.len(),
        unit_scale,
        unit_name_for(unit_scale)
    );

    let mut failures = Vec::new();

    for (&body_id, raw) in measurements {
        let Some(body) = assembly.body_mut(body_id) else {
            tracing::warn!("measurement for unknown body id {body_id}, skipping");
            continue;
        };

        match resolve_properties(raw, unit_scale) {
            Ok(props) => {
                body.volume = props.volume;
                body.center_of_mass = props.center_of_mass;
                body.inertia_tensor = props.inertia_tensor;
                tracing::debug!(
                    "body {} ('{}'): volume {:.6e} m³, COM {}",
                    body_id,
                    body.name,
                    props.volume,
                    if props.center_of_mass.is_some() { "resolved" } else { "unavailable" }
                );
            }
            Err(error) => {
                body.volume = 0.0;
                body.center_of_mass = None;
                body.inertia_tensor = None;
                tracing::warn!("body {} ('{}'): {error}", body_id, body.name);
                failures.push(PropertyFailure { body_id, error });
            }
        }
    }

    assembly.init_local_frames();
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBody;
    use approx::assert_relative_eq;
    use glam::{DMat3, DVec3};

    #[test]
    fn volume_scales_with_cube_of_unit_scale() {
        // Box measured in millimeters: 150000 mm³ -> 1.5e-4 m³
        let raw = RawBodyMeasurement {
            volume: 150_000.0,
            center_of_mass: None,
            inertia_tensor: None,
        };
        let props = resolve_properties(&raw, 0.001).unwrap();
        assert_relative_eq!(props.volume, 1.5e-4, epsilon = 1e-15);
    }

    #[test]
    fn com_scales_linearly() {
        let raw = RawBodyMeasurement {
            volume: 1.0,
            center_of_mass: Some(DVec3::new(100.0, -50.0, 25.0)),
            inertia_tensor: None,
        };
        let props = resolve_properties(&raw, 0.001).unwrap();
        let com = props.center_of_mass.unwrap();
        assert_relative_eq!(com.x, 0.1, epsilon = 1e-15);
        assert_relative_eq!(com.y, -0.05, epsilon = 1e-15);
        assert_relative_eq!(com.z, 0.025, epsilon = 1e-15);
    }

    #[test]
    fn inertia_scales_with_fifth_power() {
        let raw = RawBodyMeasurement {
            volume: 1.0,
            center_of_mass: Some(DVec3::ZERO),
            inertia_tensor: Some(DMat3::from_diagonal(DVec3::new(2.0, 3.0, 4.0))),
        };
        let s: f64 = 0.01;
        let props = resolve_properties(&raw, s).unwrap();
        let inertia = props.inertia_tensor.unwrap();
        assert_relative_eq!(inertia.x_axis.x, 2.0 * s.powi(5), epsilon = 1e-20);
        assert_relative_eq!(inertia.y_axis.y, 3.0 * s.powi(5), epsilon = 1e-20);
        assert_relative_eq!(inertia.z_axis.z, 4.0 * s.powi(5), epsilon = 1e-20);
    }

    #[test]
    fn non_positive_volume_fails() {
        let raw = RawBodyMeasurement {
            volume: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            resolve_properties(&raw, 1.0),
            Err(PropertyError::NonPositiveVolume(_))
        ));
    }

    #[test]
    fn one_failed_body_does_not_abort_the_batch() {
        let mut assembly = Assembly::new("test");
        assembly.add_body(RigidBody::numbered(0)).unwrap();
        assembly.add_body(RigidBody::numbered(1)).unwrap();
        assembly.add_body(RigidBody::numbered(2)).unwrap();

        let mut measurements = BTreeMap::new();
        measurements.insert(
            0,
            RawBodyMeasurement {
                volume: 8.0,
                center_of_mass: Some(DVec3::ONE),
                inertia_tensor: Some(DMat3::IDENTITY),
            },
        );
        measurements.insert(
            1,
            RawBodyMeasurement {
                volume: 0.0,
                ..Default::default()
            },
        );
        measurements.insert(
            2,
            RawBodyMeasurement {
                volume: 2.0,
                center_of_mass: Some(DVec3::new(0.5, 0.0, 0.0)),
                inertia_tensor: None,
            },
        );

        let failures = apply_measurements(&mut assembly, &measurements, 1.0);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].body_id, 1);

        let good = assembly.body(0).unwrap();
        assert_eq!(good.volume, 8.0);
        assert!(good.local_frame.is_some());

        let failed = assembly.body(1).unwrap();
        assert_eq!(failed.volume, 0.0);
        assert!(failed.center_of_mass.is_none());
        assert!(failed.inertia_tensor.is_none());
        assert!(failed.local_frame.is_none());

        // Body 2 resolved a COM but no inertia: valid partial state
        let partial = assembly.body(2).unwrap();
        assert!(partial.center_of_mass.is_some());
        assert!(partial.inertia_tensor.is_none());
        assert!(partial.local_frame.is_some());
    }
}
