//! Length-unit resolution for loaded source files
//!
//! CAD exchange files declare their length unit by name; everything
//! downstream works in meters. The scale factor resolved here is applied
//! once per loaded file.

/// Resolve a declared length-unit name to a meters-per-unit scale factor.
///
/// Unrecognized names default to 1.0 and emit a warning, matching the
/// behavior expected by callers that batch-load files of mixed provenance.
pub fn unit_scale_for(name: &str) -> f64 {
    match name.trim().to_uppercase().as_str() {
        "METRE" | "METER" | "M" => 1.0,
        "MILLIMETRE" | "MILLIMETER" | "MM" => 0.001,
        "CENTIMETRE" | "CENTIMETER" | "CM" => 0.01,
        "INCH" | "IN" => 0.0254,
        "FOOT" | "FT" => 0.3048,
        other => {
            tracing::warn!("unrecognized length unit '{other}', assuming meters (scale 1.0)");
            1.0
        }
    }
}

/// Display name for a resolved scale factor.
pub fn unit_name_for(scale: f64) -> &'static str {
    if (scale - 1.0).abs() < 1e-9 {
        "meters"
    } else if (scale - 0.001).abs() < 1e-9 {
        "millimeters"
    } else if (scale - 0.01).abs() < 1e-9 {
        "centimeters"
    } else if (scale - 0.0254).abs() < 1e-9 {
        "inches"
    } else if (scale - 0.3048).abs() < 1e-9 {
        "feet"
    } else {
        "unknown"
    }
}
