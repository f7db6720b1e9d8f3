//! Engine tuning calculator: the tool menu plus the common formulas.

use std::f64::consts::PI;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Two,
    Four,
}

impl Stroke {
    pub fn slug(self) -> &'static str {
        match self {
            Stroke::Two => "two-stroke",
            Stroke::Four => "four-stroke",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub title: &'static str,
    pub description: &'static str,
    pub slug: &'static str,
}

const fn tool(title: &'static str, description: &'static str, slug: &'static str) -> Tool {
    Tool {
        title,
        description,
        slug,
    }
}

const TWO_STROKE: &[Tool] = &[
    tool("Volume Kapasitas Silinder", "Cylinder Capacity Volume", "cylinder-capacity"),
    tool("Rasio Kompresi", "Compression Ratio", "compression-ratio"),
    tool("Clearance", "Clearance", "clearance"),
    tool("Squish Head", "Squish Head", "squish-head"),
    tool("Durasi Mesin 2 Tak", "2 Stroke Engine Duration", "duration-2-stroke"),
    tool("Porting Polish", "Porting Polish", "porting-polish"),
    tool("Piston Speed", "Piston Speed", "piston-speed"),
    tool("Batas Aman Putaran Mesin", "Safe Engine RPM", "safe-engine-rpm"),
    tool(
        "Diameter Ideal Karburator 2 Tak",
        "Ideal Carburetor Diameter for 2 Stroke",
        "ideal-carburetor-diameter-2-stroke",
    ),
    tool("Potensi Top Speed", "Top Speed Potential", "top-speed-potential"),
    tool(
        "Rasio Transmisi/Rasio Final Gear",
        "Transmission / Final Gear Ratio",
        "transmission-ratio",
    ),
];

const FOUR_STROKE: &[Tool] = &[
    tool("Volume Kapasitas Silinder", "Cylinder Capacity Volume", "cylinder-capacity"),
    tool("Noken As", "Camshaft", "camshaft"),
    tool("Porting Polish", "Porting Polish", "porting-polish"),
    tool("Klep", "Valve", "valve"),
    tool("Per Klep", "Valve Spring", "valve-spring"),
    tool("Rasio Kompresi", "Compression Ratio", "compression-ratio"),
    tool("Effective Stroke", "Effective Stroke", "effective-stroke"),
    tool("Kruk As", "Crankshaft", "crankshaft"),
    tool("Piston Speed", "Piston Speed", "piston-speed"),
    tool("Batas Aman Putaran Mesin", "Safe Engine RPM", "safe-engine-rpm"),
    tool("Gap Ring Piston", "Piston Ring Gap", "piston-ring-gap"),
    tool(
        "Panjang Pickup Motor",
        "Motorcycle Pickup Length",
        "motorcycle-pickup-length",
    ),
    tool("Injektor Bahan Bakar", "Fuel Injector", "fuel-injector"),
    tool("Karburator/Trottle Body", "Carburetor/Throttle Body", "carburetor"),
    tool("Intake Filter", "Intake Filter", "intake-filter"),
    tool("Knalpot Racing", "Racing Exhaust", "racing-exhaust"),
    tool("Potensi Top Speed", "Top Speed Potential", "top-speed-potential"),
    tool(
        "Potensi Performa Mesin (DK & Torsi)",
        "Engine Performance Potential (HP & Torque)",
        "engine-performance-potential",
    ),
    tool(
        "Rasio Transmisi/Rasio Final Gear",
        "Transmission / Final Gear Ratio",
        "transmission-ratio",
    ),
];

pub fn menu(stroke: Stroke) -> &'static [Tool] {
    match stroke {
        Stroke::Two => TWO_STROKE,
        Stroke::Four => FOUR_STROKE,
    }
}

fn positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ApiError::Validation(format!("{name} must be a positive number")))
    }
}

/// Swept volume of all cylinders in cc, from bore and stroke in millimetres.
pub fn cylinder_capacity(bore_mm: f64, stroke_mm: f64, cylinders: u32) -> Result<f64> {
    let bore = positive("bore", bore_mm)?;
    let stroke = positive("stroke", stroke_mm)?;
    if cylinders == 0 {
        return Err(ApiError::Validation("cylinders must be at least 1".into()));
    }
    let per_cylinder_mm3 = PI / 4.0 * bore * bore * stroke;
    Ok(per_cylinder_mm3 / 1000.0 * f64::from(cylinders))
}

/// Static compression ratio from swept volume and combustion chamber
/// volume, both in cc.
pub fn compression_ratio(swept_cc: f64, chamber_cc: f64) -> Result<f64> {
    let swept = positive("swept volume", swept_cc)?;
    let chamber = positive("chamber volume", chamber_cc)?;
    Ok((swept + chamber) / chamber)
}

/// Mean piston speed in metres per second.
pub fn piston_speed(stroke_mm: f64, rpm: f64) -> Result<f64> {
    let stroke = positive("stroke", stroke_mm)?;
    let rpm = positive("rpm", rpm)?;
    Ok(2.0 * stroke * rpm / 60_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn capacity_of_a_common_150cc_engine() {
        // 57.3 x 57.8 mm single.
        assert!(close(cylinder_capacity(57.3, 57.8, 1).unwrap(), 149.05));
        assert!(close(cylinder_capacity(57.3, 57.8, 2).unwrap(), 298.10));
    }

    #[test]
    fn compression_ratio_formula() {
        assert!(close(compression_ratio(150.0, 15.0).unwrap(), 11.0));
    }

    #[test]
    fn piston_speed_formula() {
        assert!(close(piston_speed(60.0, 10_000.0).unwrap(), 20.0));
    }

    #[test]
    fn rejects_non_positive_input() {
        assert!(cylinder_capacity(0.0, 50.0, 1).is_err());
        assert!(cylinder_capacity(50.0, 50.0, 0).is_err());
        assert!(compression_ratio(150.0, -1.0).is_err());
        assert!(piston_speed(f64::NAN, 9000.0).is_err());
    }

    #[test]
    fn menus_differ_by_stroke() {
        assert_eq!(menu(Stroke::Two).len(), 11);
        assert_eq!(menu(Stroke::Four).len(), 19);
        assert!(menu(Stroke::Four).iter().any(|t| t.slug == "camshaft"));
        assert!(!menu(Stroke::Two).iter().any(|t| t.slug == "camshaft"));
        assert!(menu(Stroke::Two)
            .iter()
            .any(|t| t.slug == "ideal-carburetor-diameter-2-stroke"));
        assert_eq!(Stroke::Four.slug(), "four-stroke");
    }
}
