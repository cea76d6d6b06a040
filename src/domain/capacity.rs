//! Vehicle capacity validation against per-type bounds.
//!
//! Runs synchronously before a vehicle record reaches persistence; this is
//! a precondition check, never retried.

pub struct CapacityBounds {
    pub weight_min_kg: f64,
    pub weight_max_kg: f64,
    pub packages_min: i32,
    pub packages_max: i32,
}

/// Inclusive bounds per vehicle type (wire token). Types without an entry
/// cannot carry parcels and fail validation outright.
pub fn bounds_for(wire_type: &str) -> Option<CapacityBounds> {
    let (weight_min_kg, weight_max_kg, packages_min, packages_max) = match wire_type {
        "VAN" => (50.0, 3000.0, 1, 15),
        "TRUCK" => (500.0, 15000.0, 10, 100),
        "BUS" => (100.0, 500.0, 5, 50),
        "MOTORCYCLE" => (10.0, 200.0, 1, 5),
        "CAR" => (20.0, 500.0, 1, 10),
        _ => return None,
    };

    Some(CapacityBounds {
        weight_min_kg,
        weight_max_kg,
        packages_min,
        packages_max,
    })
}

/// Validate a declared weight/package capacity for a vehicle type.
/// Returns the human-readable reason on failure.
pub fn validate_capacity(wire_type: &str, weight_kg: f64, packages: i32) -> Result<(), String> {
    let bounds = bounds_for(wire_type)
        .ok_or_else(|| format!("unsupported vehicle type: {wire_type}"))?;

    if weight_kg < bounds.weight_min_kg || weight_kg > bounds.weight_max_kg {
        return Err(format!(
            "weight {weight_kg} kg outside allowed range {}-{} kg for {wire_type}",
            bounds.weight_min_kg, bounds.weight_max_kg
        ));
    }

    if packages < bounds.packages_min || packages > bounds.packages_max {
        return Err(format!(
            "package count {packages} outside allowed range {}-{} for {wire_type}",
            bounds.packages_min, bounds.packages_max
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truck_weight_boundaries_are_inclusive() {
        assert!(validate_capacity("TRUCK", 500.0, 10).is_ok());
        assert!(validate_capacity("TRUCK", 15000.0, 10).is_ok());
        assert!(validate_capacity("TRUCK", 499.0, 10).is_err());
        assert!(validate_capacity("TRUCK", 15001.0, 10).is_err());
    }

    #[test]
    fn overweight_van_names_the_valid_range() {
        let err = validate_capacity("VAN", 3500.0, 5).unwrap_err();
        assert!(err.contains("50"), "message should cite the range: {err}");
        assert!(err.contains("3000"), "message should cite the range: {err}");
        assert!(err.contains("VAN"), "message should name the type: {err}");
    }

    #[test]
    fn package_count_bounds() {
        assert!(validate_capacity("MOTORCYCLE", 100.0, 5).is_ok());
        let err = validate_capacity("MOTORCYCLE", 100.0, 6).unwrap_err();
        assert!(err.contains("1-5"), "{err}");
    }

    #[test]
    fn unsupported_type_names_the_offender() {
        let err = validate_capacity("HOVERCRAFT", 100.0, 1).unwrap_err();
        assert!(err.contains("HOVERCRAFT"), "{err}");
        // OTHER has no bounds either; it is not a parcel carrier
        assert!(validate_capacity("OTHER", 100.0, 1).is_err());
    }

    #[test]
    fn remaining_types_accept_in_range_values() {
        assert!(validate_capacity("BUS", 100.0, 5).is_ok());
        assert!(validate_capacity("BUS", 500.0, 50).is_ok());
        assert!(validate_capacity("CAR", 20.0, 1).is_ok());
        assert!(validate_capacity("CAR", 501.0, 1).is_err());
    }
}
