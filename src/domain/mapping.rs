//! Translations between the wire vocabulary (upper-case fleet enums,
//! `in_progress`-style trip statuses) and the internal enums.
//!
//! Every function here is total: unknown tokens land on the designated
//! fallback value instead of failing, so a new fleet-member type coming
//! from a partner system never breaks the pipeline.

use crate::entities::organization::OrganizationType;
use crate::entities::trip::TripStatus;
use crate::entities::vehicle::VehicleType;

pub fn vehicle_type_from_wire(token: &str) -> VehicleType {
    match token {
        "TRUCK" => VehicleType::Truck,
        "VAN" => VehicleType::Van,
        "MOTORCYCLE" => VehicleType::Motorcycle,
        "CAR" => VehicleType::Car,
        "BUS" => VehicleType::Bus,
        _ => VehicleType::Other,
    }
}

pub fn vehicle_type_to_wire(vehicle_type: &VehicleType) -> &'static str {
    match vehicle_type {
        VehicleType::Truck => "TRUCK",
        VehicleType::Van => "VAN",
        VehicleType::Motorcycle => "MOTORCYCLE",
        VehicleType::Car => "CAR",
        VehicleType::Bus => "BUS",
        VehicleType::Other => "OTHER",
    }
}

pub fn organization_type_from_wire(token: &str) -> OrganizationType {
    match token {
        // The wire spells the freight type out; the internal token does not.
        "FREIGHT_FORWARDER" => OrganizationType::FreightForward,
        "MOVING_COMPANY" => OrganizationType::MovingCompany,
        "ECOMMERCE" => OrganizationType::Ecommerce,
        "CORPORATE" => OrganizationType::Corporate,
        "LOGISTICS_PROVIDER" => OrganizationType::LogisticsProvider,
        _ => OrganizationType::Other,
    }
}

pub fn organization_type_to_wire(org_type: &OrganizationType) -> &'static str {
    match org_type {
        OrganizationType::FreightForward => "FREIGHT_FORWARDER",
        OrganizationType::MovingCompany => "MOVING_COMPANY",
        OrganizationType::Ecommerce => "ECOMMERCE",
        OrganizationType::Corporate => "CORPORATE",
        OrganizationType::LogisticsProvider => "LOGISTICS_PROVIDER",
        OrganizationType::Other => "OTHER",
    }
}

/// Wire token for a trip status. `Active` is the one non-identity pair:
/// partner systems know it as `in_progress`.
pub fn trip_status_to_wire(status: TripStatus) -> &'static str {
    match status {
        TripStatus::Planned => "planned",
        TripStatus::Scheduled => "scheduled",
        TripStatus::Active => "in_progress",
        TripStatus::Completed => "completed",
        TripStatus::Cancelled => "cancelled",
        TripStatus::Delayed => "delayed",
    }
}

/// Resolve a wire trip-status token. Filters coming through the dashboard
/// use the internal spelling `active`, so both spellings resolve to
/// `Active`. Unknown tokens fall back to `Planned`.
pub fn trip_status_from_wire(token: &str) -> TripStatus {
    match token {
        "planned" => TripStatus::Planned,
        "scheduled" => TripStatus::Scheduled,
        "in_progress" | "active" => TripStatus::Active,
        "completed" => TripStatus::Completed,
        "cancelled" => TripStatus::Cancelled,
        "delayed" => TripStatus::Delayed,
        _ => TripStatus::Planned,
    }
}

/// Internal lower-case token for a trip status, used for stable sorting.
pub fn trip_status_token(status: TripStatus) -> &'static str {
    match status {
        TripStatus::Planned => "planned",
        TripStatus::Scheduled => "scheduled",
        TripStatus::Active => "active",
        TripStatus::Completed => "completed",
        TripStatus::Cancelled => "cancelled",
        TripStatus::Delayed => "delayed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn vehicle_type_round_trips() {
        for vehicle_type in VehicleType::iter() {
            let wire = vehicle_type_to_wire(&vehicle_type);
            assert_eq!(vehicle_type_from_wire(wire), vehicle_type);
        }
    }

    #[test]
    fn organization_type_round_trips() {
        for org_type in OrganizationType::iter() {
            let wire = organization_type_to_wire(&org_type);
            assert_eq!(organization_type_from_wire(wire), org_type);
        }
    }

    #[test]
    fn trip_status_round_trips() {
        for status in TripStatus::iter() {
            let wire = trip_status_to_wire(status);
            assert_eq!(trip_status_from_wire(wire), status);
        }
    }

    #[test]
    fn active_maps_to_in_progress_on_the_wire() {
        assert_eq!(trip_status_to_wire(TripStatus::Active), "in_progress");
        assert_eq!(trip_status_from_wire("in_progress"), TripStatus::Active);
        // dashboards filter with the internal spelling
        assert_eq!(trip_status_from_wire("active"), TripStatus::Active);
    }

    #[test]
    fn unknown_tokens_fall_back_instead_of_failing() {
        assert_eq!(vehicle_type_from_wire("HOVERCRAFT"), VehicleType::Other);
        assert_eq!(organization_type_from_wire("CARTEL"), OrganizationType::Other);
        assert_eq!(trip_status_from_wire("warp_speed"), TripStatus::Planned);
    }

    #[test]
    fn freight_forward_spelling_is_asymmetric() {
        assert_eq!(
            organization_type_to_wire(&OrganizationType::FreightForward),
            "FREIGHT_FORWARDER"
        );
        assert_eq!(
            organization_type_from_wire("FREIGHT_FORWARDER"),
            OrganizationType::FreightForward
        );
    }
}
