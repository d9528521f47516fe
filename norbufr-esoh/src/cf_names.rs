use norbufr_core::DescriptorId;

/// Climate and Forecast standard name plus unit for a descriptor that the
/// projector knows how to emit an observation for. A small static table,
/// ported verbatim from the source's own `cf_names` map. Descriptors absent
/// here (e.g. flight level, geopotential height) simply produce no emission.
pub struct CfName {
    pub standard_name: &'static str,
    pub unit: &'static str,
}

const fn id(f: u8, x: u8, y: u8) -> DescriptorId {
    // DescriptorId::new is not const; construct the fields directly here so
    // the static table below can stay a plain array of literals.
    DescriptorId { f, x, y }
}

static TABLE: &[(DescriptorId, CfName)] = &[
    (id(0, 10, 4), CfName { standard_name: "air_pressure", unit: "Pa" }),
    (id(0, 10, 51), CfName { standard_name: "air_pressure_at_mean_sea_level", unit: "Pa" }),
    (id(0, 11, 1), CfName { standard_name: "wind_from_direction", unit: "degree" }),
    (id(0, 11, 2), CfName { standard_name: "wind_speed", unit: "m s-1" }),
    (id(0, 12, 1), CfName { standard_name: "air_temperature", unit: "K" }),
    (id(0, 12, 4), CfName { standard_name: "air_temperature", unit: "K" }),
    (id(0, 12, 101), CfName { standard_name: "air_temperature", unit: "K" }),
    (id(0, 12, 104), CfName { standard_name: "air_temperature", unit: "K" }),
    (id(0, 12, 3), CfName { standard_name: "dew_point_temperature", unit: "K" }),
    (id(0, 12, 6), CfName { standard_name: "dew_point_temperature", unit: "K" }),
    (id(0, 12, 103), CfName { standard_name: "dew_point_temperature", unit: "K" }),
    (id(0, 12, 106), CfName { standard_name: "dew_point_temperature", unit: "K" }),
    (id(0, 13, 3), CfName { standard_name: "relative_humidity", unit: "1" }),
    (id(0, 13, 11), CfName { standard_name: "precipitation_amount", unit: "kg m-2" }),
    (id(0, 13, 23), CfName { standard_name: "precipitation_amount", unit: "kg m-2" }),
    (id(0, 20, 1), CfName { standard_name: "visibility_in_air", unit: "m" }),
    (id(0, 14, 2), CfName { standard_name: "integral_wrt_time_of_surface_downwelling_longwave_flux_in_air", unit: "W s m-2" }),
    (id(0, 14, 4), CfName { standard_name: "integral_wrt_time_of_surface_downwelling_shortwave_flux_in_air", unit: "W s m-2" }),
    (id(0, 14, 12), CfName { standard_name: "integral_wrt_time_of_surface_net_downward_longwave_flux", unit: "W s m-2" }),
    (id(0, 14, 13), CfName { standard_name: "integral_wrt_time_of_surface_net_downward_shortwave_flux", unit: "W s m-2" }),
    (id(0, 22, 42), CfName { standard_name: "sea_water_temperature", unit: "K" }),
    (id(0, 22, 43), CfName { standard_name: "sea_water_temperature", unit: "K" }),
    (id(0, 22, 45), CfName { standard_name: "sea_water_temperature", unit: "K" }),
];

pub fn lookup(descriptor: DescriptorId) -> Option<&'static CfName> {
    TABLE.iter().find(|(id, _)| *id == descriptor).map(|(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_temperature() {
        let cf = lookup(DescriptorId::new(0, 12, 101)).unwrap();
        assert_eq!(cf.standard_name, "air_temperature");
        assert_eq!(cf.unit, "K");
    }

    #[test]
    fn missing_descriptor_returns_none() {
        assert!(lookup(DescriptorId::new(0, 99, 99)).is_none());
    }
}
