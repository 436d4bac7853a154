use crate::config::SapmParameters;

/// SAPM cell temperature (King et al. 2004).
///
/// T_module = E · exp(a + b · WS) + T_air
/// T_cell   = T_module + E / 1000 · ΔT
///
/// # Arguments
///
/// * 'poa_global' - total plane of array irradiance (W/m²)
/// * 'temp_air' - ambient air temperature (°C)
/// * 'wind_speed' - wind speed at 10 m (m/s)
/// * 'params' - SAPM a, b and deltaT coefficients
pub fn sapm_cell(poa_global: f64, temp_air: f64, wind_speed: f64, params: &SapmParameters) -> f64 {
    let module = poa_global * (params.a + params.b * wind_speed).exp() + temp_air;
    module + poa_global / 1000.0 * params.delta_t
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN_RACK_GLASS_POLYMER: SapmParameters = SapmParameters { a: -3.56, b: -0.075, delta_t: 3.0 };

    #[test]
    fn dark_cell_is_at_air_temperature() {
        assert_eq!(sapm_cell(0.0, 12.5, 3.0, &OPEN_RACK_GLASS_POLYMER), 12.5);
    }

    #[test]
    fn full_sun_still_air() {
        // 1000 · e^-3.56 + 25 + 3 ≈ 56.4
        let t = sapm_cell(1000.0, 25.0, 0.0, &OPEN_RACK_GLASS_POLYMER);
        assert!((t - 56.43).abs() < 0.05, "t = {t}");
    }

    #[test]
    fn wind_cools_the_cell() {
        let still = sapm_cell(800.0, 20.0, 0.0, &OPEN_RACK_GLASS_POLYMER);
        let windy = sapm_cell(800.0, 20.0, 6.0, &OPEN_RACK_GLASS_POLYMER);
        assert!(windy < still);
    }
}
