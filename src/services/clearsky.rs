//! Ineichen & Perez (2002) clear-sky model with a fixed Linke turbidity.

use chrono::{DateTime, FixedOffset};

use crate::config::Site;
use crate::models::weather::WeatherSample;
use crate::services::solar_position::{
    alt2pres, extraterrestrial_irradiance, relative_airmass, solar_position,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearSky {
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
}

/// Clear-sky irradiance for a sun at `zenith_deg`.
///
/// * `airmass_absolute` – pressure corrected air mass
/// * `linke_turbidity` – Linke turbidity factor, ~2 very clean to ~6 hazy
/// * `altitude` – site altitude (m)
/// * `dni_extra` – extraterrestrial normal irradiance (W/m²)
pub fn ineichen(zenith_deg: f64, airmass_absolute: f64, linke_turbidity: f64, altitude: f64, dni_extra: f64) -> ClearSky {
    let cos_zenith = zenith_deg.to_radians().cos().max(0.0);
    if cos_zenith <= 0.0 || !airmass_absolute.is_finite() {
        return ClearSky::default();
    }

    let tl = linke_turbidity;
    let fh1 = (-altitude / 8000.0).exp();
    let fh2 = (-altitude / 1250.0).exp();
    let cg1 = 5.09e-5 * altitude + 0.868;
    let cg2 = 3.92e-5 * altitude + 0.0387;

    let ghi = cg1 * dni_extra * cos_zenith * (-cg2 * airmass_absolute * (fh1 + fh2 * (tl - 1.0))).exp().max(0.0);

    let b = 0.664 + 0.163 / fh1;
    let bnci = dni_extra * (b * (-0.09 * airmass_absolute * (tl - 1.0)).exp()).max(0.0);
    let bnci_2 = ghi * ((1.0 - (0.1 - 0.2 * (-tl).exp()) / (0.1 + 0.882 / fh1)) / cos_zenith).clamp(0.0, 1e20);

    let dni = bnci.min(bnci_2);
    let dhi = ghi - dni * cos_zenith;

    ClearSky { ghi, dni, dhi }
}

/// Builds a clear-sky weather table for `site` over `times`.
///
/// Rows carry no air temperature or wind; the model chain applies its defaults.
pub fn get_clearsky(site: &Site, times: &[DateTime<FixedOffset>], linke_turbidity: f64) -> Vec<WeatherSample> {
    let pressure = alt2pres(site.altitude);

    times
        .iter()
        .map(|time| {
            let sun = solar_position(time, site.latitude, site.longitude);
            let cs = match relative_airmass(sun.zenith) {
                Some(am) => ineichen(
                    sun.zenith,
                    am * pressure / 101325.0,
                    linke_turbidity,
                    site.altitude,
                    extraterrestrial_irradiance(time),
                ),
                None => ClearSky::default(),
            };

            WeatherSample {
                time: *time,
                ghi: cs.ghi,
                dni: cs.dni,
                dhi: cs.dhi,
                temp_air: None,
                wind_speed: None,
            }
        })
        .collect()
}
