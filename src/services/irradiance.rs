use crate::config::{AoiModel, TranspositionModel};

/// Plane of array irradiance components (W/m²).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoaIrradiance {
    pub poa_global: f64,
    pub poa_direct: f64,
    pub poa_diffuse: f64,
    pub poa_sky_diffuse: f64,
    pub poa_ground_diffuse: f64,
}

/// Angle of incidence between the sun and the panel normal, degrees.
pub fn aoi(surface_tilt: f64, surface_azimuth: f64, solar_zenith: f64, solar_azimuth: f64) -> f64 {
    aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth)
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}

fn aoi_projection(surface_tilt: f64, surface_azimuth: f64, solar_zenith: f64, solar_azimuth: f64) -> f64 {
    let (tilt, zenith) = (surface_tilt.to_radians(), solar_zenith.to_radians());
    tilt.cos() * zenith.cos()
        + tilt.sin() * zenith.sin() * (solar_azimuth - surface_azimuth).to_radians().cos()
}

/// Transposes horizontal irradiance onto a tilted plane.
///
/// # Arguments
///
/// * 'surface_tilt' - panel tilt from horizontal, degrees
/// * 'surface_azimuth' - panel azimuth, north = 0 clockwise
/// * 'solar_zenith' / 'solar_azimuth' - sun position, degrees
/// * 'ghi', 'dni', 'dhi' - horizontal irradiance components
/// * 'dni_extra' - extraterrestrial irradiance, only used by Hay-Davies
/// * 'albedo' - ground reflectance
#[allow(clippy::too_many_arguments)]
pub fn get_total_irradiance(
    surface_tilt: f64,
    surface_azimuth: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
    ghi: f64,
    dni: f64,
    dhi: f64,
    dni_extra: f64,
    albedo: f64,
    model: TranspositionModel,
) -> PoaIrradiance {
    let cos_aoi = aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth);
    let tilt_cos = surface_tilt.to_radians().cos();

    let poa_direct = (dni * cos_aoi).max(0.0);

    let isotropic = dhi * (1.0 + tilt_cos) / 2.0;
    let poa_sky_diffuse = match model {
        TranspositionModel::Isotropic => isotropic,
        TranspositionModel::Haydavies => {
            let anisotropy = if dni_extra > 0.0 { (dni / dni_extra).clamp(0.0, 1.0) } else { 0.0 };
            // Zenith cosine floored at cos(89°) to keep the projection ratio bounded
            let rb = cos_aoi.max(0.0) / solar_zenith.to_radians().cos().max(0.01745);
            (dhi * (anisotropy * rb + (1.0 - anisotropy) * (1.0 + tilt_cos) / 2.0)).max(0.0)
        }
    };

    let poa_ground_diffuse = (ghi * albedo * (1.0 - tilt_cos) / 2.0).max(0.0);
    let poa_diffuse = poa_sky_diffuse + poa_ground_diffuse;

    PoaIrradiance {
        poa_global: poa_direct + poa_diffuse,
        poa_direct,
        poa_diffuse,
        poa_sky_diffuse,
        poa_ground_diffuse,
    }
}

/// Incidence angle modifier applied to the beam component.
pub fn aoi_modifier(model: AoiModel, aoi_deg: f64) -> f64 {
    match model {
        AoiModel::Physical => physical_iam(aoi_deg, 1.526, 4.0, 0.002),
        AoiModel::Ashrae => ashrae_iam(aoi_deg, 0.05),
        AoiModel::NoLoss => 1.0,
    }
}

/// Transmittance through a glass cover relative to normal incidence (De Soto 2006).
///
/// # Arguments
///
/// * 'aoi_deg' - angle of incidence
/// * 'n' - refractive index of the cover
/// * 'k' - glazing extinction coefficient (1/m)
/// * 'l' - glazing thickness (m)
pub fn physical_iam(aoi_deg: f64, n: f64, k: f64, l: f64) -> f64 {
    if !aoi_deg.is_finite() {
        return 0.0;
    }
    let theta_deg = aoi_deg.abs();
    if theta_deg >= 90.0 {
        return 0.0;
    }

    let transmittance = |theta: f64| {
        let theta_r = (theta.sin() / n).asin();
        let rs = ((theta_r - theta).sin() / (theta_r + theta).sin()).powi(2);
        let rp = ((theta_r - theta).tan() / (theta_r + theta).tan()).powi(2);
        (-k * l / theta_r.cos()).exp() * (1.0 - 0.5 * (rs + rp))
    };
    let tau0 = (-k * l).exp() * (1.0 - ((1.0 - n) / (1.0 + n)).powi(2));

    // The Fresnel terms are 0/0 at normal incidence
    let theta = theta_deg.max(1e-6).to_radians();
    (transmittance(theta) / tau0).clamp(0.0, 1.0)
}

/// ASHRAE incidence angle modifier 1 - b (1/cos θ - 1).
pub fn ashrae_iam(aoi_deg: f64, b: f64) -> f64 {
    if !aoi_deg.is_finite() || aoi_deg.abs() >= 90.0 {
        return 0.0;
    }
    (1.0 - b * (1.0 / aoi_deg.to_radians().cos() - 1.0)).clamp(0.0, 1.0)
}
