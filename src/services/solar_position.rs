/// ============================================================
///  Solar geometry
///
///   1. Day angle       – Spencer (1971)
///   2. Declination     – Spencer series
///   3. Equation of time – Spencer series (minutes)
///   4. Hour angle      – from UTC and longitude (true solar time)
///   5. Zenith / elevation / azimuth (north = 0°, clockwise)
///   6. Extraterrestrial normal irradiance (eccentricity corrected)
/// ============================================================

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use std::f64::consts::PI;

const SC: f64 = 1361.0; // Solar constant W/m²
const DEG: f64 = PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    pub zenith: f64,
    pub elevation: f64,
    pub azimuth: f64,
    pub declination: f64,
    /// Minutes
    pub equation_of_time: f64,
}

/// Position of the sun seen from (`lat_deg`, `lon_deg`) at `time`.
pub fn solar_position<Tz: TimeZone>(time: &DateTime<Tz>, lat_deg: f64, lon_deg: f64) -> SolarPosition {
    let utc = time.with_timezone(&Utc);
    let b = day_angle(&utc);
    let ut_h = utc.hour() as f64 + utc.minute() as f64 / 60.0 + utc.second() as f64 / 3600.0;

    let decl_deg = (180.0 / PI)
        * (0.006918
            - 0.399912 * b.cos()
            + 0.070257 * b.sin()
            - 0.006758 * (2.0 * b).cos()
            + 0.000907 * (2.0 * b).sin()
            - 0.002697 * (3.0 * b).cos()
            + 0.00148 * (3.0 * b).sin());
    let decl = decl_deg * DEG;

    let eot_min = 229.18
        * (0.000075
            + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.04089 * (2.0 * b).sin());

    // True solar time straight from UTC, no standard meridian needed
    let solar_time_h = ut_h + lon_deg / 15.0 + eot_min / 60.0;
    let omega_deg = 15.0 * (solar_time_h - 12.0);
    // Normalise to [-180, 180) so the morning/afternoon test below holds
    let omega_deg = (omega_deg + 180.0).rem_euclid(360.0) - 180.0;
    let omega = omega_deg * DEG;

    let lat = lat_deg * DEG;
    let sin_alpha = (lat.sin() * decl.sin() + lat.cos() * decl.cos() * omega.cos()).clamp(-1.0, 1.0);
    let alpha_rad = sin_alpha.asin();
    let elevation = alpha_rad / DEG;

    let cos_az = if alpha_rad.cos().abs() > 1e-9 && lat.cos().abs() > 1e-9 {
        (decl.sin() - sin_alpha * lat.sin()) / (alpha_rad.cos() * lat.cos())
    } else {
        0.0
    };
    let az_abs = cos_az.clamp(-1.0, 1.0).acos() / DEG;
    let azimuth = if omega_deg > 0.0 { 360.0 - az_abs } else { az_abs };

    SolarPosition {
        zenith: 90.0 - elevation,
        elevation,
        azimuth,
        declination: decl_deg,
        equation_of_time: eot_min,
    }
}

/// Extraterrestrial normal irradiance for the day of `time` (W/m²).
pub fn extraterrestrial_irradiance<Tz: TimeZone>(time: &DateTime<Tz>) -> f64 {
    let b = day_angle(&time.with_timezone(&Utc));
    SC * (1.00011
        + 0.034221 * b.cos()
        + 0.00128 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin())
}

/// Kasten & Young (1989) relative air mass, `None` with the sun below the horizon.
pub fn relative_airmass(zenith_deg: f64) -> Option<f64> {
    if !(0.0..90.0).contains(&zenith_deg) {
        return None;
    }
    Some(1.0 / (zenith_deg.to_radians().cos() + 0.50572 * (96.07995 - zenith_deg).powf(-1.6364)))
}

/// Standard atmosphere pressure at `altitude` metres (Pa).
pub fn alt2pres(altitude: f64) -> f64 {
    100.0 * ((44331.514 - altitude) / 11880.516).powf(1.0 / 0.1902632)
}

#[inline]
fn day_angle(utc: &DateTime<Utc>) -> f64 {
    2.0 * PI * (utc.ordinal() as f64 - 1.0) / 365.0
}
