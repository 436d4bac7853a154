use crate::config::InverterParameters;

/// PVWatts inverter model (NREL PVWatts v5 efficiency curve).
///
/// Output is clipped to `eta_inv_nom · pdc0` and never negative.
pub fn pvwatts_ac(pdc: f64, params: &InverterParameters) -> f64 {
    if !(pdc > 0.0) || params.pdc0 <= 0.0 {
        return 0.0;
    }

    let pac0 = params.eta_inv_nom * params.pdc0;
    let zeta = pdc / params.pdc0;
    let eta = params.eta_inv_nom / params.eta_inv_ref * (-0.0162 * zeta - 0.0059 / zeta + 0.9858);

    (eta * pdc).min(pac0).max(0.0)
}
