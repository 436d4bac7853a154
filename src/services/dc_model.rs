use crate::config::SingleDiodeParameters;
use crate::models::power::IvCurvePoints;

const BOLTZMANN_EV: f64 = 8.617333262e-5; // eV/K
const T_REF_K: f64 = 298.15;
const IRRAD_REF: f64 = 1000.0;

const BISECT_ITERATIONS: usize = 100;
const GOLDEN_ITERATIONS: usize = 80;

/// PVWatts DC power: P = pdc0 · (E / 1000) · (1 + γ · (T_cell − 25))
pub fn pvwatts_dc(effective_irradiance: f64, temp_cell: f64, pdc0: f64, gamma_pdc: f64) -> f64 {
    effective_irradiance / IRRAD_REF * pdc0 * (1.0 + gamma_pdc * (temp_cell - 25.0))
}

/// Five single diode equation parameters at operating conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeParameters {
    pub photocurrent: f64,
    pub saturation_current: f64,
    pub resistance_series: f64,
    pub resistance_shunt: f64,
    /// n · Ns · Vth
    pub n_ns_vth: f64,
}

/// Translates reference parameters to the given irradiance and cell temperature (De Soto 2006).
pub fn calcparams_desoto(effective_irradiance: f64, temp_cell: f64, p: &SingleDiodeParameters) -> DiodeParameters {
    let t_cell_k = temp_cell + 273.15;
    let e_g = p.eg_ref * (1.0 + p.d_eg_dt * (t_cell_k - T_REF_K));

    let photocurrent = effective_irradiance / IRRAD_REF * (p.i_l_ref + p.alpha_sc * (t_cell_k - T_REF_K));
    let saturation_current = p.i_o_ref
        * (t_cell_k / T_REF_K).powi(3)
        * (p.eg_ref / (BOLTZMANN_EV * T_REF_K) - e_g / (BOLTZMANN_EV * t_cell_k)).exp();
    let resistance_shunt = if effective_irradiance > 0.0 {
        p.r_sh_ref * IRRAD_REF / effective_irradiance
    } else {
        f64::INFINITY
    };

    DiodeParameters {
        photocurrent,
        saturation_current,
        resistance_series: p.r_s,
        resistance_shunt,
        n_ns_vth: p.a_ref * t_cell_k / T_REF_K,
    }
}

impl DiodeParameters {
    /// Net current of the implicit diode equation at (`v`, `i`); strictly decreasing in `i`.
    fn residual(&self, v: f64, i: f64) -> f64 {
        let vd = v + i * self.resistance_series;
        self.photocurrent
            - self.saturation_current * ((vd / self.n_ns_vth).exp() - 1.0)
            - vd / self.resistance_shunt
            - i
    }

    fn current_at(&self, v: f64) -> f64 {
        let (mut lo, mut hi) = (-self.photocurrent, self.photocurrent);
        for _ in 0..BISECT_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if self.residual(v, mid) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    fn open_circuit_voltage(&self) -> f64 {
        let (mut lo, mut hi) = (0.0, self.n_ns_vth * (self.photocurrent / self.saturation_current + 1.0).ln());
        for _ in 0..BISECT_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if self.residual(mid, 0.0) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

/// Solves the single diode equation for the short circuit, open circuit and maximum power points.
///
/// A non-positive photocurrent (night) gives an all-zero curve.
pub fn singlediode(params: &DiodeParameters) -> IvCurvePoints {
    if !(params.photocurrent > 0.0) || !(params.saturation_current > 0.0) {
        return IvCurvePoints::default();
    }

    let v_oc = params.open_circuit_voltage();
    let i_sc = params.current_at(0.0);

    // P(V) is unimodal on [0, Voc]
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let power = |v: f64| v * params.current_at(v);
    let (mut a, mut b) = (0.0, v_oc);
    let mut c = b - ratio * (b - a);
    let mut d = a + ratio * (b - a);
    let (mut pc, mut pd) = (power(c), power(d));
    for _ in 0..GOLDEN_ITERATIONS {
        if pc > pd {
            b = d;
            d = c;
            pd = pc;
            c = b - ratio * (b - a);
            pc = power(c);
        } else {
            a = c;
            c = d;
            pc = pd;
            d = a + ratio * (b - a);
            pd = power(d);
        }
    }

    let v_mp = 0.5 * (a + b);
    let i_mp = params.current_at(v_mp);

    IvCurvePoints { i_sc, v_oc, i_mp, v_mp, p_mp: v_mp * i_mp }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_module() -> SingleDiodeParameters {
        SingleDiodeParameters {
            i_l_ref: 8.0,
            i_o_ref: 1e-10,
            r_s: 0.5,
            r_sh_ref: 100.0,
            a_ref: 1.5,
            eg_ref: 1.121,
            d_eg_dt: -0.0002677,
            alpha_sc: 0.004,
        }
    }

    #[test]
    fn pvwatts_scales_with_irradiance_and_temperature() {
        assert_eq!(pvwatts_dc(1000.0, 25.0, 3000.0, -0.004), 3000.0);
        assert_eq!(pvwatts_dc(500.0, 25.0, 3000.0, -0.004), 1500.0);
        assert!((pvwatts_dc(1000.0, 50.0, 3000.0, -0.004) - 2700.0).abs() < 1e-9);
        assert_eq!(pvwatts_dc(0.0, 10.0, 3000.0, -0.004), 0.0);
    }

    #[test]
    fn desoto_at_reference_conditions_is_identity() {
        let p = calcparams_desoto(1000.0, 25.0, &reference_module());
        assert!((p.photocurrent - 8.0).abs() < 1e-12);
        assert!((p.saturation_current - 1e-10).abs() < 1e-20);
        assert!((p.resistance_shunt - 100.0).abs() < 1e-12);
        assert!((p.n_ns_vth - 1.5).abs() < 1e-12);
    }

    #[test]
    fn hot_cell_saturates_more() {
        let cold = calcparams_desoto(1000.0, 25.0, &reference_module());
        let hot = calcparams_desoto(1000.0, 60.0, &reference_module());
        assert!(hot.saturation_current > cold.saturation_current * 10.0);
        assert!(hot.photocurrent > cold.photocurrent);
    }

    #[test]
    fn curve_points_are_ordered() {
        let curve = singlediode(&calcparams_desoto(1000.0, 25.0, &reference_module()));
        assert!(curve.i_sc > 7.9 && curve.i_sc <= 8.0, "isc {}", curve.i_sc);
        // Voc ≈ a · ln(IL / I0) less the shunt loss
        assert!(curve.v_oc > 36.0 && curve.v_oc < 38.5, "voc {}", curve.v_oc);
        assert!(curve.v_mp > 0.0 && curve.v_mp < curve.v_oc);
        assert!(curve.i_mp > 0.0 && curve.i_mp < curve.i_sc);
        assert!(curve.p_mp > 150.0 && curve.p_mp < curve.i_sc * curve.v_oc);
        assert!((curve.p_mp - curve.v_mp * curve.i_mp).abs() < 1e-9);
    }

    #[test]
    fn more_light_more_power() {
        let module = reference_module();
        let dim = singlediode(&calcparams_desoto(200.0, 25.0, &module));
        let bright = singlediode(&calcparams_desoto(900.0, 25.0, &module));
        assert!(bright.p_mp > dim.p_mp);
    }

    #[test]
    fn night_is_all_zero() {
        let curve = singlediode(&calcparams_desoto(0.0, 5.0, &reference_module()));
        assert_eq!(curve, IvCurvePoints::default());
    }
}
