use serde::Deserialize;
use serde_json::Value;

use crate::errors::PvgisError;

/// Expected energy for one calendar month.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyEnergy {
    pub month: u32,
    /// Average monthly energy production (kWh)
    #[serde(rename = "E_m")]
    pub e_m: f64,
}

/// Pulls `outputs.monthly.fixed` out of a PVcalc body.
///
/// Returns `Ok(None)` when the nested keys are absent, and an error when they are present
/// but a record lacks `month` or `E_m`. Record order is preserved.
pub fn extract_monthly(body: &Value) -> Result<Option<Vec<MonthlyEnergy>>, PvgisError> {
    let Some(fixed) = body
        .get("outputs")
        .and_then(|o| o.get("monthly"))
        .and_then(|m| m.get("fixed"))
    else {
        return Ok(None);
    };

    let records = Vec::<MonthlyEnergy>::deserialize(fixed)?;
    Ok(Some(records))
}

/// Yearly total `outputs.totals.fixed.E_y`, when PVGIS reports it.
pub fn yearly_total(body: &Value) -> Option<f64> {
    body.pointer("/outputs/totals/fixed/E_y").and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_year() -> Value {
        let fixed: Vec<Value> = (1..=12)
            .map(|m| json!({ "month": m, "E_d": 5.0, "E_m": 100.0 + m as f64, "H(i)_d": 4.0, "SD_m": 12.0 }))
            .collect();
        json!({ "outputs": { "monthly": { "fixed": fixed }, "totals": { "fixed": { "E_y": 1278.0 } } } })
    }

    #[test]
    fn extracts_twelve_months_in_order() {
        let records = extract_monthly(&full_year()).unwrap().unwrap();
        assert_eq!(records.len(), 12);
        assert_eq!(records.iter().map(|r| r.month).collect::<Vec<_>>(), (1..=12).collect::<Vec<_>>());
        assert_eq!(records[0].e_m, 101.0);
        assert_eq!(records[11].e_m, 112.0);
    }

    #[test]
    fn preserves_unsorted_input_order() {
        let body = json!({ "outputs": { "monthly": { "fixed": [
            { "month": 7, "E_m": 410.2 },
            { "month": 2, "E_m": 190.0 },
            { "month": 11, "E_m": 150.5 }
        ] } } });
        let records = extract_monthly(&body).unwrap().unwrap();
        assert_eq!(records.iter().map(|r| r.month).collect::<Vec<_>>(), vec![7, 2, 11]);
    }

    #[test]
    fn missing_nested_keys_yield_none() {
        assert!(extract_monthly(&json!({})).unwrap().is_none());
        assert!(extract_monthly(&json!({ "outputs": {} })).unwrap().is_none());
        assert!(extract_monthly(&json!({ "outputs": { "monthly": { "tracking": [] } } })).unwrap().is_none());
        assert!(extract_monthly(&json!({ "message": "Location over the sea" })).unwrap().is_none());
    }

    #[test]
    fn record_without_energy_is_malformed() {
        let body = json!({ "outputs": { "monthly": { "fixed": [ { "month": 1 } ] } } });
        assert!(matches!(extract_monthly(&body), Err(PvgisError::MalformedRecord(_))));
    }

    #[test]
    fn reads_yearly_total() {
        assert_eq!(yearly_total(&full_year()), Some(1278.0));
        assert_eq!(yearly_total(&json!({})), None);
    }
}
