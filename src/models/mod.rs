pub mod power;
pub mod pvgis;
pub mod weather;
