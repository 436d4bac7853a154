pub mod chart;
pub mod clearsky;
pub mod dc_model;
pub mod inverter;
pub mod irradiance;
pub mod model_chain;
pub mod pvgis_service;
pub mod solar_position;
pub mod temperature;
pub mod weather_service;
