use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no SAPM temperature coefficients for racking model '{racking}' with module type '{module}'")]
    TemperatureModel { racking: String, module: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid model parameter: {0}")]
    InvalidParameter(String),

    #[error("model produced no AC result")]
    NoAcOutput,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("weather service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid weather timestamp '{0}'")]
    Timestamp(String),
}

#[derive(Debug, Error)]
pub enum PvgisError {
    #[error("PVGIS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PVGIS returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed monthly record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot")]
    Empty,

    #[error("failed to render chart: {0}")]
    Render(String),
}
