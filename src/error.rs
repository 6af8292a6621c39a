use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid PWM format: {0}")]
    InvalidPwm(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },

    #[error("Degenerate {family} prior (param = {param}) over [{min}, {max}]: mass sums to {sum}")]
    DegeneratePrior {
        family: String,
        param: u32,
        min: usize,
        max: usize,
        sum: f64,
    },

    #[error("Config error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SamplerError>;

impl SamplerError {
    /// Create a new InvalidPwm error
    pub fn invalid_pwm(message: impl Into<String>) -> Self {
        SamplerError::InvalidPwm(message.into())
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        SamplerError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}
