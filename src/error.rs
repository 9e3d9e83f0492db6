//! Error types
//!
//! The simulation itself never fails; everything here comes from the host
//! window, configuration files, logging set-up or the remote pointer feed.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// SDL reports its failures as plain strings
    #[error("display error: {0}")]
    Display(String),

    /// The drawing surface went away while a frame was in flight
    #[error("drawing surface lost: {0}")]
    SurfaceLost(String),

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {}: {source}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to start logger: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),

    #[error("mqtt: {0}")]
    Mqtt(String),
}

impl From<sdl2::video::WindowBuildError> for Error {
    fn from(e: sdl2::video::WindowBuildError) -> Self {
        Error::Display(e.to_string())
    }
}

impl From<sdl2::IntegerOrSdlError> for Error {
    fn from(e: sdl2::IntegerOrSdlError) -> Self {
        Error::Display(e.to_string())
    }
}

impl From<sdl2::render::TextureValueError> for Error {
    fn from(e: sdl2::render::TextureValueError) -> Self {
        Error::Display(e.to_string())
    }
}
