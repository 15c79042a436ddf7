//! 文件操作错误定义

use geofid_core::GeometryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DXF error: {0}")]
    Dxf(String),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unknown file type: {0}")]
    UnknownFileType(String),

    #[error("Nothing to export")]
    EmptyBatch,

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
