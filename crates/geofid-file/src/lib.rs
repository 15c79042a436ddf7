//! GeoFid 文件格式处理
//!
//! 支持：
//! - `.dxf` 导入/导出
//! - `.csv` 扫描表导入/导出
//! - `.txt` 点列表导入/导出
//! - `.json` 批量格式（无损）
//!
//! 导入时对每条记录应用同一个 [`ConversionRequest`]，导出时按目标单位换算。

pub mod csv_io;
pub mod dxf_io;
pub mod error;
pub mod json_io;
pub mod txt_io;

pub use error::FileError;

use geofid_core::record::GeometryRecord;
use geofid_core::request::ConversionRequest;
use geofid_core::tessellate::Tessellation;
use geofid_core::units::Unit;
use std::fmt;
use std::path::Path;

/// 文件类型（按扩展名）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Dxf,
    Csv,
    Txt,
    Json,
}

impl FileType {
    /// 根据扩展名判断，不区分大小写
    pub fn from_path(path: &Path) -> Result<Self, FileError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "dxf" => Ok(FileType::Dxf),
            "csv" => Ok(FileType::Csv),
            "txt" => Ok(FileType::Txt),
            "json" => Ok(FileType::Json),
            _ => Err(FileError::UnknownFileType(path.display().to_string())),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::Dxf => "DXF",
            FileType::Csv => "CSV",
            FileType::Txt => "TXT",
            FileType::Json => "JSON",
        };
        f.write_str(name)
    }
}

/// 导入选项
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    pub request: ConversionRequest,
    /// CSV/TXT 坐标单位，DXF 使用文件自带的 `$INSUNITS`
    pub units: Unit,
    /// CSV 首行是否为表头
    pub header: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            request: ConversionRequest::default(),
            units: Unit::Microns,
            header: true,
        }
    }
}

/// 导出选项
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// 导出单位，JSON 始终为微米
    pub units: Unit,
    /// CSV 是否写表头
    pub header: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            units: Unit::Microns,
            header: true,
        }
    }
}

/// 按扩展名导入文件
pub fn import_file(path: &Path, options: &ImportOptions) -> Result<Tessellation, FileError> {
    let file_type = FileType::from_path(path)?;
    tracing::debug!("Importing {} as {}", path.display(), file_type);

    let request = &options.request;
    match file_type {
        FileType::Dxf => dxf_io::import(path, request),
        FileType::Csv => csv_io::import(path, request, options.units, options.header),
        FileType::Txt => txt_io::import(path, request, options.units),
        FileType::Json => json_io::import(path, request),
    }
}

/// 按扩展名导出文件
pub fn export_file(
    path: &Path,
    records: &[GeometryRecord],
    options: &ExportOptions,
) -> Result<(), FileError> {
    let file_type = FileType::from_path(path)?;
    tracing::debug!("Exporting {} records as {}", records.len(), file_type);

    match file_type {
        FileType::Dxf => dxf_io::export(path, records, options.units),
        FileType::Csv => csv_io::export(path, records, options.units, options.header),
        FileType::Txt => txt_io::export(path, records, options.units),
        FileType::Json => json_io::export(path, records),
    }
}
