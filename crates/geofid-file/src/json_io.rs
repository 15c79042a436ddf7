//! JSON 批量格式
//!
//! 记录数组，规范单位（微米、角度），所有几何类型都能无损保存。
//! 导入时重新分配ID并应用降级请求。

use crate::error::FileError;
use geofid_core::record::GeometryRecord;
use geofid_core::request::{BatchBuilder, ConversionRequest};
use geofid_core::tessellate::Tessellation;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// 从JSON文件导入
pub fn import(path: &Path, request: &ConversionRequest) -> Result<Tessellation, FileError> {
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<GeometryRecord> = serde_json::from_reader(reader)?;

    let mut batch = BatchBuilder::new(request);
    for record in records {
        batch.push(record.into_geometry());
    }
    let output = batch.finish();

    tracing::info!(
        "Imported {} records from {}",
        output.records.len(),
        path.display()
    );
    Ok(output)
}

/// 导出到JSON文件
pub fn export(path: &Path, records: &[GeometryRecord]) -> Result<(), FileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;

    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}
