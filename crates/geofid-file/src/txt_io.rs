//! TXT 点列表导入/导出
//!
//! 每行一个点：`x,y` 或 `x,y,z`。

use crate::error::FileError;
use geofid_core::geometry::{Geometry, Point};
use geofid_core::record::GeometryRecord;
use geofid_core::request::{BatchBuilder, ConversionRequest};
use geofid_core::tessellate::Tessellation;
use geofid_core::units::Unit;
use std::fs;
use std::path::Path;

/// 从TXT文件导入
pub fn import(path: &Path, request: &ConversionRequest, unit: Unit) -> Result<Tessellation, FileError> {
    let content = fs::read_to_string(path)?;
    let output = import_str(&content, request, unit);
    tracing::info!(
        "Imported {} points from {}",
        output.records.len(),
        path.display()
    );
    Ok(output)
}

/// 从文本导入，不是点的行直接跳过
pub fn import_str(content: &str, request: &ConversionRequest, unit: Unit) -> Tessellation {
    let mut batch = BatchBuilder::new(request);
    for line in content.lines() {
        match parse_point(line) {
            Some(point) => batch.push(Geometry::Point(point).scaled(unit.factor())),
            None => tracing::debug!("Not a point: {:?}", line),
        }
    }
    batch.finish()
}

fn parse_point(line: &str) -> Option<Point> {
    let values: Vec<f64> = line
        .trim()
        .split(',')
        .map(|v| v.trim().parse().ok())
        .collect::<Option<_>>()?;
    match values.as_slice() {
        [x, y] => Some(Point::new(*x, *y, 0.0)),
        [x, y, z] => Some(Point::new(*x, *y, *z)),
        _ => None,
    }
}

/// 导出到TXT文件，只写点
pub fn export(path: &Path, records: &[GeometryRecord], unit: Unit) -> Result<(), FileError> {
    let mut content = String::new();
    let mut written = 0;
    for record in records {
        match record.geometry() {
            Geometry::Point(point) => {
                let p = unit_point(point, unit);
                content.push_str(&format!("{}, {}, {}\n", p.x, p.y, p.z));
                written += 1;
            }
            _ => tracing::warn!("Unsupported geometry for TXT skipped: {}", record),
        }
    }
    fs::write(path, content)?;

    tracing::info!("Exported {} points to {} ({})", written, path.display(), unit);
    Ok(())
}

fn unit_point(point: &Point, unit: Unit) -> geofid_core::math::Point3 {
    point.position.map(|v| unit.from_canonical(v))
}
