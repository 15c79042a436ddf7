//! CSV 扫描表导入/导出
//!
//! 列：`name,scantype,arg1,arg2,arg3,arg4`
//!
//! | scantype | arg1      | arg2     | arg3     | arg4   |
//! |----------|-----------|----------|----------|--------|
//! | point    | "x, y, z" |          |          |        |
//! | line     | 起点      | 终点     |          |        |
//! | arc      | 圆心      | 半径     | 起始角   | 终止角 |
//! | ellipse  | 圆心      | 长轴长度 | 短长轴比 |        |
//!
//! 含逗号的字段用双引号包裹。导入的椭圆长轴沿 +X 方向。

use crate::error::FileError;
use geofid_core::geometry::{Arc, Ellipse, Geometry, Line, Point};
use geofid_core::math::{Point3, Vector3};
use geofid_core::record::GeometryRecord;
use geofid_core::request::{BatchBuilder, ConversionRequest};
use geofid_core::tessellate::Tessellation;
use geofid_core::units::Unit;
use std::fs;
use std::path::Path;

pub const HEADER: [&str; 6] = ["name", "scantype", "arg1", "arg2", "arg3", "arg4"];

/// 从CSV文件导入
pub fn import(
    path: &Path,
    request: &ConversionRequest,
    unit: Unit,
    header: bool,
) -> Result<Tessellation, FileError> {
    let content = fs::read_to_string(path)?;
    let output = import_str(&content, request, unit, header)?;
    tracing::info!(
        "Imported {} records from {}",
        output.records.len(),
        path.display()
    );
    Ok(output)
}

/// 从CSV文本导入
pub fn import_str(
    content: &str,
    request: &ConversionRequest,
    unit: Unit,
    header: bool,
) -> Result<Tessellation, FileError> {
    let factor = unit.factor();
    let mut batch = BatchBuilder::new(request);

    let skip = usize::from(header);
    for (index, line) in content.lines().enumerate().skip(skip) {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_row(line);
        let row = index + 1;
        if let Some(geometry) = parse_row(&fields, row)? {
            batch.push(geometry.scaled(factor));
        }
    }
    Ok(batch.finish())
}

/// 解析一行，未知或不可表示的类型返回 `None`
fn parse_row(fields: &[String], row: usize) -> Result<Option<Geometry>, FileError> {
    let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");
    let scantype = field(1).trim().to_ascii_uppercase();

    let geometry = match scantype.as_str() {
        "POINT" => Geometry::Point(Point::from_point3(parse_point(field(2), row)?)),
        "LINE" => Geometry::Line(Line::new(
            parse_point(field(2), row)?,
            parse_point(field(3), row)?,
        )),
        "ARC" | "CIRCLE" => Geometry::Arc(Arc::new(
            parse_point(field(2), row)?,
            parse_number(field(3), row)?,
            parse_number(field(4), row)?,
            parse_number(field(5), row)?,
        )),
        "ELLIPSE" => {
            let center = parse_point(field(2), row)?;
            let major = parse_number(field(3), row)?;
            let ratio = parse_number(field(4), row)?;
            match Ellipse::new(center, Vector3::new(major, 0.0, 0.0), ratio) {
                Ok(e) => Geometry::Ellipse(e),
                Err(e) => {
                    tracing::warn!("Row {}: {}", row, e);
                    return Ok(None);
                }
            }
        }
        _ => {
            tracing::warn!("Row {}: unknown geometry {:?}", row, field(1));
            return Ok(None);
        }
    };
    Ok(Some(geometry))
}

/// 拆分一行，支持双引号包裹和 `""` 转义
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_number(field: &str, row: usize) -> Result<f64, FileError> {
    field
        .trim()
        .parse()
        .map_err(|_| FileError::InvalidFormat(format!("row {}: invalid number {:?}", row, field)))
}

/// `x, y` 或 `x, y, z`
fn parse_point(field: &str, row: usize) -> Result<Point3, FileError> {
    let values = field
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|v| parse_number(v, row))
        .collect::<Result<Vec<f64>, _>>()?;

    match values.as_slice() {
        [x, y] => Ok(Point3::new(*x, *y, 0.0)),
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(FileError::InvalidFormat(format!(
            "row {}: expected 2 or 3 coordinates, got {:?}",
            row, field
        ))),
    }
}

fn format_point(p: &Point3) -> String {
    format!("{}, {}, {}", p.x, p.y, p.z)
}

fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// 生成一条记录对应的行，样条和多段线无法表示
fn format_row(record: &GeometryRecord, unit: Unit) -> Option<[String; 6]> {
    let scantype = record.kind().tag().to_ascii_lowercase();
    let mut row: [String; 6] = Default::default();
    row[0] = record.to_string();

    match &record.geometry().scaled(1.0 / unit.factor()) {
        Geometry::Point(point) => {
            row[2] = format_point(&point.position);
        }
        Geometry::Line(line) => {
            row[2] = format_point(&line.start);
            row[3] = format_point(&line.end);
        }
        Geometry::Arc(arc) => {
            row[2] = format_point(&arc.center);
            row[3] = arc.radius.to_string();
            row[4] = arc.start_angle.to_string();
            row[5] = arc.end_angle.to_string();
        }
        Geometry::Ellipse(ellipse) => {
            row[2] = format_point(&ellipse.center);
            row[3] = ellipse.major_radius().to_string();
            row[4] = ellipse.ratio().to_string();
        }
        Geometry::Spline(_) | Geometry::Polyline(_) => return None,
    }
    row[1] = scantype;
    Some(row)
}

/// 导出到CSV文件
pub fn export(
    path: &Path,
    records: &[GeometryRecord],
    unit: Unit,
    header: bool,
) -> Result<(), FileError> {
    let mut lines = Vec::with_capacity(records.len() + 1);
    if header {
        lines.push(HEADER.join(","));
    }

    for record in records {
        match format_row(record, unit) {
            Some(row) => {
                let quoted: Vec<String> = row.iter().map(|f| quote(f)).collect();
                lines.push(quoted.join(","));
            }
            None => tracing::warn!("Unsupported geometry for CSV skipped: {}", record),
        }
    }

    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content)?;

    tracing::info!("Exported {} records to {} ({})", records.len(), path.display(), unit);
    Ok(())
}
