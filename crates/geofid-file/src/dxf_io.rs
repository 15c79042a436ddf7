//! DXF文件导入/导出
//!
//! 导入使用 `dxf` crate 读取模型空间实体，按 `$INSUNITS` 换算为微米后逐条
//! 应用降级请求。导出同样走 `dxf::Drawing`，版本固定为 R2000 以保留
//! 椭圆、样条和轻量多段线。

use crate::error::FileError;
use dxf::entities::EntityType;
use geofid_core::geometry::{Arc, Ellipse, Geometry, Line, Point, Polyline, PolylineVertex, Spline};
use geofid_core::math::{Point3, Vector3};
use geofid_core::record::GeometryRecord;
use geofid_core::request::{BatchBuilder, ConversionRequest};
use geofid_core::tessellate::Tessellation;
use geofid_core::units::Unit;
use std::path::Path;

/// 从DXF文件导入
pub fn import(path: &Path, request: &ConversionRequest) -> Result<Tessellation, FileError> {
    let drawing = dxf::Drawing::load_file(path).map_err(|e| FileError::Dxf(e.to_string()))?;
    let output = import_drawing(&drawing, request);
    tracing::info!(
        "Imported {} records from {}",
        output.records.len(),
        path.display()
    );
    Ok(output)
}

/// 转换已加载的图纸
pub fn import_drawing(drawing: &dxf::Drawing, request: &ConversionRequest) -> Tessellation {
    let code = drawing.header.default_drawing_units as i32;
    // 0 表示无单位，按微米处理
    let factor = Unit::from_dxf_code(code).map_or(1.0, Unit::factor);

    let mut batch = BatchBuilder::new(request);
    for entity in drawing.entities() {
        match convert_dxf_entity(entity) {
            Some(geometry) => batch.push(geometry.scaled(factor)),
            None => tracing::warn!("Unsupported DXF entity skipped: {:?}", entity.specific),
        }
    }
    batch.finish()
}

fn point3(p: &dxf::Point) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

/// 将DXF实体转换为几何（未换算单位）
fn convert_dxf_entity(entity: &dxf::entities::Entity) -> Option<Geometry> {
    let geometry = match &entity.specific {
        EntityType::ModelPoint(point) => Geometry::Point(Point::from_point3(point3(&point.location))),

        EntityType::Line(line) => Geometry::Line(Line::new(point3(&line.p1), point3(&line.p2))),

        EntityType::Circle(circle) => {
            Geometry::Arc(Arc::circle(point3(&circle.center), circle.radius))
        }

        EntityType::Arc(arc) => Geometry::Arc(Arc::new(
            point3(&arc.center),
            arc.radius,
            arc.start_angle,
            arc.end_angle,
        )),

        EntityType::Ellipse(ellipse) => {
            let axis = Vector3::new(ellipse.major_axis.x, ellipse.major_axis.y, ellipse.major_axis.z);
            match Ellipse::new(point3(&ellipse.center), axis, ellipse.minor_axis_ratio) {
                Ok(e) => Geometry::Ellipse(e),
                Err(e) => {
                    tracing::warn!("Invalid DXF ellipse skipped: {}", e);
                    return None;
                }
            }
        }

        EntityType::Spline(spline) => {
            let control_points: Vec<Point3> = spline.control_points.iter().map(point3).collect();
            let weights = if spline.weight_values.is_empty() {
                vec![1.0; control_points.len()]
            } else {
                spline.weight_values.clone()
            };
            Geometry::Spline(Spline {
                degree: spline.degree_of_curve,
                closed: spline.is_closed(),
                control_points,
                knots: spline.knot_values.clone(),
                weights,
            })
        }

        EntityType::LwPolyline(lwpoly) => {
            let vertices = lwpoly
                .vertices
                .iter()
                .map(|v| PolylineVertex {
                    point: Point3::new(v.x, v.y, entity.common.elevation),
                    start_width: v.starting_width,
                    end_width: v.ending_width,
                    bulge: v.bulge,
                })
                .collect();
            Geometry::Polyline(Polyline {
                vertices,
                closed: lwpoly.is_closed(),
            })
        }

        _ => return None,
    };
    Some(geometry)
}

/// 导出到DXF文件
pub fn export(path: &Path, records: &[GeometryRecord], unit: Unit) -> Result<(), FileError> {
    if records.is_empty() {
        return Err(FileError::EmptyBatch);
    }

    let mut drawing = dxf::Drawing::new();
    drawing.header.version = dxf::enums::AcadVersion::R2000;
    drawing.header.default_drawing_units = dxf_units(unit);

    let factor = 1.0 / unit.factor();
    for record in records {
        drawing.add_entity(convert_to_dxf_entity(&record.geometry().scaled(factor)));
    }

    drawing
        .save_file(path)
        .map_err(|e| FileError::Dxf(e.to_string()))?;

    tracing::info!(
        "Exported {} records to {} ({})",
        records.len(),
        path.display(),
        unit
    );
    Ok(())
}

fn dxf_point(p: &Point3) -> dxf::Point {
    dxf::Point::new(p.x, p.y, p.z)
}

/// `$INSUNITS` 对应的单位
fn dxf_units(unit: Unit) -> dxf::enums::Units {
    use dxf::enums::Units;
    match unit {
        Unit::Inches => Units::Inches,
        Unit::Feet => Units::Feet,
        Unit::Miles => Units::Miles,
        Unit::Millimeters => Units::Millimeters,
        Unit::Centimeters => Units::Centimeters,
        Unit::Meters => Units::Meters,
        Unit::Kilometers => Units::Kilometers,
        Unit::Microinches => Units::Microinches,
        Unit::Mils => Units::Mils,
        Unit::Yards => Units::Yards,
        Unit::Angstroms => Units::Angstroms,
        Unit::Nanometers => Units::Nanometers,
        Unit::Microns => Units::Microns,
        Unit::Decimeters => Units::Decimeters,
        Unit::Decameters => Units::Decameters,
        Unit::Hectometers => Units::Hectometers,
        Unit::Gigameters => Units::Gigameters,
        Unit::AstronomicalUnits => Units::AstronomicalUnits,
        Unit::LightYears => Units::LightYears,
        Unit::Parsecs => Units::Parsecs,
        Unit::UsSurveyFeet => Units::USSurveyFeet,
        Unit::UsSurveyInch => Units::USSurveyInch,
        Unit::UsSurveyYard => Units::USSurveyYard,
        Unit::UsSurveyMile => Units::USSurveyMile,
    }
}

/// 将几何转换为DXF实体（已换算到导出单位）
fn convert_to_dxf_entity(geometry: &Geometry) -> dxf::entities::Entity {
    let mut elevation = 0.0;
    let specific = match geometry {
        Geometry::Point(point) => {
            let mut model_point = dxf::entities::ModelPoint::default();
            model_point.location = dxf_point(&point.position);
            EntityType::ModelPoint(model_point)
        }

        Geometry::Line(line) => {
            let mut dxf_line = dxf::entities::Line::default();
            dxf_line.p1 = dxf_point(&line.start);
            dxf_line.p2 = dxf_point(&line.end);
            EntityType::Line(dxf_line)
        }

        // 整圆写成 CIRCLE
        Geometry::Arc(arc) if arc.is_full_circle() => {
            let mut dxf_circle = dxf::entities::Circle::default();
            dxf_circle.center = dxf_point(&arc.center);
            dxf_circle.radius = arc.radius;
            EntityType::Circle(dxf_circle)
        }

        Geometry::Arc(arc) => {
            let mut dxf_arc = dxf::entities::Arc::default();
            dxf_arc.center = dxf_point(&arc.center);
            dxf_arc.radius = arc.radius;
            dxf_arc.start_angle = arc.start_angle;
            dxf_arc.end_angle = arc.end_angle;
            EntityType::Arc(dxf_arc)
        }

        Geometry::Ellipse(ellipse) => {
            let axis = &ellipse.major_axis;
            let mut dxf_ellipse = dxf::entities::Ellipse::default();
            dxf_ellipse.center = dxf_point(&ellipse.center);
            dxf_ellipse.major_axis = dxf::Vector::new(axis.x, axis.y, axis.z);
            dxf_ellipse.minor_axis_ratio = ellipse.ratio();
            dxf_ellipse.start_parameter = 0.0;
            dxf_ellipse.end_parameter = std::f64::consts::TAU;
            EntityType::Ellipse(dxf_ellipse)
        }

        Geometry::Spline(spline) => {
            let mut dxf_spline = dxf::entities::Spline::default();
            dxf_spline.degree_of_curve = spline.degree;
            dxf_spline.set_is_closed(spline.closed);
            dxf_spline.control_points = spline.control_points.iter().map(dxf_point).collect();
            dxf_spline.knot_values = spline.knots.clone();
            dxf_spline.weight_values = spline.weights.clone();
            EntityType::Spline(dxf_spline)
        }

        Geometry::Polyline(polyline) => {
            let mut lwpoly = dxf::entities::LwPolyline::default();
            lwpoly.set_is_closed(polyline.closed);
            elevation = polyline.vertices.first().map_or(0.0, |v| v.point.z);
            lwpoly.vertices = polyline
                .vertices
                .iter()
                .map(|v| {
                    let mut vertex = dxf::LwPolylineVertex::default();
                    vertex.x = v.point.x;
                    vertex.y = v.point.y;
                    vertex.starting_width = v.start_width;
                    vertex.ending_width = v.end_width;
                    vertex.bulge = v.bulge;
                    vertex
                })
                .collect();
            EntityType::LwPolyline(lwpoly)
        }
    };
    let mut entity = dxf::entities::Entity::new(specific);
    entity.common.elevation = elevation;
    entity
}
