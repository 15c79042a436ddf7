//! 几何细分
//!
//! 三个相邻等级之间的降级算法：
//! - 椭圆 → 圆弧：按参数角等距采样 2N 个点，每三个点拟合一段圆弧
//! - 圆弧 → 线段：按角度等距采样 N+1 个点，依次连接
//! - 线段 → 点：按 X 坐标等距采样 N 个点
//!
//! 采样均基于角度或 X 投影，不是弧长均匀采样。所有输入输出都是微米。

use crate::error::{DegenerateGeometry, Diagnostic, GeometryError};
use crate::geometry::{Arc, Ellipse, Geometry, Line, Point};
use crate::math::{Point3, EPSILON};
use crate::record::{GeometryRecord, IdAllocator};
use crate::units::Unit;

/// 未指定分段数和分段长度时的默认分段数
pub const DEFAULT_SEGMENTS: usize = 10;

/// 分段参数（规范单位）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SegmentParams {
    /// 分段数，大于0时优先使用
    pub num_segments: usize,
    /// 分段长度（微米），分段数为0时使用
    pub segment_length: f64,
}

/// 实际采用的分段方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    Count(usize),
    Length(f64),
}

impl SegmentParams {
    pub fn with_segments(num_segments: usize) -> Self {
        Self {
            num_segments,
            segment_length: 0.0,
        }
    }

    pub fn with_length(segment_length: f64) -> Self {
        Self {
            num_segments: 0,
            segment_length,
        }
    }

    /// 从边界参数构造，分段长度按 `unit` 换算为微米
    pub fn from_units(num_segments: usize, segment_length: f64, unit: Unit) -> Self {
        Self {
            num_segments,
            segment_length: unit.to_canonical(segment_length),
        }
    }

    pub fn sizing(&self) -> Sizing {
        if self.num_segments > 0 {
            Sizing::Count(self.num_segments)
        } else if self.segment_length > 0.0 {
            Sizing::Length(self.segment_length)
        } else {
            Sizing::Count(DEFAULT_SEGMENTS)
        }
    }
}

/// 一次细分的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tessellation {
    /// 新生成的记录（有序）
    pub records: Vec<GeometryRecord>,
    /// 被跳过的元素
    pub diagnostics: Vec<Diagnostic>,
    /// 整条转换失败的源记录（标签, 错误）
    pub rejected: Vec<(String, GeometryError)>,
}

impl Tessellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// 不做转换，直接包装已有记录
    pub fn passthrough(records: Vec<GeometryRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// 记录一个退化问题并输出警告
    pub fn skip(&mut self, source: &GeometryRecord, problem: DegenerateGeometry) {
        tracing::warn!("Skipping part of {}: {}", source, problem);
        self.diagnostics.push(Diagnostic {
            source_id: source.id(),
            source_kind: source.kind(),
            problem,
        });
    }

    /// 追加另一次细分的结果
    pub fn merge(&mut self, other: Tessellation) {
        self.records.extend(other.records);
        self.diagnostics.extend(other.diagnostics);
        self.rejected.extend(other.rejected);
    }

    /// 跳过的数量：退化片段加上转换失败的记录
    pub fn skipped(&self) -> usize {
        self.diagnostics.len() + self.rejected.len()
    }
}

/// 椭圆 → 圆弧
///
/// 外层 `Err` 表示整个椭圆被跳过；内层 `Err` 表示某一段圆弧拟合失败。
pub fn ellipse_to_arcs(
    ellipse: &Ellipse,
    params: &SegmentParams,
) -> Result<Vec<Result<Arc, DegenerateGeometry>>, DegenerateGeometry> {
    let num_segments = match params.sizing() {
        Sizing::Count(n) => n,
        Sizing::Length(segment_length) => {
            let circumference = ellipse.approximate_circumference();
            if segment_length > circumference {
                return Err(DegenerateGeometry::SegmentExceedsExtent {
                    segment_length,
                    extent: circumference,
                });
            }
            ((circumference / segment_length).floor() as usize).max(1)
        }
    };

    // 需要 2N 个点：每段圆弧的起点、中点，终点与下一段共用
    let step = 360.0 / num_segments as f64 / 2.0;
    let points: Vec<Point3> = (0..2 * num_segments)
        .map(|i| ellipse.point_at(i as f64 * step))
        .collect();

    let arcs = (0..num_segments)
        .map(|i| {
            let p1 = &points[2 * i];
            let p2 = &points[2 * i + 1];
            let p3 = &points[(2 * i + 2) % points.len()];
            Arc::from_three_points(p1, p2, p3, ellipse.center.z)
                .ok_or(DegenerateGeometry::CollinearFit { index: i })
        })
        .collect();

    Ok(arcs)
}

/// 圆弧 → 线段
///
/// 由分段长度推算时使用小角度近似 `(L / 2πr) · 360`，不是精确的弦长计算。
/// 整圆额外输出一条从最后一个采样点回到第一个采样点的闭合线段。
pub fn arc_to_lines(arc: &Arc, params: &SegmentParams) -> Result<Vec<Line>, DegenerateGeometry> {
    let degree = arc.sweep();

    let (num_segments, segment_angle) = match params.sizing() {
        Sizing::Count(n) => (n, degree / n as f64),
        Sizing::Length(segment_length) => {
            let segment_angle =
                segment_length / (arc.radius * 2.0 * std::f64::consts::PI) * 360.0;
            let n = (degree.abs() / segment_angle).floor() as usize;
            if n == 0 {
                return Err(DegenerateGeometry::SegmentExceedsExtent {
                    segment_length,
                    extent: arc.radius * degree.abs().to_radians(),
                });
            }
            (n, segment_angle.copysign(degree))
        }
    };

    let points: Vec<Point3> = (0..=num_segments)
        .map(|i| arc.point_at(arc.start_angle + segment_angle * i as f64))
        .collect();

    let mut lines: Vec<Line> = points
        .windows(2)
        .map(|pair| Line::new(pair[0], pair[1]))
        .collect();

    if arc.is_full_circle() {
        lines.push(Line::new(points[num_segments], points[0]));
    }

    Ok(lines)
}

/// 线段 → 点
///
/// 使用线段在XY平面投影的斜率和截距，按 X 等距采样，Z 固定为 0。
/// 竖直线段斜率无定义，作为退化几何跳过。
pub fn line_to_points(line: &Line, params: &SegmentParams) -> Result<Vec<Point>, DegenerateGeometry> {
    if line.length() < EPSILON {
        return Err(DegenerateGeometry::ZeroLengthLine);
    }
    if line.start.x == line.end.x {
        return Err(DegenerateGeometry::VerticalLine);
    }

    let num_segments = match params.sizing() {
        Sizing::Count(n) => n,
        Sizing::Length(segment_length) => {
            let extent = line.length_xy();
            let n = (extent / segment_length).floor() as usize;
            if n == 0 {
                return Err(DegenerateGeometry::SegmentExceedsExtent {
                    segment_length,
                    extent,
                });
            }
            n
        }
    };

    let (start, end) = (&line.start, &line.end);
    let slope = (start.y - end.y) / (start.x - end.x);
    let y_intercept = start.y - slope * start.x;
    let x_step = (end.x - start.x) / num_segments as f64;

    let points = (0..num_segments)
        .map(|i| {
            let x = start.x + x_step * i as f64;
            Point::new(x, slope * x + y_intercept, 0.0)
        })
        .collect();

    Ok(points)
}

/// 对单条记录执行一级细分
///
/// 只处理邻接链上有下一级的类型；其他类型由调用方在此之前拒绝。
pub(crate) fn tessellate_record(
    record: &GeometryRecord,
    params: &SegmentParams,
    ids: &mut IdAllocator,
    out: &mut Tessellation,
) {
    match record.geometry() {
        Geometry::Ellipse(ellipse) => match ellipse_to_arcs(ellipse, params) {
            Ok(arcs) => {
                for arc in arcs {
                    match arc {
                        Ok(arc) => out.records.push(ids.record(Geometry::Arc(arc))),
                        Err(problem) => out.skip(record, problem),
                    }
                }
            }
            Err(problem) => out.skip(record, problem),
        },
        Geometry::Arc(arc) => match arc_to_lines(arc, params) {
            Ok(lines) => out
                .records
                .extend(lines.into_iter().map(|l| ids.record(Geometry::Line(l)))),
            Err(problem) => out.skip(record, problem),
        },
        Geometry::Line(line) => match line_to_points(line, params) {
            Ok(points) => out
                .records
                .extend(points.into_iter().map(|p| ids.record(Geometry::Point(p)))),
            Err(problem) => out.skip(record, problem),
        },
        Geometry::Point(_) | Geometry::Spline(_) | Geometry::Polyline(_) => {
            tracing::debug!("{} has no lower fidelity stage", record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, Vector3};

    const TOL: f64 = 1e-3;

    fn dist(a: &Point3, b: &Point3) -> f64 {
        (a - b).norm()
    }

    #[test]
    fn test_sizing_policy() {
        assert_eq!(SegmentParams::default().sizing(), Sizing::Count(DEFAULT_SEGMENTS));
        assert_eq!(SegmentParams::with_segments(4).sizing(), Sizing::Count(4));
        assert_eq!(SegmentParams::with_length(2.5).sizing(), Sizing::Length(2.5));
        let params = SegmentParams {
            num_segments: 3,
            segment_length: 100.0,
        };
        assert_eq!(params.sizing(), Sizing::Count(3));
        let params = SegmentParams::from_units(0, 2.0, Unit::Millimeters);
        assert_eq!(params.sizing(), Sizing::Length(2000.0));
    }

    #[test]
    fn test_line_to_points_count() {
        let line = Line::new(Point3::new(0.0, 1.0, 5.0), Point3::new(10.0, 21.0, 7.0));
        let points = line_to_points(&line, &SegmentParams::with_segments(5)).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].position, Point3::new(0.0, 1.0, 0.0));
        for (i, p) in points.iter().enumerate() {
            assert!((p.position.x - 2.0 * i as f64).abs() < 1e-9);
            assert!((p.position.y - (1.0 + 4.0 * i as f64)).abs() < 1e-9);
            assert_eq!(p.position.z, 0.0);
        }
    }

    #[test]
    fn test_line_to_points_reversed_direction() {
        let line = Line::new(Point3::new(10.0, 0.0, 0.0), Point3::new(0.0, 10.0, 0.0));
        let points = line_to_points(&line, &SegmentParams::with_segments(4)).unwrap();
        let xs: Vec<f64> = points.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![10.0, 7.5, 5.0, 2.5]);
        assert!((points[1].position.y - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_line_to_points_default_and_length() {
        let line = Line::new(Point3::new(0.0, 0.0, 0.0), Point3::new(30.0, 40.0, 0.0));
        let points = line_to_points(&line, &SegmentParams::default()).unwrap();
        assert_eq!(points.len(), DEFAULT_SEGMENTS);

        // 长度 50，分段长度 12 → 4 个点
        let points = line_to_points(&line, &SegmentParams::with_length(12.0)).unwrap();
        assert_eq!(points.len(), 4);

        assert!(matches!(
            line_to_points(&line, &SegmentParams::with_length(60.0)),
            Err(DegenerateGeometry::SegmentExceedsExtent { .. })
        ));
    }

    #[test]
    fn test_line_to_points_degenerate() {
        let vertical = Line::new(Point3::new(3.0, 0.0, 0.0), Point3::new(3.0, 10.0, 0.0));
        assert_eq!(
            line_to_points(&vertical, &SegmentParams::with_segments(4)),
            Err(DegenerateGeometry::VerticalLine)
        );

        let zero = Line::new(Point3::new(3.0, 3.0, 3.0), Point3::new(3.0, 3.0, 3.0));
        assert_eq!(
            line_to_points(&zero, &SegmentParams::with_segments(4)),
            Err(DegenerateGeometry::ZeroLengthLine)
        );
    }

    #[test]
    fn test_arc_to_lines_full_circle() {
        let arc = Arc::circle(Point3::new(5.0, -5.0, 2.0), 1000.0);
        let n = 8;
        let lines = arc_to_lines(&arc, &SegmentParams::with_segments(n)).unwrap();
        assert_eq!(lines.len(), n + 1);

        let closing = &lines[n];
        assert!(dist(&closing.end, &lines[0].start) <= TOL * arc.radius);
        assert_eq!(closing.end.z, 2.0);
    }

    #[test]
    fn test_arc_to_lines_half_circle() {
        let arc = Arc::new(Point3::origin(), 20000.0, -90.0, 90.0);
        let lines = arc_to_lines(&arc, &SegmentParams::with_segments(10)).unwrap();
        assert_eq!(lines.len(), 10);

        for line in &lines {
            assert!(approx_eq(dist(&line.start, &arc.center), 20000.0, TOL));
            assert!(approx_eq(dist(&line.end, &arc.center), 20000.0, TOL));
        }
        for pair in lines.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!((lines[0].start.y + 20000.0).abs() < 1e-6);
        assert!((lines[9].end.y - 20000.0).abs() < 1e-6);
    }

    #[test]
    fn test_arc_to_lines_by_length() {
        // 周长约 6283，分段长度 1000 → 每段约 57.3°，半圆得到 3 段
        let arc = Arc::new(Point3::origin(), 1000.0, 0.0, 180.0);
        let lines = arc_to_lines(&arc, &SegmentParams::with_length(1000.0)).unwrap();
        assert_eq!(lines.len(), 3);

        // 反向圆弧沿顺时针采样
        let arc = Arc::new(Point3::origin(), 1000.0, 180.0, 0.0);
        let lines = arc_to_lines(&arc, &SegmentParams::with_length(1000.0)).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].end.y > 0.0);

        let arc = Arc::new(Point3::origin(), 10.0, 0.0, 10.0);
        assert!(matches!(
            arc_to_lines(&arc, &SegmentParams::with_length(100.0)),
            Err(DegenerateGeometry::SegmentExceedsExtent { .. })
        ));
    }

    #[test]
    fn test_ellipse_circle_equal_radii() {
        let ellipse =
            Ellipse::new(Point3::new(100.0, 50.0, 0.0), Vector3::new(5000.0, 0.0, 0.0), 1.0)
                .unwrap();
        let n = 12;
        let arcs = ellipse_to_arcs(&ellipse, &SegmentParams::with_segments(n)).unwrap();
        assert_eq!(arcs.len(), n);
        for arc in arcs {
            let arc = arc.expect("circle triples are never collinear");
            assert!(approx_eq(arc.radius, 5000.0, TOL));
            assert!(dist(&arc.center, &ellipse.center) < TOL * 5000.0);
        }
    }

    #[test]
    fn test_ellipse_arcs_pass_through_samples() {
        let ellipse =
            Ellipse::new(Point3::origin(), Vector3::new(0.0, 4000.0, 0.0), 0.5).unwrap();
        let arcs = ellipse_to_arcs(&ellipse, &SegmentParams::default()).unwrap();
        assert_eq!(arcs.len(), DEFAULT_SEGMENTS);

        // 第一段从长轴端点开始
        let first = arcs[0].as_ref().unwrap();
        let start = first.point_at(first.start_angle);
        assert!(start.x.abs() < 1e-6);
        assert!((start.y - 4000.0).abs() < 1e-6);
    }

    #[test]
    fn test_ellipse_segment_length() {
        let ellipse =
            Ellipse::new(Point3::origin(), Vector3::new(1000.0, 0.0, 0.0), 1.0).unwrap();
        let circumference = ellipse.approximate_circumference();

        let arcs =
            ellipse_to_arcs(&ellipse, &SegmentParams::with_length(circumference / 4.0)).unwrap();
        assert_eq!(arcs.len(), 4);

        assert!(matches!(
            ellipse_to_arcs(&ellipse, &SegmentParams::with_length(circumference * 2.0)),
            Err(DegenerateGeometry::SegmentExceedsExtent { .. })
        ));
    }

    #[test]
    fn test_ellipse_single_segment_is_collinear() {
        // 只有两个采样点，第三点回到第一点
        let ellipse =
            Ellipse::new(Point3::origin(), Vector3::new(1000.0, 0.0, 0.0), 0.5).unwrap();
        let arcs = ellipse_to_arcs(&ellipse, &SegmentParams::with_segments(1)).unwrap();
        assert_eq!(arcs, vec![Err(DegenerateGeometry::CollinearFit { index: 0 })]);
    }

    #[test]
    fn test_tessellate_record_ids_and_diagnostics() {
        let mut ids = IdAllocator::starting_at(100);
        let mut out = Tessellation::new();

        let arc = GeometryRecord::new(1, Geometry::Arc(Arc::circle(Point3::origin(), 10.0)));
        tessellate_record(&arc, &SegmentParams::with_segments(4), &mut ids, &mut out);
        assert_eq!(out.records.len(), 5);
        assert_eq!(out.records[0].id(), 100);
        assert_eq!(out.records[4].id(), 104);

        let vertical = GeometryRecord::new(
            2,
            Geometry::Line(Line::new(Point3::origin(), Point3::new(0.0, 5.0, 0.0))),
        );
        tessellate_record(&vertical, &SegmentParams::default(), &mut ids, &mut out);
        assert_eq!(out.records.len(), 5);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].source_id, 2);
        assert_eq!(out.diagnostics[0].problem, DegenerateGeometry::VerticalLine);
    }
}
