//! 几何图元定义
//!
//! 支持的图元（按保真度从低到高）：
//! - 点 (Point)
//! - 线段 (Line)
//! - 圆弧 (Arc)，整圆表示为 0°..360° 的圆弧
//! - 椭圆 (Ellipse)
//! - 样条曲线 (Spline)，透传，不细分
//! - 多段线 (Polyline)，透传，不细分
//!
//! 所有长度为微米，所有角度为角度制、逆时针。

use crate::error::GeometryError;
use crate::math::{polar_point, Point3, Vector3, EPSILON};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 几何类型，声明顺序即保真度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Line,
    Arc,
    Ellipse,
    Spline,
    Polyline,
}

impl GeometryKind {
    /// 按保真度从低到高排列
    pub const ALL: [GeometryKind; 6] = [
        GeometryKind::Point,
        GeometryKind::Line,
        GeometryKind::Arc,
        GeometryKind::Ellipse,
        GeometryKind::Spline,
        GeometryKind::Polyline,
    ];

    /// 保真度等级
    pub fn rank(self) -> usize {
        self as usize
    }

    /// 边界上使用的类型标签
    pub fn tag(self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::Line => "LINE",
            GeometryKind::Arc => "ARC",
            GeometryKind::Ellipse => "ELLIPSE",
            GeometryKind::Spline => "SPLINE",
            GeometryKind::Polyline => "LWPOLYLINE",
        }
    }

    /// 邻接链 Ellipse → Arc → Line → Point 上的下一级
    ///
    /// 样条和多段线没有细分规则。
    pub fn next_lower(self) -> Option<GeometryKind> {
        match self {
            GeometryKind::Ellipse => Some(GeometryKind::Arc),
            GeometryKind::Arc => Some(GeometryKind::Line),
            GeometryKind::Line => Some(GeometryKind::Point),
            GeometryKind::Point | GeometryKind::Spline | GeometryKind::Polyline => None,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GeometryKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POINT" => Ok(GeometryKind::Point),
            "LINE" => Ok(GeometryKind::Line),
            "ARC" | "CIRCLE" => Ok(GeometryKind::Arc),
            "ELLIPSE" => Ok(GeometryKind::Ellipse),
            "SPLINE" => Ok(GeometryKind::Spline),
            "LWPOLYLINE" | "POLYLINE" => Ok(GeometryKind::Polyline),
            _ => Err(GeometryError::UnsupportedGeometryKind(s.to_string())),
        }
    }
}

/// 几何数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point),
    Line(Line),
    Arc(Arc),
    Ellipse(Ellipse),
    Spline(Spline),
    Polyline(Polyline),
}

impl Geometry {
    /// 获取几何类型
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Line(_) => GeometryKind::Line,
            Geometry::Arc(_) => GeometryKind::Arc,
            Geometry::Ellipse(_) => GeometryKind::Ellipse,
            Geometry::Spline(_) => GeometryKind::Spline,
            Geometry::Polyline(_) => GeometryKind::Polyline,
        }
    }

    /// 按比例缩放所有长度量（坐标、半径、线宽），角度、比率和凸度不变
    ///
    /// 单位换算时使用，例如 `factor = Unit::Millimeters.factor()`。
    pub fn scaled(&self, factor: f64) -> Geometry {
        let scale = |p: &Point3| Point3::from(p.coords * factor);
        match self {
            Geometry::Point(p) => Geometry::Point(Point::from_point3(scale(&p.position))),
            Geometry::Line(l) => Geometry::Line(Line::new(scale(&l.start), scale(&l.end))),
            Geometry::Arc(a) => Geometry::Arc(Arc::new(
                scale(&a.center),
                a.radius * factor,
                a.start_angle,
                a.end_angle,
            )),
            Geometry::Ellipse(e) => Geometry::Ellipse(Ellipse {
                center: scale(&e.center),
                major_axis: e.major_axis * factor,
                ratio: e.ratio,
            }),
            Geometry::Spline(s) => Geometry::Spline(Spline {
                control_points: s.control_points.iter().map(scale).collect(),
                ..s.clone()
            }),
            Geometry::Polyline(p) => Geometry::Polyline(Polyline {
                vertices: p
                    .vertices
                    .iter()
                    .map(|v| PolylineVertex {
                        point: scale(&v.point),
                        start_width: v.start_width * factor,
                        end_width: v.end_width * factor,
                        bulge: v.bulge,
                    })
                    .collect(),
                closed: p.closed,
            }),
        }
    }
}

/// 点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub position: Point3,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
        }
    }

    pub fn from_point3(position: Point3) -> Self {
        Self { position }
    }
}

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point3,
    pub end: Point3,
}

impl Line {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 在XY平面上投影的长度
    pub fn length_xy(&self) -> f64 {
        let d = self.end - self.start;
        (d.x * d.x + d.y * d.y).sqrt()
    }
}

/// 圆弧（角度制）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point3,
    pub radius: f64,
    /// 起始角度（度）
    pub start_angle: f64,
    /// 终止角度（度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point3, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// 整圆
    pub fn circle(center: Point3, radius: f64) -> Self {
        Self::new(center, radius, 0.0, 360.0)
    }

    /// 从三点拟合圆弧（代数外接圆公式）
    ///
    /// 只使用XY坐标，圆心Z取 `z`。三点共线时返回 `None`。
    pub fn from_three_points(p1: &Point3, p2: &Point3, p3: &Point3, z: f64) -> Option<Self> {
        let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));

        // 相对容差：d 等于两条边叉积的两倍
        let scale = 2.0 * (p2 - p1).xy().norm() * (p3 - p1).xy().norm();
        if d.abs() <= EPSILON * scale || scale == 0.0 {
            return None; // 三点共线
        }

        let s1 = p1.x * p1.x + p1.y * p1.y;
        let s2 = p2.x * p2.x + p2.y * p2.y;
        let s3 = p3.x * p3.x + p3.y * p3.y;

        let ux = (s1 * (p2.y - p3.y) + s2 * (p3.y - p1.y) + s3 * (p1.y - p2.y)) / d;
        let uy = (s1 * (p3.x - p2.x) + s2 * (p1.x - p3.x) + s3 * (p2.x - p1.x)) / d;

        let center = Point3::new(ux, uy, z);
        let radius = ((p1.x - ux).powi(2) + (p1.y - uy).powi(2)).sqrt();

        let start_angle = (p1.y - uy).atan2(p1.x - ux).to_degrees();
        let end_angle = (p3.y - uy).atan2(p3.x - ux).to_degrees();

        Some(Self::new(center, radius, start_angle, end_angle))
    }

    /// 扫过的角度（带符号，不归一化）
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// 是否为整圆（恰好 360°）
    pub fn is_full_circle(&self) -> bool {
        self.sweep() == 360.0
    }

    /// 获取指定角度（度）处的点
    pub fn point_at(&self, angle_deg: f64) -> Point3 {
        polar_point(&self.center, self.radius, angle_deg)
    }
}

/// 椭圆
///
/// 长轴位于XY平面，z 分量不参与长度和方向计算。反序列化同样经过
/// [`Ellipse::new`] 校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEllipse")]
pub struct Ellipse {
    pub center: Point3,
    /// 长半轴向量（方向和长度）
    pub major_axis: Vector3,
    /// 短轴与长轴之比，(0, 1]
    ratio: f64,
}

#[derive(Deserialize)]
struct RawEllipse {
    center: Point3,
    major_axis: Vector3,
    ratio: f64,
}

impl TryFrom<RawEllipse> for Ellipse {
    type Error = GeometryError;

    fn try_from(raw: RawEllipse) -> Result<Self, Self::Error> {
        Ellipse::new(raw.center, raw.major_axis, raw.ratio)
    }
}

impl Ellipse {
    pub fn new(center: Point3, major_axis: Vector3, ratio: f64) -> Result<Self, GeometryError> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(GeometryError::InvalidGeometry(format!(
                "ellipse ratio {} is outside (0, 1]",
                ratio
            )));
        }
        if major_axis.xy().norm() < EPSILON {
            return Err(GeometryError::InvalidGeometry(
                "ellipse major axis has zero length in the XY plane".to_string(),
            ));
        }
        Ok(Self {
            center,
            major_axis,
            ratio,
        })
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// 长半轴长度 a（长轴在XY平面上的投影）
    pub fn major_radius(&self) -> f64 {
        self.major_axis.xy().norm()
    }

    /// 短半轴长度 b
    pub fn minor_radius(&self) -> f64 {
        self.ratio * self.major_radius()
    }

    /// 长轴在XY平面上的方向角（度）
    pub fn rotation(&self) -> f64 {
        self.major_axis.y.atan2(self.major_axis.x).to_degrees()
    }

    /// 近似周长 2π·sqrt((a²+b²)/2)
    pub fn approximate_circumference(&self) -> f64 {
        let a = self.major_radius();
        let b = self.minor_radius();
        2.0 * std::f64::consts::PI * ((a * a + b * b) / 2.0).sqrt()
    }

    /// 极角 θ（度，相对长轴）处的极径 r(θ) = a·b / sqrt((b·cosθ)² + (a·sinθ)²)
    pub fn polar_radius(&self, theta_deg: f64) -> f64 {
        let a = self.major_radius();
        let b = self.minor_radius();
        let theta = theta_deg.to_radians();
        a * b / ((b * theta.cos()).powi(2) + (a * theta.sin()).powi(2)).sqrt()
    }

    /// 极角 θ（度，相对长轴）处椭圆上的点
    pub fn point_at(&self, theta_deg: f64) -> Point3 {
        polar_point(
            &self.center,
            self.polar_radius(theta_deg),
            theta_deg + self.rotation(),
        )
    }
}

/// 样条曲线（透传）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub degree: i32,
    pub closed: bool,
    pub control_points: Vec<Point3>,
    pub knots: Vec<f64>,
    /// 每个控制点一个权重
    pub weights: Vec<f64>,
}

/// 多段线顶点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineVertex {
    pub point: Point3,
    pub start_width: f64,
    pub end_width: f64,
    /// 凸度（bulge）- 用于弧线段，0表示直线
    pub bulge: f64,
}

impl PolylineVertex {
    pub fn new(point: Point3) -> Self {
        Self {
            point,
            start_width: 0.0,
            end_width: 0.0,
            bulge: 0.0,
        }
    }
}

/// 多段线（透传）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub vertices: Vec<PolylineVertex>,
    /// 是否闭合
    pub closed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order() {
        assert!(GeometryKind::Point < GeometryKind::Line);
        assert!(GeometryKind::Line < GeometryKind::Arc);
        assert!(GeometryKind::Arc < GeometryKind::Ellipse);
        assert_eq!(GeometryKind::Ellipse.next_lower(), Some(GeometryKind::Arc));
        assert_eq!(GeometryKind::Spline.next_lower(), None);
    }

    #[test]
    fn test_kind_from_tag() {
        assert_eq!("line".parse::<GeometryKind>().unwrap(), GeometryKind::Line);
        assert_eq!("CIRCLE".parse::<GeometryKind>().unwrap(), GeometryKind::Arc);
        assert_eq!(
            "LWPOLYLINE".parse::<GeometryKind>().unwrap(),
            GeometryKind::Polyline
        );
        assert!(matches!(
            "HATCH".parse::<GeometryKind>(),
            Err(GeometryError::UnsupportedGeometryKind(_))
        ));
    }

    #[test]
    fn test_arc_from_three_points() {
        let arc = Arc::from_three_points(
            &Point3::new(10.0, 0.0, 0.0),
            &Point3::new(0.0, 10.0, 0.0),
            &Point3::new(-10.0, 0.0, 0.0),
            5.0,
        )
        .unwrap();
        assert!(arc.center.x.abs() < 1e-9);
        assert!(arc.center.y.abs() < 1e-9);
        assert_eq!(arc.center.z, 5.0);
        assert!((arc.radius - 10.0).abs() < 1e-9);
        assert!(arc.start_angle.abs() < 1e-9);
        assert!((arc.end_angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_collinear() {
        let fit = Arc::from_three_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(2.0, 2.0, 0.0),
            0.0,
        );
        assert!(fit.is_none());
    }

    #[test]
    fn test_ellipse_ratio_invariant() {
        let center = Point3::origin();
        let axis = Vector3::new(10.0, 0.0, 0.0);
        assert!(Ellipse::new(center, axis, 0.0).is_err());
        assert!(Ellipse::new(center, axis, 1.5).is_err());
        assert!(Ellipse::new(center, axis, 1.0).is_ok());
        assert!(Ellipse::new(center, Vector3::zeros(), 0.5).is_err());
        assert!(Ellipse::new(center, axis, f64::NAN).is_err());
    }

    #[test]
    fn test_ellipse_raw_goes_through_new() {
        let raw = |ratio| RawEllipse {
            center: Point3::origin(),
            major_axis: Vector3::new(10.0, 0.0, 0.0),
            ratio,
        };
        assert!(matches!(
            Ellipse::try_from(raw(0.0)),
            Err(GeometryError::InvalidGeometry(_))
        ));
        assert!(Ellipse::try_from(raw(-0.5)).is_err());
        assert!(Ellipse::try_from(raw(2.0)).is_err());
        assert_eq!(Ellipse::try_from(raw(0.5)).unwrap().ratio(), 0.5);
    }

    #[test]
    fn test_ellipse_axis_projected_to_xy() {
        let e = Ellipse::new(Point3::origin(), Vector3::new(3.0, 4.0, 12.0), 0.5).unwrap();
        assert!((e.major_radius() - 5.0).abs() < 1e-12);
        assert!((e.minor_radius() - 2.5).abs() < 1e-12);
        let p = e.point_at(0.0);
        assert!((p.x - 3.0).abs() < 1e-9);
        assert!((p.y - 4.0).abs() < 1e-9);

        // 长轴垂直于XY平面
        assert!(Ellipse::new(Point3::origin(), Vector3::new(0.0, 0.0, 7.0), 0.5).is_err());
    }

    #[test]
    fn test_ellipse_polar_radius() {
        let e = Ellipse::new(Point3::origin(), Vector3::new(20.0, 0.0, 0.0), 0.5).unwrap();
        assert!((e.polar_radius(0.0) - 20.0).abs() < 1e-9);
        assert!((e.polar_radius(90.0) - 10.0).abs() < 1e-9);
        let p = e.point_at(90.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_circle() {
        let arc = Arc::circle(Point3::origin(), 5.0);
        assert!(arc.is_full_circle());
        assert!(!Arc::new(Point3::origin(), 5.0, -90.0, 90.0).is_full_circle());
    }

    #[test]
    fn test_scaled_keeps_angles_and_ratio() {
        let arc = Geometry::Arc(Arc::new(Point3::new(1.0, 2.0, 3.0), 4.0, 10.0, 20.0));
        assert_eq!(
            arc.scaled(1000.0),
            Geometry::Arc(Arc::new(Point3::new(1000.0, 2000.0, 3000.0), 4000.0, 10.0, 20.0))
        );

        let e = Ellipse::new(Point3::origin(), Vector3::new(0.0, 2.0, 0.0), 0.25).unwrap();
        match Geometry::Ellipse(e).scaled(10.0) {
            Geometry::Ellipse(s) => {
                assert_eq!(s.major_axis, Vector3::new(0.0, 20.0, 0.0));
                assert_eq!(s.ratio(), 0.25);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
