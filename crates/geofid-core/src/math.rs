//! 数学基础类型
//!
//! 所有坐标都使用 `f64`，单位为规范单位（微米）。

/// 三维点
pub type Point3 = nalgebra::Point3<f64>;

/// 三维向量
pub type Vector3 = nalgebra::Vector3<f64>;

/// 几何比较容差
pub const EPSILON: f64 = 1e-10;

/// 两个浮点数在相对容差内是否相等
pub fn approx_eq(a: f64, b: f64, rel_tolerance: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= rel_tolerance * scale
}

/// 极坐标（角度制）转为XY平面上的点，Z取 `origin.z`
pub fn polar_point(origin: &Point3, radius: f64, angle_deg: f64) -> Point3 {
    let angle = angle_deg.to_radians();
    Point3::new(
        origin.x + radius * angle.cos(),
        origin.y + radius * angle.sin(),
        origin.z,
    )
}
