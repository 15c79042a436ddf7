//! GeoFid 核心几何引擎
//!
//! 在 CAD 文件导入/导出的边界上把几何降级为下游工具允许的类型。
//!
//! # 保真度等级
//!
//! 从低到高：点 < 线段 < 圆弧 < 椭圆 < 样条 < 多段线。
//! 只支持沿 椭圆 → 圆弧 → 线段 → 点 逐级细分，从不向上拟合。
//!
//! # 示例
//!
//! ```rust
//! use geofid_core::prelude::*;
//!
//! let arc = Arc::new(Point3::origin(), 20000.0, -90.0, 90.0);
//! let lines = arc_to_lines(&arc, &SegmentParams::with_segments(10)).unwrap();
//! assert_eq!(lines.len(), 10);
//! ```

pub mod convert;
pub mod error;
pub mod fidelity;
pub mod geometry;
pub mod math;
pub mod record;
pub mod request;
pub mod tessellate;
pub mod units;

pub use error::{DegenerateGeometry, Diagnostic, GeometryError};

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::convert::{conversion_path, convert_to};
    pub use crate::error::{DegenerateGeometry, Diagnostic, GeometryError};
    pub use crate::fidelity::{resolve, KindSet};
    pub use crate::geometry::{
        Arc, Ellipse, Geometry, GeometryKind, Line, Point, Polyline, PolylineVertex, Spline,
    };
    pub use crate::math::{Point3, Vector3};
    pub use crate::record::{GeometryRecord, IdAllocator};
    pub use crate::request::{BatchBuilder, ConversionRequest};
    pub use crate::tessellate::{
        arc_to_lines, ellipse_to_arcs, line_to_points, SegmentParams, Tessellation,
    };
    pub use crate::units::Unit;
}
