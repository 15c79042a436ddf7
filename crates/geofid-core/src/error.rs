//! 几何转换错误定义
//!
//! 分为两类：
//! - [`GeometryError`]：结构性错误，终止当前调用
//! - [`DegenerateGeometry`]：局部退化，跳过该输出元素并继续

use crate::geometry::GeometryKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Cannot convert {from} to {to}")]
    ConversionImpossible { from: GeometryKind, to: GeometryKind },

    #[error("Unsupported geometry kind: {0}")]
    UnsupportedGeometryKind(String),

    #[error("Record {id} is {found}, expected {expected}")]
    KindMismatch {
        id: u64,
        expected: GeometryKind,
        found: GeometryKind,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// 退化几何（可恢复）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegenerateGeometry {
    #[error("points of arc {index} are collinear, circle fit is undefined")]
    CollinearFit { index: usize },

    #[error("line is vertical, slope is undefined")]
    VerticalLine,

    #[error("line has zero length")]
    ZeroLengthLine,

    #[error("segment length {segment_length} exceeds geometry extent {extent}")]
    SegmentExceedsExtent { segment_length: f64, extent: f64 },
}

/// 细分过程中产生的诊断信息
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 源记录ID
    pub source_id: u64,
    /// 源记录类型
    pub source_kind: GeometryKind,
    pub problem: DegenerateGeometry,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.source_kind, self.source_id, self.problem)
    }
}
