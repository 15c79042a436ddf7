//! 几何记录
//!
//! 记录一旦生成即不可变。ID 由生产者（导入器或上一步细分）通过显式的
//! [`IdAllocator`] 分配，只保证在一次调用的输出内唯一。

use crate::geometry::{Geometry, GeometryKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 带ID的几何记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    id: u64,
    geometry: Geometry,
}

impl GeometryRecord {
    pub fn new(id: u64, geometry: Geometry) -> Self {
        Self { id, geometry }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }

    pub fn into_geometry(self) -> Geometry {
        self.geometry
    }
}

impl fmt::Display for GeometryRecord {
    /// `KIND:id`，例如 `ARC:3`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id)
    }
}

/// 记录ID分配器
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从指定值开始分配
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// 分配下一个ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// 用新ID包装几何
    pub fn record(&mut self, geometry: Geometry) -> GeometryRecord {
        GeometryRecord::new(self.next_id(), geometry)
    }

    /// 已分配的ID数量（即下一个ID）
    pub fn peek(&self) -> u64 {
        self.next
    }
}
