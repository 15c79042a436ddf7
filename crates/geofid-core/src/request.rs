//! 边界降级请求
//!
//! 导入器对每条记录应用同一个请求：
//! - 允许集合为空，或记录类型在允许集合中 → 保留
//! - 否则若 `convert` 为真且能解析出目标类型 → 细分
//! - 否则静默丢弃

use crate::convert::convert_to;
use crate::error::GeometryError;
use crate::fidelity::{resolve, KindSet};
use crate::geometry::{Geometry, GeometryKind};
use crate::record::{GeometryRecord, IdAllocator};
use crate::tessellate::{SegmentParams, Tessellation};
use crate::units::Unit;

/// 降级请求参数
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    /// 允许的类型，空集表示不限制
    pub allowed: KindSet,
    /// 是否把不允许的类型降级转换（否则丢弃）
    pub convert: bool,
    /// 分段数
    pub num_segments: usize,
    /// 分段长度（`segment_unit` 单位）
    pub segment_length: f64,
    /// 分段长度的单位
    pub segment_unit: Unit,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self {
            allowed: KindSet::EMPTY,
            convert: false,
            num_segments: 0,
            segment_length: 0.0,
            segment_unit: Unit::Microns,
        }
    }
}

impl ConversionRequest {
    /// 换算为规范单位的分段参数
    pub fn segment_params(&self) -> SegmentParams {
        SegmentParams::from_units(self.num_segments, self.segment_length, self.segment_unit)
    }

    /// 该类型是否无需转换即可保留
    pub fn accepts(&self, kind: GeometryKind) -> bool {
        self.allowed.is_empty() || self.allowed.contains(kind)
    }

    /// 对单条记录应用请求
    ///
    /// 丢弃时返回空结果；转换失败时返回错误，由调用方决定是否继续。
    pub fn apply(
        &self,
        record: GeometryRecord,
        ids: &mut IdAllocator,
    ) -> Result<Tessellation, GeometryError> {
        let kind = record.kind();
        if self.accepts(kind) {
            return Ok(Tessellation::passthrough(vec![record]));
        }

        let target = match (self.convert, resolve(kind, &self.allowed)) {
            (true, Some(target)) => target,
            _ => {
                tracing::debug!("Dropping {}: not in allowed kinds {}", record, self.allowed);
                return Ok(Tessellation::new());
            }
        };

        convert_to(kind, target, vec![record], &self.segment_params(), ids)
    }
}

/// 按请求逐条累积一次导入的输出
///
/// 导入和转换产生的记录共用同一个 [`IdAllocator`]，因此输出ID唯一。
#[derive(Debug)]
pub struct BatchBuilder<'a> {
    request: &'a ConversionRequest,
    ids: IdAllocator,
    output: Tessellation,
}

impl<'a> BatchBuilder<'a> {
    pub fn new(request: &'a ConversionRequest) -> Self {
        Self {
            request,
            ids: IdAllocator::new(),
            output: Tessellation::new(),
        }
    }

    /// 添加一个导入的几何
    pub fn push(&mut self, geometry: Geometry) {
        let record = self.ids.record(geometry);
        let label = record.to_string();
        match self.request.apply(record, &mut self.ids) {
            Ok(tessellation) => self.output.merge(tessellation),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", label, e);
                self.output.rejected.push((label, e));
            }
        }
    }

    /// 转换失败而被跳过的记录
    pub fn rejected(&self) -> &[(String, GeometryError)] {
        &self.output.rejected
    }

    /// 结束本批，失败记录保留在 [`Tessellation::rejected`]
    pub fn finish(self) -> Tessellation {
        self.output
    }
}
