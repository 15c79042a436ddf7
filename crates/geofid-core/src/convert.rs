//! 降级转换编排
//!
//! 沿固定邻接链 Ellipse → Arc → Line → Point 逐级细分，每一步执行一个
//! 细分阶段，直到类型匹配。目标不可达时在执行任何阶段之前返回
//! [`GeometryError::ConversionImpossible`]，因此不会产生部分输出。

use crate::error::GeometryError;
use crate::geometry::GeometryKind;
use crate::record::{GeometryRecord, IdAllocator};
use crate::tessellate::{tessellate_record, SegmentParams, Tessellation};

/// 计算从 `source` 到 `target` 经过的类型（含两端）
///
/// 目标不在邻接链下游时返回 `None`。
pub fn conversion_path(source: GeometryKind, target: GeometryKind) -> Option<Vec<GeometryKind>> {
    let mut path = vec![source];
    let mut current = source;
    while current != target {
        current = current.next_lower()?;
        path.push(current);
    }
    Some(path)
}

/// 将一批 `source` 类型的记录转换为 `target` 类型
///
/// 类型相同时原样返回。所有新记录的ID都从 `ids` 分配。
pub fn convert_to(
    source: GeometryKind,
    target: GeometryKind,
    records: Vec<GeometryRecord>,
    params: &SegmentParams,
    ids: &mut IdAllocator,
) -> Result<Tessellation, GeometryError> {
    if let Some(record) = records.iter().find(|r| r.kind() != source) {
        return Err(GeometryError::KindMismatch {
            id: record.id(),
            expected: source,
            found: record.kind(),
        });
    }

    if source == target {
        return Ok(Tessellation::passthrough(records));
    }

    let path = conversion_path(source, target).ok_or(GeometryError::ConversionImpossible {
        from: source,
        to: target,
    })?;

    let mut current = Tessellation::passthrough(records);
    for stage in path.windows(2) {
        let mut next = Tessellation::new();
        for record in &current.records {
            tessellate_record(record, params, ids, &mut next);
        }
        tracing::debug!(
            "{} -> {}: {} -> {} records",
            stage[0],
            stage[1],
            current.records.len(),
            next.records.len()
        );
        let mut diagnostics = current.diagnostics;
        diagnostics.append(&mut next.diagnostics);
        next.diagnostics = diagnostics;
        current = next;
    }

    Ok(current)
}
