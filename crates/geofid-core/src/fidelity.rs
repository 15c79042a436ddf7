//! 保真度解析
//!
//! 给定源类型和允许的类型集合，选出不高于源类型的最高保真度允许类型。
//!
//! 样条和多段线有两条特殊规则，找不到时回落到通用规则：
//! - 样条：允许线段 → 线段；否则允许点 → 点（即使允许圆弧也跳过）
//! - 多段线：同时允许圆弧和线段 → 圆弧；只允许线段 → 线段；否则允许点 → 点

use crate::geometry::GeometryKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 允许类型集合（位域）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KindSet {
    bits: u8,
}

impl KindSet {
    pub const EMPTY: KindSet = KindSet { bits: 0 };

    fn bit(kind: GeometryKind) -> u8 {
        1 << kind.rank()
    }

    pub fn contains(&self, kind: GeometryKind) -> bool {
        self.bits & Self::bit(kind) != 0
    }

    pub fn insert(&mut self, kind: GeometryKind) {
        self.bits |= Self::bit(kind);
    }

    pub fn remove(&mut self, kind: GeometryKind) {
        self.bits &= !Self::bit(kind);
    }

    pub fn with(mut self, kind: GeometryKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// 按保真度从低到高遍历
    pub fn iter(&self) -> impl Iterator<Item = GeometryKind> + '_ {
        GeometryKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<GeometryKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = GeometryKind>>(iter: I) -> Self {
        let mut set = KindSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.iter().map(GeometryKind::tag).collect();
        write!(f, "{{{}}}", tags.join(", "))
    }
}

/// 解析降级目标类型
///
/// 返回 `None` 表示无法降级。
pub fn resolve(source: GeometryKind, allowed: &KindSet) -> Option<GeometryKind> {
    use GeometryKind::*;

    let special = match source {
        // SPLINE -> LINE -> POINT
        Spline => {
            if allowed.contains(Line) {
                Some(Line)
            } else if allowed.contains(Point) {
                Some(Point)
            } else {
                None
            }
        }
        // LWPOLYLINE -> ARC/LINE -> LINE -> POINT
        Polyline => {
            if allowed.contains(Arc) && allowed.contains(Line) {
                Some(Arc)
            } else if allowed.contains(Line) {
                Some(Line)
            } else if allowed.contains(Point) {
                Some(Point)
            } else {
                None
            }
        }
        _ => None,
    };
    if special.is_some() {
        return special;
    }

    // 从源类型的下一级开始向下查找
    GeometryKind::ALL[..source.rank()]
        .iter()
        .rev()
        .copied()
        .find(|kind| allowed.contains(*kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use GeometryKind::*;

    fn set(kinds: &[GeometryKind]) -> KindSet {
        kinds.iter().copied().collect()
    }

    #[test]
    fn test_generic_rule() {
        assert_eq!(resolve(Arc, &set(&[Line, Point])), Some(Line));
        assert_eq!(resolve(Arc, &set(&[Point])), Some(Point));
        assert_eq!(resolve(Ellipse, &set(&[Arc, Point])), Some(Arc));
        assert_eq!(resolve(Ellipse, &set(&[Line])), Some(Line));
    }

    #[test]
    fn test_never_upward() {
        assert_eq!(resolve(Line, &set(&[Arc, Ellipse])), None);
        assert_eq!(resolve(Point, &set(&[Line, Arc])), None);
        assert_eq!(resolve(Arc, &KindSet::EMPTY), None);
    }

    #[test]
    fn test_spline_rule() {
        assert_eq!(resolve(Spline, &set(&[Point])), Some(Point));
        assert_eq!(resolve(Spline, &set(&[Arc, Line, Point])), Some(Line));
        // 样条跳过圆弧，回落到通用规则时取椭圆
        assert_eq!(resolve(Spline, &set(&[Ellipse, Arc])), Some(Ellipse));
        assert_eq!(resolve(Spline, &set(&[Arc])), Some(Arc));
    }

    #[test]
    fn test_polyline_rule() {
        assert_eq!(resolve(Polyline, &set(&[Arc, Line])), Some(Arc));
        assert_eq!(resolve(Polyline, &set(&[Line, Point])), Some(Line));
        assert_eq!(resolve(Polyline, &set(&[Point])), Some(Point));
        assert_eq!(resolve(Polyline, &set(&[Spline])), Some(Spline));
    }

    #[test]
    fn test_kind_set() {
        let mut kinds = set(&[Point, Arc]);
        assert!(kinds.contains(Point));
        assert!(!kinds.contains(Line));
        kinds.remove(Point);
        assert_eq!(kinds.iter().collect::<Vec<_>>(), vec![Arc]);
        assert_eq!(KindSet::EMPTY.with(Line).with(Point).to_string(), "{POINT, LINE}");
    }
}
