//! 长度单位系统
//!
//! 核心内部统一使用规范单位**微米**。单位字符串只在边界（文件适配器、
//! 命令行）解析为换算系数，不会在流水线中途混用。
//!
//! 单位顺序与 DXF `$INSUNITS` 编码一致（1 = 英寸 … 24 = 美国测量英里，
//! 0 = 无单位）。

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 长度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    Inches,
    Feet,
    Miles,
    Millimeters,
    Centimeters,
    Meters,
    Kilometers,
    Microinches,
    Mils,
    Yards,
    Angstroms,
    Nanometers,
    /// 规范单位
    #[default]
    Microns,
    Decimeters,
    Decameters,
    Hectometers,
    Gigameters,
    AstronomicalUnits,
    LightYears,
    Parsecs,
    UsSurveyFeet,
    UsSurveyInch,
    UsSurveyYard,
    UsSurveyMile,
}

/// (单位, 缩写, 每单位对应的微米数)，按 `$INSUNITS` 编码排列
const UNIT_TABLE: [(Unit, &str, f64); 24] = [
    (Unit::Inches, "in", 25_400.0),
    (Unit::Feet, "ft", 304_800.0),
    (Unit::Miles, "mi", 1_609_344_000.0),
    (Unit::Millimeters, "mm", 1.0e3),
    (Unit::Centimeters, "cm", 1.0e4),
    (Unit::Meters, "m", 1.0e6),
    (Unit::Kilometers, "km", 1.0e9),
    (Unit::Microinches, "ui", 0.0254),
    (Unit::Mils, "mil", 25.4),
    (Unit::Yards, "yd", 914_400.0),
    (Unit::Angstroms, "a", 1.0e-4),
    (Unit::Nanometers, "nm", 1.0e-3),
    (Unit::Microns, "um", 1.0),
    (Unit::Decimeters, "dm", 1.0e5),
    (Unit::Decameters, "dam", 1.0e7),
    (Unit::Hectometers, "hm", 1.0e8),
    (Unit::Gigameters, "gm", 1.0e15),
    (Unit::AstronomicalUnits, "au", 1.495_978_707e17),
    (Unit::LightYears, "ly", 9.460_730_472_580_8e21),
    (Unit::Parsecs, "pc", 3.085_677_581_491_367e22),
    // 美国测量英尺 = 1200/3937 米
    (Unit::UsSurveyFeet, "usft", 304_800.609_601_219_2),
    (Unit::UsSurveyInch, "usin", 25_400.050_800_101_6),
    (Unit::UsSurveyYard, "usyd", 914_401.828_803_657_6),
    (Unit::UsSurveyMile, "usmi", 1_609_347_218.694_437_3),
];

impl Unit {
    /// 全部单位，按 `$INSUNITS` 编码排列
    pub fn all() -> impl Iterator<Item = Unit> {
        UNIT_TABLE.iter().map(|(unit, _, _)| *unit)
    }

    fn entry(self) -> &'static (Unit, &'static str, f64) {
        // 表按枚举声明顺序排列
        &UNIT_TABLE[self as usize]
    }

    /// 单位缩写（如 `mm`）
    pub fn abbrev(self) -> &'static str {
        self.entry().1
    }

    /// 换算系数：1个该单位等于多少微米
    pub fn factor(self) -> f64 {
        self.entry().2
    }

    /// 转换为规范单位（微米）
    pub fn to_canonical(self, value: f64) -> f64 {
        value * self.factor()
    }

    /// 从规范单位（微米）转换为该单位
    pub fn from_canonical(self, value: f64) -> f64 {
        value / self.factor()
    }

    /// DXF `$INSUNITS` 编码（1..=24）
    pub fn dxf_code(self) -> i16 {
        self as i16 + 1
    }

    /// 从 DXF `$INSUNITS` 编码解析；0（无单位）和未知编码返回 `None`
    pub fn from_dxf_code(code: i32) -> Option<Unit> {
        if code < 1 {
            return None;
        }
        UNIT_TABLE.get(code as usize - 1).map(|(unit, _, _)| *unit)
    }
}

impl FromStr for Unit {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let abbrev = s.trim();
        UNIT_TABLE
            .iter()
            .find(|(_, a, _)| a.eq_ignore_ascii_case(abbrev))
            .map(|(unit, _, _)| *unit)
            .ok_or_else(|| GeometryError::InvalidUnit(s.to_string()))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// 按缩写查询换算系数
pub fn factor(unit: &str) -> Result<f64, GeometryError> {
    Ok(unit.parse::<Unit>()?.factor())
}

/// 按缩写将数值转换为微米
pub fn to_canonical(value: f64, unit: &str) -> Result<f64, GeometryError> {
    Ok(unit.parse::<Unit>()?.to_canonical(value))
}

/// 按缩写将微米数值转换为目标单位
pub fn from_canonical(value: f64, unit: &str) -> Result<f64, GeometryError> {
    Ok(unit.parse::<Unit>()?.from_canonical(value))
}
