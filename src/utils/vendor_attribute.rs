//! 用户属性描述解析
//! 格式与 smartctl 的 `-v`/`--vendorattribute` 参数一致：
//! `ID,FORMAT[:BYTEORDER][,NAME[,(HDD|SSD)]]`，ID 为 `N` 时作用于全部属性

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::{char, digit1};
use nom::combinator::{eof, map_res, opt, value};
use nom::sequence::preceded;
use nom::IResult;
use nom::Parser;
use once_cell::sync::Lazy;

use crate::error::{RsDriveDbError, RsDriveDbResult};

/// 旧版简写参数到标准格式的映射
static LEGACY_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("9,halfminutes", "9,halfmin2hour,Power_On_Half_Minutes"),
        ("9,minutes", "9,min2hour,Power_On_Minutes"),
        ("9,seconds", "9,sec2hour,Power_On_Seconds"),
        ("9,temp", "9,tempminmax,Temperature_Celsius"),
        ("192,emergencyretractcyclect", "192,raw48,Emerg_Retract_Cycle_Ct"),
        ("193,loadunload", "193,raw24/raw24"),
        ("194,10xCelsius", "194,temp10x,Temperature_Celsius_x10"),
        ("194,unknown", "194,raw48,Unknown_Attribute"),
        ("197,increasing", "197,raw48+,Total_Pending_Sectors"),
        ("198,offlinescanuncsectorct", "198,raw48,Offline_Scan_UNC_SectCt"),
        ("198,increasing", "198,raw48+,Total_Offl_Uncorrectabl"),
        ("200,writeerrorcount", "200,raw48,Write_Error_Count"),
        ("201,detectedtacount", "201,raw48,Detected_TA_Count"),
        ("220,temp", "220,tempminmax,Temperature_Celsius"),
    ])
});

/// 属性描述适用的设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveType {
    Hdd,
    Ssd,
}

/// 一条用户属性描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorAttribute {
    /// 属性编号，None 表示全部属性
    pub id: Option<u8>,
    /// 解析方式，如 `raw48`、`tempminmax`
    pub format: String,
    /// 显式指定的字节序，如 `r543210`
    pub byte_order: Option<String>,
    pub name: Option<String>,
    pub drive_type: Option<DriveType>,
}

impl VendorAttribute {
    /// 合成规则中的 conv 字段（带字节序时为 `FORMAT:BYTEORDER`）
    pub fn conv(&self) -> String {
        match &self.byte_order {
            Some(order) => format!("{}:{}", self.format, order),
            None => self.format.clone(),
        }
    }
}

impl fmt::Display for VendorAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{},{}", id, self.conv())?,
            None => write!(f, "N,{}", self.conv())?,
        }
        if let Some(name) = &self.name {
            write!(f, ",{}", name)?;
            match self.drive_type {
                Some(DriveType::Hdd) => write!(f, ",HDD")?,
                Some(DriveType::Ssd) => write!(f, ",SSD")?,
                None => {}
            }
        }
        Ok(())
    }
}

impl FromStr for VendorAttribute {
    type Err = RsDriveDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

fn attribute_id(input: &str) -> IResult<&str, Option<u8>> {
    alt((
        map_res(digit1, |s: &str| s.parse::<u8>().map(Some)),
        value(None, char('N')),
    ))
    .parse(input)
}

fn drive_type(input: &str) -> IResult<&str, DriveType> {
    alt((value(DriveType::Hdd, tag("HDD")), value(DriveType::Ssd, tag("SSD")))).parse(input)
}

fn attribute(input: &str) -> IResult<&str, VendorAttribute> {
    let (input, id) = attribute_id(input)?;
    let (input, _) = char(',')(input)?;
    let (input, format) = take_till1(|c: char| c == ',' || c == ':')(input)?;
    let (input, byte_order) = opt(preceded(char(':'), take_till1(|c: char| c == ','))).parse(input)?;
    let (input, name_and_type) = opt(preceded(
        char(','),
        (
            take_till1(|c: char| c == ','),
            opt(preceded(char(','), drive_type)),
        ),
    ))
    .parse(input)?;
    let (input, _) = eof(input)?;

    let (name, drive_type) = match name_and_type {
        Some((name, drive_type)) => (Some(name.to_string()), drive_type),
        None => (None, None),
    };

    Ok((
        input,
        VendorAttribute {
            id,
            format: format.to_string(),
            byte_order: byte_order.map(str::to_string),
            name,
            drive_type,
        },
    ))
}

/// 解析单条属性描述，支持标准格式与旧版简写（如 `9,minutes`）
pub fn parse(s: &str) -> RsDriveDbResult<VendorAttribute> {
    let s = s.trim();
    let normalized = LEGACY_ALIASES.get(s).copied().unwrap_or(s);
    attribute(normalized)
        .map(|(_, attr)| attr)
        .map_err(|_| RsDriveDbError::VendorAttributeError(s.to_string()))
}

/// 批量解析，任一失败即返回错误
pub fn parse_all<'a>(items: impl IntoIterator<Item = &'a str>) -> RsDriveDbResult<Vec<VendorAttribute>> {
    items.into_iter().map(parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_form() {
        let attr = parse("190,tempminmax:r543210,Airflow_Temp,HDD").unwrap();
        assert_eq!(attr.id, Some(190));
        assert_eq!(attr.format, "tempminmax");
        assert_eq!(attr.byte_order.as_deref(), Some("r543210"));
        assert_eq!(attr.name.as_deref(), Some("Airflow_Temp"));
        assert_eq!(attr.drive_type, Some(DriveType::Hdd));
        assert_eq!(attr.conv(), "tempminmax:r543210");
        assert_eq!(attr.to_string(), "190,tempminmax:r543210,Airflow_Temp,HDD");
    }

    #[test]
    fn test_parse_minimal_form() {
        let attr = parse("9,raw48").unwrap();
        assert_eq!(attr.id, Some(9));
        assert_eq!(attr.conv(), "raw48");
        assert_eq!(attr.name, None);
        assert_eq!(attr.drive_type, None);
    }

    #[test]
    fn test_parse_all_attributes_marker() {
        // 测试场景：N 表示作用于全部属性
        let attr = parse("N,raw48,Unknown,SSD").unwrap();
        assert_eq!(attr.id, None);
        assert_eq!(attr.drive_type, Some(DriveType::Ssd));
    }

    #[test]
    fn test_parse_legacy_alias() {
        let attr: VendorAttribute = "9,minutes".parse().unwrap();
        assert_eq!(attr.format, "min2hour");
        assert_eq!(attr.name.as_deref(), Some("Power_On_Minutes"));

        let attr = parse("193,loadunload").unwrap();
        assert_eq!(attr.format, "raw24/raw24");
        assert_eq!(attr.name, None);
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "9", "256,raw48", "x,raw48", "9,raw48,Name,TAPE", "9,,Name"] {
            assert!(
                matches!(parse(input), Err(RsDriveDbError::VendorAttributeError(_))),
                "expected error for {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_all_stops_at_error() {
        assert_eq!(parse_all(["9,raw48", "194,temp10x"]).unwrap().len(), 2);
        assert!(parse_all(["9,raw48", "bogus"]).is_err());
    }
}
