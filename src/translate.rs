use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::path::Path;

/// Province-level municipalities: regions with no meaningful sub-division,
/// reported as both province and their own sole unit.
pub const MUNICIPALITIES: [&str; 4] = ["北京市", "天津市", "上海市", "重庆市"];

pub fn is_municipality(name: &str) -> bool {
    MUNICIPALITIES.contains(&name)
}

/// Maps the raw English-style province name used by the summary feed to the
/// canonical localized name used by the region list.
pub fn localized_province_name(raw: &str) -> Option<&'static str> {
    let localized = match raw {
        "Hubei" => "湖北省",
        "Zhejiang" => "浙江省",
        "Guangdong" => "广东省",
        "Henan" => "河南省",
        "Hunan" => "湖南省",
        "Anhui" => "安徽省",
        "Jiangxi" => "江西省",
        "Chongqing" => "重庆市",
        "Jiangsu" => "江苏省",
        "Sichuan" => "四川省",
        "Shandong" => "山东省",
        "Shanghai" => "上海市",
        "Beijing" => "北京市",
        "Fujian" => "福建省",
        "Shaanxi" => "陕西省",
        "Guangxi" => "广西壮族自治区",
        "Heilongjiang" => "黑龙江省",
        "Hebei" => "河北省",
        "Yunnan" => "云南省",
        "Liaoning" => "辽宁省",
        "Hainan" => "海南省",
        "Shanxi" => "山西省",
        "Tianjin" => "天津市",
        "Gansu" => "甘肃省",
        "Guizhou" => "贵州省",
        "Inner Mongolia" => "内蒙古自治区",
        "Ningxia" => "宁夏回族自治区",
        "Jilin" => "吉林省",
        "Xinjiang" => "新疆维吾尔自治区",
        "Qinghai" => "青海省",
        "Tibet" => "西藏自治区",
        _ => return None,
    };
    Some(localized)
}

/// A manual correction for a child name whose historical form in older
/// reports no longer matches any canonical name. One historical name may map
/// to several current regions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Correction {
    pub province_name: String,
    pub given_name: String,
    #[serde(deserialize_with = "one_or_many")]
    pub correct_names: Vec<String>,
}

pub fn default_corrections() -> Vec<Correction> {
    vec![Correction {
        province_name: "黑龙江省".to_string(),
        given_name: "大兴安岭".to_string(),
        correct_names: vec!["大兴安岭地区".to_string()],
    }]
}

pub fn find_correction<'a>(
    corrections: &'a [Correction],
    province_name: &str,
    given_name: &str,
) -> Option<&'a Correction> {
    corrections
        .iter()
        .find(|c| c.province_name == province_name && c.given_name == given_name)
}

/// Loads a corrections table from a JSON file. Entries may give
/// `correct_names` as a single string or a list.
pub fn load_corrections_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Correction>> {
    let file = File::open(path)?;
    let corrections = serde_json::from_reader(file)?;
    Ok(corrections)
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::One(name) => vec![name],
        Raw::Many(names) => names,
    })
}
