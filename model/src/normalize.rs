use std::collections::{BTreeMap, BTreeSet};

use crate::classify::CityClassifier;
use crate::parse::detect_separator;

/// Canonicalizes one raw waypoint string. The alias table, the country-prefix
/// list, and the known-city set are injected at construction so tests can
/// swap them out; `builtin` supplies the curated tables.
///
/// `normalize` is idempotent: running it on its own output is a no-op.
pub struct CityNormalizer {
    aliases: BTreeMap<String, String>,
    // Ordered: a prefix that starts with another prefix (印度尼西亚 vs 印度)
    // must come first.
    country_prefixes: Vec<String>,
    known_cities: BTreeSet<String>,
}

impl CityNormalizer {
    pub fn new(
        aliases: BTreeMap<String, String>,
        country_prefixes: Vec<String>,
        known_cities: BTreeSet<String>,
    ) -> Self {
        Self {
            aliases,
            country_prefixes,
            known_cities,
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            CITY_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            COUNTRY_PREFIXES.iter().map(|p| p.to_string()).collect(),
            CityClassifier::builtin().known_cities(),
        )
    }

    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean_waypoint(raw);
        if cleaned.is_empty() {
            return cleaned;
        }

        if let Some(mapped) = self.aliases.get(&cleaned) {
            return mapped.clone();
        }

        // "日本东京" -> "东京", "哈萨克斯坦卡拉干达" -> "卡拉干达". Only
        // short-circuit when the remainder resolves; an unresolved remainder
        // may still be a compound.
        let after_prefix = self.strip_country_prefix(&cleaned);
        if let Some(rest) = &after_prefix {
            if let Some(mapped) = self.aliases.get(rest) {
                return mapped.clone();
            }
            if self.known_cities.contains(rest) {
                return rest.clone();
            }
        }

        // A compound like "哈萨克斯坦卡拉干达州-挪威奥斯陆" reaches us in one
        // piece when the upstream field was split on a different separator.
        // Take the first part that resolves to a known city.
        if let Some(city) = self.resolve_compound(&cleaned) {
            return city;
        }

        // Unresolved prefix strip last. Recursing keeps normalize idempotent
        // even when the remainder starts with yet another prefix.
        if let Some(rest) = after_prefix {
            return self.normalize(&rest);
        }

        cleaned
    }

    fn strip_country_prefix(&self, text: &str) -> Option<String> {
        for prefix in &self.country_prefixes {
            if let Some(rest) = text.strip_prefix(prefix.as_str()) {
                if !rest.is_empty() {
                    return Some(rest.to_string());
                }
            }
        }
        None
    }

    fn resolve_compound(&self, text: &str) -> Option<String> {
        let sep = detect_separator(text)?;
        for part in text.split(sep) {
            if part.is_empty() {
                continue;
            }
            if let Some(mapped) = self.aliases.get(part) {
                if self.known_cities.contains(mapped) {
                    return Some(mapped.clone());
                }
            }
            if let Some(rest) = self.strip_country_prefix(part) {
                let rest = self.aliases.get(&rest).cloned().unwrap_or(rest);
                if self.known_cities.contains(&rest) {
                    return Some(rest);
                }
            }
            if self.known_cities.contains(part) {
                return Some(part.to_string());
            }
        }
        None
    }
}

/// Whitespace, airport designators, and parenthesized IATA codes never
/// distinguish cities, so they're removed before any table lookup.
fn clean_waypoint(raw: &str) -> String {
    let mut text: String = strip_parens(raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    // "国际机场" before "机场"; the loop catches stacked designators like
    // "InternationalAirport" left over after whitespace removal.
    const DESIGNATORS: [&str; 5] = ["国际机场", "机场", "空港", "Airport", "International"];
    loop {
        let mut stripped = false;
        for designator in DESIGNATORS {
            if let Some(rest) = text.strip_suffix(designator) {
                text = rest.to_string();
                stripped = true;
            }
        }
        if !stripped {
            break;
        }
    }
    text
}

fn strip_parens(text: &str) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' | '（' => depth += 1,
            ')' | '）' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

const CITY_ALIASES: &[(&str, &str)] = &[
    // Airport full names
    ("班达拉奈克", "科伦坡"),
    ("英迪拉甘地", "新德里"),
    ("贾特拉帕蒂希瓦", "孟买"),
    ("达卡沙阿贾拉勒", "达卡"),
    ("肯佩戈达", "班加罗尔"),
    ("阿拉玛伊克巴尔", "拉合尔"),
    ("扎耶德", "阿布扎比"),
    ("阿勒马克图姆", "迪拜"),
    ("努尔苏丹纳扎尔巴耶夫", "阿斯塔纳"),
    ("苏巴斯·钱德拉·鲍斯", "科伦坡"),
    ("尼诺阿基诺", "马尼拉"),
    ("素万那普", "曼谷"),
    ("瓦茨拉夫哈维尔", "布拉格"),
    ("麦克坦", "宿务"),
    ("马克坦", "宿务"),
    // City + airport compounds
    ("上海浦东", "上海"),
    ("北京首都", "北京"),
    ("广州白云", "广州"),
    ("深圳宝安", "深圳"),
    ("西安咸阳", "西安"),
    ("昆明长水", "昆明"),
    ("温州龙湾", "温州"),
    ("杭州萧山", "杭州"),
    ("东京成田", "东京"),
    ("首尔仁川", "首尔"),
    ("马尼拉尼诺阿基诺", "马尼拉"),
    ("纽约肯尼迪", "纽约"),
    ("伦敦斯坦斯特德", "伦敦"),
    // Misspellings seen in the sheets
    ("伦敦斯塔斯特德", "伦敦"),
    ("日本大版", "大阪"),
    ("日本大坂", "大阪"),
    // Region / short forms
    ("胡志明", "胡志明市"),
    ("博乐阿拉山口", "博乐"),
    ("卡拉干达州", "卡拉干达"),
    ("槟榔屿州", "槟城"),
    ("槟城州", "槟城"),
    ("英格兰东米德兰兹", "东米德兰兹"),
];

const COUNTRY_PREFIXES: &[&str] = &[
    "日本",
    "韩国",
    "美国",
    "德国",
    "英国",
    "法国",
    "荷兰",
    "比利时",
    "丹麦",
    "挪威",
    "瑞典",
    "芬兰",
    "意大利",
    "西班牙",
    "葡萄牙",
    "俄罗斯",
    "加拿大",
    "澳大利亚",
    "新西兰",
    "泰国",
    "越南",
    "马来西亚",
    "新加坡",
    "印度尼西亚",
    "菲律宾",
    "印度",
    "孟加拉",
    "巴基斯坦",
    "阿联酋",
    "沙特阿拉伯",
    "土耳其",
    "埃及",
    "南非",
    "肯尼亚",
    "埃塞俄比亚",
    "巴西",
    "阿根廷",
    "智利",
    "哈萨克斯坦",
    "乌兹别克斯坦",
    "吉尔吉斯斯坦",
    "塔吉克斯坦",
    "土库曼斯坦",
    "阿塞拜疆",
    "格鲁吉亚",
    "亚美尼亚",
];
