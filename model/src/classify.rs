use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a canonical city belongs to the domestic or the international
/// registry. Unknown means the name is in neither; it's never guessed from
/// the script of the string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Domestic,
    International,
    Unknown,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Category::Domestic => write!(f, "domestic"),
            Category::International => write!(f, "international"),
            Category::Unknown => write!(f, "unknown"),
        }
    }
}

/// Categorizes canonical city names against two disjoint curated registries.
pub struct CityClassifier {
    domestic: BTreeSet<String>,
    international: BTreeSet<String>,
}

impl CityClassifier {
    pub fn new(domestic: BTreeSet<String>, international: BTreeSet<String>) -> Self {
        Self {
            domestic,
            international,
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            DOMESTIC_CITIES.iter().map(|c| c.to_string()).collect(),
            INTERNATIONAL_CITIES.iter().map(|c| c.to_string()).collect(),
        )
    }

    /// The input must already be canonical (see CityNormalizer).
    pub fn classify(&self, city: &str) -> Category {
        if self.domestic.contains(city) {
            Category::Domestic
        } else if self.international.contains(city) {
            Category::International
        } else {
            Category::Unknown
        }
    }

    /// A record endpoint survives only if its canonical name is a known city
    /// and doesn't look like a stray non-city cell (registration codes,
    /// aircraft-type fragments) that leaked into a route column.
    pub fn is_valid(&self, city: &str) -> bool {
        !looks_like_junk(city) && self.classify(city) != Category::Unknown
    }

    /// Union of both registries, for the normalizer's compound fallback.
    pub fn known_cities(&self) -> BTreeSet<String> {
        self.domestic.union(&self.international).cloned().collect()
    }
}

fn looks_like_junk(city: &str) -> bool {
    if city.is_empty() {
        return true;
    }
    let lower = city.to_ascii_lowercase();
    if lower == "nan" || lower == "null" || lower == "none" {
        return true;
    }
    // Registration numbers and IATA-ish codes: all ASCII uppercase/digits
    if city
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return true;
    }
    // Aircraft-type fragments like "338ER类似"
    if let Some(digits) = city.strip_suffix("ER类似") {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
    }
    false
}

const DOMESTIC_CITIES: &[&str] = &[
    // Municipalities
    "北京", "上海", "天津", "重庆",
    // Provincial capitals and major hubs
    "广州", "深圳", "成都", "杭州", "南京", "武汉", "西安", "昆明", "郑州", "长沙",
    "沈阳", "大连", "青岛", "海口", "贵阳", "兰州", "乌鲁木齐", "哈尔滨", "长春", "南宁",
    "石家庄", "太原", "呼和浩特", "合肥", "福州", "南昌", "济南", "银川", "西宁", "拉萨",
    // Other cargo-relevant cities
    "苏州", "无锡", "南通", "宁波", "温州", "潍坊", "烟台", "鄂州", "厦门", "泉州",
    "珠海", "东莞", "佛山", "中山", "湛江", "惠州", "扬州", "盐城", "连云港", "嘉兴",
    "绍兴", "金华", "义乌", "舟山", "台州", "芜湖", "蚌埠", "安庆", "黄山", "阜阳",
];

const INTERNATIONAL_CITIES: &[&str] = &[
    // East and southeast Asia
    "东京", "大阪", "名古屋", "福冈", "札幌",
    "首尔", "釜山", "济州",
    "台北", "高雄", "台中", "桃园",
    "香港", "澳门",
    "新加坡",
    "吉隆坡", "槟城", "亚庇",
    "马尼拉", "宿务", "克拉克",
    "胡志明市", "河内", "岘港",
    "曼谷", "普吉", "清迈",
    "雅加达", "巴厘岛", "泗水",
    // South and central Asia, middle east
    "金奈", "科伦坡", "新德里", "孟买", "达卡", "班加罗尔", "拉合尔", "卡拉奇",
    "伊斯兰堡", "加德满都", "科威特", "多哈", "迪拜", "阿布扎比", "沙迦",
    "利雅得", "吉达",
    "卡拉干达", "阿拉木图", "阿斯塔纳", "奇姆肯特", "阿克托别",
    "塔什干", "比什凯克", "杜尚别", "阿什哈巴德",
    "第比利斯", "埃里温", "巴库",
    // Europe
    "法兰克福", "慕尼黑", "柏林", "汉堡", "杜塞尔多夫", "科隆",
    "伦敦", "曼彻斯特", "东米德兰兹", "普雷斯蒂克",
    "巴黎", "里昂", "马赛",
    "阿姆斯特丹", "鹿特丹",
    "布鲁塞尔", "列日", "安特卫普",
    "苏黎世", "日内瓦", "维也纳",
    "罗马", "米兰", "威尼斯",
    "马德里", "巴塞罗那", "里斯本",
    "斯德哥尔摩", "奥斯陆", "赫尔辛基", "哥本哈根",
    "华沙", "布拉格", "布达佩斯", "布加勒斯特",
    "莫斯科", "圣彼得堡", "新西伯利亚", "叶卡捷琳堡",
    // Americas
    "纽约", "洛杉矶", "芝加哥", "旧金山", "西雅图", "波士顿", "华盛顿",
    "迈阿密", "达拉斯", "休斯顿", "亚特兰大",
    "安克雷奇", "费尔班克斯",
    "多伦多", "温哥华", "蒙特利尔", "哈利法克斯",
    "墨西哥城", "圣保罗", "圣地亚哥", "布宜诺斯艾利斯", "利马", "波哥大",
    // Africa and Oceania
    "开罗", "约翰内斯堡", "内罗毕", "拉各斯", "亚的斯亚贝巴", "卡萨布兰卡",
    "悉尼", "墨尔本", "布里斯班", "珀斯", "奥克兰",
    // Land ports on the central Asia corridor
    "博乐", "霍尔果斯", "阿拉山口",
];
