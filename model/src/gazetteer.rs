use std::collections::BTreeMap;

use anyhow::Result;
use geo::Point;
use serde::Deserialize;

/// Static lookup from canonical city name to coordinates. Pure in-memory;
/// never touches the network. A miss is the caller's problem to report --
/// records without coordinates stay in the output, they just don't render.
pub struct Gazetteer {
    cities: BTreeMap<String, Point<f64>>,
}

impl Gazetteer {
    pub fn builtin() -> Self {
        Self {
            cities: CITY_COORDINATES
                .iter()
                .map(|(city, lat, lon)| (city.to_string(), Point::new(*lon, *lat)))
                .collect(),
        }
    }

    /// Reads a `city,lat,lon` table, replacing the built-in one.
    pub fn load<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut cities = BTreeMap::new();
        for rec in csv::Reader::from_reader(reader).deserialize() {
            let rec: Record = rec?;
            if !(-90.0..=90.0).contains(&rec.lat) || !(-180.0..=180.0).contains(&rec.lon) {
                bail!("{} has out-of-range coordinates ({}, {})", rec.city, rec.lat, rec.lon);
            }
            if cities.insert(rec.city.clone(), Point::new(rec.lon, rec.lat)).is_some() {
                bail!("Duplicate gazetteer entry for {}", rec.city);
            }
        }
        Ok(Self { cities })
    }

    pub fn resolve(&self, city: &str) -> Option<Point<f64>> {
        self.cities.get(city).copied()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[derive(Deserialize)]
struct Record {
    city: String,
    lat: f64,
    lon: f64,
}

// (city, latitude, longitude)
const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    // Mainland China
    ("北京", 39.90, 116.41),
    ("上海", 31.23, 121.47),
    ("天津", 39.13, 117.20),
    ("重庆", 29.56, 106.55),
    ("广州", 23.13, 113.26),
    ("深圳", 22.54, 114.06),
    ("杭州", 30.27, 120.16),
    ("南京", 32.06, 118.80),
    ("武汉", 30.59, 114.31),
    ("成都", 30.57, 104.07),
    ("西安", 34.34, 108.94),
    ("郑州", 34.75, 113.63),
    ("济南", 36.65, 117.12),
    ("沈阳", 41.81, 123.43),
    ("长春", 43.82, 125.32),
    ("哈尔滨", 45.80, 126.53),
    ("石家庄", 38.04, 114.51),
    ("太原", 37.87, 112.55),
    ("合肥", 31.82, 117.23),
    ("福州", 26.07, 119.30),
    ("南昌", 28.68, 115.86),
    ("长沙", 28.23, 112.94),
    ("海口", 20.04, 110.32),
    ("南宁", 22.82, 108.32),
    ("贵阳", 26.65, 106.63),
    ("昆明", 24.88, 102.83),
    ("兰州", 36.06, 103.83),
    ("乌鲁木齐", 43.83, 87.62),
    ("呼和浩特", 40.84, 111.75),
    ("银川", 38.49, 106.23),
    ("西宁", 36.62, 101.78),
    ("拉萨", 29.65, 91.14),
    ("苏州", 31.30, 120.58),
    ("无锡", 31.49, 120.31),
    ("南通", 31.98, 120.89),
    ("宁波", 29.87, 121.54),
    ("温州", 28.00, 120.67),
    ("青岛", 36.07, 120.38),
    ("烟台", 37.46, 121.44),
    ("潍坊", 36.71, 119.16),
    ("大连", 38.91, 121.61),
    ("厦门", 24.48, 118.09),
    ("泉州", 24.87, 118.68),
    ("鄂州", 30.39, 114.89),
    ("东莞", 23.02, 113.75),
    ("珠海", 22.27, 113.58),
    ("佛山", 23.02, 113.12),
    ("义乌", 29.31, 120.08),
    ("博乐", 44.90, 82.07),
    ("霍尔果斯", 44.21, 80.42),
    ("阿拉山口", 45.17, 82.57),
    ("香港", 22.32, 114.17),
    ("澳门", 22.20, 113.54),
    ("台北", 25.03, 121.57),
    // East and southeast Asia
    ("东京", 35.68, 139.69),
    ("大阪", 34.69, 135.50),
    ("名古屋", 35.18, 136.91),
    ("首尔", 37.57, 126.98),
    ("釜山", 35.18, 129.08),
    ("新加坡", 1.35, 103.82),
    ("吉隆坡", 3.14, 101.69),
    ("槟城", 5.41, 100.34),
    ("曼谷", 13.76, 100.50),
    ("普吉", 7.88, 98.39),
    ("清迈", 18.79, 98.98),
    ("马尼拉", 14.60, 120.98),
    ("宿务", 10.32, 123.89),
    ("克拉克", 15.19, 120.56),
    ("胡志明市", 10.82, 106.63),
    ("河内", 21.03, 105.85),
    ("岘港", 16.05, 108.21),
    ("雅加达", -6.21, 106.85),
    ("巴厘岛", -8.65, 115.22),
    // South and central Asia, middle east
    ("新德里", 28.61, 77.21),
    ("孟买", 19.08, 72.88),
    ("金奈", 13.08, 80.27),
    ("班加罗尔", 12.97, 77.59),
    ("达卡", 23.81, 90.41),
    ("科伦坡", 6.93, 79.86),
    ("加德满都", 27.72, 85.32),
    ("卡拉奇", 24.86, 67.01),
    ("拉合尔", 31.55, 74.34),
    ("伊斯兰堡", 33.68, 73.05),
    ("迪拜", 25.20, 55.27),
    ("阿布扎比", 24.45, 54.38),
    ("沙迦", 25.35, 55.42),
    ("多哈", 25.29, 51.53),
    ("科威特", 29.38, 47.99),
    ("利雅得", 24.71, 46.68),
    ("吉达", 21.49, 39.19),
    ("阿拉木图", 43.24, 76.89),
    ("阿斯塔纳", 51.17, 71.43),
    ("卡拉干达", 49.80, 73.09),
    ("阿克托别", 50.28, 57.17),
    ("奇姆肯特", 42.32, 69.59),
    ("塔什干", 41.30, 69.24),
    ("比什凯克", 42.87, 74.59),
    ("杜尚别", 38.56, 68.79),
    ("阿什哈巴德", 37.96, 58.33),
    ("第比利斯", 41.72, 44.78),
    ("埃里温", 40.18, 44.51),
    ("巴库", 40.41, 49.87),
    // Europe
    ("法兰克福", 50.11, 8.68),
    ("慕尼黑", 48.14, 11.58),
    ("柏林", 52.52, 13.40),
    ("汉堡", 53.55, 9.99),
    ("杜塞尔多夫", 51.23, 6.78),
    ("科隆", 50.94, 6.96),
    ("伦敦", 51.51, -0.13),
    ("曼彻斯特", 53.48, -2.24),
    ("东米德兰兹", 52.83, -1.33),
    ("普雷斯蒂克", 55.51, -4.59),
    ("巴黎", 48.86, 2.35),
    ("里昂", 45.76, 4.84),
    ("马赛", 43.30, 5.37),
    ("阿姆斯特丹", 52.37, 4.90),
    ("鹿特丹", 51.92, 4.48),
    ("布鲁塞尔", 50.85, 4.35),
    ("列日", 50.63, 5.57),
    ("安特卫普", 51.22, 4.40),
    ("苏黎世", 47.38, 8.54),
    ("日内瓦", 46.20, 6.14),
    ("维也纳", 48.21, 16.37),
    ("罗马", 41.90, 12.50),
    ("米兰", 45.46, 9.19),
    ("威尼斯", 45.44, 12.32),
    ("马德里", 40.42, -3.70),
    ("巴塞罗那", 41.39, 2.17),
    ("里斯本", 38.72, -9.14),
    ("斯德哥尔摩", 59.33, 18.07),
    ("奥斯陆", 59.91, 10.75),
    ("赫尔辛基", 60.17, 24.94),
    ("哥本哈根", 55.68, 12.57),
    ("华沙", 52.23, 21.01),
    ("布拉格", 50.08, 14.44),
    ("布达佩斯", 47.50, 19.04),
    ("布加勒斯特", 44.43, 26.10),
    ("莫斯科", 55.76, 37.62),
    ("圣彼得堡", 59.93, 30.34),
    ("新西伯利亚", 55.03, 82.92),
    ("叶卡捷琳堡", 56.84, 60.61),
    // Americas
    ("纽约", 40.71, -74.01),
    ("洛杉矶", 34.05, -118.24),
    ("芝加哥", 41.88, -87.63),
    ("旧金山", 37.77, -122.42),
    ("西雅图", 47.61, -122.33),
    ("波士顿", 42.36, -71.06),
    ("华盛顿", 38.91, -77.04),
    ("迈阿密", 25.76, -80.19),
    ("达拉斯", 32.78, -96.80),
    ("休斯顿", 29.76, -95.37),
    ("亚特兰大", 33.75, -84.39),
    ("安克雷奇", 61.22, -149.90),
    ("费尔班克斯", 64.84, -147.72),
    ("多伦多", 43.65, -79.38),
    ("温哥华", 49.28, -123.12),
    ("蒙特利尔", 45.50, -73.57),
    ("哈利法克斯", 44.65, -63.57),
    ("墨西哥城", 19.43, -99.13),
    ("圣保罗", -23.55, -46.63),
    ("圣地亚哥", -33.45, -70.67),
    ("布宜诺斯艾利斯", -34.60, -58.38),
    ("利马", -12.05, -77.04),
    ("波哥大", 4.71, -74.07),
    // Africa and Oceania
    ("开罗", 30.04, 31.24),
    ("约翰内斯堡", -26.20, 28.05),
    ("内罗毕", -1.29, 36.82),
    ("拉各斯", 6.52, 3.38),
    ("亚的斯亚贝巴", 9.03, 38.74),
    ("卡萨布兰卡", 33.57, -7.59),
    ("悉尼", -33.87, 151.21),
    ("墨尔本", -37.81, 144.96),
    ("布里斯班", -27.47, 153.03),
    ("珀斯", -31.95, 115.86),
    ("奥克兰", -36.85, 174.76),
];
