use crate::classify::{Category, CityClassifier};
use crate::normalize::CityNormalizer;

/// Candidate separators, tried in order; the first one present in the text
/// wins and separators are never mixed within one string. "->" must come
/// before "-" so "A->B" doesn't split into "A" and ">B".
const SEPARATORS: [&str; 6] = ["—", "->", "-", "→", "至", "到"];

/// Sheets use these strings instead of leaving the route cell blank.
const PLACEHOLDERS: [&str; 2] = ["无近一个月的飞行记录", "停场维修"];

/// One named stop parsed out of a route-text field.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    /// Canonical city name
    pub name: String,
    /// As it appeared in the route text
    pub raw: String,
    pub category: Category,
}

/// One directed hop between two adjacent waypoints of a route text. Every
/// segment of a multi-hop route carries the complete joined text and its own
/// position in it.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSegment {
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub full_text: String,
    pub index: usize,
}

pub(crate) fn detect_separator(text: &str) -> Option<&'static str> {
    SEPARATORS.iter().find(|sep| text.contains(**sep)).copied()
}

pub fn is_placeholder(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || PLACEHOLDERS.contains(&text)
}

/// Splits one route-text field (possibly multi-hop) into directed segments.
/// "上海—安克雷奇—纽约" yields (上海, 安克雷奇) and (安克雷奇, 纽约). Returns
/// nothing for placeholders, separator-less text, and dangling separators
/// that leave fewer than two waypoints.
pub fn parse_route_text(
    normalizer: &CityNormalizer,
    classifier: &CityClassifier,
    text: &str,
) -> Vec<RouteSegment> {
    let text = text.trim();
    if is_placeholder(text) {
        return Vec::new();
    }
    let sep = match detect_separator(text) {
        Some(sep) => sep,
        None => {
            return Vec::new();
        }
    };

    let parts: Vec<&str> = text
        .split(sep)
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    let full_text = parts.join(sep);

    let waypoints: Vec<Waypoint> = parts
        .into_iter()
        .map(|raw| {
            let name = normalizer.normalize(raw);
            let category = classifier.classify(&name);
            Waypoint {
                name,
                raw: raw.to_string(),
                category,
            }
        })
        .collect();

    waypoints
        .windows(2)
        .enumerate()
        .map(|(index, pair)| RouteSegment {
            origin: pair[0].clone(),
            destination: pair[1].clone(),
            full_text: full_text.clone(),
            index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<RouteSegment> {
        let normalizer = CityNormalizer::builtin();
        let classifier = CityClassifier::builtin();
        parse_route_text(&normalizer, &classifier, text)
    }

    #[test]
    fn test_single_hop() {
        let segments = parse("重庆-法兰克福");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].origin.name, "重庆");
        assert_eq!(segments[0].destination.name, "法兰克福");
        assert_eq!(segments[0].full_text, "重庆-法兰克福");
        assert_eq!(segments[0].index, 0);
    }

    #[test]
    fn test_multi_hop() {
        let segments = parse("上海—安克雷奇—纽约");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].origin.name, "上海");
        assert_eq!(segments[0].destination.name, "安克雷奇");
        assert_eq!(segments[1].origin.name, "安克雷奇");
        assert_eq!(segments[1].destination.name, "纽约");
        for (index, segment) in segments.iter().enumerate() {
            assert_eq!(segment.full_text, "上海—安克雷奇—纽约");
            assert_eq!(segment.index, index);
        }
    }

    #[test]
    fn test_placeholders() {
        assert!(parse("").is_empty());
        assert!(parse("无近一个月的飞行记录").is_empty());
        assert!(parse("停场维修").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_first_separator_wins() {
        // "—" appears, so "-" inside the second waypoint is left alone and
        // the normalizer's compound fallback deals with it
        let segments = parse("上海—哈萨克斯坦卡拉干达州-挪威奥斯陆");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].origin.name, "上海");
        assert_eq!(segments[0].destination.name, "卡拉干达");
    }

    #[test]
    fn test_arrow_separator() {
        let segments = parse("深圳->河内");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].origin.name, "深圳");
        assert_eq!(segments[0].destination.name, "河内");
    }

    #[test]
    fn test_dangling_separator() {
        let segments = parse("上海—纽约—");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].full_text, "上海—纽约");

        assert!(parse("上海—").is_empty());
        assert!(parse("—").is_empty());
    }

    #[test]
    fn test_waypoints_normalized_and_categorized() {
        let segments = parse("上海浦东机场—纽约肯尼迪");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].origin.name, "上海");
        assert_eq!(segments[0].origin.raw, "上海浦东机场");
        assert_eq!(segments[0].origin.category, Category::Domestic);
        assert_eq!(segments[0].destination.name, "纽约");
        assert_eq!(segments[0].destination.category, Category::International);
    }
}
