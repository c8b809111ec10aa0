//! Japanese prefectures.

/// All 47 prefectures in JIS X 0401 order.
pub const PREFECTURES: [&str; 47] = [
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
    "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県", "岐阜県",
    "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府", "兵庫県",
    "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県", "山口県",
    "徳島県", "香川県", "愛媛県", "高知県", "福岡県", "佐賀県", "長崎県",
    "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

/// Whether `name` is one of the 47 prefectures.
#[must_use]
pub fn is_prefecture(name: &str) -> bool {
    PREFECTURES.contains(&name)
}

/// JIS code (1-based position) of a prefecture.
#[must_use]
pub fn prefecture_code(name: &str) -> Option<usize> {
    PREFECTURES.iter().position(|p| *p == name).map(|i| i + 1)
}

/// Extract the prefecture an address belongs to.
///
/// Leading postal codes (`〒150-0001`) are skipped. Addresses normally start
/// with the prefecture; otherwise the first prefecture name found anywhere
/// in the address wins.
#[must_use]
pub fn extract_prefecture(address: &str) -> Option<&'static str> {
    let trimmed = strip_postal_code(address.trim());

    if let Some(p) = PREFECTURES.iter().find(|p| trimmed.starts_with(**p)) {
        return Some(*p);
    }

    PREFECTURES
        .iter()
        .filter_map(|p| trimmed.find(*p).map(|pos| (pos, *p)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, p)| p)
}

fn strip_postal_code(address: &str) -> &str {
    let rest = address.trim_start_matches('〒').trim_start();
    let digits_and_dash = rest
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '-' | '－' | '‐' | '−'))
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());

    if digits_and_dash >= 7 {
        rest[digits_and_dash..].trim_start()
    } else {
        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prefecture() {
        assert!(is_prefecture("東京都"));
        assert!(is_prefecture("北海道"));
        assert!(!is_prefecture("東京"));
    }

    #[test]
    fn test_prefecture_code() {
        assert_eq!(prefecture_code("北海道"), Some(1));
        assert_eq!(prefecture_code("東京都"), Some(13));
        assert_eq!(prefecture_code("沖縄県"), Some(47));
        assert_eq!(prefecture_code("Tokyo"), None);
    }

    #[test]
    fn test_extract_prefecture_prefix() {
        assert_eq!(extract_prefecture("東京都渋谷区道玄坂1-2-3"), Some("東京都"));
        assert_eq!(extract_prefecture("  神奈川県横浜市"), Some("神奈川県"));
    }

    #[test]
    fn test_extract_prefecture_skips_postal_code() {
        assert_eq!(
            extract_prefecture("〒150-0041 東京都渋谷区神南1丁目22−7"),
            Some("東京都")
        );
        assert_eq!(extract_prefecture("060-0001 北海道札幌市"), Some("北海道"));
    }

    #[test]
    fn test_extract_prefecture_contains() {
        assert_eq!(extract_prefecture("日本、京都府京都市下京区"), Some("京都府"));
    }

    #[test]
    fn test_extract_prefecture_none() {
        assert_eq!(extract_prefecture("1600 Amphitheatre Pkwy"), None);
        assert_eq!(extract_prefecture(""), None);
    }

    #[test]
    fn test_kyoto_is_not_tokyo() {
        // "東京都" must not be found inside "京都府".
        assert_eq!(extract_prefecture("京都府京都市"), Some("京都府"));
    }
}
