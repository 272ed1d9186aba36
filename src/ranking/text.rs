use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::db::ImageRecord;

/// 文本匹配的结果
#[derive(Debug, Clone, Copy)]
pub struct TextHit<'a> {
    pub record: &'a ImageRecord,
    /// 命中是否来自描述字段，决定混合模式下的加分幅度
    pub in_descripcion: bool,
}

/// 归一化文本：小写、去掉变音符号、去掉首尾空白
///
/// 对同一个字符串重复归一化结果不变
pub fn normalize(text: &str) -> String {
    let folded = text.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)).collect::<String>();
    folded.trim().to_owned()
}

/// 保留描述、街区、城镇、分类中任一字段包含 `needle` 子串的记录
///
/// `needle` 必须已经过 [`normalize`]，空串匹配所有记录
pub fn match_text<'a>(candidates: &[&'a ImageRecord], needle: &str) -> Vec<TextHit<'a>> {
    candidates
        .iter()
        .filter_map(|&record| {
            if normalize(&record.descripcion).contains(needle) {
                return Some(TextHit { record, in_descripcion: true });
            }
            [&record.barrio, &record.localidad, &record.categoria]
                .into_iter()
                .any(|field| normalize(field).contains(needle))
                .then_some(TextHit { record, in_descripcion: false })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::filter::tests::record;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Nueva Córdoba "), "nueva cordoba");
        assert_eq!(normalize("GÜEMES"), "guemes");
        assert_eq!(normalize("Cosquín\t"), "cosquin");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["  Nueva Córdoba ", "ÁRBOL", "\u{301} a", "gente cruzando la calle", "İstanbul", ""] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "normalize is not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_substring_not_token() {
        let r = record(1, "Nueva Córdoba", "Córdoba Capital", "Calles");
        let hits = match_text(&[&r], &normalize("nueva"));
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].in_descripcion);
        let hits = match_text(&[&r], &normalize("eva cor"));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_descripcion_hit_flag() {
        let mut r = record(1, "Alberdi", "Córdoba Capital", "Calles");
        r.descripcion = "Calle empedrada en Alberdi".into();
        let hits = match_text(&[&r], &normalize("ALBERDI"));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].in_descripcion);
    }

    #[test]
    fn test_no_match() {
        let r = record(1, "Alberdi", "Córdoba Capital", "Calles");
        assert!(match_text(&[&r], &normalize("tranvía")).is_empty());
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let a = record(1, "", "Cosquín", "Paisajes");
        let b = record(2, "Alberdi", "Córdoba Capital", "Calles");
        let hits = match_text(&[&a, &b], &normalize("   "));
        assert_eq!(hits.len(), 2);
        // 空描述也包含空串
        assert!(hits.iter().all(|h| h.in_descripcion));
    }
}
