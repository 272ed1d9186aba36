use std::path::Path;
use std::sync::LazyLock;

use indicatif::ProgressStyle;
use regex::Regex;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::block_in_place;

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\d+$").expect("failed to build regex"));

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {wide_msg}")
        .expect("invalid progress style")
        .progress_chars("##-")
}

/// 执行 CPU 密集的计算
///
/// 在多线程运行时的工作线程上通过 `block_in_place` 执行，避免阻塞其他任务；
/// 单线程运行时或运行时之外直接执行
pub fn cpu_bound<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => block_in_place(f),
        _ => f(),
    }
}

/// 照片在 images 目录中的存储文件名
///
/// 使用原始路径 blake3 哈希的前 8 位作为前缀，避免不同目录下的同名文件冲突
pub fn stored_filename(original_path: &str, file_name: &str) -> String {
    let hash = blake3::hash(original_path.as_bytes()).to_hex();
    let base = Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{}_{}", &hash.as_str()[..8], base)
}

/// 从文件名推断出的照片元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredMetadata {
    pub localidad: String,
    pub barrio: String,
    pub descripcion: String,
}

/// 根据文件名推断城镇、街区和描述
///
/// 街区只对科尔多瓦市区推断
pub fn infer_metadata(file_name: &str) -> InferredMetadata {
    let lower = file_name.to_lowercase();

    let localidad = if lower.contains("villa_carlos_paz") || lower.contains("carlos_paz") {
        "Villa Carlos Paz"
    } else if lower.contains("cosquin") {
        "Cosquín"
    } else if lower.contains("alta_gracia") {
        "Alta Gracia"
    } else {
        "Córdoba Capital"
    };

    let barrio = if localidad != "Córdoba Capital" {
        ""
    } else if lower.contains("nueva_cordoba") || lower.contains("nueva cordoba") {
        "Nueva Córdoba"
    } else if lower.contains("alberdi") {
        "Alberdi"
    } else if lower.contains("guemes") {
        "Güemes"
    } else if lower.contains("centro") {
        "Centro"
    } else {
        ""
    };

    let stem = Path::new(file_name).file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let descripcion = title_case(&stem.replace(['_', '-'], " "));
    let descripcion = TRAILING_NUMBER.replace(&descripcion, "").into_owned();

    InferredMetadata {
        localidad: localidad.to_string(),
        barrio: barrio.to_string(),
        descripcion,
    }
}

/// 每个单词首字母大写，其余小写
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_bound_outside_runtime() {
        assert_eq!(cpu_bound(|| 21 * 2), 42);
    }

    #[tokio::test]
    async fn test_cpu_bound_current_thread() {
        assert_eq!(cpu_bound(|| 21 * 2), 42);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cpu_bound_multi_thread() {
        let handle = tokio::spawn(async { cpu_bound(|| (1..=100).sum::<i32>()) });
        assert_eq!(handle.await.unwrap(), 5050);
    }

    #[test]
    fn test_stored_filename() {
        let a = stored_filename("/fotos/a/plaza.jpg", "plaza.jpg");
        let b = stored_filename("/fotos/b/plaza.jpg", "plaza.jpg");
        assert!(a.ends_with("_plaza.jpg"));
        assert_eq!(a.len(), "12345678_plaza.jpg".len());
        assert_ne!(a, b);
        assert_eq!(a, stored_filename("/fotos/a/plaza.jpg", "plaza.jpg"));
    }

    #[test]
    fn test_stored_filename_strips_directories() {
        let name = stored_filename("x", "../../etc/passwd");
        assert!(name.ends_with("_passwd"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_infer_capital_barrio() {
        let meta = infer_metadata("nueva_cordoba_plaza_españa_12.jpg");
        assert_eq!(meta.localidad, "Córdoba Capital");
        assert_eq!(meta.barrio, "Nueva Córdoba");
        assert_eq!(meta.descripcion, "Nueva Cordoba Plaza España");
    }

    #[test]
    fn test_infer_other_localidad() {
        let meta = infer_metadata("cosquin-festival-centro.png");
        assert_eq!(meta.localidad, "Cosquín");
        assert_eq!(meta.barrio, "");
        assert_eq!(meta.descripcion, "Cosquin Festival Centro");

        let meta = infer_metadata("VILLA_CARLOS_PAZ_reloj_cucu.jpg");
        assert_eq!(meta.localidad, "Villa Carlos Paz");
    }

    #[test]
    fn test_infer_default() {
        let meta = infer_metadata("guemes_feria.webp");
        assert_eq!(meta.localidad, "Córdoba Capital");
        assert_eq!(meta.barrio, "Güemes");
        assert_eq!(meta.descripcion, "Guemes Feria");

        let meta = infer_metadata("tranvia.jpg");
        assert_eq!(meta.barrio, "");
        assert_eq!(meta.descripcion, "Tranvia");
    }
}
