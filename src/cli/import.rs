use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use log::info;
use serde::Deserialize;

use crate::archive::ImageMetadata;
use crate::cli::SubCommandExtend;
use crate::config::{EmbedOptions, Opts};
use crate::embed::Embedder;
use crate::utils::pb_style;
use crate::PhotoArchiveBuilder;

#[derive(Parser, Debug, Clone)]
pub struct ImportCommand {
    #[command(flatten)]
    pub embed: EmbedOptions,
    /// 元数据 CSV 文件，需包含 path、barrio、localidad、categoria、descripcion 列
    pub csv: PathBuf,
}

/// CSV 中的一行
#[derive(Debug, Deserialize)]
struct CsvRow {
    path: String,
    barrio: Option<String>,
    localidad: String,
    categoria: String,
    descripcion: Option<String>,
}

impl From<&CsvRow> for ImageMetadata {
    fn from(row: &CsvRow) -> Self {
        Self {
            original_path: row.path.clone(),
            barrio: row.barrio.clone().unwrap_or_default(),
            localidad: row.localidad.clone(),
            categoria: row.categoria.clone(),
            descripcion: row.descripcion.clone().unwrap_or_default(),
        }
    }
}

impl SubCommandExtend for ImportCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let rows = csv::Reader::from_path(&self.csv)?.deserialize::<CsvRow>().collect::<Vec<_>>();
        info!("在 {} 中找到 {} 张照片", self.csv.display(), rows.len());

        let archive = PhotoArchiveBuilder::new(opts.conf_dir.clone()).open().await?;
        let embedder = Embedder::from_options(&self.embed)?;

        let pb = ProgressBar::new(rows.len() as u64).with_style(pb_style());
        let (mut indexed, mut skipped, mut errors) = (0, 0, 0);

        for (line, row) in rows.into_iter().enumerate() {
            pb.inc(1);
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    pb.println(format!("第 {} 行格式错误: {e}", line + 2));
                    errors += 1;
                    continue;
                }
            };

            let path = Path::new(&row.path);
            if !path.exists() {
                pb.println(format!("文件不存在: {}", row.path));
                errors += 1;
                continue;
            }
            if archive.contains(&row.path).await? {
                pb.set_message(format!("跳过已添加照片: {}", row.path));
                skipped += 1;
                continue;
            }

            let file_name = path.file_name().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
            let meta = ImageMetadata::from(&row);
            let result = match tokio::fs::read(path).await {
                Ok(contents) => archive.add_image(&embedder, &file_name, &contents, &meta).await,
                Err(e) => Err(e.into()),
            };
            match result {
                Ok(filename) => {
                    pb.set_message(filename);
                    indexed += 1;
                }
                Err(e) => {
                    pb.println(format!("添加失败 {}: {e}", row.path));
                    errors += 1;
                }
            }
        }

        pb.finish_with_message("导入完成");
        info!("成功: {indexed}，跳过: {skipped}，失败: {errors}");
        println!("indexed: {indexed}, skipped: {skipped}, errors: {errors}");

        Ok(())
    }
}
