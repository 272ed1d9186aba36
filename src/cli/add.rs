use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use log::info;
use regex::Regex;
use walkdir::WalkDir;

use crate::archive::ImageMetadata;
use crate::cli::SubCommandExtend;
use crate::config::{EmbedOptions, Opts};
use crate::embed::Embedder;
use crate::utils::{infer_metadata, pb_style};
use crate::PhotoArchiveBuilder;

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    #[command(flatten)]
    pub embed: EmbedOptions,
    /// 照片所在目录
    pub path: PathBuf,
    /// 目录中所有照片使用的分类
    #[arg(long)]
    pub categoria: String,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png,gif,webp,bmp")]
    pub suffix: String,
}

impl SubCommandExtend for AddCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let re_suf = Regex::new(&format!("(?i)^({})$", self.suffix.replace(',', "|")))?;
        let archive = PhotoArchiveBuilder::new(opts.conf_dir.clone()).open().await?;
        let embedder = Embedder::from_options(&self.embed)?;

        info!("开始扫描目录: {}", self.path.display());
        let entries = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().extension().is_some_and(|ext| re_suf.is_match(&ext.to_string_lossy()))
            })
            .map(|entry| entry.into_path())
            .collect::<Vec<_>>();
        info!("扫描完成，共 {} 张照片，分类: {}", entries.len(), self.categoria);

        let pb = ProgressBar::new(entries.len() as u64).with_style(pb_style());
        let (mut indexed, mut skipped, mut errors) = (0, 0, 0);

        for path in entries {
            pb.inc(1);
            let original_path = path.to_string_lossy().to_string();
            if archive.contains(&original_path).await? {
                pb.set_message(format!("跳过已添加照片: {original_path}"));
                skipped += 1;
                continue;
            }

            let file_name = path.file_name().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
            let inferred = infer_metadata(&file_name);
            let meta = ImageMetadata {
                original_path: original_path.clone(),
                barrio: inferred.barrio,
                localidad: inferred.localidad,
                categoria: self.categoria.clone(),
                descripcion: inferred.descripcion,
            };

            let result = match tokio::fs::read(&path).await {
                Ok(contents) => archive.add_image(&embedder, &file_name, &contents, &meta).await,
                Err(e) => Err(e.into()),
            };
            match result {
                Ok(filename) => {
                    pb.set_message(filename);
                    indexed += 1;
                }
                Err(e) => {
                    pb.println(format!("添加失败 {original_path}: {e}"));
                    errors += 1;
                }
            }
        }

        pb.finish_with_message("照片添加完成");
        info!("成功: {indexed}，跳过: {skipped}，失败: {errors}");
        println!("indexed: {indexed}, skipped: {skipped}, errors: {errors}");

        Ok(())
    }
}
