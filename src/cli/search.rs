use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::cli::SubCommandExtend;
use crate::config::{EmbedOptions, Opts, SearchOptions};
use crate::embed::Embedder;
use crate::ranking::SearchHit;
use crate::PhotoArchiveBuilder;

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub embed: EmbedOptions,
    #[command(flatten)]
    pub search: SearchOptions,
    /// 查询文本
    pub query: String,
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        // 先校验参数，避免无效请求打开数据库
        let query = self.search.to_query(&self.query)?;
        let archive = PhotoArchiveBuilder::new(opts.conf_dir.clone()).open().await?;
        let embedder = Embedder::from_options(&self.embed)?;

        let result = archive.search(&embedder, &query).await?;

        print_result(&result, self)
    }
}

fn print_result(result: &[SearchHit], opts: &SearchCommand) -> Result<()> {
    match opts.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for hit in result {
                println!(
                    "{:.4}\t{}\t{}\t{}\t{}",
                    hit.similarity, hit.filename, hit.localidad, hit.categoria, hit.descripcion
                );
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}
