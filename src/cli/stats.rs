use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::{Opts, PhotoArchiveBuilder};

#[derive(Parser, Debug, Clone)]
pub struct StatsCommand {
    /// 以 JSON 格式输出
    #[arg(long)]
    pub json: bool,
}

impl SubCommandExtend for StatsCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let archive = PhotoArchiveBuilder::new(opts.conf_dir.clone()).open().await?;
        let analytics = archive.analytics().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&analytics)?);
            return Ok(());
        }

        println!("total: {}", analytics.total_imagenes);
        println!("pending review: {}", analytics.pendientes_revisar);
        print_counts("categorias", analytics.categorias.iter().map(|c| (&c.categoria, c.total)));
        print_counts("barrios", analytics.barrios.iter().map(|c| (&c.barrio, c.total)));
        print_counts("localidades", analytics.localidades.iter().map(|c| (&c.localidad, c.total)));
        Ok(())
    }
}

fn print_counts<'a>(title: &str, counts: impl Iterator<Item = (&'a String, i64)>) {
    println!("\n{title}:");
    for (value, total) in counts {
        println!("{total:>8}\t{value}");
    }
}
