use clap::Parser;
use log::info;
use tokio::net::TcpListener;

use crate::cli::SubCommandExtend;
use crate::config::EmbedOptions;
use crate::embed::Embedder;
use crate::{Opts, PhotoArchiveBuilder, server};

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    #[command(flatten)]
    pub embed: EmbedOptions,
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: String,
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let archive = PhotoArchiveBuilder::new(opts.conf_dir.clone()).open().await?;
        let embedder = Embedder::from_options(&self.embed)?;
        info!("照片总数: {}，嵌入维数: {}", archive.count().await?, embedder.dimension());

        // 创建应用状态
        let state = server::AppState::new(archive, embedder);

        // 创建应用
        let app = server::create_app(state);

        // 启动服务器
        info!("服务器启动：http://{}", &self.addr);
        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
