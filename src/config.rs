use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use directories::ProjectDirs;

use crate::cli::*;
use crate::ranking::{DEFAULT_LIMIT, Filters, SearchError, SearchMode, SearchQuery};

#[derive(Parser, Debug, Clone)]
pub struct EmbedOptions {
    /// 嵌入向量提供方
    #[arg(long, value_enum, default_value_t = EmbedderKind::Hash)]
    pub embedder: EmbedderKind,
    /// 外部嵌入服务地址，使用 http 提供方时必填
    #[arg(long, value_name = "URL", required_if_eq("embedder", "http"))]
    pub embed_url: Option<String>,
    /// 嵌入向量维数，整个库内必须保持一致
    #[arg(long, value_name = "N", default_value_t = 512, value_parser = clap::value_parser!(u32).range(1..=65536))]
    pub dimension: u32,
    /// 嵌入服务请求超时，单位为毫秒
    #[arg(long, value_name = "MS", default_value_t = 30000)]
    pub embed_timeout_ms: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    /// 离线特征哈希
    Hash,
    /// 外部 HTTP 模型服务
    Http,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 搜索模式
    #[arg(long, value_enum, default_value_t = SearchMode::Hybrid)]
    pub mode: SearchMode,
    /// 显示的结果数量
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_LIMIT as i64, allow_negative_numbers = true)]
    pub limit: i64,
    /// 只搜索该街区的照片
    #[arg(long)]
    pub barrio: Option<String>,
    /// 只搜索该城镇的照片
    #[arg(long)]
    pub localidad: Option<String>,
    /// 只搜索该分类的照片
    #[arg(long)]
    pub categoria: Option<String>,
}

impl SearchOptions {
    pub fn to_query(&self, text: &str) -> Result<SearchQuery, SearchError> {
        let filters =
            Filters::new(self.barrio.clone(), self.localidad.clone(), self.categoria.clone());
        SearchQuery::new(text, filters, self.mode, self.limit)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "fotosearch", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// 配置目录，存放数据库和照片文件
    #[arg(short, long, value_name = "DIR", default_value_t = ConfDir::default_dir())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 扫描目录，以目录作为分类添加照片
    Add(AddCommand),
    /// 按 CSV 元数据批量添加照片
    Import(ImportCommand),
    /// 搜索照片
    Search(SearchCommand),
    /// 启动 HTTP 搜索服务
    Server(ServerCommand),
    /// 显示照片库统计信息
    Stats(StatsCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    /// 系统默认的配置目录
    pub fn default_dir() -> Self {
        let path = ProjectDirs::from("", "cordoba", "fotosearch")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".fotosearch"));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("fotosearch.db")
    }

    /// 返回照片文件的存放目录
    pub fn images(&self) -> PathBuf {
        self.path.join("images")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

impl fmt::Display for ConfDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conf_dir_paths() {
        let dir = ConfDir::from_str("/tmp/fotos").unwrap();
        assert_eq!(dir.database(), PathBuf::from("/tmp/fotos/fotosearch.db"));
        assert_eq!(dir.images(), PathBuf::from("/tmp/fotos/images"));
        assert_eq!(dir.to_string(), "/tmp/fotos");
    }

    #[test]
    fn test_parse_search_command() {
        let opts = Opts::try_parse_from([
            "fotosearch",
            "-c",
            "/tmp/fotos",
            "search",
            "nueva cordoba",
            "--mode",
            "text",
            "--limit",
            "3",
            "--barrio",
            "Nueva Córdoba",
        ])
        .unwrap();
        let SubCommand::Search(cmd) = opts.subcmd else { panic!("expected search") };
        let query = cmd.search.to_query(&cmd.query).unwrap();
        assert_eq!(query.mode(), SearchMode::Text);
        assert_eq!(query.limit(), 3);
        assert_eq!(query.filters().barrio.as_deref(), Some("Nueva Córdoba"));
        assert_eq!(query.filters().localidad, None);
    }

    #[test]
    fn test_http_embedder_requires_url() {
        let res = Opts::try_parse_from(["fotosearch", "server", "--embedder", "http"]);
        assert!(res.is_err());
        let res = Opts::try_parse_from([
            "fotosearch",
            "server",
            "--embedder",
            "http",
            "--embed-url",
            "http://127.0.0.1:9000",
        ]);
        assert!(res.is_ok());
    }
}
