//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 模型服务配置
    #[serde(default)]
    pub model: ModelConfig,

    /// 商品检索服务配置
    #[serde(default)]
    pub shopping: ShoppingConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 推荐流水线配置
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 后台 Worker 配置
    #[serde(default)]
    pub worker: WorkerConfig,

    /// 终态写入重试配置
    #[serde(default)]
    pub store_retry: StoreRetryConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            shopping: ShoppingConfig::default(),
            database: DatabaseConfig::default(),
            pipeline: PipelineConfig::default(),
            worker: WorkerConfig::default(),
            store_retry: StoreRetryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 模型服务配置（嵌入 + 打分）
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// 模型服务基础 URL
    #[serde(default = "default_model_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

fn default_model_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_model_timeout() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            timeout_secs: default_model_timeout(),
        }
    }
}

/// 商品检索服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ShoppingConfig {
    /// 商品检索服务基础 URL
    #[serde(default = "default_shopping_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_shopping_timeout")]
    pub timeout_secs: u64,
}

fn default_shopping_url() -> String {
    "http://localhost:8100".to_string()
}

fn default_shopping_timeout() -> u64 {
    30
}

impl Default for ShoppingConfig {
    fn default() -> Self {
        Self {
            url: default_shopping_url(),
            timeout_secs: default_shopping_timeout(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/serec.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 推荐流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// 返回的推荐条数
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// 行为序列窗口长度，只保留最近 N 条
    #[serde(default = "default_max_sequence_len")]
    pub max_sequence_len: usize,
}

fn default_top_k() -> usize {
    5
}

fn default_max_sequence_len() -> usize {
    40
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_sequence_len: default_max_sequence_len(),
        }
    }
}

/// 后台 Worker 配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// 最大并发任务数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 任务队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    100
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// 终态写入重试配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRetryConfig {
    /// 最大重试次数
    #[serde(default = "default_store_max_retries")]
    pub max_retries: u32,

    /// 首次重试延迟（毫秒），之后指数增长
    #[serde(default = "default_store_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_store_max_retries() -> u32 {
    3
}

fn default_store_base_delay_ms() -> u64 {
    100
}

impl Default for StoreRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_store_max_retries(),
            base_delay_ms: default_store_base_delay_ms(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
