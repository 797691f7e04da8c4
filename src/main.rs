//! Serec - 序列推荐任务服务
//!
//! - Domain: behavior/, recommendation/ (Bounded Contexts)
//! - Application: commands, queries, ports, pipeline
//! - Infrastructure: http, memory, worker, persistence, adapters

use std::sync::Arc;

use serec::application::pipeline::{PipelineConfig, RecommendPipeline};
use serec::config::{load_config, print_config};
use serec::infrastructure::adapters::{
    HttpModelClient, HttpModelClientConfig, HttpShoppingClient, HttpShoppingClientConfig,
};
use serec::infrastructure::http::{AppState, HttpServer, ServerConfig};
use serec::infrastructure::memory::InMemoryCancellationRegistry;
use serec::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteTaskStore,
};
use serec::infrastructure::worker::{RecWorker, RecWorkerConfig};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},serec={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Serec - 序列推荐任务服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 任务存储
    let task_store = Arc::new(SqliteTaskStore::new(pool));

    // 模型客户端（嵌入 + 打分）
    let model_config = HttpModelClientConfig {
        base_url: config.model.url.clone(),
        timeout_secs: config.model.timeout_secs,
    };
    let model_client = Arc::new(HttpModelClient::new(model_config)?);

    // 商品检索客户端
    let shopping_config = HttpShoppingClientConfig {
        base_url: config.shopping.url.clone(),
        timeout_secs: config.shopping.timeout_secs,
    };
    let shopping_client = Arc::new(HttpShoppingClient::new(shopping_config)?);

    // 推荐流水线
    let pipeline = Arc::new(RecommendPipeline::new(
        PipelineConfig {
            top_k: config.pipeline.top_k,
        },
        model_client.clone(),
        model_client,
        shopping_client,
    ));

    // 取消句柄注册表
    let registry = Arc::new(InMemoryCancellationRegistry::new());

    // 创建任务队列
    let (job_tx, job_rx) = mpsc::channel(config.worker.queue_capacity);

    // 创建 RecWorker
    let worker_config = RecWorkerConfig {
        max_concurrent: config.worker.max_concurrent,
        store_max_retries: config.store_retry.max_retries,
        store_retry_base_ms: config.store_retry.base_delay_ms,
    };
    let worker = RecWorker::new(worker_config, job_rx, task_store.clone(), pipeline);

    // 启动 Worker
    tokio::spawn(worker.run());

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        registry,
        task_store,
        job_tx,
        config.pipeline.max_sequence_len,
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
            }
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
