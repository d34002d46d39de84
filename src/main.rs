//! 后台访问网关主入口

use backoffice_gate::{
    access::{self_check, AccessResolver, NavigationRenderer, RouteGuard},
    config::{AppConfig, SessionStoreKind},
    db,
    handlers::health,
    middleware::AppState,
    repository::UserRepository,
    routes,
    session::{MemorySessionStore, PgSessionStore, SessionAccessor, SessionStore},
    telemetry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();
    let mut check_only = false;

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("backoffice-gate {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            "--check-access" => check_only = true,
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    if let Ok(env) = std::env::var("BACKOFFICE_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    // 设置应用启动时间
    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志与指标
    telemetry::init_telemetry(&config);
    telemetry::init_metrics();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Backoffice gate starting...");

    // 3. 权限映射自检（导航与守卫必须一致）
    let resolver = AccessResolver::standard();
    let guard = RouteGuard::new(resolver.clone(), config.access.on_unknown_role);
    let navigation = NavigationRenderer::new(resolver.clone());
    if let Err(e) = self_check(&guard, &navigation) {
        tracing::error!(error = %e, "Access mapping self-check failed");
        return Err(anyhow::anyhow!("Access mapping self-check failed: {}", e));
    }

    if check_only {
        println!("access mapping OK (version {})", resolver.mapping().version());
        return Ok(());
    }

    // 4. 数据库连接池 + 迁移
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    tracing::info!("Database initialized");

    // 5. 会话存储
    let session_store: Arc<dyn SessionStore> = match config.session.store {
        SessionStoreKind::Memory => Arc::new(MemorySessionStore::new()),
        SessionStoreKind::Postgres => Arc::new(PgSessionStore::new(db_pool.clone())),
    };
    tracing::info!(store = ?config.session.store, "Session store ready");

    spawn_session_purge(
        SessionAccessor::new(session_store.clone()),
        Duration::from_secs(config.session.purge_interval_secs),
    );

    // 6. 构建应用状态
    let users = Arc::new(UserRepository::new(db_pool.clone()));
    let app_state = Arc::new(AppState::new(
        config.clone(),
        db_pool,
        users,
        session_store,
        resolver,
    )?);

    // 7. 构建路由
    let app = routes::create_router(app_state);

    // 8. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 9. 优雅关闭
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 定期清理过期会话
fn spawn_session_purge(sessions: SessionAccessor, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // 第一次 tick 立即返回
        interval.tick().await;

        loop {
            interval.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "Expired sessions purged"),
                Err(e) => tracing::warn!(error = %e, "Session purge failed"),
            }
        }
    });
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制退出
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("backoffice-gate {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: backoffice-gate [选项]");
    println!();
    println!("选项:");
    println!("  --version        打印版本信息并退出");
    println!("  --help           打印此帮助信息并退出");
    println!("  --check-access   校验权限映射与导航的一致性并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 BACKOFFICE_ 前缀的环境变量完成");
    println!("  可用选项请参考 .env.example");
}
