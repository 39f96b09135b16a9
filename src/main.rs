use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use meeting_room_backend::{
    AppState,
    config::Config,
    email::EmailService,
    middleware::{auth_middleware, log_errors, permission_guard},
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'meeting_room_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 设置 Redis 客户端
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");

    // 设置邮件服务
    let email = EmailService::new(&config).expect("Failed to create mail transport");

    // 设置应用状态
    let state = AppState {
        pool,
        config: config.clone(),
        redis: Arc::new(redis_client),
        email: Arc::new(email),
    };

    // 将路由分为公开路由和受保护路由
    let public_routes = Router::new()
        // 注册、登录和验证码
        .route("/user/register", post(routes::user::register))
        .route("/user/register-captcha", get(routes::user::register_captcha))
        .route("/user/login", post(routes::user::login))
        .route("/user/admin/login", post(routes::user::admin_login))
        .route("/user/refresh-token", get(routes::user::refresh_token))
        // 验证码确认的密码修改
        .route("/user/update_password", post(routes::user::update_password))
        .route(
            "/user/update_password/captcha",
            get(routes::user::update_password_captcha),
        )
        .route("/user/freeze", get(routes::user::freeze))
        .route("/user/aaa", get(routes::user::aaa))
        // 预定查询和审批
        .route("/booking/list", get(routes::booking::list))
        .route("/booking/apply", get(routes::booking::apply));

    let protected_routes = Router::new()
        // 需要认证的用户路由
        .route("/user/info", get(routes::user::info))
        .route("/user/list", get(routes::user::list))
        .route("/user/update", post(routes::user::update))
        .route("/user/update/captcha", get(routes::user::update_captcha))
        .route(
            "/user/bbb",
            get(routes::user::bbb).layer(axum::middleware::from_fn(|req, next| {
                permission_guard(&["ddd"], req, next)
            })),
        )
        // 预定路由
        .route("/booking/add", post(routes::booking::add))
        .route("/booking/urge/{id}", get(routes::booking::urge))
        // 会议室路由
        .route("/meeting-room/list", get(routes::meeting_room::list))
        .route("/meeting-room/create", post(routes::meeting_room::create))
        .route("/meeting-room/update", post(routes::meeting_room::update))
        .route(
            "/meeting-room/{id}",
            get(routes::meeting_room::find_by_id).delete(routes::meeting_room::remove),
        )
        // 统计路由
        .route(
            "/statistic/user-booking-count",
            get(routes::statistic::user_booking_count),
        )
        // 应用认证中间件
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // 创建基础路由
    let router = Router::new().nest(
        &config.api_base_uri.clone(),
        Router::new().merge(public_routes).merge(protected_routes),
    );

    // 添加日志中间件
    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        // 设置开发环境的CORS，允许所有来源
        let cors = CorsLayer::permissive();
        router.layer(cors)
    };

    // 添加应用状态
    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
