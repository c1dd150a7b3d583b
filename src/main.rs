use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use dianping_backend::{
    AppState,
    config::Config,
    mail::Mailer,
    middleware::{auth_middleware, log_errors},
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
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
                conn.execute("SET application_name = 'dianping_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 设置邮件客户端
    let mailer = Mailer::from_config(&config).expect("Failed to create SMTP transport");

    // 设置应用状态
    let state = AppState {
        pool,
        config: config.clone(),
        mailer,
    };

    // 普通用户路由
    let user_routes = Router::new()
        .route("/user/register", post(routes::user::register))
        .route("/user/login", post(routes::user::login))
        .route("/user/available", get(routes::user::available))
        .route("/user/search", get(routes::user::search))
        .route("/user/info", get(routes::user::get_info))
        .route("/user/info", post(routes::user::update_info))
        .route("/user/review", get(routes::user::list_reviews))
        .route("/user/review", post(routes::user::post_review))
        .route("/user/review", delete(routes::user::delete_review));

    // 商家路由
    let merchant_routes = Router::new()
        .route("/merchant/register", post(routes::merchant::register))
        .route("/merchant/apply", post(routes::merchant::apply))
        .route("/merchant/info", get(routes::merchant::get_info))
        .route("/merchant/info", post(routes::merchant::update_info))
        .route("/merchant/statistic", get(routes::merchant::statistic))
        .route("/merchant/food", get(routes::merchant::list_food))
        .route("/merchant/food", post(routes::merchant::add_food))
        .route("/merchant/food", put(routes::merchant::edit_food))
        .route("/merchant/food", delete(routes::merchant::delete_food))
        .route("/merchant/category", get(routes::merchant::list_category))
        .route("/merchant/category", post(routes::merchant::add_category))
        .route("/merchant/category", put(routes::merchant::edit_category))
        .route(
            "/merchant/category",
            delete(routes::merchant::delete_category),
        )
        .route("/merchant/review", get(routes::merchant::list_reviews));

    // 管理员路由
    let admin_routes = Router::new()
        .route("/admin/info", get(routes::admin::get_info))
        .route("/admin/admin", get(routes::admin::list_admins))
        .route("/admin/admin", post(routes::admin::create_admin))
        .route("/admin/admin", put(routes::admin::update_admin))
        .route(
            "/admin/verification/{kind}",
            get(routes::admin::list_verifications),
        )
        .route(
            "/admin/verification",
            post(routes::admin::resolve_verification),
        )
        .route("/admin/ban", post(routes::admin::ban))
        .route("/admin/review", delete(routes::admin::delete_review))
        .route("/admin/food", delete(routes::admin::delist_food));

    // 游客路由
    let common_routes = Router::new()
        .route("/common/index", get(routes::common::index))
        .route("/common/rank", get(routes::common::rank))
        .route(
            "/common/search/merchant",
            get(routes::common::search_merchant),
        )
        .route("/common/search/food", get(routes::common::search_food))
        .route("/common/food", get(routes::common::food_detail))
        .route("/common/review", get(routes::common::food_reviews));

    // 访问闸门统一作用于整棵 API 树，公开路径在闸门内判定
    let api = Router::new()
        .merge(user_routes)
        .merge(merchant_routes)
        .merge(admin_routes)
        .merge(common_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new().nest(&config.api_base_uri.clone(), api);

    // 添加日志中间件
    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        let cors = tower_http::cors::CorsLayer::permissive();
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
