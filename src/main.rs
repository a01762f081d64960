// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas: login, registro e a vitrine de avaliações
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let protected_auth_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::products::create_product).get(handlers::products::list_products),
        )
        .route("/low-stock", get(handlers::products::list_low_stock))
        .route("/{id}/adjust", post(handlers::products::adjust_stock))
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::customers::upsert_customer).get(handlers::customers::list_customers),
        )
        .route(
            "/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let invoice_routes = Router::new()
        .route(
            "/",
            post(handlers::invoices::create_invoice).get(handlers::invoices::list_invoices),
        )
        .route(
            "/payment-types",
            get(handlers::invoices::list_payment_types)
                .post(handlers::invoices::create_payment_type),
        )
        .route(
            "/payment-types/{id}",
            axum::routing::put(handlers::invoices::update_payment_type),
        )
        .route(
            "/{id}",
            get(handlers::invoices::get_invoice).delete(handlers::invoices::delete_invoice),
        )
        .route("/{id}/cancel", post(handlers::invoices::cancel_invoice))
        .route("/{id}/payments", post(handlers::invoices::record_payment))
        .route("/{id}/pdf", get(handlers::documents::get_invoice_pdf))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let job_order_routes = Router::new()
        .route("/", get(handlers::job_orders::list_board))
        .route(
            "/{invoice_item_id}",
            post(handlers::job_orders::append_status),
        )
        .route(
            "/{invoice_item_id}/history",
            get(handlers::job_orders::get_history),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let lens_stock_routes = Router::new()
        .route(
            "/types",
            get(handlers::lens_stocks::list_types).post(handlers::lens_stocks::create_type),
        )
        .route(
            "/types/{id}/grid",
            get(handlers::lens_stocks::get_grid).put(handlers::lens_stocks::upsert_level),
        )
        .route("/{id}/adjust", post(handlers::lens_stocks::adjust_quantity))
        .route("/alerts", get(handlers::lens_stocks::list_alerts))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/sales-chart", get(handlers::dashboard::get_sales_chart))
        .route("/top-products", get(handlers::dashboard::get_top_products))
        .route("/branch-sales", get(handlers::dashboard::get_branch_sales))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let settings_routes = Router::new()
        .route(
            "/templates",
            get(handlers::settings::list_templates).put(handlers::settings::upsert_template),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let admin_routes = Router::new()
        .route(
            "/customers/backfill",
            post(handlers::customers::backfill_customers),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/reviews", get(handlers::reviews::list_reviews))
        .nest("/api/auth", auth_routes)
        .nest("/api/auth", protected_auth_routes)
        .nest("/api/products", product_routes)
        .nest("/api/customers", customer_routes)
        .nest("/api/invoices", invoice_routes)
        .nest("/api/job-orders", job_order_routes)
        .nest("/api/lens-stocks", lens_stock_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/admin", admin_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
