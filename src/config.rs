// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        CustomerRepository, DashboardRepository, InvoiceRepository, JobOrderRepository,
        LensStockRepository, ProductRepository, SettingsRepository, UserRepository,
    },
    services::{
        auth::AuthService, document_service::DocumentService, invoice_service::InvoiceService,
        review_service::ReviewService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    // Repositórios de CRUD simples: os handlers chamam direto
    pub product_repo: ProductRepository,
    pub customer_repo: CustomerRepository,
    pub invoice_repo: InvoiceRepository,
    pub job_order_repo: JobOrderRepository,
    pub lens_stock_repo: LensStockRepository,
    pub dashboard_repo: DashboardRepository,
    pub settings_repo: SettingsRepository,
    // Serviços com lógica de verdade
    pub auth_service: AuthService,
    pub invoice_service: InvoiceService,
    pub document_service: DocumentService,
    pub review_service: ReviewService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, o main decide.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let store_name = env::var("STORE_NAME").unwrap_or_else(|_| "Optik Melawai".to_string());
        let place_id = env::var("GOOGLE_PLACE_ID").unwrap_or_default();
        let maps_api_key = env::var("GOOGLE_MAPS_API_KEY").unwrap_or_default();

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let job_order_repo = JobOrderRepository::new(db_pool.clone());
        let lens_stock_repo = LensStockRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret.clone());
        let invoice_service = InvoiceService::new(
            db_pool.clone(),
            invoice_repo.clone(),
            product_repo.clone(),
            customer_repo.clone(),
            job_order_repo.clone(),
        );
        let document_service =
            DocumentService::new(db_pool.clone(), invoice_repo.clone(), store_name);
        let review_service = ReviewService::new(reqwest::Client::new(), place_id, maps_api_key);

        Ok(Self {
            db_pool,
            jwt_secret,
            product_repo,
            customer_repo,
            invoice_repo,
            job_order_repo,
            lens_stock_repo,
            dashboard_repo,
            settings_repo,
            auth_service,
            invoice_service,
            document_service,
            review_service,
        })
    }
}
