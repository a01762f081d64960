pub mod user_repo;
pub use user_repo::UserRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod job_order_repo;
pub use job_order_repo::JobOrderRepository;
pub mod lens_stock_repo;
pub use lens_stock_repo::LensStockRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
