// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Catalog ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::adjust_stock,
        handlers::products::list_low_stock,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::upsert_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::backfill_customers,

        // --- Invoices ---
        handlers::invoices::create_invoice,
        handlers::invoices::list_invoices,
        handlers::invoices::get_invoice,
        handlers::invoices::cancel_invoice,
        handlers::invoices::delete_invoice,
        handlers::invoices::record_payment,
        handlers::invoices::list_payment_types,
        handlers::invoices::create_payment_type,
        handlers::invoices::update_payment_type,

        // --- Documents ---
        handlers::documents::get_invoice_pdf,

        // --- Job Orders ---
        handlers::job_orders::list_board,
        handlers::job_orders::get_history,
        handlers::job_orders::append_status,

        // --- Lens Stock ---
        handlers::lens_stocks::list_types,
        handlers::lens_stocks::create_type,
        handlers::lens_stocks::get_grid,
        handlers::lens_stocks::upsert_level,
        handlers::lens_stocks::adjust_quantity,
        handlers::lens_stocks::list_alerts,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_sales_chart,
        handlers::dashboard::get_top_products,
        handlers::dashboard::get_branch_sales,

        // --- Settings ---
        handlers::settings::list_templates,
        handlers::settings::upsert_template,

        // --- Reviews ---
        handlers::reviews::list_reviews,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::product::Product,
            handlers::products::ProductPayload,
            handlers::products::AdjustStockPayload,

            // --- Customers ---
            models::customer::Customer,
            handlers::customers::CustomerPayload,
            handlers::customers::BackfillPayload,

            // --- Invoices ---
            models::invoice::Branch,
            models::invoice::InvoiceStatus,
            models::invoice::Invoice,
            models::invoice::InvoiceItem,
            models::invoice::InvoiceDetail,
            models::invoice::Payment,
            models::invoice::PaymentType,
            handlers::invoices::CreateInvoicePayload,
            handlers::invoices::InvoiceCustomerPayload,
            handlers::invoices::InvoiceItemPayload,
            handlers::invoices::PrescriptionPayload,
            handlers::invoices::RecordPaymentPayload,
            handlers::invoices::PaymentTypePayload,
            handlers::invoices::UpdatePaymentTypePayload,

            // --- Job Orders ---
            models::job_order::JobOrderStatus,
            models::job_order::JobOrderEntry,
            models::job_order::JobOrderSummary,
            handlers::job_orders::AppendStatusPayload,

            // --- Lens Stock ---
            models::lens::LensType,
            models::lens::LensStock,
            handlers::lens_stocks::LensTypePayload,
            handlers::lens_stocks::UpsertLevelPayload,
            handlers::lens_stocks::AdjustQuantityPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::SalesChartEntry,
            models::dashboard::TopProductEntry,
            models::dashboard::BranchSalesEntry,

            // --- Settings ---
            models::settings::MessageTemplate,
            handlers::settings::UpsertTemplatePayload,

            // --- Reviews ---
            models::review::Review,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Catalog", description = "Catálogo de Produtos e Estoque"),
        (name = "Customers", description = "Cadastro de Clientes"),
        (name = "Invoices", description = "Vendas, Numeração e Pagamentos"),
        (name = "Documents", description = "Geração de PDFs"),
        (name = "Job Orders", description = "Ordens de Serviço do Laboratório"),
        (name = "Lens Stock", description = "Grade de Estoque de Lentes (SPH x CYL)"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais"),
        (name = "Settings", description = "Modelos de Mensagem e Configurações"),
        (name = "Reviews", description = "Avaliações Públicas da Loja")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
