// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

// GET /api/invoices/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/invoices/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID da Fatura")),
    responses(
        (status = 200, description = "PDF da fatura, com receita quando houver lentes", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Fatura não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (invoice_number, pdf_bytes) =
        app_state.document_service.generate_invoice_pdf(id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.pdf\"", invoice_number),
        ),
    ];

    Ok((headers, pdf_bytes))
}
