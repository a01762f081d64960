pub mod auth;
pub mod document_service;
pub mod invoice_service;
pub mod review_service;
