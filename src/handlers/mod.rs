pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod documents;
pub mod invoices;
pub mod job_orders;
pub mod lens_stocks;
pub mod products;
pub mod reviews;
pub mod settings;
