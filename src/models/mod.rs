pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod invoice;
pub mod job_order;
pub mod lens;
pub mod product;
pub mod review;
pub mod settings;
