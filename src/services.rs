pub mod identity;
pub mod user_service;
pub mod catalog_service;
pub mod order_policy;
pub mod order_service;
pub mod payment_service;
