pub mod health;
pub mod users;
pub mod products;
pub mod orders;
pub mod payments;
