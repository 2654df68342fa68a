pub mod create;
pub mod health;
pub mod plan;
pub mod validate;
