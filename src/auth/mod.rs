pub mod claims;
pub mod extractors;
pub mod jwt;

pub use extractors::{AdminUser, AuthUser, FinanceOrAdmin, ROLE_ADMIN, ROLE_FINANCE_MANAGER};
pub use jwt::JwtKeys;
