//! Access tokens and route authorization

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod policy;

pub use jwt::{Claims, TokenKeys};
pub use middleware::{authenticate, authorize_owner, bearer_token, OwnerParam};
pub use models::Identity;
pub use policy::Access;
