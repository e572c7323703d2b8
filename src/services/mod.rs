//! Services layer - Business logic
//!
//! Services implement the business rules on top of the repositories:
//! credential handling, session token issuing/verification, and post
//! ownership checks.

pub mod password;
pub mod post;
pub mod token;
pub mod user;

pub use password::{hash_password, verify_password};
pub use post::{PostService, PostServiceError};
pub use token::{AuthClaims, TokenCodec, TokenError};
pub use user::{UserService, UserServiceError};
