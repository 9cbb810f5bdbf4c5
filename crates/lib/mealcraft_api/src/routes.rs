//! Route paths.

/// Prefix for every versioned endpoint.
pub const API_PREFIX: &str = "/api/v1";

pub const GET_ROOT: &str = "/";
pub const GET_HEALTH: &str = "/api/v1/health";

pub const POST_AUTH_REGISTER: &str = "/api/v1/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/v1/auth/login";
pub const GET_AUTH_USERS_ME: &str = "/api/v1/auth/users/me";

pub const POST_RESPOND: &str = "/api/v1/respond";
pub const POST_BEVERAGE_PAIRINGS: &str = "/api/v1/beverage-pairings";
pub const POST_DISH_PAIRINGS: &str = "/api/v1/dish-pairings";
