//! Route path constants.

pub const POST_AUTH_REGISTER: &str = "/api/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const POST_AUTH_LOGOUT: &str = "/api/auth/logout";
pub const GET_AUTH_ME: &str = "/api/auth/me";

pub const GET_HEALTH: &str = "/api/health";
pub const GET_CATEGORIES: &str = "/api/categories";

pub const TOPICS: &str = "/api/topics";
pub const TOPICS_ID: &str = "/api/topics/{id}";
pub const POST_TOPICS_ID_VIEW: &str = "/api/topics/{id}/view";
pub const TOPICS_ID_REPLIES: &str = "/api/topics/{id}/replies";

pub const GET_USERS: &str = "/api/users";
pub const MESSAGES: &str = "/api/messages";
pub const POST_MESSAGES_MARK_READ: &str = "/api/messages/mark-read";

pub const GET_USER_STATS: &str = "/api/user/stats";
pub const GET_USER_TOPICS: &str = "/api/user/topics";
pub const GET_USER_REPLIES: &str = "/api/user/replies";
pub const PATCH_USER_PROFILE: &str = "/api/user/profile";
pub const PATCH_USER_PASSWORD: &str = "/api/user/password";

pub const GET_ADMIN_STATS: &str = "/api/admin/stats";
pub const GET_ADMIN_RECENT_USERS: &str = "/api/admin/recent-users";
pub const GET_ADMIN_RECENT_TOPICS: &str = "/api/admin/recent-topics";
pub const GET_ADMIN_USERS: &str = "/api/admin/users";
pub const DELETE_ADMIN_USERS_ID: &str = "/api/admin/users/{id}";
pub const PATCH_ADMIN_USERS_ID_ROLE: &str = "/api/admin/users/{id}/role";
pub const GET_ADMIN_TOPICS: &str = "/api/admin/topics";
pub const DELETE_ADMIN_TOPICS_ID: &str = "/api/admin/topics/{id}";
pub const ADMIN_CATEGORIES: &str = "/api/admin/categories";
pub const ADMIN_CATEGORIES_ID: &str = "/api/admin/categories/{id}";
