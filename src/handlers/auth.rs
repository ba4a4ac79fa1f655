use actix_web::{HttpResponse, Responder};

use crate::auth::middleware::AuthenticatedUser;
use crate::models::users::UserResponse;

/// GET /api/auth/me: return the currently authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}
