use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, CreateUserFromAuth};

/// Create a new user from Supabase Auth JWT claims (called by auth middleware).
pub async fn find_or_create_from_auth(
    db: &DatabaseConnection,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    // Try to find the user first (by Supabase auth UUID).
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        display_name: Set(input.display_name),
        avatar_url: Set(input.avatar_url),
        auth_provider: Set(input.auth_provider),
        role: Set(input.role),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_user.insert(db).await
}

/// Fetch a single user by ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}
