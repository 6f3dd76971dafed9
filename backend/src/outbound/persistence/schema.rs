//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lowercase.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        role -> Varchar,
        profile_pic -> Nullable<Text>,
        /// SHA-256 hex digest of the open reset token.
        reset_token_hash -> Nullable<Varchar>,
        reset_token_expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalog entries. `created_by` is a weak reference.
    products (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        price -> Float8,
        image_url -> Nullable<Text>,
        status -> Varchar,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Customer orders. Line items and the delivery estimate are documents.
    orders (id) {
        id -> Uuid,
        user_id -> Uuid,
        line_items -> Jsonb,
        total_price -> Float8,
        estimated_delivery_time -> Jsonb,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(orders -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(orders, products, users);
