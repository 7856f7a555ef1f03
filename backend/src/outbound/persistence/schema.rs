//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `phone` and `username` are unique.
    users (id) {
        id -> Int8,
        username -> Varchar,
        phone -> Varchar,
        /// PHC-formatted Argon2id hash.
        password_hash -> Text,
        email -> Nullable<Varchar>,
        birth_day -> Nullable<Date>,
        profile -> Nullable<Text>,
        avatar -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    textbooks (id) {
        id -> Int8,
        title -> Varchar,
        tag -> Varchar,
        description -> Nullable<Text>,
        author_id -> Int8,
        collaborator_id -> Nullable<Int8>,
        is_hot -> Bool,
        mark -> Nullable<Int2>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable published versions. `(textbook_id, version_no)` is unique.
    textbook_versions (id) {
        id -> Int8,
        textbook_id -> Int8,
        version_no -> Varchar,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user bit flags on a textbook (1 subscribe, 2 watch later, 4 rated).
    user_operations (id) {
        id -> Int8,
        user_id -> Int8,
        textbook_id -> Int8,
        operation -> Int2,
    }
}

diesel::joinable!(textbooks -> users (author_id));
diesel::joinable!(textbook_versions -> textbooks (textbook_id));
diesel::joinable!(user_operations -> textbooks (textbook_id));

diesel::allow_tables_to_appear_in_same_query!(users, textbooks, textbook_versions, user_operations);
