//! Database schema definitions
//!
//! PostgreSQL uses `SERIAL` and restarts it with `TRUNCATE ... RESTART
//! IDENTITY`. DuckDB has no restartable identity, so ids come from
//! `users_id_seq`, which the truncate replaces with a fresh sequence.
//!
//! DuckDB stores the JSON documents as `VARCHAR` so that creating the table
//! does not depend on the json extension being installed.

/// Database schema helper
pub struct UserSchema;

impl UserSchema {
    /// `users` table for PostgreSQL
    pub fn postgres_create_sql() -> &'static str {
        r#"
CREATE TABLE IF NOT EXISTS public.users (
    id SERIAL PRIMARY KEY,
    name VARCHAR NOT NULL,
    age INT NOT NULL,
    address JSONB,
    additional_info JSONB
);
"#
    }

    /// `users` table for DuckDB
    pub fn duckdb_create_sql() -> &'static str {
        r#"
CREATE SEQUENCE IF NOT EXISTS users_id_seq START 1;

CREATE TABLE IF NOT EXISTS users (
    id BIGINT PRIMARY KEY,
    name VARCHAR NOT NULL,
    age INTEGER NOT NULL,
    address VARCHAR,
    additional_info VARCHAR
);
"#
    }

    /// Insert one user into DuckDB, drawing the id from `users_id_seq`
    pub fn duckdb_insert_sql() -> &'static str {
        "INSERT INTO users (id, name, age, address, additional_info) \
         VALUES (nextval('users_id_seq'), ?, ?, ?, ?)"
    }

    /// Empty the DuckDB `users` table and restart its id sequence at 1
    pub fn duckdb_truncate_sql() -> &'static str {
        r#"
DELETE FROM users;
CREATE OR REPLACE SEQUENCE users_id_seq START 1;
"#
    }
}
