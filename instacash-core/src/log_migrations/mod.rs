//! Event log migrations - embedded SQL files
//!
//! Compiled in with include_str! and applied in name order.

/// (filename, sql) pairs. `000_migrations.sql` bootstraps the tracking
/// table and must stay first.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
