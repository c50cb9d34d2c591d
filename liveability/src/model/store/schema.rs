//! table definitions. every statement is `IF NOT EXISTS` so that schema
//! creation can run at the start of every command.

pub const CREATE_ORIGINS: &str = "
CREATE TABLE IF NOT EXISTS origins (
    origin_id    TEXT PRIMARY KEY,
    x            REAL NOT NULL,
    y            REAL NOT NULL,
    partition_id TEXT NOT NULL,
    areas        TEXT NOT NULL DEFAULT '{}'
);";

pub const CREATE_DESTINATIONS: &str = "
CREATE TABLE IF NOT EXISTS destinations (
    destination_id TEXT PRIMARY KEY,
    source         TEXT NOT NULL,
    x              REAL NOT NULL,
    y              REAL NOT NULL
);";

/// `category` is the empty string for rows tracking a whole partition.
pub const CREATE_PROGRESS_LEDGER: &str = "
CREATE TABLE IF NOT EXISTS progress_ledger (
    partition_id     TEXT NOT NULL,
    category         TEXT NOT NULL DEFAULT '',
    item_count       INTEGER NOT NULL,
    status           TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    duration_minutes REAL NOT NULL DEFAULT 0,
    PRIMARY KEY (partition_id, category)
);";

pub const CREATE_ROUTE_RESULTS: &str = "
CREATE TABLE IF NOT EXISTS route_results (
    origin_id     TEXT NOT NULL,
    category      TEXT NOT NULL,
    distance_m    REAL,
    count         INTEGER NOT NULL DEFAULT 0,
    source_counts TEXT NOT NULL DEFAULT '{}',
    geometry      TEXT,
    updated_at    TEXT NOT NULL,
    PRIMARY KEY (origin_id, category)
);";

pub const CREATE_ORIGIN_FAILURES: &str = "
CREATE TABLE IF NOT EXISTS origin_failures (
    origin_id    TEXT NOT NULL,
    category     TEXT NOT NULL,
    partition_id TEXT NOT NULL,
    message      TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    PRIMARY KEY (origin_id, category)
);";

pub const CREATE_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS origins_partition_idx ON origins (partition_id);
CREATE INDEX IF NOT EXISTS destinations_source_idx ON destinations (source);
CREATE INDEX IF NOT EXISTS route_results_category_idx ON route_results (category);
CREATE INDEX IF NOT EXISTS progress_ledger_status_idx ON progress_ledger (status);";

pub const ALL_TABLES: [&str; 5] = [
    CREATE_ORIGINS,
    CREATE_DESTINATIONS,
    CREATE_PROGRESS_LEDGER,
    CREATE_ROUTE_RESULTS,
    CREATE_ORIGIN_FAILURES,
];
