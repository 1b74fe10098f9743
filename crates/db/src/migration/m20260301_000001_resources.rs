//! Resource tables migration.
//!
//! Creates one table per declared resource type. Column names match the
//! `column` of each field definition in the core catalog.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ORGANIZATION
        // ============================================================
        db.execute_unprepared(DEPARTMENTS_SQL).await?;
        db.execute_unprepared(FACULTY_SQL).await?;
        db.execute_unprepared(PROGRAMS_SQL).await?;

        // ============================================================
        // PART 2: CAMPUS LIFE
        // ============================================================
        db.execute_unprepared(SOCIETIES_SQL).await?;
        db.execute_unprepared(EVENTS_SQL).await?;
        db.execute_unprepared(NEWS_SQL).await?;

        // ============================================================
        // PART 3: DOCUMENTS
        // ============================================================
        db.execute_unprepared(PUBLICATIONS_SQL).await?;
        db.execute_unprepared(NOTICES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const DEPARTMENTS_SQL: &str = r"
CREATE TABLE departments (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT UNIQUE,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const FACULTY_SQL: &str = r"
CREATE TABLE faculty (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    designation TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    bio TEXT,
    image_url TEXT,
    department_id BIGINT REFERENCES departments(id) ON DELETE SET NULL,
    is_head BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_faculty_department ON faculty(department_id);
";

const PROGRAMS_SQL: &str = r"
CREATE TABLE programs (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    level TEXT NOT NULL,
    duration_years BIGINT,
    description TEXT,
    department_id BIGINT NOT NULL REFERENCES departments(id) ON DELETE RESTRICT,
    brochure_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_programs_department ON programs(department_id);
";

const SOCIETIES_SQL: &str = r"
CREATE TABLE societies (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    logo_url TEXT,
    faculty_advisor_id TEXT REFERENCES faculty(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const EVENTS_SQL: &str = r"
CREATE TABLE events (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    venue TEXT,
    starts_at TIMESTAMPTZ NOT NULL,
    ends_at TIMESTAMPTZ,
    image_url TEXT,
    society_id TEXT REFERENCES societies(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_events_ends_after_start CHECK (ends_at IS NULL OR ends_at >= starts_at)
);

CREATE INDEX idx_events_starts ON events(starts_at DESC);
CREATE INDEX idx_events_society ON events(society_id);
";

const NEWS_SQL: &str = r"
CREATE TABLE news (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    image_url TEXT,
    highlighted BOOLEAN NOT NULL DEFAULT false,
    published_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Listing highlighted news newest-first
CREATE INDEX idx_news_published ON news(published_at DESC) WHERE highlighted;
";

const PUBLICATIONS_SQL: &str = r"
CREATE TABLE publications (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    authors TEXT NOT NULL,
    venue TEXT,
    year BIGINT NOT NULL,
    sequence BIGINT,
    faculty_id TEXT REFERENCES faculty(id) ON DELETE SET NULL,
    document_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_publications_year ON publications(year DESC, sequence);
CREATE INDEX idx_publications_faculty ON publications(faculty_id);
";

const NOTICES_SQL: &str = r"
CREATE TABLE notices (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    notice_date DATE NOT NULL,
    document_url TEXT,
    pinned BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_notices_date ON notices(notice_date DESC);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS notices CASCADE;
DROP TABLE IF EXISTS publications CASCADE;
DROP TABLE IF EXISTS news CASCADE;
DROP TABLE IF EXISTS events CASCADE;
DROP TABLE IF EXISTS societies CASCADE;
DROP TABLE IF EXISTS programs CASCADE;
DROP TABLE IF EXISTS faculty CASCADE;
DROP TABLE IF EXISTS departments CASCADE;
";
