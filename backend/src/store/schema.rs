//! Tables of the portal as created in a local SQLite store.
//!
//! The hosted store owns its own schema; these definitions mirror it for the
//! local backend, including the `templates` migration (cascade delete on
//! companies).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Boolean,
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    pub ddl: &'static str,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

use ColumnKind::{Boolean, Integer, Text};

pub const COLLEGES: Table = Table {
    name: "colleges",
    primary_key: "college_id",
    columns: &[
        col("college_id", Integer),
        col("college_name", Text),
        col("created_at", Text),
    ],
    ddl: "CREATE TABLE IF NOT EXISTS colleges (
        college_id INTEGER PRIMARY KEY AUTOINCREMENT,
        college_name TEXT NOT NULL UNIQUE,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
};

pub const COURSES: Table = Table {
    name: "courses",
    primary_key: "course_id",
    columns: &[
        col("course_id", Integer),
        col("course_name", Text),
        col("created_at", Text),
    ],
    ddl: "CREATE TABLE IF NOT EXISTS courses (
        course_id INTEGER PRIMARY KEY AUTOINCREMENT,
        course_name TEXT NOT NULL UNIQUE,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
};

pub const COMPANIES: Table = Table {
    name: "companies",
    primary_key: "company_id",
    columns: &[
        col("company_id", Integer),
        col("company_name", Text),
        col("created_at", Text),
    ],
    ddl: "CREATE TABLE IF NOT EXISTS companies (
        company_id INTEGER PRIMARY KEY AUTOINCREMENT,
        company_name TEXT NOT NULL,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
};

pub const STUDENTS: Table = Table {
    name: "students",
    primary_key: "student_id",
    columns: &[
        col("student_id", Integer),
        col("name", Text),
        col("phone_number", Text),
        col("email", Text),
        col("year", Integer),
        col("branch", Text),
        col("college_id", Integer),
        col("eligible", Boolean),
        col("certificate", Text),
        col("certificate_approved", Boolean),
        col("certificate_id", Text),
        col("downloaded_count", Integer),
        col("deleted", Boolean),
        col("created_at", Text),
    ],
    ddl: "CREATE TABLE IF NOT EXISTS students (
        student_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        phone_number TEXT NOT NULL UNIQUE,
        email TEXT,
        year INTEGER,
        branch TEXT,
        college_id INTEGER REFERENCES colleges(college_id),
        eligible INTEGER NOT NULL DEFAULT 0,
        certificate TEXT,
        certificate_approved INTEGER NOT NULL DEFAULT 0,
        certificate_id TEXT,
        downloaded_count INTEGER NOT NULL DEFAULT 0,
        deleted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
};

pub const TEMPLATES: Table = Table {
    name: "templates",
    primary_key: "id",
    columns: &[
        col("id", Integer),
        col("template", Text),
        col("company_id", Integer),
        col("is_selected", Boolean),
        col("created_at", Text),
    ],
    ddl: "CREATE TABLE IF NOT EXISTS templates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        template TEXT NOT NULL,
        company_id INTEGER NOT NULL REFERENCES companies(company_id) ON DELETE CASCADE,
        is_selected INTEGER NOT NULL DEFAULT 0,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
};

/// Creation order respects foreign keys.
pub const TABLES: &[&Table] = &[&COLLEGES, &COURSES, &COMPANIES, &STUDENTS, &TEMPLATES];

pub fn table(name: &str) -> Option<&'static Table> {
    TABLES.iter().copied().find(|t| t.name == name)
}
