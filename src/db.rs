use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::records::CarReport;

const SECTION_TABLES: [&str; 7] = [
    "section_a",
    "section_b1",
    "section_b2",
    "section_c",
    "section_d",
    "section_e1",
    "section_e2",
];

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let conn = Connection::open(path).with_context(|| format!("opening {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS car_reports (
            document_id    TEXT PRIMARY KEY,
            car_id         TEXT NOT NULL,
            reporter       TEXT,
            location       TEXT,
            total_cost     REAL NOT NULL DEFAULT 0,
            extracted_json TEXT NOT NULL,
            processed_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_reports_car ON car_reports(car_id);

        CREATE TABLE IF NOT EXISTS section_a (
            id          INTEGER PRIMARY KEY,
            document_id TEXT NOT NULL,
            car_no      TEXT,
            issue_date  TEXT,
            reporter    TEXT,
            department  TEXT,
            client      TEXT,
            location    TEXT,
            well_no     TEXT,
            project     TEXT
        );

        CREATE TABLE IF NOT EXISTS section_b1 (
            id          INTEGER PRIMARY KEY,
            document_id TEXT NOT NULL,
            car_no      TEXT NOT NULL,
            seq         INTEGER NOT NULL,
            date        TEXT,
            time        TEXT,
            details     TEXT
        );

        CREATE TABLE IF NOT EXISTS section_b2 (
            id          INTEGER PRIMARY KEY,
            document_id TEXT NOT NULL,
            car_no      TEXT NOT NULL,
            seq         INTEGER NOT NULL,
            breakdown   TEXT,
            cost_myr    TEXT
        );

        CREATE TABLE IF NOT EXISTS section_c (
            id                     INTEGER PRIMARY KEY,
            document_id            TEXT NOT NULL,
            car_no                 TEXT NOT NULL,
            seq                    INTEGER NOT NULL,
            causal_factor          TEXT,
            why                    TEXT,
            answer                 TEXT,
            clause_mapped          TEXT,
            cosine_similarity_pct  REAL,
            euclidean_distance_pct REAL
        );
        CREATE INDEX IF NOT EXISTS idx_c_clause ON section_c(clause_mapped);

        CREATE TABLE IF NOT EXISTS section_d (
            id                  INTEGER PRIMARY KEY,
            document_id         TEXT NOT NULL,
            car_no              TEXT NOT NULL,
            seq                 INTEGER NOT NULL,
            correction_taken    TEXT,
            responsible_party   TEXT,
            implementation_date TEXT,
            clause_code         TEXT
        );

        CREATE TABLE IF NOT EXISTS section_e1 (
            id                  INTEGER PRIMARY KEY,
            document_id         TEXT NOT NULL,
            car_no              TEXT NOT NULL,
            seq                 INTEGER NOT NULL,
            corrective_action   TEXT,
            responsible_party   TEXT,
            implementation_date TEXT
        );

        CREATE TABLE IF NOT EXISTS section_e2 (
            id          INTEGER PRIMARY KEY,
            document_id TEXT NOT NULL,
            car_no      TEXT NOT NULL,
            seq         INTEGER NOT NULL,
            accepted    TEXT,
            rejected    TEXT
        );
        ",
    )?;
    for table in SECTION_TABLES {
        conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_doc ON {table}(document_id);"
        ))?;
    }
    Ok(())
}

/// Replace everything stored for `report.document_id` in one transaction.
pub fn save_report(conn: &Connection, report: &CarReport) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let doc = report.document_id.as_str();
    let car_no = report.car_no();
    {
        tx.execute("DELETE FROM car_reports WHERE document_id = ?1", [doc])?;
        for table in SECTION_TABLES {
            tx.execute(&format!("DELETE FROM {table} WHERE document_id = ?1"), [doc])?;
        }

        let summary = report.summary();
        let json = serde_json::to_string(report)?;
        tx.execute(
            "INSERT INTO car_reports
             (document_id, car_id, reporter, location, total_cost, extracted_json, processed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                doc,
                car_no,
                summary.reporter,
                summary.location,
                summary.total_cost,
                json,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        let mut a_stmt = tx.prepare(
            "INSERT INTO section_a
             (document_id, car_no, issue_date, reporter, department, client, location, well_no, project)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for a in &report.section_a {
            a_stmt.execute(rusqlite::params![
                doc, a.car_no, a.issue_date, a.reporter, a.department, a.client, a.location,
                a.well_no, a.project,
            ])?;
        }

        let mut b1_stmt = tx.prepare(
            "INSERT INTO section_b1 (document_id, car_no, seq, date, time, details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for r in &report.section_b1 {
            b1_stmt.execute(rusqlite::params![doc, r.car_no, r.seq, r.date, r.time, r.details])?;
        }

        let mut b2_stmt = tx.prepare(
            "INSERT INTO section_b2 (document_id, car_no, seq, breakdown, cost_myr)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for r in &report.section_b2 {
            b2_stmt.execute(rusqlite::params![doc, r.car_no, r.seq, r.breakdown, r.cost_myr])?;
        }

        let mut c_stmt = tx.prepare(
            "INSERT INTO section_c
             (document_id, car_no, seq, causal_factor, why, answer,
              clause_mapped, cosine_similarity_pct, euclidean_distance_pct)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for r in &report.section_c {
            c_stmt.execute(rusqlite::params![
                doc, r.car_no, r.seq, r.causal_factor, r.why, r.answer, r.clause_mapped,
                r.cosine_similarity_pct, r.euclidean_distance_pct,
            ])?;
        }

        let mut d_stmt = tx.prepare(
            "INSERT INTO section_d
             (document_id, car_no, seq, correction_taken, responsible_party, implementation_date, clause_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for r in &report.section_d {
            d_stmt.execute(rusqlite::params![
                doc, r.car_no, r.seq, r.correction_taken, r.responsible_party,
                r.implementation_date, r.clause_code,
            ])?;
        }

        let mut e1_stmt = tx.prepare(
            "INSERT INTO section_e1
             (document_id, car_no, seq, corrective_action, responsible_party, implementation_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for r in &report.section_e1 {
            e1_stmt.execute(rusqlite::params![
                doc, r.car_no, r.seq, r.corrective_action, r.responsible_party, r.implementation_date,
            ])?;
        }

        let mut e2_stmt = tx.prepare(
            "INSERT INTO section_e2 (document_id, car_no, seq, accepted, rejected)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for r in &report.section_e2 {
            e2_stmt.execute(rusqlite::params![doc, r.car_no, r.seq, r.accepted, r.rejected])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Stored report for `document_id`, as saved.
pub fn fetch_report(conn: &Connection, document_id: &str) -> Result<Option<CarReport>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT extracted_json FROM car_reports WHERE document_id = ?1",
            [document_id],
            |r| r.get(0),
        )
        .optional()?;
    json.map(|j| serde_json::from_str(&j).context("decoding stored report"))
        .transpose()
}

pub struct Stats {
    pub reports: usize,
    pub total_cost: f64,
    pub sections: Vec<(&'static str, usize)>,
    pub clauses: Vec<(String, usize)>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let reports: usize = conn.query_row("SELECT COUNT(*) FROM car_reports", [], |r| r.get(0))?;
    let total_cost: f64 = conn.query_row(
        "SELECT COALESCE(SUM(total_cost), 0) FROM car_reports",
        [],
        |r| r.get(0),
    )?;
    let mut sections = Vec::with_capacity(SECTION_TABLES.len());
    for table in SECTION_TABLES {
        let n: usize =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        sections.push((table, n));
    }
    let mut stmt = conn.prepare(
        "SELECT clause_mapped, COUNT(*) AS n FROM section_c
         WHERE clause_mapped IS NOT NULL
         GROUP BY clause_mapped ORDER BY n DESC, clause_mapped LIMIT 10",
    )?;
    let clauses = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<(String, usize)>, _>>()?;
    Ok(Stats {
        reports,
        total_cost,
        sections,
        clauses,
    })
}

// ── Tests ──
