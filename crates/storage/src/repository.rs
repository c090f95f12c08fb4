//! Repository Implementation

use crate::StorageError;
use alerting::{Alert, Severity};
use chrono::{DateTime, Duration, Utc};
use sensors::SensorReading;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// One recorded control action
#[derive(Debug, Clone)]
pub struct ControlActionRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub command_type: String,
    pub command: String,
    pub outcome: serde_json::Value,
}

/// Filters for the alert listing query
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub acknowledged: Option<bool>,
    pub limit: Option<i64>,
}

/// Row counts reported by the health endpoint
#[derive(Debug, Clone, Copy)]
pub struct StorageCounts {
    pub readings: i64,
    pub alerts: i64,
    pub unacknowledged_alerts: i64,
    pub control_actions: i64,
}

/// Repository over a SQLite connection pool
///
/// All tables are created on connect. Timestamps are stored as RFC 3339
/// text so rows stay readable with the sqlite CLI.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open (creating if needed) the database at the given path
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init_schema().await?;
        info!(database_url, "Storage initialized");
        Ok(repo)
    }

    /// Open an in-memory database, used by tests and demo mode
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // A second connection would see a different empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init_schema().await?;
        Ok(repo)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sensor_readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                tds REAL NOT NULL,
                ph REAL NOT NULL,
                orp REAL NOT NULL,
                turbidity REAL NOT NULL,
                temperature REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_readings_timestamp ON sensor_readings(timestamp)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                alert_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                message TEXT NOT NULL,
                acknowledged INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS control_actions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                command_type TEXT NOT NULL,
                command TEXT NOT NULL,
                outcome TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analysis_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                report TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist one sensor reading
    pub async fn insert_reading(&self, reading: &SensorReading) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO sensor_readings (timestamp, tds, ph, orp, turbidity, temperature)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reading.timestamp.to_rfc3339())
        .bind(reading.tds)
        .bind(reading.ph)
        .bind(reading.orp)
        .bind(reading.turbidity)
        .bind(reading.temperature)
        .execute(&self.pool)
        .await?;

        debug!(id = result.last_insert_rowid(), "Reading persisted");
        Ok(result.last_insert_rowid())
    }

    /// Readings from the last `hours` hours, oldest first
    pub async fn recent_readings(&self, hours: u32) -> Result<Vec<SensorReading>, StorageError> {
        let cutoff = (Utc::now() - Duration::hours(i64::from(hours))).to_rfc3339();
        let rows = sqlx::query(
            r#"
            SELECT timestamp, tds, ph, orp, turbidity, temperature
            FROM sensor_readings
            WHERE timestamp >= ?
            ORDER BY timestamp ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| reading_from_row(&row)).collect()
    }

    /// The most recent reading, if any
    pub async fn latest_reading(&self) -> Result<Option<SensorReading>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT timestamp, tds, ph, orp, turbidity, temperature
            FROM sensor_readings
            ORDER BY timestamp DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| reading_from_row(&r)).transpose()
    }

    /// Persist an alert
    pub async fn insert_alert(&self, alert: &Alert) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO alerts (id, timestamp, alert_type, severity, message, acknowledged)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(alert.id.to_string())
        .bind(alert.timestamp.to_rfc3339())
        .bind(&alert.alert_type)
        .bind(alert.severity.as_str())
        .bind(&alert.message)
        .bind(alert.acknowledged)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List alerts, newest first, with optional filters
    pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StorageError> {
        let limit = filter.limit.unwrap_or(50).clamp(1, 500);
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, alert_type, severity, message, acknowledged
            FROM alerts
            WHERE (? IS NULL OR severity = ?)
              AND (? IS NULL OR acknowledged = ?)
            ORDER BY timestamp DESC
            LIMIT ?
            "#,
        )
        .bind(filter.severity.map(|s| s.as_str()))
        .bind(filter.severity.map(|s| s.as_str()))
        .bind(filter.acknowledged)
        .bind(filter.acknowledged)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| alert_from_row(&row)).collect()
    }

    /// Mark an alert acknowledged. Returns false when the ID is unknown.
    pub async fn acknowledge_alert(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE alerts SET acknowledged = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record an executed control action with its serialized outcome
    pub async fn record_control_action(
        &self,
        command_type: &str,
        command: &str,
        outcome: &serde_json::Value,
    ) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO control_actions (timestamp, command_type, command, outcome)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(command_type)
        .bind(command)
        .bind(serde_json::to_string(outcome)?)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Control actions, newest first
    pub async fn recent_control_actions(
        &self,
        limit: i64,
    ) -> Result<Vec<ControlActionRecord>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, command_type, command, outcome
            FROM control_actions
            ORDER BY timestamp DESC
            LIMIT ?
            "#,
        )
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ControlActionRecord {
                    id: row.try_get("id")?,
                    timestamp: timestamp_from_row(&row)?,
                    command_type: row.try_get("command_type")?,
                    command: row.try_get("command")?,
                    outcome: serde_json::from_str(row.try_get::<String, _>("outcome")?.as_str())?,
                })
            })
            .collect()
    }

    /// Store one analysis snapshot as JSON
    pub async fn insert_analysis(&self, report: &serde_json::Value) -> Result<i64, StorageError> {
        let result = sqlx::query("INSERT INTO analysis_records (timestamp, report) VALUES (?, ?)")
            .bind(Utc::now().to_rfc3339())
            .bind(serde_json::to_string(report)?)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// The most recent analysis snapshot, if any
    pub async fn latest_analysis(&self) -> Result<Option<serde_json::Value>, StorageError> {
        let row = sqlx::query("SELECT report FROM analysis_records ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| {
            let report: String = r.try_get("report")?;
            Ok(serde_json::from_str(&report)?)
        })
        .transpose()
    }

    /// Row counts for health reporting
    pub async fn counts(&self) -> Result<StorageCounts, StorageError> {
        let readings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sensor_readings")
            .fetch_one(&self.pool)
            .await?;
        let alerts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts")
            .fetch_one(&self.pool)
            .await?;
        let unacknowledged_alerts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE acknowledged = 0")
                .fetch_one(&self.pool)
                .await?;
        let control_actions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM control_actions")
            .fetch_one(&self.pool)
            .await?;

        Ok(StorageCounts {
            readings,
            alerts,
            unacknowledged_alerts,
            control_actions,
        })
    }
}

fn timestamp_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<DateTime<Utc>, StorageError> {
    let raw: String = row.try_get("timestamp")?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp {raw}: {e}")))
}

fn reading_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<SensorReading, StorageError> {
    Ok(SensorReading {
        timestamp: timestamp_from_row(row)?,
        tds: row.try_get("tds")?,
        ph: row.try_get("ph")?,
        orp: row.try_get("orp")?,
        turbidity: row.try_get("turbidity")?,
        temperature: row.try_get("temperature")?,
    })
}

fn alert_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Alert, StorageError> {
    let id_raw: String = row.try_get("id")?;
    let severity_raw: String = row.try_get("severity")?;
    Ok(Alert {
        id: Uuid::parse_str(&id_raw)
            .map_err(|e| StorageError::Corrupt(format!("bad alert id {id_raw}: {e}")))?,
        timestamp: timestamp_from_row(row)?,
        alert_type: row.try_get("alert_type")?,
        severity: severity_raw
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("bad severity: {e}")))?,
        message: row.try_get("message")?,
        acknowledged: row.try_get("acknowledged")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(tds: f64, ph: f64) -> SensorReading {
        SensorReading::now(tds, ph, 450.0, 0.3, 22.0)
    }

    #[tokio::test]
    async fn test_insert_and_fetch_readings() {
        let repo = Repository::in_memory().await.unwrap();

        repo.insert_reading(&reading(250.0, 7.2)).await.unwrap();
        repo.insert_reading(&reading(260.0, 7.3)).await.unwrap();

        let readings = repo.recent_readings(1).await.unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings[0].timestamp <= readings[1].timestamp);

        let latest = repo.latest_reading().await.unwrap().unwrap();
        assert_eq!(latest.tds, 260.0);
    }

    #[tokio::test]
    async fn test_window_excludes_old_readings() {
        let repo = Repository::in_memory().await.unwrap();

        let mut old = reading(250.0, 7.2);
        old.timestamp = Utc::now() - Duration::hours(30);
        repo.insert_reading(&old).await.unwrap();
        repo.insert_reading(&reading(300.0, 7.0)).await.unwrap();

        let last_day = repo.recent_readings(24).await.unwrap();
        assert_eq!(last_day.len(), 1);
        assert_eq!(last_day[0].tds, 300.0);

        let full_week = repo.recent_readings(168).await.unwrap();
        assert_eq!(full_week.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_database() {
        let repo = Repository::in_memory().await.unwrap();
        assert!(repo.latest_reading().await.unwrap().is_none());
        assert!(repo.recent_readings(24).await.unwrap().is_empty());
        assert_eq!(repo.counts().await.unwrap().readings, 0);
    }

    #[tokio::test]
    async fn test_alert_roundtrip_and_ack() {
        let repo = Repository::in_memory().await.unwrap();

        let alert = Alert::new("sensor_warning_ph", Severity::Medium, "pH too low");
        repo.insert_alert(&alert).await.unwrap();

        let listed = repo.list_alerts(&AlertFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, alert.id);
        assert_eq!(listed[0].severity, Severity::Medium);
        assert!(!listed[0].acknowledged);

        assert!(repo.acknowledge_alert(alert.id).await.unwrap());
        assert!(!repo.acknowledge_alert(Uuid::new_v4()).await.unwrap());

        let unack = repo
            .list_alerts(&AlertFilter {
                acknowledged: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(unack.is_empty());
    }

    #[tokio::test]
    async fn test_alert_severity_filter() {
        let repo = Repository::in_memory().await.unwrap();

        repo.insert_alert(&Alert::new("a", Severity::Low, "low"))
            .await
            .unwrap();
        repo.insert_alert(&Alert::new("b", Severity::Critical, "critical"))
            .await
            .unwrap();

        let critical = repo
            .list_alerts(&AlertFilter {
                severity: Some(Severity::Critical),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].alert_type, "b");
    }

    #[tokio::test]
    async fn test_control_actions_and_analysis() {
        let repo = Repository::in_memory().await.unwrap();

        let outcome = serde_json::json!({"valve_state": "open"});
        repo.record_control_action("valve", "0", &outcome)
            .await
            .unwrap();

        let actions = repo.recent_control_actions(10).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].command_type, "valve");
        assert_eq!(actions[0].outcome, outcome);

        assert!(repo.latest_analysis().await.unwrap().is_none());
        let report = serde_json::json!({"overall_status": "good"});
        repo.insert_analysis(&report).await.unwrap();
        assert_eq!(repo.latest_analysis().await.unwrap().unwrap(), report);

        let counts = repo.counts().await.unwrap();
        assert_eq!(counts.control_actions, 1);
    }
}
