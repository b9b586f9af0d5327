// ============================
// gymdesk-backend/src/storage/flat_file.rs
// ============================
//! Flat-file store for development and tests.
//!
//! Users live in `users.json`; the audit log is the append-only JSON-lines
//! file `audit.log`. The store keeps no gym domain tables, so dashboard
//! counts are always zero.
use std::{
    fs,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{
    fs as tokio_fs,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    sync::Mutex,
};

use super::Storage;
use crate::error::AppError;
use crate::models::{AuditEntry, AuditRecord, DashboardStats, NewAuditEntry, NewUser, User};

const USERS_FILE: &str = "users.json";
const AUDIT_FILE: &str = "audit.log";

/// Flat-file implementation of the Storage trait
#[derive(Clone, Debug)]
pub struct FlatFileStorage {
    root: PathBuf,
    /// Serializes writers within this process
    write_lock: Arc<Mutex<()>>,
    /// Id of the newest audit entry; `None` until the log has been scanned
    last_audit_id: Arc<Mutex<Option<i64>>>,
}

fn unavailable(err: io::Error) -> AppError {
    AppError::Connection(format!("flat-file store unavailable: {err}"))
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
            last_audit_id: Arc::new(Mutex::new(None)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn users_path(&self) -> PathBuf {
        self.root.join(USERS_FILE)
    }

    fn audit_path(&self) -> PathBuf {
        self.root.join(AUDIT_FILE)
    }

    async fn load_users(&self) -> Result<Vec<User>, AppError> {
        match tokio_fs::read_to_string(self.users_path()).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(unavailable(e)),
        }
    }

    /// Replace `users.json` via a temp file so readers never see a partial write
    async fn save_users(&self, users: &[User]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(users)?;
        let tmp = self.root.join(format!("{USERS_FILE}.tmp"));
        tokio_fs::write(&tmp, json).await.map_err(unavailable)?;
        tokio_fs::rename(&tmp, self.users_path())
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    /// Audit entries in file order. Lines that do not parse, such as one
    /// torn by a crash mid-append, are skipped.
    async fn load_audit(&self) -> Result<Vec<AuditEntry>, AppError> {
        let content = match tokio_fs::read_to_string(self.audit_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unavailable(e)),
        };

        let entries = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(line = index + 1, error = %e, "skipping unreadable audit log line");
                    None
                },
            })
            .collect();
        Ok(entries)
    }
}

/// Whether the last byte of `file` is something other than a newline
async fn ends_mid_line(file: &mut tokio_fs::File) -> io::Result<bool> {
    if file.metadata().await?.len() == 0 {
        return Ok(false);
    }
    file.seek(io::SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        tokio_fs::create_dir_all(&self.root)
            .await
            .map_err(unavailable)?;

        if !tokio_fs::try_exists(self.users_path()).await.map_err(unavailable)? {
            self.save_users(&[]).await?;
        }

        tokio_fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.audit_path())
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, AppError> {
        Ok(self.load_users().await?.len() as u64)
    }

    async fn insert_user(&self, new_user: &NewUser) -> Result<User, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.load_users().await?;

        if users.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::DuplicateUser(new_user.username.clone()));
        }

        let user = User {
            id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            display_name: new_user.display_name.clone(),
            email: new_user.email.clone(),
            active: true,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        self.save_users(&users).await?;

        Ok(user)
    }

    async fn find_active_user(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .load_users()
            .await?
            .into_iter()
            .find(|u| u.active && u.username == username))
    }

    /// Append a JSON line to `audit.log`.
    ///
    /// The log is scanned once for the newest id; later appends number from
    /// memory. A torn last line is terminated before the new entry is written.
    async fn append_audit(&self, new_entry: &NewAuditEntry) -> Result<AuditEntry, AppError> {
        let mut last_id = self.last_audit_id.lock().await;

        let users = self.load_users().await?;
        if !users.iter().any(|u| u.id == new_entry.user_id) {
            return Err(AppError::AuditWrite(format!(
                "unknown acting user {}",
                new_entry.user_id
            )));
        }

        let previous = match last_id.take() {
            Some(id) => id,
            None => self.load_audit().await?.iter().map(|e| e.id).max().unwrap_or(0),
        };

        let entry = AuditEntry {
            id: previous + 1,
            user_id: new_entry.user_id,
            action: new_entry.action.clone(),
            affected_table: new_entry.affected_table.clone(),
            record_id: new_entry.record_id,
            detail: new_entry.detail.clone(),
            created_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut file = tokio_fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.audit_path())
            .await
            .map_err(unavailable)?;

        if ends_mid_line(&mut file).await.map_err(unavailable)? {
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes()).await.map_err(unavailable)?;
        file.flush().await.map_err(unavailable)?;

        *last_id = Some(entry.id);
        Ok(entry)
    }

    async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditRecord>, AppError> {
        let users = self.load_users().await?;
        let entries = self.load_audit().await?;

        let records = entries
            .into_iter()
            .rev()
            .take(limit)
            .map(|entry| {
                let username = users
                    .iter()
                    .find(|u| u.id == entry.user_id)
                    .map_or_else(|| format!("#{}", entry.user_id), |u| u.username.clone());
                AuditRecord { entry, username }
            })
            .collect();

        Ok(records)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        Ok(DashboardStats::default())
    }
}
