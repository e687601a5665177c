//! In-memory sessions of signed-in users.
//!
//! A session is created by a successful login and addressed by an opaque
//! UUID v4 token. The map is shared by every worker of the server behind an
//! `Arc<RwLock>`: extractors take read locks, login and logout take the
//! write lock.
//!
//! Sessions expire a fixed time after login. Expired entries are dropped
//! when they are looked up and whenever a new session is created.

use common::model::session::Role;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    /// Set for student sessions only.
    pub student_id: Option<i64>,
}

impl Session {
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            student_id: None,
        }
    }

    pub fn student(student_id: i64) -> Self {
        Self {
            role: Role::Student,
            student_id: Some(student_id),
        }
    }
}

struct Entry {
    session: Session,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Registers `session` and returns its token.
    pub async fn create(&self, session: Session) -> String {
        let token = Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            token.clone(),
            Entry {
                session,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.session.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        self.remove(token).await;
        None
    }

    /// Drops the session; returns whether it existed.
    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Drops every session of `student_id`; returns how many there were.
    pub async fn remove_student(&self, student_id: i64) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.session.student_id != Some(student_id));
        before - sessions.len()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
