//! The reserved-file side channel to the authentication collaborator.
//!
//! Writing to `/create-user.txt` or `/create-group.txt` is how this crate's
//! vfs-as-API surface triggers account provisioning. Rather than looping
//! back over its own HTTP listener, the post-write side effect goes
//! through [`SignupSink`], a trait the default implementation satisfies
//! with a real HTTP call and tests satisfy with [`NoopSignupSink`].

use async_trait::async_trait;
use tracing::warn;

use crate::service::Filesystem;
use crate::{Error, Result};

pub const CREATE_USER_PATH: &str = "/create-user.txt";
pub const CREATE_GROUP_PATH: &str = "/create-group.txt";

/// Which reserved file a write landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedFile {
    CreateUser,
    CreateGroup,
}

impl ReservedFile {
    pub fn classify(path: &str) -> Option<Self> {
        match path {
            CREATE_USER_PATH => Some(ReservedFile::CreateUser),
            CREATE_GROUP_PATH => Some(ReservedFile::CreateGroup),
            _ => None,
        }
    }
}

/// Notifies the authentication collaborator of a signup or group
/// association request parsed from a reserved file.
#[async_trait]
pub trait SignupSink: Send + Sync {
    async fn create_user(&self, uid: u32, password: &str) -> Result<()>;
    async fn associate_group(&self, uid: u32, gid: u32) -> Result<()>;
}

/// Posts to the authentication collaborator's signup endpoints.
pub struct HttpSignupSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSignupSink {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[async_trait]
impl SignupSink for HttpSignupSink {
    async fn create_user(&self, uid: u32, password: &str) -> Result<()> {
        let url = format!("{}/signup", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "uid": uid, "password": password }))
            .send()
            .await
            .map_err(|e| Error::mismatch(format!("signup request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(Error::mismatch(format!("signup rejected: {}", resp.status())));
        }
        Ok(())
    }

    async fn associate_group(&self, uid: u32, gid: u32) -> Result<()> {
        let url = format!("{}/groups", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "uid": uid, "gid": gid }))
            .send()
            .await
            .map_err(|e| Error::mismatch(format!("group association request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(Error::mismatch(format!("group association rejected: {}", resp.status())));
        }
        Ok(())
    }
}

/// Records nothing and always succeeds. Used by tests that exercise
/// `write_stream`/`write` without a running authentication collaborator.
#[derive(Default)]
pub struct NoopSignupSink;

#[async_trait]
impl SignupSink for NoopSignupSink {
    async fn create_user(&self, _uid: u32, _password: &str) -> Result<()> {
        Ok(())
    }

    async fn associate_group(&self, _uid: u32, _gid: u32) -> Result<()> {
        Ok(())
    }
}

impl Filesystem {
    pub(crate) async fn run_signup_side_effect(&self, reserved: ReservedFile, contents: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(contents);
        let mut fields = text.split_whitespace();
        let Some(uid_field) = fields.next() else {
            return self.report_signup_failure(reserved, "missing uid").await;
        };
        let Some(second_field) = fields.next() else {
            return self.report_signup_failure(reserved, "missing second field").await;
        };
        let Ok(uid) = uid_field.parse::<u32>() else {
            return self.report_signup_failure(reserved, "uid is not a number").await;
        };

        let result = match reserved {
            ReservedFile::CreateUser => self.signup.create_user(uid, second_field).await,
            ReservedFile::CreateGroup => match second_field.parse::<u32>() {
                Ok(gid) => self.signup.associate_group(uid, gid).await,
                Err(_) => return self.report_signup_failure(reserved, "gid is not a number").await,
            },
        };

        match result {
            Ok(()) => self.report_signup_success(reserved).await,
            Err(e) => {
                warn!(error = %e, "signup side channel rejected by authentication collaborator");
                self.report_signup_failure(reserved, &e.to_string()).await
            }
        }
    }

    async fn report_signup_success(&self, reserved: ReservedFile) -> Result<()> {
        self.backing.overwrite(reserved_path(reserved), b"ok").await
    }

    async fn report_signup_failure(&self, reserved: ReservedFile, reason: &str) -> Result<()> {
        self.backing.overwrite(reserved_path(reserved), format!("error: {reason}").as_bytes()).await
    }
}

fn reserved_path(reserved: ReservedFile) -> &'static str {
    match reserved {
        ReservedFile::CreateUser => CREATE_USER_PATH,
        ReservedFile::CreateGroup => CREATE_GROUP_PATH,
    }
}
