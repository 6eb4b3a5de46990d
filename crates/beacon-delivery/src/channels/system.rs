//! Second-ranked channel: the operating system notifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::channel::ChannelProvider;
use beacon_core::traits::os_notify::{OsNotifier, Permission};

/// Cached outcome of the permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermissionState {
    NotRequested,
    Granted,
    Denied,
}

/// Delivers through the OS notification surface.
///
/// Permission is requested at most once per session; a denial is cached
/// and the channel stays unavailable without prompting again.
pub struct SystemNotifyChannel {
    notifier: Arc<dyn OsNotifier>,
    permission: Mutex<PermissionState>,
}

impl SystemNotifyChannel {
    pub fn new(notifier: Arc<dyn OsNotifier>) -> Self {
        Self {
            notifier,
            permission: Mutex::new(PermissionState::NotRequested),
        }
    }

    /// Resolve the cached permission, prompting on first use.
    async fn ensure_permission(&self) -> AppResult<()> {
        let mut permission = self.permission.lock().await;
        match *permission {
            PermissionState::Granted => Ok(()),
            PermissionState::Denied => {
                Err(AppError::channel("OS notification permission denied"))
            }
            PermissionState::NotRequested => match self.notifier.request_permission().await? {
                Permission::Granted => {
                    info!("OS notification permission granted");
                    *permission = PermissionState::Granted;
                    Ok(())
                }
                Permission::Denied => {
                    info!("OS notification permission denied");
                    *permission = PermissionState::Denied;
                    Err(AppError::channel("OS notification permission denied"))
                }
            },
        }
    }
}

#[async_trait]
impl ChannelProvider for SystemNotifyChannel {
    fn name(&self) -> &'static str {
        "os_notify"
    }

    async fn is_available(&self) -> bool {
        *self.permission.lock().await != PermissionState::Denied
    }

    async fn deliver(&self, title: &str, body: &str, dismiss_after: Duration) -> AppResult<()> {
        self.ensure_permission().await?;
        self.notifier.show(title, body, dismiss_after).await?;
        debug!(title, "Delivered via OS notifier");
        Ok(())
    }
}

impl std::fmt::Debug for SystemNotifyChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemNotifyChannel").finish()
    }
}
