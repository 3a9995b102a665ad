use crate::error::ApiError;
use crate::guard::{AccessGuard, Navigation, Route};
use crate::records::{Confirm, DeleteOutcome, RecordsManager, UserDraft};
use crate::types::{User, UserId};

pub const LOGOUT_PROMPT: &str = "Are you sure you want to log out?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    Loading,
    Ready,
    AddDialogOpen(UserDraft),
    EditDialogOpen { id: UserId, draft: UserDraft },
}

/// The protected user-management view.
///
/// The record list is never patched locally: every successful mutation is
/// followed by a full reload, and a failed reload leaves the list empty.
pub struct Dashboard {
    records: RecordsManager,
    user: User,
    state: DashboardState,
    users: Vec<User>,
    notice: Option<String>,
}

impl Dashboard {
    /// Run the access guard and, when it lets us through, load the list.
    pub async fn open(records: RecordsManager) -> Navigation<Dashboard> {
        let guarded = AccessGuard::new(records.session()).protect(|user| user);
        let user = match guarded {
            Navigation::Render(user) => user,
            Navigation::Redirect(route) => return Navigation::Redirect(route),
        };

        let mut dashboard = Dashboard {
            records,
            user,
            state: DashboardState::Loading,
            users: Vec::new(),
            notice: None,
        };
        dashboard.mount().await;
        Navigation::Render(dashboard)
    }

    /// Loading, first fetch, then Ready
    pub async fn mount(&mut self) {
        self.state = DashboardState::Loading;
        self.reload().await;
        self.state = DashboardState::Ready;
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Last error shown to the operator, if any
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn open_add(&mut self) -> bool {
        if self.state != DashboardState::Ready {
            return false;
        }
        self.state = DashboardState::AddDialogOpen(UserDraft::default());
        true
    }

    pub fn open_edit(&mut self, user: &User) -> bool {
        if self.state != DashboardState::Ready {
            return false;
        }
        self.state = DashboardState::EditDialogOpen {
            id: user.id,
            draft: UserDraft::from_user(user),
        };
        true
    }

    /// The open dialog's buffer
    pub fn draft_mut(&mut self) -> Option<&mut UserDraft> {
        match &mut self.state {
            DashboardState::AddDialogOpen(draft) => Some(draft),
            DashboardState::EditDialogOpen { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Close any dialog and drop its buffer
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            DashboardState::AddDialogOpen(_) | DashboardState::EditDialogOpen { .. }
        ) {
            self.state = DashboardState::Ready;
        }
    }

    /// Save the open dialog. On failure the dialog stays open with its draft.
    pub async fn submit(&mut self) -> Result<(), ApiError> {
        let result = match &self.state {
            DashboardState::AddDialogOpen(draft) => self.records.create(draft).await,
            DashboardState::EditDialogOpen { id, draft } => self.records.update(*id, draft).await,
            _ => return Ok(()),
        };

        match result {
            Ok(()) => {
                self.state = DashboardState::Ready;
                self.reload().await;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn delete(&mut self, id: UserId, confirm: &dyn Confirm) -> Result<DeleteOutcome, ApiError> {
        if self.state != DashboardState::Ready {
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.records.delete(id, confirm).await {
            Ok(DeleteOutcome::Deleted) => {
                self.reload().await;
                Ok(DeleteOutcome::Deleted)
            }
            Ok(DeleteOutcome::Cancelled) => Ok(DeleteOutcome::Cancelled),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Confirmed logout; returns whether the session was ended.
    pub fn logout(&mut self, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm(LOGOUT_PROMPT) {
            return false;
        }
        self.records.session().logout();
        self.records.navigator().redirect(Route::Login);
        true
    }

    async fn reload(&mut self) {
        match self.records.list().await {
            Ok(users) => {
                self.users = users;
                self.notice = None;
            }
            Err(err) => {
                self.users = Vec::new();
                self.notice = Some(err.to_string());
            }
        }
    }

    fn fail(&mut self, err: ApiError) -> ApiError {
        self.notice = Some(err.to_string());
        err
    }
}
