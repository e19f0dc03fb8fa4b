/// RSVP board
///
/// The collaborator-facing surface. Each `on_*` operation runs against the
/// shared services and then signals redisplay; renderers subscribe to the
/// signal and call `view()` to recompute what they show.
use crate::{
    auth::Session,
    avatar::{upload, AvatarCategory, AvatarPreview, AvatarResolver, AvatarStage, ResolvedAvatar},
    context::AppContext,
    error::{RsvpError, RsvpResult},
    rsvp::{RosterCounts, RosterMember, RsvpRecord, RsvpStatus, TimeRemaining},
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};

/// Why dependent views need recomputing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redisplay {
    Login,
    Logout,
    StatusChanged,
    AdminReset,
    AvatarChanged(AvatarCategory),
    AvatarFallback(AvatarCategory),
    /// Periodic timer refresh
    Tick,
    /// A sweep evicted these identities
    TimersExpired(Vec<String>),
}

/// The logged-in participant's own RSVP card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnRsvp {
    pub status: RsvpStatus,
    pub message: String,
    pub time_remaining: TimeRemaining,
    pub timer_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub member: RosterMember,
    pub status_label: String,
    pub timer: String,
    pub avatar: ResolvedAvatar,
}

/// Everything a renderer needs for one redisplay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub session: Option<Session>,
    pub own: Option<OwnRsvp>,
    pub roster: Vec<MemberView>,
    /// Admins only
    pub counts: Option<RosterCounts>,
    /// Upload panel, only for sessions allowed to upload
    pub preview: Option<AvatarPreview>,
}

impl BoardView {
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }
}

pub struct RsvpBoard {
    ctx: Arc<AppContext>,
    session: RwLock<Option<Session>>,
    /// Stage each category fell back to after a load failure
    fallbacks: RwLock<HashMap<AvatarCategory, AvatarStage>>,
}

impl RsvpBoard {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            session: RwLock::new(None),
            fallbacks: RwLock::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Redisplay> {
        self.ctx.redisplay.subscribe()
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn require_session(&self) -> RsvpResult<Session> {
        self.session().await.ok_or(RsvpError::NotLoggedIn)
    }

    /// Pick up a login persisted by an earlier run
    pub async fn restore_session(&self) -> Option<Session> {
        let restored = self.ctx.sessions.restore().await;
        if let Some(session) = &restored {
            *self.session.write().await = Some(session.clone());
            self.ctx.notify(Redisplay::Login);
        }
        restored
    }

    pub async fn on_login_submit(&self, identity: &str, credential: &str) -> RsvpResult<Session> {
        let session = self
            .ctx
            .sessions
            .authenticate(identity, credential)
            .await
            .map_err(|e| report("Login", e))?;

        *self.session.write().await = Some(session.clone());
        self.ctx.notify(Redisplay::Login);

        Ok(session)
    }

    pub async fn on_logout(&self) {
        let previous = self.session.write().await.take();

        if let Some(session) = previous {
            self.ctx.sessions.logout(&session).await;
            self.ctx.notify(Redisplay::Logout);
        }
    }

    /// Record the logged-in participant's response and restart their timer
    pub async fn on_set_status(&self, status: RsvpStatus) -> RsvpResult<Option<RsvpRecord>> {
        let session = self.require_session().await?;

        let record = self.ctx.records.set_status(&session.identity, status).await;
        info!("{} is now {}", session.identity, status.label());
        self.ctx.notify(Redisplay::StatusChanged);

        Ok(record)
    }

    /// Clear every response; admins only
    pub async fn on_admin_reset(&self) -> RsvpResult<usize> {
        let session = self.require_session().await?;

        let cleared = self
            .ctx
            .admin
            .reset_all(&session)
            .await
            .map_err(|e| report("Admin reset", e))?;
        self.ctx.notify(Redisplay::AdminReset);

        Ok(cleared)
    }

    /// Store an uploaded file as the custom image for the session's category
    pub async fn on_image_file(&self, data: Vec<u8>) -> RsvpResult<AvatarPreview> {
        let session = self.require_upload_session().await?;
        let category = session.category;

        let accepted = upload::accept_image(data, self.ctx.config.upload.max_image_bytes)
            .await
            .map_err(|e| report("Image upload", e))?;

        info!(
            "{} uploaded a {}x{} {} ({} bytes) for {}",
            session.identity,
            accepted.width,
            accepted.height,
            accepted.mime_type,
            accepted.size,
            category
        );

        self.avatars().overrides().save(category, accepted.data_url).await;
        self.fallbacks.write().await.remove(&category);
        self.ctx.notify(Redisplay::AvatarChanged(category));

        Ok(self.avatars().preview(category).await)
    }

    /// Revert the session's category to its default images
    pub async fn on_remove_custom_image(&self) -> RsvpResult<AvatarPreview> {
        let session = self.require_upload_session().await?;
        let category = session.category;

        self.avatars().overrides().clear(category).await;
        self.fallbacks.write().await.remove(&category);
        self.ctx.notify(Redisplay::AvatarChanged(category));

        Ok(self.avatars().preview(category).await)
    }

    /// Advance a category's avatar after the renderer failed to load `failed_reference`
    pub async fn on_image_load_failure(
        &self,
        category_key: &str,
        failed_reference: &str,
    ) -> ResolvedAvatar {
        let category = AvatarCategory::from_key_or_default(category_key);
        let resolved = self
            .avatars()
            .on_load_failure(category, failed_reference)
            .await;

        self.fallbacks
            .write()
            .await
            .insert(category, resolved.stage);
        self.ctx.notify(Redisplay::AvatarFallback(category));

        resolved
    }

    /// Recompute everything the renderer shows
    pub async fn view(&self) -> BoardView {
        let session = match self.session().await {
            Some(session) => session,
            None => return BoardView::default(),
        };

        let members = self.ctx.aggregator.roster().await;

        let own = members
            .iter()
            .find(|m| m.identity == session.identity)
            .map(|m| OwnRsvp {
                status: m.status,
                message: m.status.own_message().to_string(),
                time_remaining: m.time_remaining,
                timer_text: m.time_remaining.own_timer_text(),
            });

        let mut avatars: HashMap<AvatarCategory, ResolvedAvatar> = HashMap::new();
        let mut roster = Vec::with_capacity(members.len());
        for member in members {
            let avatar = match avatars.get(&member.category) {
                Some(avatar) => avatar.clone(),
                None => {
                    let avatar = self.current_avatar(member.category).await;
                    avatars.insert(member.category, avatar.clone());
                    avatar
                }
            };

            roster.push(MemberView {
                status_label: member.status.label().to_string(),
                timer: member.time_remaining.to_string(),
                member,
                avatar,
            });
        }

        let counts = if session.is_admin() {
            self.ctx.admin.stats(&session).await.ok()
        } else {
            None
        };

        let preview = if session.can_upload_image {
            Some(self.avatars().preview(session.category).await)
        } else {
            None
        };

        BoardView {
            session: Some(session),
            own,
            roster,
            counts,
            preview,
        }
    }

    fn avatars(&self) -> &AvatarResolver {
        &self.ctx.avatars
    }

    async fn require_upload_session(&self) -> RsvpResult<Session> {
        let session = self.require_session().await?;
        if !session.can_upload_image {
            warn!("{} tried to change a custom image without permission", session.identity);
            return Err(RsvpError::UploadNotPermitted(session.identity));
        }
        Ok(session)
    }

    /// Avatar for a category, honouring any fallback already taken
    async fn current_avatar(&self, category: AvatarCategory) -> ResolvedAvatar {
        let fallback = self.fallbacks.read().await.get(&category).copied();
        let override_data = self.avatars().overrides().get(category).await;
        let stage = fallback
            .unwrap_or_else(|| AvatarResolver::initial_stage(override_data.as_deref()));

        self.avatars()
            .render(category, stage, override_data.as_deref())
    }
}

/// Log a failed action at the level its error deserves
///
/// Participant mistakes are shown to them and only warrant a warning; anything
/// else is an operational fault.
fn report(action: &str, e: RsvpError) -> RsvpError {
    if e.is_user_facing() {
        warn!("{} rejected: {}", action, e);
    } else {
        error!("{} failed: {}", action, e);
    }
    e
}
