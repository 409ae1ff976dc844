//! Application operations behind the HTTP handlers.
//!
//! Handlers receive a verified [`Caller`] from the access guard and hand it
//! in explicitly; nothing here reads ambient request state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use revdesk_auth::identity::{
    validate_assignable_role, validate_email, validate_password, validate_username,
};
use revdesk_auth::{
    AccountStatus, AdminUpdate, Caller, Identity, IdentityView, NewIdentity, ProfileUpdate,
    RoleLevel, TokenService, hash_password, verify_password,
};
use revdesk_core::{DomainError, DomainResult, RecordId, UserId};
use revdesk_infra::{
    IdentityStore, InMemoryIdentityStore, InMemoryRevenueStore, RevenueStore, StoreError,
};
use revdesk_reporting::{
    ListParams, OwnerSummary, Page, RevenueDraft, RevenueRecord, RevenueView, paginate_records,
    summarize_by_owner,
};

use super::dto::{AdminCreateRequest, RegisterRequest, SignInRequest, SignInResponse, SignedInUser};

const BAD_CREDENTIALS: &str = "invalid username or password";

#[derive(Clone)]
pub struct AppServices {
    identities: Arc<dyn IdentityStore>,
    revenue: Arc<dyn RevenueStore>,
    tokens: Arc<TokenService>,
}

impl AppServices {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        revenue: Arc<dyn RevenueStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            identities,
            revenue,
            tokens,
        }
    }

    /// Services over fresh in-memory stores.
    pub fn in_memory(tokens: Arc<TokenService>) -> Self {
        Self::new(
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(InMemoryRevenueStore::new()),
            tokens,
        )
    }

    pub fn identities(&self) -> &Arc<dyn IdentityStore> {
        &self.identities
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    // -------------------------
    // Identities
    // -------------------------

    /// Self-service sign-up. The role is always `user`.
    pub fn register(&self, req: RegisterRequest, now: DateTime<Utc>) -> DomainResult<IdentityView> {
        validate_username(&req.username)?;
        validate_email(&req.email)?;
        validate_password(&req.password)?;

        let nickname = if req.nickname.is_empty() {
            req.username.clone()
        } else {
            req.nickname
        };

        let identity = self.identities.insert(
            NewIdentity {
                password_hash: hash_password(&req.password)?,
                username: req.username,
                nickname,
                email: req.email,
                role: RoleLevel::USER,
                avatar: String::new(),
                bio: String::new(),
                website: String::new(),
                status: AccountStatus::Active,
            },
            now,
        )?;

        tracing::info!(user_id = %identity.id, username = %identity.username, "registered");
        Ok(identity.view())
    }

    /// Verify credentials and mint a session token.
    ///
    /// Unknown username and wrong password fail identically.
    pub fn sign_in(&self, req: SignInRequest, now: DateTime<Utc>) -> DomainResult<SignInResponse> {
        let Some(identity) = self.identities.find_by_username(&req.username)? else {
            tracing::info!(username = %req.username, "sign-in rejected: unknown user");
            return Err(DomainError::unauthenticated(BAD_CREDENTIALS));
        };

        if !verify_password(&req.password, &identity.password_hash) {
            tracing::info!(user_id = %identity.id, "sign-in rejected: bad password");
            return Err(DomainError::unauthenticated(BAD_CREDENTIALS));
        }

        // Status is read again under the store lock so a concurrent disable wins.
        let identity = self
            .identities
            .modify(identity.id, &mut |stored: &mut Identity| {
                if stored.is_active() {
                    stored.last_login_at = Some(now);
                }
            })
            .map_err(|e| match e {
                StoreError::NotFound(_) => DomainError::unauthenticated(BAD_CREDENTIALS),
                other => other.into(),
            })?;

        if !identity.is_active() {
            tracing::info!(user_id = %identity.id, "sign-in rejected: account disabled");
            return Err(DomainError::unauthenticated("account is disabled"));
        }

        let token = self.tokens.issue(&identity, now)?;
        tracing::info!(user_id = %identity.id, role = %identity.role, "signed in");

        Ok(SignInResponse {
            user: SignedInUser {
                id: identity.id,
                nickname: identity.nickname,
                email: identity.email,
                token,
                role: identity.role,
            },
        })
    }

    pub fn profile(&self, caller: &Caller) -> DomainResult<IdentityView> {
        Ok(self.identity(caller.user_id())?.view())
    }

    pub fn update_profile(
        &self,
        caller: &Caller,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<IdentityView> {
        update.validate()?;
        let identity = self.modify_identity(caller.user_id(), update, ProfileUpdate::apply, now)?;
        Ok(identity.view())
    }

    /// Marketers, newest first.
    pub fn list_marketers(&self) -> DomainResult<Vec<IdentityView>> {
        let mut marketers: Vec<Identity> = self
            .identities
            .list()?
            .into_iter()
            .filter(|i| i.role == RoleLevel::MARKETER)
            .collect();
        newest_first(&mut marketers);
        Ok(marketers.iter().map(Identity::view).collect())
    }

    /// Every identity, newest first.
    pub fn admin_list(&self) -> DomainResult<Vec<IdentityView>> {
        let mut all = self.identities.list()?;
        newest_first(&mut all);
        Ok(all.iter().map(Identity::view).collect())
    }

    pub fn admin_create(
        &self,
        caller: &Caller,
        req: AdminCreateRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<IdentityView> {
        validate_username(&req.username)?;
        validate_email(&req.email)?;
        validate_password(&req.password)?;
        validate_assignable_role(req.role)?;

        let nickname = if req.nickname.is_empty() {
            req.username.clone()
        } else {
            req.nickname
        };

        let identity = self.identities.insert(
            NewIdentity {
                password_hash: hash_password(&req.password)?,
                username: req.username,
                nickname,
                email: req.email,
                role: req.role,
                avatar: req.avatar,
                bio: req.bio,
                website: req.website,
                status: AccountStatus::Active,
            },
            now,
        )?;

        tracing::info!(
            actor = %caller.user_id(),
            user_id = %identity.id,
            role = %identity.role,
            "account created by admin"
        );
        Ok(identity.view())
    }

    pub fn admin_update(
        &self,
        caller: &Caller,
        target: UserId,
        update: AdminUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<IdentityView> {
        if caller.owns(target) {
            return Err(DomainError::forbidden("cannot modify your own account"));
        }
        update.validate()?;

        let identity = self.modify_identity(target, update, AdminUpdate::apply, now)?;

        tracing::info!(actor = %caller.user_id(), user_id = %target, "account updated by admin");
        Ok(identity.view())
    }

    /// Remove an identity. Revenue rows it owns are left in place.
    pub fn delete_identity(&self, caller: &Caller, target: UserId) -> DomainResult<()> {
        self.identities.delete(target).map_err(user_not_found)?;
        tracing::info!(actor = %caller.user_id(), user_id = %target, "account deleted");
        Ok(())
    }

    /// Apply a one-shot edit under the store's write lock.
    fn modify_identity<U>(
        &self,
        id: UserId,
        update: U,
        apply: fn(U, &mut Identity, DateTime<Utc>),
        now: DateTime<Utc>,
    ) -> DomainResult<Identity> {
        let mut pending = Some(update);
        self.identities
            .modify(id, &mut |identity: &mut Identity| {
                if let Some(update) = pending.take() {
                    apply(update, identity, now);
                }
            })
            .map_err(user_not_found)
    }

    fn identity(&self, id: UserId) -> DomainResult<Identity> {
        self.identities
            .get(id)?
            .ok_or_else(|| DomainError::not_found("user not found"))
    }

    // -------------------------
    // Revenue
    // -------------------------

    pub fn create_revenue(
        &self,
        caller: &Caller,
        draft: RevenueDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<RevenueView> {
        // Reject a bad instant before an id is reserved for it.
        draft.parsed_record_time()?;
        let record = RevenueRecord::create(self.revenue.next_id(), caller.user_id(), draft, now)?;
        self.revenue.insert(record.clone())?;
        tracing::info!(record_id = %record.id, user_id = %record.user_id, "revenue record created");
        Ok(record.view())
    }

    /// A record owned by the caller; anything else is reported as missing.
    pub fn get_revenue(&self, caller: &Caller, id: RecordId) -> DomainResult<RevenueView> {
        Ok(self.owned_record(caller, id)?.view())
    }

    pub fn update_revenue(
        &self,
        caller: &Caller,
        id: RecordId,
        draft: RevenueDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<RevenueView> {
        let mut record = self
            .revenue
            .get(id)?
            .ok_or_else(|| DomainError::not_found("revenue record not found"))?;
        if !caller.owns(record.user_id) {
            return Err(DomainError::forbidden(
                "cannot modify another user's revenue record",
            ));
        }

        record.apply(draft, now)?;
        self.revenue.update(record.clone())?;
        Ok(record.view())
    }

    pub fn delete_revenue(&self, caller: &Caller, id: RecordId) -> DomainResult<()> {
        let record = self.owned_record(caller, id)?;
        self.revenue.delete(record.id)?;
        tracing::info!(record_id = %record.id, user_id = %caller.user_id(), "revenue record deleted");
        Ok(())
    }

    /// Listing across owners (optionally narrowed by `userId`), with each
    /// row's owner nickname and avatar joined in.
    pub fn list_revenue(&self, params: &ListParams) -> DomainResult<Page<RevenueView>> {
        let records = self.revenue.query(&params.filter)?;
        let owners = self.owner_directory()?;

        Ok(
            paginate_records(&records, &params.filter, params.page).map(|record| {
                let view = record.view();
                match owners.get(&record.user_id) {
                    Some(owner) => view.with_owner(owner.nickname.clone(), owner.avatar.clone()),
                    None => view,
                }
            }),
        )
    }

    /// The caller's own records; any `userId` in the query is ignored.
    pub fn own_revenue(&self, caller: &Caller, params: ListParams) -> DomainResult<Page<RevenueView>> {
        let params = params.scoped_to(caller.user_id());
        let records = self.revenue.query(&params.filter)?;
        Ok(paginate_records(&records, &params.filter, params.page).map(|r| r.view()))
    }

    /// Per-owner totals with aggregate ROI.
    pub fn revenue_summary(&self, params: &ListParams) -> DomainResult<Page<OwnerSummary>> {
        let records = self.revenue.query(&params.filter)?;
        let owners = self.owner_directory()?;

        Ok(summarize_by_owner(&records, &params.filter, params.page, |id| {
            owners.get(&id).map(|o| o.nickname.clone())
        })
        .map(OwnerSummary::rounded))
    }

    fn owned_record(&self, caller: &Caller, id: RecordId) -> DomainResult<RevenueRecord> {
        self.revenue
            .get(id)?
            .filter(|r| caller.owns(r.user_id))
            .ok_or_else(|| DomainError::not_found("revenue record not found"))
    }

    fn owner_directory(&self) -> DomainResult<HashMap<UserId, Identity>> {
        Ok(self
            .identities
            .list()?
            .into_iter()
            .map(|i| (i.id, i))
            .collect())
    }
}

fn user_not_found(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound(_) => DomainError::not_found("user not found"),
        other => other.into(),
    }
}

fn newest_first(identities: &mut [Identity]) {
    identities.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
