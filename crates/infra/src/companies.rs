//! Company and membership store.
//!
//! This is where the membership invariants are enforced transactionally:
//! company bootstrap, the last-OWNER guard (count under `FOR UPDATE` row
//! locks) and ownership transfer. Guarded transactions are wrapped in
//! [`retry_transient`] so serialization conflicts and deadlocks are retried a
//! bounded number of times.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use talentbase_companies::{
    assignable_role, ensure_can_modify, ensure_owner_remains, Company, Membership,
    MembershipStatus,
};
use talentbase_core::{CompanyId, DomainError, MembershipId, Role, UserId};

use crate::error::{retry_transient, translate_constraint, StoreError, StoreResult};

#[derive(Debug, Clone, FromRow)]
struct MembershipRow {
    id: Uuid,
    company_id: Uuid,
    user_id: Uuid,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self) -> StoreResult<Membership> {
        Ok(Membership {
            id: MembershipId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            user_id: UserId::from_uuid(self.user_id),
            role: Role::parse(&self.role).map_err(decode_err)?,
            status: MembershipStatus::parse(&self.status).map_err(decode_err)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl CompanyRow {
    fn into_company(self) -> Company {
        Company {
            id: CompanyId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            deleted_at: self.deleted_at,
        }
    }
}

/// A membership joined with the member's account fields, for listings.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    pub membership: Membership,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, FromRow)]
struct MemberRecordRow {
    id: Uuid,
    company_id: Uuid,
    user_id: Uuid,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email: String,
    full_name: String,
}

fn decode_err(e: DomainError) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(Box::new(e)))
}

#[derive(Clone)]
pub struct CompanyStore {
    pool: PgPool,
}

impl CompanyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bootstrap a company: the company row and its OWNER/ACTIVE membership
    /// commit together or not at all.
    pub async fn create(
        &self,
        owner: UserId,
        name: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<(Company, Membership)> {
        let mut tx = self.pool.begin().await?;

        let company_id = CompanyId::new();
        sqlx::query(
            r#"
            INSERT INTO companies (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(name)
        .bind(description)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let membership = Membership::owner(company_id, owner, now);
        insert_membership(&mut tx, &membership).await?;

        tx.commit().await?;

        let company = Company {
            id: company_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            deleted_at: None,
        };
        Ok((company, membership))
    }

    /// Default read: deleted companies are invisible.
    pub async fn get(&self, company_id: CompanyId) -> StoreResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT id, name, description, created_at, deleted_at
            FROM companies
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CompanyRow::into_company))
    }

    pub async fn update(
        &self,
        company_id: CompanyId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> StoreResult<Company> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            UPDATE companies
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, description, created_at, deleted_at
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(StoreError::not_found)?;

        Ok(row.into_company())
    }

    pub async fn soft_delete(&self, company_id: CompanyId, now: DateTime<Utc>) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET deleted_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }

    // ── Memberships ─────────────────────────────────────────────────────────

    /// The membership resolver's lookup: ACTIVE only. INVITED and REVOKED
    /// behave as "no membership".
    pub async fn find_active_membership(
        &self,
        company_id: CompanyId,
        user_id: UserId,
    ) -> StoreResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, company_id, user_id, role, status, created_at, updated_at
            FROM memberships
            WHERE company_id = $1 AND user_id = $2 AND status = 'active'
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MembershipRow::into_membership).transpose()
    }

    pub async fn find_membership(
        &self,
        company_id: CompanyId,
        user_id: UserId,
    ) -> StoreResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, company_id, user_id, role, status, created_at, updated_at
            FROM memberships
            WHERE company_id = $1 AND user_id = $2
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MembershipRow::into_membership).transpose()
    }

    /// Invited and active members, joined with account fields.
    pub async fn list_members(&self, company_id: CompanyId) -> StoreResult<Vec<MemberRecord>> {
        let rows = sqlx::query_as::<_, MemberRecordRow>(
            r#"
            SELECT m.id, m.company_id, m.user_id, m.role, m.status,
                   m.created_at, m.updated_at, u.email, u.full_name
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.company_id = $1 AND m.status <> 'revoked'
            ORDER BY m.created_at
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let membership = MembershipRow {
                    id: row.id,
                    company_id: row.company_id,
                    user_id: row.user_id,
                    role: row.role,
                    status: row.status,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
                .into_membership()?;
                Ok(MemberRecord {
                    membership,
                    email: row.email,
                    full_name: row.full_name,
                })
            })
            .collect()
    }

    /// Create an INVITED membership. The (company, user) pair is unique: a
    /// previous membership of any status (including REVOKED, which is
    /// terminal) makes this a conflict.
    pub async fn invite(
        &self,
        company_id: CompanyId,
        target: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> StoreResult<Membership> {
        assignable_role(role)?;

        if self.find_membership(company_id, target).await?.is_some() {
            return Err(StoreError::conflict(
                "user is already a member of this company",
            ));
        }

        let mut tx = self.pool.begin().await?;
        let membership = Membership::invited(company_id, target, role, now);
        insert_membership(&mut tx, &membership).await?;
        tx.commit().await?;

        Ok(membership)
    }

    /// INVITED → ACTIVE, by the invited actor.
    pub async fn accept_invite(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Membership> {
        let mut tx = self.pool.begin().await?;

        let mut membership = lock_membership(&mut tx, company_id, user_id)
            .await?
            .ok_or_else(StoreError::not_found)?;

        membership.status = membership.accept()?;
        membership.updated_at = now;
        update_membership(&mut tx, &membership).await?;

        tx.commit().await?;
        Ok(membership)
    }

    /// Change an ACTIVE membership's role. Demoting an OWNER is guarded by
    /// the last-OWNER count, taken under row locks in the same transaction.
    pub async fn change_role(
        &self,
        company_id: CompanyId,
        actor_role: Role,
        target: UserId,
        new_role: Role,
        now: DateTime<Utc>,
    ) -> StoreResult<Membership> {
        assignable_role(new_role)?;
        retry_transient(|| self.try_change_role(company_id, actor_role, target, new_role, now))
            .await
    }

    async fn try_change_role(
        &self,
        company_id: CompanyId,
        actor_role: Role,
        target: UserId,
        new_role: Role,
        now: DateTime<Utc>,
    ) -> StoreResult<Membership> {
        let mut tx = self.pool.begin().await?;

        let mut membership = lock_membership(&mut tx, company_id, target)
            .await?
            .ok_or_else(StoreError::not_found)?;

        ensure_can_modify(actor_role, membership.role)?;
        membership.ensure_role_changeable()?;

        if membership.role == Role::Owner {
            let owners = lock_active_owners(&mut tx, company_id).await?;
            ensure_owner_remains(Role::Owner, owners)?;
        }

        membership.role = new_role;
        membership.updated_at = now;
        update_membership(&mut tx, &membership).await?;

        tx.commit().await?;
        Ok(membership)
    }

    /// Revoke a membership (cancel an invite or remove an active member).
    /// Revoking an ACTIVE OWNER is guarded by the last-OWNER count.
    pub async fn revoke(
        &self,
        company_id: CompanyId,
        actor_role: Role,
        target: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Membership> {
        retry_transient(|| self.try_revoke(company_id, actor_role, target, now)).await
    }

    async fn try_revoke(
        &self,
        company_id: CompanyId,
        actor_role: Role,
        target: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Membership> {
        let mut tx = self.pool.begin().await?;

        let mut membership = lock_membership(&mut tx, company_id, target)
            .await?
            .ok_or_else(StoreError::not_found)?;

        ensure_can_modify(actor_role, membership.role)?;
        let next = membership.revoke()?;

        if membership.role == Role::Owner && membership.is_active() {
            let owners = lock_active_owners(&mut tx, company_id).await?;
            ensure_owner_remains(Role::Owner, owners)?;
        }

        membership.status = next;
        membership.updated_at = now;
        update_membership(&mut tx, &membership).await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %company_id,
            user_id = %target,
            "membership revoked"
        );
        Ok(membership)
    }

    /// Atomically promote `to` to OWNER and demote `from` to ADMIN.
    pub async fn transfer_ownership(
        &self,
        company_id: CompanyId,
        from: UserId,
        to: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        if from == to {
            return Err(DomainError::validation("cannot transfer ownership to yourself").into());
        }
        retry_transient(|| self.try_transfer_ownership(company_id, from, to, now)).await
    }

    async fn try_transfer_ownership(
        &self,
        company_id: CompanyId,
        from: UserId,
        to: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        // Lock both rows in one statement, in id order, so concurrent
        // transfers cannot deadlock on each other.
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, company_id, user_id, role, status, created_at, updated_at
            FROM memberships
            WHERE company_id = $1 AND user_id IN ($2, $3)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(from.as_uuid())
        .bind(to.as_uuid())
        .fetch_all(&mut *tx)
        .await?;

        let mut initiator = None;
        let mut target = None;
        for row in rows {
            let membership = row.into_membership()?;
            if membership.user_id == from {
                initiator = Some(membership);
            } else if membership.user_id == to {
                target = Some(membership);
            }
        }

        // Re-checked under lock: the route-level check may be stale.
        let mut initiator = initiator.ok_or(DomainError::Forbidden)?;
        if !initiator.is_active() || initiator.role != Role::Owner {
            return Err(DomainError::Forbidden.into());
        }

        let mut target = target.ok_or_else(StoreError::not_found)?;
        if !target.is_active() {
            return Err(StoreError::conflict("target membership is not active"));
        }

        target.role = Role::Owner;
        target.updated_at = now;
        update_membership(&mut tx, &target).await?;

        initiator.role = Role::Admin;
        initiator.updated_at = now;
        update_membership(&mut tx, &initiator).await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %company_id,
            from = %from,
            to = %to,
            "ownership transferred"
        );
        Ok(())
    }
}

async fn insert_membership(
    tx: &mut Transaction<'_, Postgres>,
    membership: &Membership,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO memberships (id, company_id, user_id, role, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(membership.id.as_uuid())
    .bind(membership.company_id.as_uuid())
    .bind(membership.user_id.as_uuid())
    .bind(membership.role.as_str())
    .bind(membership.status.as_str())
    .bind(membership.created_at)
    .bind(membership.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(translate_constraint)?;

    Ok(())
}

async fn update_membership(
    tx: &mut Transaction<'_, Postgres>,
    membership: &Membership,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        UPDATE memberships
        SET role = $2, status = $3, updated_at = $4
        WHERE id = $1
        "#,
    )
    .bind(membership.id.as_uuid())
    .bind(membership.role.as_str())
    .bind(membership.status.as_str())
    .bind(membership.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn lock_membership(
    tx: &mut Transaction<'_, Postgres>,
    company_id: CompanyId,
    user_id: UserId,
) -> StoreResult<Option<Membership>> {
    let row = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT id, company_id, user_id, role, status, created_at, updated_at
        FROM memberships
        WHERE company_id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(company_id.as_uuid())
    .bind(user_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?;

    row.map(MembershipRow::into_membership).transpose()
}

/// Count the company's ACTIVE OWNER rows, locking them (in id order) for the
/// remainder of the transaction. This closes the window where two concurrent
/// demotions could both observe count = 2.
async fn lock_active_owners(
    tx: &mut Transaction<'_, Postgres>,
    company_id: CompanyId,
) -> StoreResult<i64> {
    let rows = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM memberships
        WHERE company_id = $1 AND role = 'owner' AND status = 'active'
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(company_id.as_uuid())
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.len() as i64)
}
