//! Admin user management: listings, detail lookups, and cascading deletion.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::pagination::{offset, Page, PER_PAGE_MANAGE};

/// Users of one role, searchable by name or email substring, 10 per page.
pub async fn list_users(
    pool: &PgPool,
    role: Role,
    search: Option<&str>,
    page: i64,
) -> Result<Page<User>, AppError> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM users WHERE role = ");
    count_qb.push_bind(role.as_str());
    push_user_search(&mut count_qb, search);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM users WHERE role = ");
    qb.push_bind(role.as_str());
    push_user_search(&mut qb, search);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(PER_PAGE_MANAGE)
        .push(" OFFSET ")
        .push_bind(offset(page, PER_PAGE_MANAGE));
    let items = qb.build_query_as::<User>().fetch_all(pool).await?;

    Ok(Page::new(items, total, page, PER_PAGE_MANAGE))
}

fn push_user_search(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(term) = search {
        let pattern = format!("%{term}%");
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub async fn fetch_user(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

/// Deletes a user and everything they own in one transaction, in dependency
/// order: applications to their jobs, their own applications, their jobs,
/// their profile, then the user row. A failure anywhere rolls the whole
/// cascade back.
pub async fn delete_user_cascade(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM applications WHERE job_id IN (SELECT id FROM jobs WHERE employer_id = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM applications WHERE jobseeker_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM jobs WHERE employer_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    tx.commit().await?;
    info!("Deleted user {user_id} with owned jobs, applications, and profile");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_search_matches_name_and_email() {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users WHERE role = ");
        qb.push_bind("employer");
        push_user_search(&mut qb, Some("alice"));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM users WHERE role = $1 \
             AND (name ILIKE $2 OR email ILIKE $3)"
        );
    }

    #[test]
    fn blank_search_adds_nothing() {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users WHERE role = ");
        qb.push_bind("employer");
        let before = qb.sql().to_string();
        push_user_search(&mut qb, None);
        assert_eq!(qb.sql(), before);
    }
}
