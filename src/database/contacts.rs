use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::{Contact, ContactChanges, ContactQuery, NewContact, Owner};

/// Contacts, always filtered by `user_id` in SQL
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner: Owner, query: &ContactQuery) -> Result<Vec<Contact>, DatabaseError> {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT id, name, email, phone FROM contacts \
             WHERE user_id = $1 AND name ILIKE $2 \
             ORDER BY id DESC LIMIT $3 OFFSET $4",
        )
        .bind(owner.id())
        .bind(like_pattern(query.search()))
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(contacts)
    }

    pub async fn count(&self, owner: Owner, query: &ContactQuery) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM contacts WHERE user_id = $1 AND name ILIKE $2",
        )
        .bind(owner.id())
        .bind(like_pattern(query.search()))
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    pub async fn insert(&self, owner: Owner, contact: &NewContact) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO contacts (user_id, name, email, phone) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(owner.id())
        .bind(&contact.name)
        .bind(contact.email.as_deref().unwrap_or(""))
        .bind(contact.phone.as_deref().unwrap_or(""))
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Returns the number of rows touched; zero when the id is missing or not owned.
    pub async fn update(&self, owner: Owner, id: i64, changes: &ContactChanges) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE contacts SET \
             name = COALESCE($1, name), \
             email = COALESCE($2, email), \
             phone = COALESCE($3, phone) \
             WHERE id = $4 AND user_id = $5",
        )
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.phone.as_deref())
        .bind(id)
        .bind(owner.id())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, owner: Owner, id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.id())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Substring pattern with LIKE wildcards in the input escaped
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_matches_everything() {
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(like_pattern("Ali"), "%Ali%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
