/// Contact persistence
///
/// Every query filters on the owning user's id, so a contact belonging to
/// someone else is indistinguishable from a contact that does not exist.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Contact;
use crate::error::AppError;

pub struct ContactData {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub extra: Option<String>,
}

/// Escapes LIKE metacharacters so a search term is matched literally.
/// Without this, a query of "%" would list every contact.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Lists a user's contacts with optional prefix search over first name,
/// last name, and email, plus skip/limit pagination.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    q: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<Contact>, AppError> {
    let contacts = sqlx::query_as::<_, Contact>(
        r#"
        SELECT id, user_id, first_name, last_name, email, phone, birthday, extra
        FROM contacts
        WHERE user_id = $1
          AND ($2 = ''
               OR first_name LIKE $2 || '%'
               OR last_name LIKE $2 || '%'
               OR email LIKE $2 || '%')
        ORDER BY first_name, last_name
        OFFSET $3 LIMIT $4
        "#,
    )
    .bind(user_id)
    .bind(escape_like(q))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(contacts)
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    data: ContactData,
) -> Result<Contact, AppError> {
    let contact = sqlx::query_as::<_, Contact>(
        r#"
        INSERT INTO contacts (id, user_id, first_name, last_name, email, phone, birthday, extra)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, user_id, first_name, last_name, email, phone, birthday, extra
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.birthday)
    .bind(&data.extra)
    .fetch_one(pool)
    .await?;

    Ok(contact)
}

pub async fn read(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Contact>, AppError> {
    let contact = sqlx::query_as::<_, Contact>(
        r#"
        SELECT id, user_id, first_name, last_name, email, phone, birthday, extra
        FROM contacts
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(contact)
}

/// Full replacement of the contact's mutable fields. Returns None when
/// the contact is absent or owned by another user.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    data: ContactData,
) -> Result<Option<Contact>, AppError> {
    let contact = sqlx::query_as::<_, Contact>(
        r#"
        UPDATE contacts
        SET first_name = $3, last_name = $4, email = $5, phone = $6, birthday = $7, extra = $8
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, first_name, last_name, email, phone, birthday, extra
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.birthday)
    .bind(&data.extra)
    .fetch_optional(pool)
    .await?;

    Ok(contact)
}

pub async fn delete(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Contact>, AppError> {
    let contact = sqlx::query_as::<_, Contact>(
        r#"
        DELETE FROM contacts
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, first_name, last_name, email, phone, birthday, extra
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(contact)
}

/// Contacts whose birthday falls within the next `days` days. The age of
/// a person `days` from now exceeds their age today exactly when the
/// birthday sits in that window, which handles the year wrap-around.
pub async fn upcoming_birthdays(
    pool: &PgPool,
    user_id: Uuid,
    days: i32,
) -> Result<Vec<Contact>, AppError> {
    let contacts = sqlx::query_as::<_, Contact>(
        r#"
        SELECT id, user_id, first_name, last_name, email, phone, birthday, extra
        FROM contacts
        WHERE user_id = $1
          AND birthday IS NOT NULL
          AND date_part('year', age(birthday - make_interval(days => $2)))
              > date_part('year', age(birthday))
        ORDER BY birthday
        "#,
    )
    .bind(user_id)
    .bind(days)
    .fetch_all(pool)
    .await?;

    Ok(contacts)
}
