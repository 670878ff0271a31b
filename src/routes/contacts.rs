/// Contact routes
///
/// All handlers run behind the auth guard and scope every query to the
/// authenticated owner. A contact owned by someone else answers 404,
/// exactly like a contact that does not exist.

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Contact, User};
use crate::error::{AppError, DatabaseError};
use crate::repository::{contacts, ContactStore};
use crate::validators::is_valid_contact;

#[derive(Deserialize)]
pub struct ContactPayload {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub extra: Option<String>,
}

impl ContactPayload {
    fn validated(&self) -> Result<contacts::ContactData, AppError> {
        let fields = is_valid_contact(
            &self.first_name,
            self.last_name.as_deref(),
            self.email.as_deref(),
            self.phone.as_deref(),
            self.extra.as_deref(),
        )?;
        Ok(contacts::ContactData {
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone: fields.phone,
            birthday: self.birthday,
            extra: fields.extra,
        })
    }
}

#[derive(Serialize)]
pub struct ContactResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub extra: Option<String>,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id.to_string(),
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone: contact.phone,
            birthday: contact.birthday,
            extra: contact.extra,
        }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Deserialize)]
pub struct BirthdaysQuery {
    #[serde(default = "default_days")]
    pub days: i32,
}

fn default_days() -> i32 {
    7
}

fn not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("Contact not found".to_string()))
}

/// GET /api/contacts
pub async fn list_contacts(
    user: web::ReqData<User>,
    query: web::Query<ListQuery>,
    store: web::Data<dyn ContactStore>,
) -> Result<HttpResponse, AppError> {
    let found = store
        .list(user.id, &query.q, query.skip.max(0), query.limit.clamp(1, 500))
        .await?;

    let body: Vec<ContactResponse> = found.into_iter().map(ContactResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/contacts
pub async fn create_contact(
    user: web::ReqData<User>,
    body: web::Json<ContactPayload>,
    store: web::Data<dyn ContactStore>,
) -> Result<HttpResponse, AppError> {
    let data = body.validated()?;
    let contact = store.create(user.id, data).await?;

    tracing::info!(user_id = %user.id, contact_id = %contact.id, "Contact created");

    Ok(HttpResponse::Created().json(ContactResponse::from(contact)))
}

/// GET /api/contacts/upcoming_birthdays
pub async fn upcoming_birthdays(
    user: web::ReqData<User>,
    query: web::Query<BirthdaysQuery>,
    store: web::Data<dyn ContactStore>,
) -> Result<HttpResponse, AppError> {
    let found = store.upcoming_birthdays(user.id, query.days.max(0)).await?;
    let body: Vec<ContactResponse> = found.into_iter().map(ContactResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/contacts/{contact_id}
pub async fn read_contact(
    user: web::ReqData<User>,
    path: web::Path<Uuid>,
    store: web::Data<dyn ContactStore>,
) -> Result<HttpResponse, AppError> {
    let contact = store
        .read(user.id, path.into_inner())
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(ContactResponse::from(contact)))
}

/// PUT /api/contacts/{contact_id}
pub async fn update_contact(
    user: web::ReqData<User>,
    path: web::Path<Uuid>,
    body: web::Json<ContactPayload>,
    store: web::Data<dyn ContactStore>,
) -> Result<HttpResponse, AppError> {
    let data = body.validated()?;
    let contact = store
        .update(user.id, path.into_inner(), data)
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(ContactResponse::from(contact)))
}

/// DELETE /api/contacts/{contact_id}
pub async fn delete_contact(
    user: web::ReqData<User>,
    path: web::Path<Uuid>,
    store: web::Data<dyn ContactStore>,
) -> Result<HttpResponse, AppError> {
    let contact = store
        .delete(user.id, path.into_inner())
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(user_id = %user.id, contact_id = %contact.id, "Contact deleted");

    Ok(HttpResponse::Ok().json(ContactResponse::from(contact)))
}
