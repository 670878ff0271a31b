//! Contact endpoint tests driven through the real routes and auth guard
//! against an in-memory store, one bearer token per user.

use std::sync::{Arc, Mutex};

use actix_web::dev::HttpServiceFactory;
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use contact_hub::auth::{hash_password, AuthService, TokenService};
use contact_hub::configuration::JwtSettings;
use contact_hub::domain::{Contact, User};
use contact_hub::error::AppError;
use contact_hub::middleware::AuthGuard;
use contact_hub::repository::contacts::ContactData;
use contact_hub::repository::{AuthStore, ContactStore};
use contact_hub::routes::{
    create_contact, delete_contact, list_contacts, read_contact, update_contact,
    upcoming_birthdays,
};

/// In-memory stand-in for the Postgres-backed store, covering both the
/// auth side (so the guard can identify callers) and the contact side.
#[derive(Default)]
struct MemStore {
    users: Mutex<Vec<User>>,
    contacts: Mutex<Vec<Contact>>,
}

impl MemStore {
    fn add_user(&self, username: &str, email: &str) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password("Secret123").expect("Failed to hash password"),
            avatar: None,
            created_at: Utc::now(),
            confirmed_at: Some(Utc::now()),
        };
        let id = user.id;
        self.users.lock().unwrap().push(user);
        id
    }
}

#[async_trait]
impl AuthStore for MemStore {
    async fn find_user(&self, login: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == login || u.username == login)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn save_refresh_token(&self, _user_id: Uuid, _token: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn consume_refresh_token(&self, _token: &str) -> Result<Option<Uuid>, AppError> {
        Ok(None)
    }

    async fn mark_confirmed(&self, email: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            user.confirmed_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// The birthday's next occurrence strictly after `today`.
fn next_occurrence(birthday: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = birthday.with_year(today.year())?;
    if this_year > today {
        Some(this_year)
    } else {
        birthday.with_year(today.year() + 1)
    }
}

#[async_trait]
impl ContactStore for MemStore {
    async fn list(
        &self,
        user_id: Uuid,
        q: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Contact>, AppError> {
        let mut found: Vec<Contact> = self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .filter(|c| {
                q.is_empty()
                    || c.first_name.starts_with(q)
                    || c.last_name.as_deref().is_some_and(|n| n.starts_with(q))
                    || c.email.as_deref().is_some_and(|e| e.starts_with(q))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.first_name.cmp(&b.first_name));
        Ok(found
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn create(&self, user_id: Uuid, data: ContactData) -> Result<Contact, AppError> {
        let contact = Contact {
            id: Uuid::new_v4(),
            user_id,
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            phone: data.phone,
            birthday: data.birthday,
            extra: data.extra,
        };
        self.contacts.lock().unwrap().push(contact.clone());
        Ok(contact)
    }

    async fn read(&self, user_id: Uuid, id: Uuid) -> Result<Option<Contact>, AppError> {
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        data: ContactData,
    ) -> Result<Option<Contact>, AppError> {
        let mut contacts = self.contacts.lock().unwrap();
        match contacts.iter_mut().find(|c| c.id == id && c.user_id == user_id) {
            Some(contact) => {
                contact.first_name = data.first_name;
                contact.last_name = data.last_name;
                contact.email = data.email;
                contact.phone = data.phone;
                contact.birthday = data.birthday;
                contact.extra = data.extra;
                Ok(Some(contact.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<Option<Contact>, AppError> {
        let mut contacts = self.contacts.lock().unwrap();
        match contacts.iter().position(|c| c.id == id && c.user_id == user_id) {
            Some(index) => Ok(Some(contacts.remove(index))),
            None => Ok(None),
        }
    }

    async fn upcoming_birthdays(
        &self,
        user_id: Uuid,
        days: i32,
    ) -> Result<Vec<Contact>, AppError> {
        let today = Utc::now().date_naive();
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .filter(|c| {
                c.birthday
                    .and_then(|b| next_occurrence(b, today))
                    .is_some_and(|next| (next - today).num_days() <= i64::from(days))
            })
            .cloned()
            .collect())
    }
}

fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "test-secret-key-at-least-32-characters-long".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
        confirmation_token_expiry: 604800,
    }
}

fn auth_with_store() -> (AuthService, Arc<MemStore>) {
    let store = Arc::new(MemStore::default());
    let auth = AuthService::new(TokenService::new(&jwt_settings()), store.clone());
    (auth, store)
}

fn contact_routes(auth: AuthService) -> impl HttpServiceFactory {
    web::scope("/api/contacts")
        .wrap(AuthGuard::new(auth))
        .route("", web::get().to(list_contacts))
        .route("", web::post().to(create_contact))
        .route("/upcoming_birthdays", web::get().to(upcoming_birthdays))
        .route("/{contact_id}", web::get().to(read_contact))
        .route("/{contact_id}", web::put().to(update_contact))
        .route("/{contact_id}", web::delete().to(delete_contact))
}

fn bearer(auth: &AuthService, email: &str) -> (&'static str, String) {
    let token = auth.tokens().issue_access(email).expect("token issuance");
    ("Authorization", format!("Bearer {}", token))
}

#[tokio::test]
async fn owner_can_create_and_read_a_contact() {
    let (auth, store) = auth_with_store();
    store.add_user("blackwidow", "natasha@mail.com");

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store.clone() as Arc<dyn ContactStore>))
            .service(contact_routes(auth.clone())),
    )
    .await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(bearer(&auth, "natasha@mail.com"))
            .set_json(json!({"first_name": "Tony", "last_name": "Stark"}))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), 201);
    let body: Value = test::read_body_json(created).await;
    let id = body["id"].as_str().expect("id in response").to_string();

    let fetched = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/contacts/{}", id))
            .insert_header(bearer(&auth, "natasha@mail.com"))
            .to_request(),
    )
    .await;
    assert_eq!(fetched.status(), 200);
    let body: Value = test::read_body_json(fetched).await;
    assert_eq!(body["first_name"], "Tony");
}

#[tokio::test]
async fn anothers_contact_reads_as_absent() {
    let (auth, store) = auth_with_store();
    let owner_id = store.add_user("blackwidow", "natasha@mail.com");
    store.add_user("hawkeye1", "clint@mail.com");

    let contact = store
        .create(
            owner_id,
            ContactData {
                first_name: "Tony".to_string(),
                last_name: None,
                email: None,
                phone: None,
                birthday: None,
                extra: None,
            },
        )
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store.clone() as Arc<dyn ContactStore>))
            .service(contact_routes(auth.clone())),
    )
    .await;

    // Reading, replacing, or deleting someone else's contact all answer
    // exactly like a contact that does not exist.
    let read = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/contacts/{}", contact.id))
            .insert_header(bearer(&auth, "clint@mail.com"))
            .to_request(),
    )
    .await;
    assert_eq!(read.status(), 404);

    let update = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/contacts/{}", contact.id))
            .insert_header(bearer(&auth, "clint@mail.com"))
            .set_json(json!({"first_name": "Hijacked"}))
            .to_request(),
    )
    .await;
    assert_eq!(update.status(), 404);

    let delete = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/contacts/{}", contact.id))
            .insert_header(bearer(&auth, "clint@mail.com"))
            .to_request(),
    )
    .await;
    assert_eq!(delete.status(), 404);

    // The owner's contact survived all three attempts, untouched.
    let survivor = store.read(owner_id, contact.id).await.unwrap().unwrap();
    assert_eq!(survivor.first_name, "Tony");
}

#[tokio::test]
async fn listing_shows_only_the_callers_contacts() {
    let (auth, store) = auth_with_store();
    let natasha = store.add_user("blackwidow", "natasha@mail.com");
    let clint = store.add_user("hawkeye1", "clint@mail.com");

    for name in ["Tony", "Bruce"] {
        store
            .create(
                natasha,
                ContactData {
                    first_name: name.to_string(),
                    last_name: None,
                    email: None,
                    phone: None,
                    birthday: None,
                    extra: None,
                },
            )
            .await
            .unwrap();
    }
    store
        .create(
            clint,
            ContactData {
                first_name: "Laura".to_string(),
                last_name: None,
                email: None,
                phone: None,
                birthday: None,
                extra: None,
            },
        )
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store.clone() as Arc<dyn ContactStore>))
            .service(contact_routes(auth.clone())),
    )
    .await;

    let listed = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/contacts")
            .insert_header(bearer(&auth, "clint@mail.com"))
            .to_request(),
    )
    .await;
    assert_eq!(listed.status(), 200);
    let body: Value = test::read_body_json(listed).await;
    let names: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .map(|c| c["first_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Laura"]);
}

#[tokio::test]
async fn upcoming_birthdays_are_scoped_to_the_caller() {
    let (auth, store) = auth_with_store();
    let natasha = store.add_user("blackwidow", "natasha@mail.com");
    let clint = store.add_user("hawkeye1", "clint@mail.com");

    // 1992 is a leap year, so any month/day survives the year rewrite.
    let soon = (Utc::now().date_naive() + Duration::days(3))
        .with_year(1992)
        .unwrap();
    for (owner, name) in [(natasha, "Tony"), (clint, "Laura")] {
        store
            .create(
                owner,
                ContactData {
                    first_name: name.to_string(),
                    last_name: None,
                    email: None,
                    phone: None,
                    birthday: Some(soon),
                    extra: None,
                },
            )
            .await
            .unwrap();
    }

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store.clone() as Arc<dyn ContactStore>))
            .service(contact_routes(auth.clone())),
    )
    .await;

    let listed = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/contacts/upcoming_birthdays")
            .insert_header(bearer(&auth, "natasha@mail.com"))
            .to_request(),
    )
    .await;
    assert_eq!(listed.status(), 200);
    let body: Value = test::read_body_json(listed).await;
    let names: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .map(|c| c["first_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Tony"]);
}

#[tokio::test]
async fn requests_without_a_token_are_rejected() {
    let (auth, store) = auth_with_store();
    store.add_user("blackwidow", "natasha@mail.com");

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store.clone() as Arc<dyn ContactStore>))
            .service(contact_routes(auth)),
    )
    .await;

    // The guard rejects at the middleware layer, so the error surfaces
    // before a ServiceResponse is built.
    let result = test::try_call_service(
        &app,
        test::TestRequest::get().uri("/api/contacts").to_request(),
    )
    .await;
    let status = match result {
        Ok(response) => response.status(),
        Err(error) => actix_web::HttpResponse::from_error(error).status(),
    };
    assert_eq!(status, 401);
}
