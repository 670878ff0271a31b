use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, TokenService};
use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::image_host::ImageHost;
use crate::middleware::AuthGuard;
use crate::repository::{ContactStore, PgStore};
use crate::routes::{
    confirm_email, create_contact, current_user, delete_contact, health_check, list_contacts,
    login, read_contact, refresh, request_email, signup, update_avatar, update_contact,
    upcoming_birthdays,
};

pub fn run(listener: TcpListener, pool: PgPool, settings: Settings) -> Result<Server, std::io::Error> {
    let tokens = TokenService::new(&settings.jwt);
    let store = Arc::new(PgStore::new(pool.clone()));
    let auth = AuthService::new(tokens, store.clone());

    let http_client = reqwest::Client::new();
    let email_client = EmailClient::new(
        settings.email.base_url.clone(),
        settings.email.sender.clone(),
        http_client.clone(),
    );
    let image_host = ImageHost::new(&settings.image_host, http_client);

    let pool = web::Data::new(pool);
    let contact_store: web::Data<dyn ContactStore> =
        web::Data::from(store as Arc<dyn ContactStore>);
    let auth_data = web::Data::new(auth.clone());
    let email_client = web::Data::new(email_client);
    let image_host = web::Data::new(image_host);
    let app_settings = web::Data::new(settings.application.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(pool.clone())
            .app_data(contact_store.clone())
            .app_data(auth_data.clone())
            .app_data(email_client.clone())
            .app_data(image_host.clone())
            .app_data(app_settings.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    // Public auth endpoints
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(signup))
                            .route("/login", web::post().to(login))
                            .route("/refresh", web::post().to(refresh))
                            .route("/confirmed_email/{token}", web::get().to(confirm_email))
                            .route("/request_email", web::post().to(request_email)),
                    )
                    // Everything below requires a valid access token
                    .service(
                        web::scope("/users")
                            .wrap(AuthGuard::new(auth.clone()))
                            .route("", web::get().to(current_user))
                            .route("/avatar", web::patch().to(update_avatar)),
                    )
                    .service(
                        web::scope("/contacts")
                            .wrap(AuthGuard::new(auth.clone()))
                            .route("", web::get().to(list_contacts))
                            .route("", web::post().to(create_contact))
                            .route(
                                "/upcoming_birthdays",
                                web::get().to(upcoming_birthdays),
                            )
                            .route("/{contact_id}", web::get().to(read_contact))
                            .route("/{contact_id}", web::put().to(update_contact))
                            .route("/{contact_id}", web::delete().to(delete_contact)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
