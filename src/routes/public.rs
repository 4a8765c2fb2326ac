use actix_web::http::header::Header;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_httpauth::headers::authorization::{Authorization, Basic};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{authenticate_credentials, hash_password, new_id, AuthUser},
    catalog::round2,
    error::ApiError,
    models::{ReviewPayload, ReviewRow, ServicePayload, ServiceRow, AUTH_TYPE_CREDENTIALS, ROLE_USER},
    state::AppState,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/services").route(web::get().to(list_services)))
        .service(
            web::resource("/services/{id}/reviews")
                .route(web::get().to(review_summary))
                .route(web::post().to(submit_review)),
        )
        .service(web::resource("/services/{id}").route(web::get().to(get_service)))
        .service(web::resource("/register").route(web::post().to(register)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

const SERVICE_COLUMNS: &str = "id, slug, title, tagline, description, long_description, features, \
                               price_per_hour, rating, reviews, image, is_active, created_at, updated_at";

async fn list_services(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = sqlx::query_as::<_, ServiceRow>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at DESC"
    ))
    .fetch_all(&state.db)
    .await?;

    let services: Vec<ServicePayload> = rows.into_iter().map(ServicePayload::from).collect();
    Ok(HttpResponse::Ok().json(services))
}

/// Resolves a catalog entry by slug or internal id.
pub async fn fetch_service(
    state: &AppState,
    id_or_slug: &str,
) -> Result<Option<ServiceRow>, sqlx::Error> {
    sqlx::query_as::<_, ServiceRow>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE slug = ? OR id = ? LIMIT 1"
    ))
    .bind(id_or_slug)
    .bind(id_or_slug)
    .fetch_optional(&state.db)
    .await
}

async fn get_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let row = fetch_service(&state, &id)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;
    Ok(HttpResponse::Ok().json(ServicePayload::from(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    full_name: String,
    email: String,
    password: String,
    contact: Option<String>,
    nid: Option<String>,
}

async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let mut errors = Vec::new();
    if body.full_name.trim().len() < 2 {
        errors.push("Full name must be at least 2 characters.".to_string());
    }
    if !body.email.contains('@') {
        errors.push("A valid email is required.".to_string());
    }
    if body.password.len() < 6 {
        errors.push("Password must be at least 6 characters.".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let email = body.email.trim().to_lowercase();
    let existing = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE email = ? LIMIT 1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "User with this email already exists.".to_string(),
        ));
    }

    let password_hash = hash_password(&body.password)
        .map_err(|err| ApiError::Upstream(format!("password hash failed: {err}")))?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"INSERT INTO users (id, full_name, email, password_hash, auth_type, role, contact, nid, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(new_id())
    .bind(body.full_name.trim())
    .bind(&email)
    .bind(password_hash)
    .bind(AUTH_TYPE_CREDENTIALS)
    .bind(ROLE_USER)
    .bind(body.contact)
    .bind(body.nid)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|err| {
        ApiError::conflict_on_unique(err, "User with this email already exists.")
    })?;

    Ok(HttpResponse::Created().json(json!({ "message": "User registered successfully" })))
}

#[derive(Debug, serde::Serialize)]
struct StarBucket {
    star: i64,
    count: i64,
    percentage: f64,
}

async fn review_summary(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let service = fetch_service(&state, &id)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;

    let latest = sqlx::query_as::<_, ReviewRow>(
        r#"SELECT id, service_id, user_id, booking_id, user_name, user_image, rating, comment, created_at
           FROM reviews
           WHERE service_id = ?
           ORDER BY created_at DESC
           LIMIT 5"#,
    )
    .bind(&service.id)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE service_id = ?")
        .bind(&service.id)
        .fetch_one(&state.db)
        .await?;

    let counts = sqlx::query_as::<_, (i64, i64)>(
        "SELECT rating, COUNT(*) FROM reviews WHERE service_id = ? GROUP BY rating",
    )
    .bind(&service.id)
    .fetch_all(&state.db)
    .await?;

    let distribution: Vec<StarBucket> = (1..=5)
        .rev()
        .map(|star| {
            let count = counts
                .iter()
                .find(|(rating, _)| *rating == star)
                .map(|(_, count)| *count)
                .unwrap_or(0);
            let percentage = if total > 0 {
                ((count as f64 / total as f64) * 1000.0).round() / 10.0
            } else {
                0.0
            };
            StarBucket {
                star,
                count,
                percentage,
            }
        })
        .collect();

    let latest_reviews: Vec<ReviewPayload> = latest.into_iter().map(ReviewPayload::from).collect();

    Ok(HttpResponse::Ok().json(json!({
        "latestReviews": latest_reviews,
        "totalReviews": total,
        "distribution": distribution,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewRequest {
    rating: i64,
    comment: String,
    booking_id: String,
}

/// Review submission authenticates from the Authorization header directly:
/// the sibling GET on the same resource is public, so the route cannot sit
/// behind the scope-level auth middleware.
async fn submit_review(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, ApiError> {
    let auth = basic_auth_user(&state, &req).await?;
    let id = path.into_inner();
    let body = body.into_inner();

    let mut errors = Vec::new();
    if !(1..=5).contains(&body.rating) {
        errors.push("Rating must be between 1 and 5.".to_string());
    }
    if body.comment.trim().is_empty() {
        errors.push("Comment is required.".to_string());
    }
    if body.booking_id.trim().is_empty() {
        errors.push("Booking reference is required.".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let service = fetch_service(&state, &id)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;

    let booking =
        sqlx::query_scalar::<_, String>("SELECT id FROM bookings WHERE id = ? LIMIT 1")
            .bind(body.booking_id.trim())
            .fetch_optional(&state.db)
            .await?;
    let booking_id = booking.ok_or(ApiError::NotFound("Booking"))?;

    let existing =
        sqlx::query_scalar::<_, String>("SELECT id FROM reviews WHERE booking_id = ? LIMIT 1")
            .bind(&booking_id)
            .fetch_optional(&state.db)
            .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "You have already reviewed this service".to_string(),
        ));
    }

    let review_id = new_id();
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"INSERT INTO reviews (id, service_id, user_id, booking_id, user_name, user_image, rating, comment, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&review_id)
    .bind(&service.id)
    .bind(&auth.id)
    .bind(&booking_id)
    .bind(&auth.full_name)
    .bind(&auth.image)
    .bind(body.rating)
    .bind(body.comment.trim())
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|err| {
        ApiError::conflict_on_unique(err, "You have already reviewed this service")
    })?;

    // Full re-aggregation over every review for the service; the two writes
    // are not atomic and self-heal on the next review.
    let (average, count) = sqlx::query_as::<_, (f64, i64)>(
        "SELECT AVG(rating), COUNT(*) FROM reviews WHERE service_id = ?",
    )
    .bind(&service.id)
    .fetch_one(&state.db)
    .await?;

    sqlx::query("UPDATE services SET rating = ?, reviews = ?, updated_at = ? WHERE id = ?")
        .bind(round2(average))
        .bind(count)
        .bind(&now)
        .bind(&service.id)
        .execute(&state.db)
        .await?;

    let row = sqlx::query_as::<_, ReviewRow>(
        r#"SELECT id, service_id, user_id, booking_id, user_name, user_image, rating, comment, created_at
           FROM reviews WHERE id = ?"#,
    )
    .bind(&review_id)
    .fetch_one(&state.db)
    .await?;

    Ok(HttpResponse::Created().json(ReviewPayload::from(row)))
}

async fn basic_auth_user(state: &AppState, req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let auth = Authorization::<Basic>::parse(req).map_err(|_| ApiError::Unauthorized)?;
    let credentials = auth.into_scheme();
    let email = credentials.user_id().to_string();
    let password = credentials.password().unwrap_or_default().to_string();
    authenticate_credentials(state, &email, &password)
        .await
        .ok_or(ApiError::Unauthorized)
}
