use actix_web::{web, HttpResponse};
use actix_web_httpauth::middleware::HttpAuthentication;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite};

use crate::{
    auth::{admin_validator, new_id},
    booking::{BookingStatus, PaymentStatus},
    catalog::slugify,
    db::fetch_booking,
    error::ApiError,
    models::{
        BookingPayload, BookingRow, ServicePayload, ServiceRow, UserPayload, UserRow, ROLE_ADMIN,
        ROLE_USER,
    },
    pagination::{ListQuery, Pagination},
    state::AppState,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(HttpAuthentication::basic(admin_validator))
            .service(
                web::resource("/bookings")
                    .route(web::get().to(list_bookings))
                    .route(web::patch().to(update_booking_status)),
            )
            .service(web::resource("/payments").route(web::get().to(list_payments)))
            .service(
                web::resource("/services")
                    .route(web::get().to(list_services))
                    .route(web::post().to(create_service))
                    .route(web::patch().to(update_service))
                    .route(web::delete().to(delete_service)),
            )
            .service(
                web::resource("/users")
                    .route(web::get().to(list_users))
                    .route(web::patch().to(mutate_user)),
            ),
    );
}

/// Search matches user name/email, booking id, and service name with OR
/// semantics: matching account ids are resolved first, then bookings are
/// filtered against id/serviceName substrings or that owner set.
async fn list_bookings(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "all")
        .map(str::to_string);

    let search = query.search().map(str::to_string);
    let user_ids: Vec<String> = match &search {
        Some(term) => {
            let pattern = format!("%{term}%");
            sqlx::query_scalar("SELECT id FROM users WHERE full_name LIKE ? OR email LIKE ?")
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&state.db)
                .await?
        }
        None => Vec::new(),
    };

    let push_filters = |builder: &mut QueryBuilder<Sqlite>| {
        builder.push(" WHERE 1 = 1");
        if let Some(status) = &status {
            builder.push(" AND b.status = ").push_bind(status.clone());
        }
        if let Some(term) = &search {
            let pattern = format!("%{term}%");
            builder
                .push(" AND (b.id LIKE ")
                .push_bind(pattern.clone())
                .push(" OR b.service_name LIKE ")
                .push_bind(pattern);
            if !user_ids.is_empty() {
                builder.push(" OR b.user_id IN (");
                let mut separated = builder.separated(", ");
                for id in &user_ids {
                    separated.push_bind(id.clone());
                }
                builder.push(")");
            }
            builder.push(")");
        }
    };

    let mut count_builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM bookings b");
    push_filters(&mut count_builder);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(&state.db)
        .await?;

    let mut rows_builder = QueryBuilder::<Sqlite>::new(
        "SELECT b.*, u.full_name AS user_name, u.email AS user_email \
         FROM bookings b LEFT JOIN users u ON b.user_id = u.id",
    );
    push_filters(&mut rows_builder);
    rows_builder
        .push(" ORDER BY b.created_at DESC LIMIT ")
        .push_bind(query.limit())
        .push(" OFFSET ")
        .push_bind(query.offset());

    let rows: Vec<BookingRow> = rows_builder
        .build_query_as()
        .fetch_all(&state.db)
        .await?;

    let bookings: Vec<BookingPayload> = rows.into_iter().map(BookingPayload::from).collect();
    Ok(HttpResponse::Ok().json(json!({
        "bookings": bookings,
        "pagination": Pagination::new(total, &query),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdateRequest {
    booking_id: String,
    status: String,
}

async fn update_booking_status(
    state: web::Data<AppState>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let status = body
        .status
        .parse::<BookingStatus>()
        .ok()
        .filter(BookingStatus::admin_settable)
        .ok_or_else(|| {
            ApiError::Validation(vec![format!("'{}' is not a settable status.", body.status)])
        })?;

    let booking = fetch_booking(&state.db, &body.booking_id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    // No legality check against the current state; any settable status may
    // replace any other, last write wins.
    sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(&booking.id)
        .execute(&state.db)
        .await?;

    let updated = fetch_booking(&state.db, &booking.id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Status updated successfully",
        "booking": BookingPayload::from(updated),
    })))
}

async fn list_payments(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let (total, rows) = match query.search() {
        Some(term) => {
            let pattern = format!("%{term}%");
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM bookings \
                 WHERE payment_status = ? AND (transaction_id LIKE ? OR service_name LIKE ?)",
            )
            .bind(PaymentStatus::Paid.as_str())
            .bind(&pattern)
            .bind(&pattern)
            .fetch_one(&state.db)
            .await?;

            let rows = sqlx::query_as::<_, BookingRow>(
                r#"SELECT b.*, u.full_name AS user_name, u.email AS user_email
                   FROM bookings b
                   LEFT JOIN users u ON b.user_id = u.id
                   WHERE b.payment_status = ? AND (b.transaction_id LIKE ? OR b.service_name LIKE ?)
                   ORDER BY b.updated_at DESC
                   LIMIT ? OFFSET ?"#,
            )
            .bind(PaymentStatus::Paid.as_str())
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&state.db)
            .await?;
            (total, rows)
        }
        None => {
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE payment_status = ?")
                    .bind(PaymentStatus::Paid.as_str())
                    .fetch_one(&state.db)
                    .await?;

            let rows = sqlx::query_as::<_, BookingRow>(
                r#"SELECT b.*, u.full_name AS user_name, u.email AS user_email
                   FROM bookings b
                   LEFT JOIN users u ON b.user_id = u.id
                   WHERE b.payment_status = ?
                   ORDER BY b.updated_at DESC
                   LIMIT ? OFFSET ?"#,
            )
            .bind(PaymentStatus::Paid.as_str())
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&state.db)
            .await?;
            (total, rows)
        }
    };

    let payments: Vec<BookingPayload> = rows.into_iter().map(BookingPayload::from).collect();
    Ok(HttpResponse::Ok().json(json!({
        "payments": payments,
        "pagination": Pagination::new(total, &query),
    })))
}

async fn list_services(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = sqlx::query_as::<_, ServiceRow>(
        r#"SELECT id, slug, title, tagline, description, long_description, features,
                  price_per_hour, rating, reviews, image, is_active, created_at, updated_at
           FROM services
           ORDER BY created_at DESC"#,
    )
    .fetch_all(&state.db)
    .await?;

    let services: Vec<ServicePayload> = rows.into_iter().map(ServicePayload::from).collect();
    Ok(HttpResponse::Ok().json(services))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceForm {
    title: String,
    tag_line: String,
    description: String,
    long_description: String,
    price: f64,
    image: String,
    features: Vec<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

fn validate_service_form(form: &ServiceForm) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if form.title.trim().len() < 3 {
        errors.push("Title must be at least 3 characters.".to_string());
    }
    if form.tag_line.trim().len() < 5 {
        errors.push("Tagline must be at least 5 characters.".to_string());
    }
    if form.description.trim().len() < 10 {
        errors.push("Description must be at least 10 characters.".to_string());
    }
    if form.long_description.trim().len() < 10 {
        errors.push("Long description must be at least 10 characters.".to_string());
    }
    if form.price <= 0.0 {
        errors.push("Price per hour must be positive.".to_string());
    }
    if form.image.trim().is_empty() {
        errors.push("Image URL is required.".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

async fn create_service(
    state: web::Data<AppState>,
    body: web::Json<ServiceForm>,
) -> Result<HttpResponse, ApiError> {
    let form = body.into_inner();
    validate_service_form(&form)?;

    let slug = slugify(form.title.trim());
    if slug.is_empty() {
        return Err(ApiError::Validation(vec![
            "Title must contain at least one alphanumeric character.".to_string(),
        ]));
    }

    let existing = sqlx::query_scalar::<_, String>("SELECT id FROM services WHERE slug = ? LIMIT 1")
        .bind(&slug)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Service with this name already exists".to_string(),
        ));
    }

    let service_id = new_id();
    let now = Utc::now().to_rfc3339();
    let features = serde_json::to_string(&form.features).unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        r#"INSERT INTO services
           (id, slug, title, tagline, description, long_description, features,
            price_per_hour, image, is_active, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&service_id)
    .bind(&slug)
    .bind(form.title.trim())
    .bind(form.tag_line.trim())
    .bind(form.description.trim())
    .bind(form.long_description.trim())
    .bind(&features)
    .bind(form.price)
    .bind(form.image.trim())
    .bind(form.is_active.unwrap_or(true) as i64)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|err| {
        ApiError::conflict_on_unique(err, "Service with this name already exists")
    })?;

    log::info!("Service '{slug}' created");

    let row = sqlx::query_as::<_, ServiceRow>(
        r#"SELECT id, slug, title, tagline, description, long_description, features,
                  price_per_hour, rating, reviews, image, is_active, created_at, updated_at
           FROM services WHERE id = ?"#,
    )
    .bind(&service_id)
    .fetch_one(&state.db)
    .await?;

    Ok(HttpResponse::Created().json(ServicePayload::from(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceUpdateForm {
    id: String,
    #[serde(flatten)]
    form: ServiceForm,
}

/// Edits never touch the slug; bookings denormalize name and cost at
/// creation time, so historical records are unaffected either way.
async fn update_service(
    state: web::Data<AppState>,
    body: web::Json<ServiceUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    let ServiceUpdateForm { id, form } = body.into_inner();
    if id.trim().is_empty() {
        return Err(ApiError::Validation(vec![
            "Service ID is required.".to_string()
        ]));
    }
    validate_service_form(&form)?;

    let features = serde_json::to_string(&form.features).unwrap_or_else(|_| "[]".to_string());
    let result = sqlx::query(
        r#"UPDATE services
           SET title = ?, tagline = ?, description = ?, long_description = ?,
               features = ?, price_per_hour = ?, image = ?, is_active = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(form.title.trim())
    .bind(form.tag_line.trim())
    .bind(form.description.trim())
    .bind(form.long_description.trim())
    .bind(&features)
    .bind(form.price)
    .bind(form.image.trim())
    .bind(form.is_active.unwrap_or(true) as i64)
    .bind(Utc::now().to_rfc3339())
    .bind(id.trim())
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Service"));
    }

    let row = sqlx::query_as::<_, ServiceRow>(
        r#"SELECT id, slug, title, tagline, description, long_description, features,
                  price_per_hour, rating, reviews, image, is_active, created_at, updated_at
           FROM services WHERE id = ?"#,
    )
    .bind(id.trim())
    .fetch_one(&state.db)
    .await?;

    Ok(HttpResponse::Ok().json(ServicePayload::from(row)))
}

#[derive(Debug, Deserialize)]
struct DeleteQuery {
    id: String,
}

async fn delete_service(
    state: web::Data<AppState>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ApiError> {
    let result = sqlx::query("DELETE FROM services WHERE id = ?")
        .bind(query.id.trim())
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Service"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Service deleted successfully" })))
}

async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"SELECT id, full_name, email, password_hash, auth_type, role,
                  contact, address, bio, nid, image, created_at, updated_at
           FROM users
           ORDER BY created_at DESC"#,
    )
    .fetch_all(&state.db)
    .await?;

    let users: Vec<UserPayload> = rows.into_iter().map(UserPayload::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserMutationRequest {
    user_id: String,
    action: String,
}

async fn mutate_user(
    state: web::Data<AppState>,
    body: web::Json<UserMutationRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    match body.action.as_str() {
        // Deletion is immediate and unrecoverable; bookings keep their
        // user_id reference and surface as ownerless.
        "delete" => {
            let result = sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(&body.user_id)
                .execute(&state.db)
                .await?;
            if result.rows_affected() == 0 {
                return Err(ApiError::NotFound("User"));
            }
            log::info!("User {} deleted by admin", body.user_id);
            Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
        }
        "toggle_role" => {
            let role = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = ?")
                .bind(&body.user_id)
                .fetch_optional(&state.db)
                .await?
                .ok_or(ApiError::NotFound("User"))?;

            let new_role = if role == ROLE_ADMIN { ROLE_USER } else { ROLE_ADMIN };
            sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
                .bind(new_role)
                .bind(Utc::now().to_rfc3339())
                .bind(&body.user_id)
                .execute(&state.db)
                .await?;

            log::info!("User {} role toggled to {new_role}", body.user_id);
            Ok(HttpResponse::Ok().json(json!({
                "message": "User role updated",
                "role": new_role,
            })))
        }
        _ => Err(ApiError::Validation(vec!["Invalid action".to_string()])),
    }
}
