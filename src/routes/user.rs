use actix_web::{web, HttpResponse};
use actix_web_httpauth::middleware::HttpAuthentication;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{new_id, user_validator, AuthUser},
    booking::{
        amount_minor, duration_in_bounds, total_cost, BookingStatus, PaymentPreference,
        PaymentStatus, MAX_DURATION_HOURS, MIN_DURATION_HOURS,
    },
    db::fetch_booking,
    email::InvoiceData,
    error::ApiError,
    models::{BookingPayload, BookingRow, UserPayload, UserRow},
    payments::IntentMetadata,
    routes::public::fetch_service,
    state::AppState,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    let auth = HttpAuthentication::basic(user_validator);
    cfg.service(
        web::resource("/bookings")
            .wrap(auth.clone())
            .route(web::get().to(my_bookings))
            .route(web::post().to(create_booking)),
    )
    .service(
        web::resource("/bookings/{id}/cancel")
            .wrap(auth.clone())
            .route(web::patch().to(cancel_booking)),
    )
    .service(
        web::resource("/create-payment-intent")
            .wrap(auth.clone())
            .route(web::post().to(create_payment_intent)),
    )
    .service(
        web::resource("/user")
            .wrap(auth)
            .route(web::get().to(get_profile))
            .route(web::patch().to(update_profile)),
    );
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationRequest {
    division: String,
    district: String,
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingRequest {
    service_id: String,
    date: String,
    duration: i64,
    location: LocationRequest,
    email: String,
    #[serde(default)]
    payment_preference: Option<String>,
    #[serde(default)]
    transaction_id: Option<String>,
}

async fn create_booking(
    state: web::Data<AppState>,
    auth: web::ReqData<AuthUser>,
    body: web::Json<BookingRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let mut errors = Vec::new();

    if !duration_in_bounds(body.duration) {
        errors.push(format!(
            "Duration must be between {MIN_DURATION_HOURS} and {MAX_DURATION_HOURS} hours."
        ));
    }
    if body.date.trim().is_empty() {
        errors.push("Date is required.".to_string());
    }
    if body.location.division.trim().is_empty() {
        errors.push("Division is required.".to_string());
    }
    if body.location.district.trim().is_empty() {
        errors.push("District is required.".to_string());
    }
    if body.location.address.trim().is_empty() {
        errors.push("Full address is required.".to_string());
    }
    if !body.email.contains('@') {
        errors.push("A valid contact email is required.".to_string());
    }

    let preference = body
        .payment_preference
        .as_deref()
        .unwrap_or(PaymentPreference::PayLater.as_str())
        .parse::<PaymentPreference>()
        .map_err(|_| {
            ApiError::Validation(vec![
                "Payment preference must be pay-now or pay-later.".to_string()
            ])
        })?;

    let transaction_id = body
        .transaction_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    if preference == PaymentPreference::PayNow && transaction_id.is_none() {
        errors.push("A transaction id is required for pay-now bookings.".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let service = fetch_service(&state, body.service_id.trim())
        .await?
        .ok_or(ApiError::NotFound("Service"))?;

    // Cost is computed here, from the offering's current price. Any
    // client-supplied figure never reaches the ledger.
    let cost = total_cost(body.duration, service.price_per_hour);
    let payment_status = match preference {
        PaymentPreference::PayNow => PaymentStatus::Paid,
        PaymentPreference::PayLater => PaymentStatus::Unpaid,
    };
    let transaction_id = match preference {
        PaymentPreference::PayNow => transaction_id,
        PaymentPreference::PayLater => None,
    };

    let booking_id = new_id();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"INSERT INTO bookings
           (id, user_id, service_id, service_name, date, duration, total_cost,
            division, district, address, email, payment_preference, payment_status,
            transaction_id, status, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&booking_id)
    .bind(&auth.id)
    .bind(&service.slug)
    .bind(&service.title)
    .bind(body.date.trim())
    .bind(body.duration)
    .bind(cost)
    .bind(body.location.division.trim())
    .bind(body.location.district.trim())
    .bind(body.location.address.trim())
    .bind(body.email.trim())
    .bind(preference.as_str())
    .bind(payment_status.as_str())
    .bind(&transaction_id)
    .bind(BookingStatus::Pending.as_str())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    log::info!(
        "Booking {booking_id} created for {} ({} h, {} {})",
        service.slug,
        body.duration,
        cost,
        preference.as_str()
    );

    if payment_status == PaymentStatus::Paid {
        if let Some(mailer) = &state.mailer {
            mailer.send_invoice(InvoiceData {
                order_id: booking_id.clone(),
                customer_name: auth.full_name.clone(),
                customer_email: body.email.trim().to_string(),
                service_name: service.title.clone(),
                date: body.date.trim().to_string(),
                duration: body.duration,
                total_cost: cost,
                address: body.location.address.trim().to_string(),
            });
        }
    }

    let row = fetch_booking(&state.db, &booking_id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Booking created successfully",
        "booking": BookingPayload::from(row),
    })))
}

async fn my_bookings(
    state: web::Data<AppState>,
    auth: web::ReqData<AuthUser>,
) -> Result<HttpResponse, ApiError> {
    let rows = sqlx::query_as::<_, BookingRow>(
        r#"SELECT b.*, u.full_name AS user_name, u.email AS user_email
           FROM bookings b
           LEFT JOIN users u ON b.user_id = u.id
           WHERE b.user_id = ?
           ORDER BY b.created_at DESC"#,
    )
    .bind(&auth.id)
    .fetch_all(&state.db)
    .await?;

    let bookings: Vec<BookingPayload> = rows.into_iter().map(BookingPayload::from).collect();
    Ok(HttpResponse::Ok().json(bookings))
}

async fn cancel_booking(
    state: web::Data<AppState>,
    auth: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let booking_id = path.into_inner();
    let booking = fetch_booking(&state.db, &booking_id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    if booking.user_id != auth.id {
        return Err(ApiError::Forbidden);
    }
    if booking.status == BookingStatus::Cancelled.as_str() {
        return Err(ApiError::Conflict(
            "Booking is already cancelled".to_string(),
        ));
    }

    sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
        .bind(BookingStatus::Cancelled.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(&booking_id)
        .execute(&state.db)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Booking cancelled successfully" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentRequest {
    service_id: String,
    duration: i64,
}

async fn create_payment_intent(
    state: web::Data<AppState>,
    auth: web::ReqData<AuthUser>,
    body: web::Json<IntentRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    if !duration_in_bounds(body.duration) {
        return Err(ApiError::Validation(vec![format!(
            "Duration must be between {MIN_DURATION_HOURS} and {MAX_DURATION_HOURS} hours."
        )]));
    }

    let service = fetch_service(&state, body.service_id.trim())
        .await?
        .ok_or(ApiError::NotFound("Service"))?;

    let amount = amount_minor(body.duration, service.price_per_hour);
    let intent = state
        .payments
        .create_intent(
            amount,
            IntentMetadata {
                user_id: auth.id.clone(),
                service_id: service.slug.clone(),
                duration: body.duration,
            },
        )
        .await
        .map_err(|err| ApiError::Upstream(err.to_string()))?;

    Ok(HttpResponse::Ok().json(json!({ "clientSecret": intent.client_secret })))
}

async fn get_profile(
    state: web::Data<AppState>,
    auth: web::ReqData<AuthUser>,
) -> Result<HttpResponse, ApiError> {
    let row = fetch_user(&state, &auth.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(UserPayload::from(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest {
    full_name: String,
    contact: Option<String>,
    address: Option<String>,
    bio: Option<String>,
    nid: Option<String>,
    image: Option<String>,
}

async fn update_profile(
    state: web::Data<AppState>,
    auth: web::ReqData<AuthUser>,
    body: web::Json<ProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let mut errors = Vec::new();
    if body.full_name.trim().len() < 2 {
        errors.push("Name must be at least 2 characters.".to_string());
    }
    if body.bio.as_deref().map(str::len).unwrap_or(0) > 300 {
        errors.push("Bio must be less than 300 characters.".to_string());
    }
    if let Some(image) = body.image.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        if !image.starts_with("http://") && !image.starts_with("https://") {
            errors.push("Image must be a valid URL.".to_string());
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    sqlx::query(
        r#"UPDATE users
           SET full_name = ?, contact = ?, address = ?, bio = ?, nid = ?, image = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(body.full_name.trim())
    .bind(&body.contact)
    .bind(&body.address)
    .bind(&body.bio)
    .bind(&body.nid)
    .bind(&body.image)
    .bind(Utc::now().to_rfc3339())
    .bind(&auth.id)
    .execute(&state.db)
    .await?;

    let row = fetch_user(&state, &auth.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(UserPayload::from(row)))
}

async fn fetch_user(state: &AppState, id: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"SELECT id, full_name, email, password_hash, auth_type, role,
                  contact, address, bio, nid, image, created_at, updated_at
           FROM users WHERE id = ? LIMIT 1"#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await
}
