use serde::Serialize;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

pub const AUTH_TYPE_CREDENTIALS: &str = "credentials";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub auth_type: String,
    pub role: String,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub nid: Option<String>,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceRow {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub long_description: String,
    pub features: String,
    pub price_per_hour: f64,
    pub rating: f64,
    pub reviews: i64,
    pub image: String,
    pub is_active: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Booking row plus the owner's name/email resolved via LEFT JOIN. The join
/// columns are NULL when the owning account has been deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub id: String,
    pub user_id: String,
    pub service_id: String,
    pub service_name: String,
    pub date: String,
    pub duration: i64,
    pub total_cost: f64,
    pub division: String,
    pub district: String,
    pub address: String,
    pub email: String,
    pub payment_preference: String,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: String,
    pub service_id: String,
    pub user_id: String,
    pub booking_id: String,
    pub user_name: String,
    pub user_image: Option<String>,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub long_description: String,
    pub features: Vec<String>,
    pub price_per_hour: f64,
    pub rating: f64,
    pub reviews: i64,
    pub image: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ServiceRow> for ServicePayload {
    fn from(row: ServiceRow) -> Self {
        let features = serde_json::from_str(&row.features).unwrap_or_default();
        ServicePayload {
            id: row.id,
            slug: row.slug,
            title: row.title,
            tagline: row.tagline,
            description: row.description,
            long_description: row.long_description,
            features,
            price_per_hour: row.price_per_hour,
            rating: row.rating,
            reviews: row.reviews,
            image: row.image,
            is_active: row.is_active != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub division: String,
    pub district: String,
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOwner {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub id: String,
    pub user_id: String,
    pub service_id: String,
    pub service_name: String,
    pub date: String,
    pub duration: i64,
    pub total_cost: f64,
    pub location: LocationPayload,
    pub email: String,
    pub payment_preference: String,
    pub payment_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<BookingOwner>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BookingRow> for BookingPayload {
    fn from(row: BookingRow) -> Self {
        let user = match (row.user_name, row.user_email) {
            (Some(full_name), Some(email)) => Some(BookingOwner { full_name, email }),
            _ => None,
        };
        BookingPayload {
            id: row.id,
            user_id: row.user_id,
            service_id: row.service_id,
            service_name: row.service_name,
            date: row.date,
            duration: row.duration,
            total_cost: row.total_cost,
            location: LocationPayload {
                division: row.division,
                district: row.district,
                address: row.address,
            },
            email: row.email,
            payment_preference: row.payment_preference,
            payment_status: row.payment_status,
            transaction_id: row.transaction_id,
            status: row.status,
            user,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Account as exposed over the API: the password hash never leaves the
/// database layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub auth_type: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRow> for UserPayload {
    fn from(row: UserRow) -> Self {
        UserPayload {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            auth_type: row.auth_type,
            role: row.role,
            contact: row.contact,
            address: row.address,
            bio: row.bio,
            nid: row.nid,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub id: String,
    pub service_id: String,
    pub user_id: String,
    pub booking_id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

impl From<ReviewRow> for ReviewPayload {
    fn from(row: ReviewRow) -> Self {
        ReviewPayload {
            id: row.id,
            service_id: row.service_id,
            user_id: row.user_id,
            booking_id: row.booking_id,
            user_name: row.user_name,
            user_image: row.user_image,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}
