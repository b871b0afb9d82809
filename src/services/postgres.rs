use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use crate::models::{
    Amenity, Category, Coordinates, Feedback, Gym, GymAmenity, GymCategory, GymPatch, Message,
    Review, ReviewStatus, Role, User,
};
use crate::services::directory::{GymDirectory, StoreError};

const GYM_COLUMNS: &str = r#"
    id, name, location, description, longitude, latitude, rating, review_count,
    price_range, hours, images, status, owner_id, place_id, is_featured,
    created_at, updated_at
"#;

const REVIEW_COLUMNS: &str = "id, gym_id, user_id, rating, content, status, created_at";

const USER_COLUMNS: &str = "id, email, name, role, avatar_url, created_at";

/// PostgreSQL-backed gym directory
///
/// Talks directly to the hosted directory database rather than through
/// its REST layer.
pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    /// Create a new directory client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new directory client from optional settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to gym directory database");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

/// `ILIKE` pattern for a substring match, with wildcards in the input escaped
pub fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn parse_column<T: std::str::FromStr<Err = String>>(row: &PgRow, column: &str) -> Result<T, StoreError> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(StoreError::InvalidInput)
}

fn gym_from_row(row: &PgRow) -> Result<Gym, StoreError> {
    let review_count: i32 = row.try_get("review_count")?;
    Ok(Gym {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        description: row.try_get::<Option<String>, _>("description")?.unwrap_or_default(),
        coordinates: Coordinates::new(row.try_get("longitude")?, row.try_get("latitude")?),
        rating: row.try_get("rating")?,
        review_count: review_count.max(0) as u32,
        price_range: row.try_get("price_range")?,
        hours: row.try_get::<Option<String>, _>("hours")?.unwrap_or_default(),
        images: row.try_get::<Option<Vec<String>>, _>("images")?.unwrap_or_default(),
        status: parse_column(row, "status")?,
        owner_id: row.try_get("owner_id")?,
        place_id: row.try_get("place_id")?,
        is_featured: row.try_get("is_featured")?,
        distance: None,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn review_from_row(row: &PgRow) -> Result<Review, StoreError> {
    let rating: i16 = row.try_get("rating")?;
    Ok(Review {
        id: row.try_get("id")?,
        gym_id: row.try_get("gym_id")?,
        user_id: row.try_get("user_id")?,
        rating: rating.clamp(0, 5) as u8,
        content: row.try_get("content")?,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: parse_column::<Role>(row, "role")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: row.try_get("created_at")?,
    })
}

fn collect_rows<T>(
    rows: &[PgRow],
    map: impl Fn(&PgRow) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    rows.iter().map(map).collect()
}

#[async_trait]
impl GymDirectory for PostgresDirectory {
    async fn gyms_by_location(&self, text: &str) -> Result<Vec<Gym>, StoreError> {
        let query = format!(
            r#"SELECT {} FROM gyms WHERE location ILIKE $1 ESCAPE '\' ORDER BY created_at, id"#,
            GYM_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(like_pattern(text))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Location '{}' matched {} gyms", text, rows.len());

        collect_rows(&rows, gym_from_row)
    }

    async fn gym_by_id(&self, id: &str) -> Result<Option<Gym>, StoreError> {
        let query = format!("SELECT {} FROM gyms WHERE id = $1", GYM_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(gym_from_row).transpose()
    }

    async fn gyms_by_place_ids(&self, place_ids: &[String]) -> Result<Vec<Gym>, StoreError> {
        if place_ids.is_empty() {
            return Ok(vec![]);
        }

        let query = format!("SELECT {} FROM gyms WHERE place_id = ANY($1)", GYM_COLUMNS);
        let rows = sqlx::query(&query)
            .bind(place_ids)
            .fetch_all(&self.pool)
            .await?;

        collect_rows(&rows, gym_from_row)
    }

    async fn gyms_by_owner(&self, owner_id: &str) -> Result<Vec<Gym>, StoreError> {
        let query = format!(
            "SELECT {} FROM gyms WHERE owner_id = $1 ORDER BY name",
            GYM_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        collect_rows(&rows, gym_from_row)
    }

    /// Only the provided fields change; `updated_at` always moves
    async fn update_gym(&self, id: &str, patch: &GymPatch) -> Result<Gym, StoreError> {
        let query = format!(
            r#"
            UPDATE gyms SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                description = COALESCE($4, description),
                longitude = COALESCE($5, longitude),
                latitude = COALESCE($6, latitude),
                price_range = COALESCE($7, price_range),
                hours = COALESCE($8, hours),
                images = COALESCE($9, images),
                status = COALESCE($10, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            GYM_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.location.as_deref())
            .bind(patch.description.as_deref())
            .bind(patch.coordinates.map(|c| c.longitude))
            .bind(patch.coordinates.map(|c| c.latitude))
            .bind(patch.price_range.as_deref())
            .bind(patch.hours.as_deref())
            .bind(patch.images.clone())
            .bind(patch.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| StoreError::NotFound(format!("gym {}", id)))?;
        tracing::info!("Updated gym {}", id);
        gym_from_row(&row)
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, name, icon FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(Category {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    icon: row.try_get::<Option<String>, _>("icon")?.unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn amenities(&self) -> Result<Vec<Amenity>, StoreError> {
        let rows = sqlx::query("SELECT id, name, icon FROM amenities ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(Amenity {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    icon: row.try_get::<Option<String>, _>("icon")?.unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn gym_categories(&self, gym_ids: &[String]) -> Result<Vec<GymCategory>, StoreError> {
        if gym_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query(
            "SELECT id, gym_id, category_id FROM gym_categories WHERE gym_id = ANY($1)",
        )
        .bind(gym_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(GymCategory {
                    id: row.try_get("id")?,
                    gym_id: row.try_get("gym_id")?,
                    category_id: row.try_get("category_id")?,
                })
            })
            .collect()
    }

    async fn gym_amenities(&self, gym_ids: &[String]) -> Result<Vec<GymAmenity>, StoreError> {
        if gym_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query(
            "SELECT id, gym_id, amenity_id, is_available FROM gym_amenities WHERE gym_id = ANY($1)",
        )
        .bind(gym_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(GymAmenity {
                    id: row.try_get("id")?,
                    gym_id: row.try_get("gym_id")?,
                    amenity_id: row.try_get("amenity_id")?,
                    is_available: row.try_get("is_available")?,
                })
            })
            .collect()
    }

    async fn published_reviews(&self, gym_id: &str) -> Result<Vec<Review>, StoreError> {
        let query = format!(
            "SELECT {} FROM reviews WHERE gym_id = $1 AND status = 'published' ORDER BY created_at DESC",
            REVIEW_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(gym_id)
            .fetch_all(&self.pool)
            .await?;

        collect_rows(&rows, review_from_row)
    }

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, gym_id, user_id, rating, content, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&review.id)
        .bind(&review.gym_id)
        .bind(&review.user_id)
        .bind(review.rating as i16)
        .bind(&review.content)
        .bind(review.status.as_str())
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Inserted review {} for gym {}", review.id, review.gym_id);
        Ok(())
    }

    async fn update_review_status(
        &self,
        id: &str,
        status: ReviewStatus,
    ) -> Result<Review, StoreError> {
        let query = format!(
            "UPDATE reviews SET status = $2 WHERE id = $1 RETURNING {}",
            REVIEW_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| StoreError::NotFound(format!("review {}", id)))?;
        review_from_row(&row)
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO feedback (
                id, gym_id, user_id, rating, review, amenities_confirmed,
                amenities_missing, is_accurate, inaccuracy_details, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&feedback.id)
        .bind(&feedback.gym_id)
        .bind(&feedback.user_id)
        .bind(feedback.rating as i16)
        .bind(&feedback.review)
        .bind(Json(&feedback.amenities_confirmed))
        .bind(&feedback.amenities_missing)
        .bind(feedback.is_accurate)
        .bind(feedback.inaccuracy_details.as_deref())
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Inserted feedback {} for gym {}", feedback.id, feedback.gym_id);
        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, subject, content, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&message.id)
        .bind(&message.sender_id)
        .bind(&message.recipient_id)
        .bind(&message.subject)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        let query = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        collect_rows(&rows, user_from_row)
    }

    async fn update_user_role(&self, id: &str, role: Role) -> Result<User, StoreError> {
        let query = format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        tracing::info!("Changed role of user {} to {}", id, role);
        user_from_row(&row)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_text() {
        assert_eq!(like_pattern("Tampa, FL"), "%Tampa, FL%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_fit"), "%100\\%\\_fit%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
