use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use seva_core::{Capacity, CatalogRepository, Category, Offering, RepoError};

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OfferingRow {
    id: i32,
    name: String,
    name_malayalam: String,
    malayalam_date: String,
    day: String,
    bookable_date: Option<NaiveDate>,
    amount: Option<i32>,
    category: String,
    parent_key: Option<String>,
    description: Option<String>,
    description_english: Option<String>,
    capacity: Option<i32>,
    online_booking_available: bool,
    requires_direct_visit: bool,
    requires_notification: bool,
    requires_advance_booking: bool,
    requires_booking: bool,
    is_comprehensive_ritual: bool,
}

impl From<OfferingRow> for Offering {
    fn from(row: OfferingRow) -> Self {
        Offering {
            id: row.id,
            name: row.name,
            name_malayalam: row.name_malayalam,
            malayalam_date: row.malayalam_date,
            day: row.day,
            bookable_date: row.bookable_date,
            amount: row.amount,
            category: Category::parse(&row.category).unwrap_or(Category::Regular),
            parent_key: row.parent_key,
            description: row.description,
            description_english: row.description_english,
            capacity: Capacity::from(row.capacity.and_then(|n| u32::try_from(n).ok())),
            online_booking_available: row.online_booking_available,
            requires_direct_visit: row.requires_direct_visit,
            requires_notification: row.requires_notification,
            requires_advance_booking: row.requires_advance_booking,
            requires_booking: row.requires_booking,
            is_comprehensive_ritual: row.is_comprehensive_ritual,
        }
    }
}

const OFFERING_COLUMNS: &str = "id, name, name_malayalam, malayalam_date, day, bookable_date, \
     amount, category, parent_key, description, description_english, capacity, \
     online_booking_available, requires_direct_visit, requires_notification, \
     requires_advance_booking, requires_booking, is_comprehensive_ritual";

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Offering>, RepoError> {
        let row = sqlx::query_as::<_, OfferingRow>(&format!(
            "SELECT {OFFERING_COLUMNS} FROM offerings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Offering::from))
    }

    async fn list_all(&self) -> Result<Vec<Offering>, RepoError> {
        let rows = sqlx::query_as::<_, OfferingRow>(&format!(
            "SELECT {OFFERING_COLUMNS} FROM offerings ORDER BY bookable_date NULLS LAST, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Offering::from).collect())
    }

    async fn list_by_category(&self, category: Category) -> Result<Vec<Offering>, RepoError> {
        let rows = sqlx::query_as::<_, OfferingRow>(&format!(
            "SELECT {OFFERING_COLUMNS} FROM offerings WHERE category = $1 ORDER BY id"
        ))
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Offering::from).collect())
    }

    async fn find_subcategories(&self, parent_key: &str) -> Result<Vec<Offering>, RepoError> {
        let rows = sqlx::query_as::<_, OfferingRow>(&format!(
            "SELECT {OFFERING_COLUMNS} FROM offerings WHERE parent_key = $1 ORDER BY id"
        ))
        .bind(parent_key)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Offering::from).collect())
    }

    async fn list_stars(&self) -> Result<Vec<String>, RepoError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM stars ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
