use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Car, NewCar};

#[derive(Error, Debug)]
pub enum CarStoreError {
    #[error("Car {0} not found")]
    NotFound(Uuid),

    #[error("Registration number {0} is already in use")]
    DuplicateRegistration(String),

    #[error("Car storage failure: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for CarStoreError {
    fn from(e: sqlx::Error) -> Self {
        CarStoreError::Internal(e.to_string())
    }
}

#[async_trait]
pub trait CarStore: Send + Sync {
    /// All cars, oldest first
    async fn list_cars(&self) -> Result<Vec<Car>, CarStoreError>;

    async fn get_car(&self, id: Uuid) -> Result<Car, CarStoreError>;

    async fn create_car(&self, car: &NewCar) -> Result<Car, CarStoreError>;

    /// Replace every mutable field of an existing car
    async fn update_car(&self, id: Uuid, car: &NewCar) -> Result<Car, CarStoreError>;

    async fn delete_car(&self, id: Uuid) -> Result<(), CarStoreError>;
}

fn map_write_error(e: sqlx::Error, registration_no: &str) -> CarStoreError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            CarStoreError::DuplicateRegistration(registration_no.to_string())
        }
        e => e.into(),
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Clone)]
pub struct PgCarStore {
    db_pool: PgPool,
}

impl PgCarStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CarStore for PgCarStore {
    async fn list_cars(&self) -> Result<Vec<Car>, CarStoreError> {
        let cars = sqlx::query_as::<_, Car>("SELECT * FROM cars ORDER BY created_at ASC")
            .fetch_all(&self.db_pool)
            .await?;

        Ok(cars)
    }

    async fn get_car(&self, id: Uuid) -> Result<Car, CarStoreError> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(CarStoreError::NotFound(id))
    }

    async fn create_car(&self, car: &NewCar) -> Result<Car, CarStoreError> {
        let now = Utc::now();

        sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (id, category, color, model, make, registration_no, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(car.category)
        .bind(&car.color)
        .bind(&car.model)
        .bind(&car.make)
        .bind(&car.registration_no)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| map_write_error(e, &car.registration_no))
    }

    async fn update_car(&self, id: Uuid, car: &NewCar) -> Result<Car, CarStoreError> {
        sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET category = $2, color = $3, model = $4, make = $5, registration_no = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(car.category)
        .bind(&car.color)
        .bind(&car.model)
        .bind(&car.make)
        .bind(&car.registration_no)
        .bind(Utc::now())
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| map_write_error(e, &car.registration_no))?
        .ok_or(CarStoreError::NotFound(id))
    }

    async fn delete_car(&self, id: Uuid) -> Result<(), CarStoreError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CarStoreError::NotFound(id));
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Default)]
pub struct InMemoryCarStore {
    cars: Arc<RwLock<HashMap<Uuid, Car>>>,
}

impl InMemoryCarStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn registration_taken(cars: &HashMap<Uuid, Car>, registration_no: &str, except: Option<Uuid>) -> bool {
    cars.values()
        .any(|car| car.registration_no == registration_no && Some(car.id) != except)
}

#[async_trait]
impl CarStore for InMemoryCarStore {
    async fn list_cars(&self) -> Result<Vec<Car>, CarStoreError> {
        let mut cars: Vec<Car> = self.cars.read().await.values().cloned().collect();
        cars.sort_by_key(|car| (car.created_at, car.id));
        Ok(cars)
    }

    async fn get_car(&self, id: Uuid) -> Result<Car, CarStoreError> {
        self.cars
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CarStoreError::NotFound(id))
    }

    async fn create_car(&self, car: &NewCar) -> Result<Car, CarStoreError> {
        let mut cars = self.cars.write().await;
        if registration_taken(&cars, &car.registration_no, None) {
            return Err(CarStoreError::DuplicateRegistration(car.registration_no.clone()));
        }

        let now = Utc::now();
        let created = Car {
            id: Uuid::new_v4(),
            category: car.category,
            color: car.color.clone(),
            model: car.model.clone(),
            make: car.make.clone(),
            registration_no: car.registration_no.clone(),
            created_at: now,
            updated_at: now,
        };
        cars.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update_car(&self, id: Uuid, car: &NewCar) -> Result<Car, CarStoreError> {
        let mut cars = self.cars.write().await;
        if !cars.contains_key(&id) {
            return Err(CarStoreError::NotFound(id));
        }
        if registration_taken(&cars, &car.registration_no, Some(id)) {
            return Err(CarStoreError::DuplicateRegistration(car.registration_no.clone()));
        }

        let existing = cars.get_mut(&id).ok_or(CarStoreError::NotFound(id))?;
        existing.category = car.category;
        existing.color = car.color.clone();
        existing.model = car.model.clone();
        existing.make = car.make.clone();
        existing.registration_no = car.registration_no.clone();
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    async fn delete_car(&self, id: Uuid) -> Result<(), CarStoreError> {
        self.cars
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(CarStoreError::NotFound(id))
    }
}
