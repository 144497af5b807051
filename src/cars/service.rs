use std::sync::Arc;

use uuid::Uuid;

use super::model::{Car, CarPayload};
use super::store::{CarStore, CarStoreError};
use crate::error::ApiError;

impl From<CarStoreError> for ApiError {
    fn from(e: CarStoreError) -> Self {
        match e {
            CarStoreError::NotFound(_) => ApiError::NotFound("Car not found".to_string()),
            CarStoreError::DuplicateRegistration(registration_no) => ApiError::Conflict(format!(
                "A car with registration number {} already exists",
                registration_no
            )),
            CarStoreError::Internal(message) => ApiError::DatabaseError(message),
        }
    }
}

#[derive(Clone)]
pub struct CarService {
    store: Arc<dyn CarStore>,
}

impl CarService {
    pub fn new(store: Arc<dyn CarStore>) -> Self {
        Self { store }
    }

    pub async fn list_cars(&self) -> Result<Vec<Car>, ApiError> {
        Ok(self.store.list_cars().await?)
    }

    pub async fn get_car(&self, id: Uuid) -> Result<Car, ApiError> {
        Ok(self.store.get_car(id).await?)
    }

    pub async fn create_car(&self, payload: CarPayload) -> Result<Car, ApiError> {
        let new_car = payload.into_new_car()?;
        let car = self.store.create_car(&new_car).await?;

        tracing::info!(car_id = %car.id, registration_no = %car.registration_no, "Car created");

        Ok(car)
    }

    pub async fn update_car(&self, id: Uuid, payload: CarPayload) -> Result<Car, ApiError> {
        let new_car = payload.into_new_car()?;
        let car = self.store.update_car(id, &new_car).await?;

        tracing::info!(car_id = %car.id, "Car updated");

        Ok(car)
    }

    pub async fn delete_car(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.delete_car(id).await?;

        tracing::info!(car_id = %id, "Car deleted");

        Ok(())
    }
}
