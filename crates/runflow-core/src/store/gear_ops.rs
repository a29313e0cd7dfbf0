//! Gear (shoe) operations for the ProgramStore.

use jiff::Timestamp;
use log::{info, warn};

use super::ProgramStore;
use crate::{
    db::{Database, SHOES_KEY},
    error::{Result, RunflowError},
    models::{gear::DEFAULT_MAX_DISTANCE, Shoe},
    params::{AddShoe, LogShoeDistance},
};

fn read_shoes(db: &Database) -> Result<Vec<Shoe>> {
    let body = db.get_document(SHOES_KEY)?.and_then(|d| d.body);
    Ok(match body {
        Some(body) => serde_json::from_str(&body).unwrap_or_else(|e| {
            warn!("Stored gear list is unreadable, starting empty: {e}");
            Vec::new()
        }),
        None => Vec::new(),
    })
}

fn write_shoes(db: &mut Database, shoes: &[Shoe]) -> Result<()> {
    let body = serde_json::to_string(shoes)?;
    db.put_document(SHOES_KEY, &body)?;
    Ok(())
}

impl ProgramStore {
    /// Lists the shoes.
    pub async fn list_shoes(&self) -> Result<Vec<Shoe>> {
        self.with_db(|db| read_shoes(db)).await
    }

    /// Adds a new active pair with no mileage.
    pub async fn add_shoe(&self, params: &AddShoe) -> Result<Shoe> {
        let brand = params.brand.trim().to_string();
        let name = params.model.trim().to_string();
        if brand.is_empty() || name.is_empty() {
            return Err(RunflowError::invalid_input("shoe")
                .with_reason("Brand and model are required"));
        }
        let max_distance = match params.max_distance {
            Some(d) if d.is_finite() && d > 0.0 => d.trunc(),
            Some(_) => {
                return Err(RunflowError::invalid_input("max_distance")
                    .with_reason("Maximum distance must be a positive number of kilometres"))
            }
            None => DEFAULT_MAX_DISTANCE,
        };

        let shoe = self
            .with_db(move |db| {
                let mut shoes = read_shoes(db)?;

                let mut stamp = Timestamp::now().as_millisecond();
                while shoes.iter().any(|s| s.id == stamp.to_string()) {
                    stamp += 1;
                }

                let shoe = Shoe {
                    id: stamp.to_string(),
                    name,
                    brand,
                    distance: 0.0,
                    max_distance,
                    is_active: true,
                };
                shoes.push(shoe.clone());
                write_shoes(db, &shoes)?;
                Ok(shoe)
            })
            .await?;

        info!("Added shoe {} ({} {})", shoe.id, shoe.brand, shoe.name);
        Ok(shoe)
    }

    /// Removes a pair of shoes.
    pub async fn remove_shoe(&self, id: &str) -> Result<Shoe> {
        let id = id.to_string();
        self.with_db(move |db| {
            let mut shoes = read_shoes(db)?;
            let position = shoes
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| RunflowError::ShoeNotFound { id: id.clone() })?;
            let removed = shoes.remove(position);
            write_shoes(db, &shoes)?;
            Ok(removed)
        })
        .await
    }

    /// Adds kilometres to a pair of shoes.
    pub async fn log_shoe_distance(&self, params: &LogShoeDistance) -> Result<Shoe> {
        if !params.km.is_finite() || params.km <= 0.0 {
            return Err(RunflowError::invalid_input("km")
                .with_reason("Distance must be a positive number of kilometres"));
        }
        let id = params.id.clone();
        let km = params.km;

        self.with_db(move |db| {
            let mut shoes = read_shoes(db)?;
            let shoe = shoes
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| RunflowError::ShoeNotFound { id: id.clone() })?;
            shoe.distance += km;
            let updated = shoe.clone();
            write_shoes(db, &shoes)?;
            Ok(updated)
        })
        .await
    }
}
