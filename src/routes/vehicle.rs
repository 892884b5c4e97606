use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::FindOptions,
    Client,
};
use std::sync::Arc;

use crate::models::vehicle::Vehicle;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    limit: Option<u16>,
    search: Option<String>,
}

pub async fn get_vehicles(
    data: web::Data<Arc<Client>>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Vehicle> =
        client.database("Fleet").collection("Vehicles");

    let mut options = FindOptions::default();
    if let Some(limit) = params.limit {
        options.limit = Some(limit.into());
    }
    let mut filter = doc! { "active": true };
    if let Some(search_text) = &params.search {
        if !search_text.is_empty() {
            filter.insert(
                "name",
                doc! {
                    "$regex": format!("^{}", regex::escape(search_text)),
                    "$options": "i"
                },
            );
        }
    }

    match collection.find(filter).with_options(options).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Vehicle>>().await {
            Ok(vehicles) => HttpResponse::Ok().json(vehicles),
            Err(err) => {
                log::error!("Failed to collect vehicles: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect vehicles.")
            }
        },
        Err(err) => {
            log::error!("Failed to find vehicles: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find vehicles.")
        }
    }
}

pub async fn get_vehicle_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Vehicle> =
        client.database("Fleet").collection("Vehicles");

    let id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid vehicle ID format"),
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(vehicle)) => HttpResponse::Ok().json(vehicle),
        Ok(None) => HttpResponse::NotFound().body("Vehicle not found"),
        Err(err) => {
            log::error!("Failed to fetch vehicle: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch vehicle.")
        }
    }
}
