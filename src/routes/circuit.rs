use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::FindOptions,
    Client,
};
use std::sync::Arc;

use crate::models::circuit::Circuit;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    limit: Option<u16>,
}

pub async fn get_circuits(
    data: web::Data<Arc<Client>>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Circuit> =
        client.database("Tours").collection("Circuits");

    let mut options = FindOptions::default();
    if let Some(limit) = params.limit {
        options.limit = Some(limit.into());
    }

    match collection
        .find(doc! { "active": true })
        .with_options(options)
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Circuit>>().await {
            Ok(circuits) => HttpResponse::Ok().json(circuits),
            Err(err) => {
                log::error!("Failed to collect circuits: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect circuits.")
            }
        },
        Err(err) => {
            log::error!("Failed to find circuits: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find circuits.")
        }
    }
}

pub async fn get_circuit_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Circuit> =
        client.database("Tours").collection("Circuits");

    let id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid circuit ID format"),
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(circuit)) => HttpResponse::Ok().json(circuit),
        Ok(None) => HttpResponse::NotFound().body("Circuit not found"),
        Err(err) => {
            log::error!("Failed to fetch circuit: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch circuit.")
        }
    }
}
