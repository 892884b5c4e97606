use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::FindOptions,
    Client,
};
use std::sync::Arc;

use crate::models::excursion::Excursion;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    limit: Option<u16>,
}

pub async fn get_excursions(
    data: web::Data<Arc<Client>>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Excursion> =
        client.database("Tours").collection("Excursions");

    let mut options = FindOptions::default();
    if let Some(limit) = params.limit {
        options.limit = Some(limit.into());
    }

    match collection
        .find(doc! { "active": true })
        .with_options(options)
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Excursion>>().await {
            Ok(excursions) => HttpResponse::Ok().json(excursions),
            Err(err) => {
                log::error!("Failed to collect excursions: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect excursions.")
            }
        },
        Err(err) => {
            log::error!("Failed to find excursions: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find excursions.")
        }
    }
}

pub async fn get_excursion_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Excursion> =
        client.database("Tours").collection("Excursions");

    let id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid excursion ID format"),
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(excursion)) => HttpResponse::Ok().json(excursion),
        Ok(None) => HttpResponse::NotFound().body("Excursion not found"),
        Err(err) => {
            log::error!("Failed to fetch excursion: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch excursion.")
        }
    }
}
