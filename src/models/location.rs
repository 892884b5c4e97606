use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub city: String,
    pub country: String,
    pub coordinates: (f64, f64),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn round_trips_without_timestamps() {
        let doc = doc! {
            "name": "Airport Desk",
            "city": "Lisbon",
            "country": "PT",
            "coordinates": [38.774, -9.134],
        };
        let location: Location = bson::from_document(doc).unwrap();
        assert!(location.created_at.is_none());

        let serialized = bson::to_document(&location).unwrap();
        assert!(!serialized.contains_key("created_at"));
        assert!(!serialized.contains_key("updated_at"));
    }
}
