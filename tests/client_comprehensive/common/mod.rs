//! Shared fixtures for the client integration suite.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use docstore::{
    ClientConfig, Container, Database, DocumentClient, Error, QueryDefinition, RequestCharge,
    ResourceKind, ResponseStatus, SizeBasedMeter,
};
pub use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    pub last_name: String,
    pub children: Vec<Child>,
    pub address: Address,
    pub is_registered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub first_name: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub city: String,
    pub zipcode: String,
}

pub fn family(id: &str, last_name: &str, city: &str) -> Family {
    Family {
        id: id.to_string(),
        last_name: last_name.to_string(),
        children: vec![Child {
            first_name: "Jesse".to_string(),
            age: 8,
        }],
        address: Address {
            city: city.to_string(),
            zipcode: "1010AB".to_string(),
        },
        is_registered: false,
    }
}

pub fn andersen() -> Family {
    family("Andersen.1", "Andersen", "Seattle")
}

pub fn wakefield() -> Family {
    family("Wakefield.7", "Wakefield", "New York")
}

/// In-memory client with default configuration.
pub fn client() -> DocumentClient {
    DocumentClient::ephemeral().expect("ephemeral client")
}

/// Client with the given page size.
pub fn client_with_page_size(max_item_count: usize) -> DocumentClient {
    DocumentClient::open(ClientConfig {
        max_item_count,
        ..ClientConfig::default()
    })
    .expect("client")
}

/// Client that charges by payload size.
pub fn metered_client() -> DocumentClient {
    DocumentClient::open_with_meter(ClientConfig::default(), Arc::new(SizeBasedMeter::default()))
        .expect("metered client")
}

/// `FamilyDatabase/FamilyContainer` partitioned on `/lastName`.
pub fn family_container(client: &DocumentClient) -> (Database, Container) {
    let database = client
        .create_database_if_absent("FamilyDatabase")
        .expect("database")
        .into_resource();
    let container = database
        .create_container_if_absent("FamilyContainer", "/lastName")
        .expect("container")
        .into_resource();
    (database, container)
}

/// Drain every page of a query into a flat list of ids.
pub fn query_ids(container: &Container, sql: &str) -> Vec<String> {
    let feed = container
        .query_items_text::<serde_json::Value>(sql)
        .expect("query");
    let mut ids = Vec::new();
    for page in feed {
        for body in page.expect("page") {
            ids.push(body["id"].as_str().unwrap_or_default().to_string());
        }
    }
    ids
}
