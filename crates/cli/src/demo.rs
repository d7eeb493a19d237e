//! `docstore demo`: the family walkthrough.
//!
//! Creates a database and a container partitioned on `/lastName`, inserts
//! two families idempotently, queries one back, replaces it after a
//! read-modify-write, then deletes the item and the database.

use crate::family::{self, Family, FAMILY_PARTITION_KEY_PATH};
use crate::format::{emit, OutputMode};
use docstore_client::{Container, DocumentClient, QueryDefinition, RequestCharge, Result};
use serde_json::json;
use std::path::PathBuf;

/// Options of one demo run.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub database: String,
    pub container: String,
    pub export: Option<PathBuf>,
    pub keep: bool,
}

impl Default for DemoOptions {
    fn default() -> Self {
        DemoOptions {
            database: "FamilyDatabase".to_string(),
            container: "FamilyContainer".to_string(),
            export: None,
            keep: false,
        }
    }
}

/// What a demo run did.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSummary {
    pub created_items: usize,
    pub query_matches: usize,
    pub final_etag: Option<u64>,
    pub total_charge: RequestCharge,
}

pub fn run(client: &DocumentClient, options: &DemoOptions, mode: OutputMode) -> Result<DemoSummary> {
    let mut total = RequestCharge::ZERO;

    let response = client.create_database_if_absent(&options.database)?;
    total += response.request_charge();
    emit(
        mode,
        &format!("Created Database: {}", options.database),
        json!({"created": response.is_created(), "requestCharge": response.request_charge().value()}),
    );
    let database = response.into_resource();

    let response = database.create_container_if_absent(&options.container, FAMILY_PARTITION_KEY_PATH)?;
    total += response.request_charge();
    emit(
        mode,
        &format!("Created Container: {}", options.container),
        json!({"created": response.is_created(), "partitionKeyPath": FAMILY_PARTITION_KEY_PATH}),
    );
    let container = response.into_resource();

    let mut created_items = 0;
    for family in [family::van_appeldoorn(), family::wakefield()] {
        let response = container.create_item_if_absent(&family)?;
        total += response.request_charge();
        let charge = response.request_charge();
        if response.is_created() {
            created_items += 1;
            emit(
                mode,
                &format!(
                    "Created item in database with id: {} Operation consumed {}s.",
                    family.id, charge
                ),
                json!({"id": family.id, "requestCharge": charge.value()}),
            );
        } else {
            emit(
                mode,
                &format!("Item in database with id: {} already exists", family.id),
                json!({"id": family.id}),
            );
        }
    }

    let (query_matches, query_charge) = query_families(&container, mode)?;
    total += query_charge;

    let (final_etag, replace_charge) = register_van_appeldoorn(&container, mode)?;
    total += replace_charge;

    if let Some(path) = &options.export {
        let snapshot = database.export_snapshot()?;
        snapshot.save(path)?;
        emit(
            mode,
            &format!(
                "Exported {} documents to {}",
                snapshot.document_count(),
                path.display()
            ),
            json!({"path": path.display().to_string(), "documents": snapshot.document_count()}),
        );
    }

    if !options.keep {
        let family = family::van_appeldoorn();
        let response = container.delete_item(&family.id, family.last_name.as_str())?;
        total += response.request_charge();
        emit(
            mode,
            &format!("Deleted Family [{},{}]", family.last_name, family.id),
            json!({"id": family.id, "partitionKey": family.last_name}),
        );

        let response = database.delete()?;
        total += response.request_charge();
        emit(
            mode,
            &format!("Deleted Database: {}", options.database),
            json!({"database": options.database}),
        );
    }

    Ok(DemoSummary {
        created_items,
        query_matches,
        final_etag,
        total_charge: total,
    })
}

fn query_families(container: &Container, mode: OutputMode) -> Result<(usize, RequestCharge)> {
    let sql = "SELECT * FROM c WHERE c.lastName = 'van Appeldoorn'";
    emit(mode, &format!("Running query: {}", sql), json!({"query": sql}));

    let mut feed = container.query_items::<Family>(&QueryDefinition::parse(sql)?)?;
    let mut matches = 0;
    let mut charge = RequestCharge::ZERO;
    while feed.has_more_results() {
        let page = feed.read_next()?;
        charge += page.request_charge();
        for family in page {
            matches += 1;
            emit(mode, &format!("\tRead {}", family), json!({"id": family.id}));
        }
    }
    Ok((matches, charge))
}

fn register_van_appeldoorn(container: &Container, mode: OutputMode) -> Result<(Option<u64>, RequestCharge)> {
    let read = container.read_item("Appeldoorn.1", "van Appeldoorn")?;
    let mut charge = read.request_charge();
    let mut family: Family = read.deserialize()?;

    family.is_registered = true;
    if let Some(child) = family.children.first_mut() {
        child.age = 18;
    }

    let etag = read.etag().unwrap_or_default();
    let replaced = container.replace_item_if_match(&family, etag)?;
    charge += replaced.request_charge();
    emit(
        mode,
        &format!(
            "Updated Family [{},{}].\n\tBody is now: {}",
            family.last_name, family.id, family
        ),
        json!({"id": family.id, "etag": replaced.etag()}),
    );
    Ok((replaced.etag(), charge))
}
