//! Equality queries across partitions, paging and the query text subset.

use crate::common::*;

fn seeded(client: &DocumentClient) -> Container {
    let (_, container) = family_container(client);
    container.create_item(&family("A", "Smith", "Seattle")).unwrap();
    container.create_item(&family("B", "Jones", "Boston")).unwrap();
    container.create_item(&family("C", "Smith", "Austin")).unwrap();
    container.create_item(&family("D", "Brown", "Seattle")).unwrap();
    container
}

#[test]
fn equality_on_partition_key_field() {
    let client = client();
    let container = seeded(&client);
    let mut ids = query_ids(&container, "SELECT * FROM c WHERE c.lastName = 'Smith'");
    ids.sort();
    assert_eq!(ids, vec!["A", "C"]);
}

#[test]
fn equality_on_nested_field_spans_partitions() {
    let client = client();
    let container = seeded(&client);
    let mut ids = query_ids(&container, "SELECT * FROM c WHERE c.address.city = \"Seattle\"");
    ids.sort();
    assert_eq!(ids, vec!["A", "D"]);
}

#[test]
fn no_matches_yields_no_pages() {
    let client = client();
    let container = seeded(&client);
    let mut feed = container
        .query_items_where::<Family>("lastName", "Nobody")
        .unwrap();
    assert!(!feed.has_more_results());
    assert!(feed.next().is_none());
}

#[test]
fn select_all_returns_every_document() {
    let client = client();
    let container = seeded(&client);
    assert_eq!(query_ids(&container, "SELECT * FROM c").len(), 4);
}

#[test]
fn pages_respect_max_item_count() {
    let client = client_with_page_size(3);
    let (_, container) = family_container(&client);
    for i in 0..7 {
        container
            .create_item(&family(&format!("f{}", i), "Smith", "Seattle"))
            .unwrap();
    }

    let mut feed = container
        .query_items_where::<Family>("lastName", "Smith")
        .unwrap();
    let mut sizes = Vec::new();
    while feed.has_more_results() {
        sizes.push(feed.read_next().unwrap().count());
    }
    assert_eq!(sizes, vec![3, 3, 1]);
}

#[test]
fn explicit_page_size_overrides_config() {
    let client = client();
    let container = seeded(&client);
    let pages: Vec<usize> = container
        .query_items::<Family>(&QueryDefinition::all())
        .unwrap()
        .with_max_item_count(1)
        .map(|page| page.unwrap().count())
        .collect();
    assert_eq!(pages, vec![1, 1, 1, 1]);
}

#[test]
fn query_is_restartable() {
    let client = client();
    let container = seeded(&client);
    let query = QueryDefinition::field_equals("lastName", "Smith").unwrap();

    let first: Vec<String> = container
        .query_documents(&query)
        .unwrap()
        .map(|d| d.id().to_string())
        .collect();
    let second: Vec<String> = container
        .query_documents(&query)
        .unwrap()
        .map(|d| d.id().to_string())
        .collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn numeric_and_boolean_literals() {
    let client = client();
    let container = seeded(&client);
    assert_eq!(
        query_ids(&container, "SELECT * FROM c WHERE c.isRegistered = false").len(),
        4
    );
    let mut registered = container.read_item("B", "Jones").unwrap().deserialize::<Family>().unwrap();
    registered.is_registered = true;
    container.replace_item(&registered).unwrap();
    assert_eq!(
        query_ids(&container, "SELECT * FROM c WHERE c.isRegistered = true"),
        vec!["B"]
    );
}

#[test]
fn unsupported_queries_are_rejected() {
    let client = client();
    let container = seeded(&client);
    for sql in [
        "SELECT c.id FROM c",
        "SELECT * FROM c WHERE c.lastName > 'A'",
        "SELECT * FROM c WHERE c.lastName = 'A' AND c.id = 'B'",
        "DELETE FROM c",
    ] {
        assert!(
            matches!(
                container.query_items_text::<Family>(sql),
                Err(Error::UnsupportedQuery(_))
            ),
            "accepted: {}",
            sql
        );
    }
}

#[test]
fn query_charges_by_payload_size() {
    let client = metered_client();
    let (_, container) = family_container(&client);
    container.create_item(&andersen()).unwrap();
    let page = container
        .query_items_where::<Family>("lastName", "Andersen")
        .unwrap()
        .read_next()
        .unwrap();
    assert_eq!(page.count(), 1);
    assert!(page.request_charge().value() >= 1.0);
}

#[test]
fn closed_client_stops_feed() {
    let client = client();
    let container = seeded(&client);
    let mut feed = container.query_items::<Family>(&QueryDefinition::all()).unwrap();
    client.close();
    assert!(!feed.has_more_results());
    assert!(matches!(feed.read_next(), Err(Error::ClientClosed)));
}
