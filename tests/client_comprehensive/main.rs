//! Client-level integration tests: the family walkthrough, idempotent
//! creation, partition isolation, cascading deletes, paged queries,
//! concurrent writers and snapshot round trips.

mod common;

mod cascade_tests;
mod concurrency_tests;
mod family_scenario_tests;
mod idempotency_tests;
mod partition_isolation_tests;
mod query_tests;
mod snapshot_tests;
