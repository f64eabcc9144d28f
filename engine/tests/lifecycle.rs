//! End-to-end optimistic mutation scenarios.
//!
//! snapshot -> optimistic apply -> remote call -> confirm or roll back

use paddock_engine::{
    add_optimistic_record, create_optimistic_context, generate_entity_temp_id,
    replace_temp_id_with_record, JsonRecord, Mutation, MutationState, QueryCache, QueryKey,
    Resolution, RollbackContext, Tracked,
};
use serde_json::{json, Map, Value};

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn broiler_batch() -> Vec<Tracked<JsonRecord>> {
    vec![Tracked::confirmed(JsonRecord::new(
        "b1",
        fields(json!({"species": "Broiler", "status": "active"})),
    ))]
}

#[test]
fn create_batch_confirmed() {
    let cached = broiler_batch();
    let temp_id = generate_entity_temp_id("batch");
    assert!(temp_id.as_str().starts_with("temp-batch-"));

    let _context = create_optimistic_context(Some(cached.as_slice()), Some(temp_id.clone()));
    let optimistic = add_optimistic_record(
        Some(cached.as_slice()),
        fields(json!({"species": "Catfish", "status": "active", "quantity": 500})),
        &temp_id,
    );

    assert_eq!(optimistic.len(), 2);
    assert_eq!(optimistic[1].id(), temp_id.as_str());
    assert!(optimistic[1].is_optimistic());

    let server = JsonRecord::new(
        "b2",
        fields(json!({"species": "Catfish", "status": "active", "quantity": 500})),
    );
    let settled = replace_temp_id_with_record(&optimistic, &temp_id, server);

    assert_eq!(settled.len(), 2);
    assert_eq!(settled[0], cached[0]);
    assert_eq!(settled[1].id(), "b2");
    assert!(!settled[1].is_optimistic());
    assert_eq!(settled[1].temp_id(), None);
}

#[test]
fn create_batch_rolled_back() {
    let cached = broiler_batch();
    let temp_id = generate_entity_temp_id("batch");

    let context = create_optimistic_context(Some(cached.as_slice()), Some(temp_id.clone()));
    let optimistic = add_optimistic_record(
        Some(cached.as_slice()),
        fields(json!({"species": "Catfish", "status": "active"})),
        &temp_id,
    );
    assert_eq!(optimistic.len(), 2);

    // Remote call failed
    let restored = context.restore();
    assert_eq!(restored, cached);
}

#[test]
fn context_survives_persistence() {
    let cached = broiler_batch();
    let temp_id = generate_entity_temp_id("batch");
    let context = create_optimistic_context(Some(cached.as_slice()), Some(temp_id.clone()));

    // App restarted while offline
    let json = context.to_json().unwrap();
    let reloaded = RollbackContext::<JsonRecord>::from_json(&json).unwrap();

    assert_eq!(reloaded.temp_id(), Some(&temp_id));
    assert_eq!(reloaded.restore(), cached);
}

#[test]
fn pending_mutation_resolves_once() {
    let cached = broiler_batch();
    let (optimistic, pending) =
        Mutation::<JsonRecord>::update("batch", "b1", fields(json!({"status": "harvested"})))
            .begin(Some(cached.as_slice()));
    assert_eq!(pending.state(), MutationState::Pending);
    assert!(optimistic[0].is_optimistic());

    let (settled, resolution) = pending.confirm(&optimistic, None).unwrap();
    assert_eq!(MutationState::from(resolution), MutationState::Confirmed);
    assert_eq!(settled[0].record().get("status"), Some(&json!("harvested")));
    assert!(!settled[0].is_optimistic());
}

#[test]
fn cache_interleaved_mutations() {
    let mut cache = QueryCache::new();
    let key = QueryKey::new("sale");
    cache.set(
        key.clone(),
        vec![Tracked::confirmed(JsonRecord::new("s1", fields(json!({"total": 120}))))],
    );

    let first = cache
        .begin(&key, Mutation::create("sale", fields(json!({"total": 45}))))
        .unwrap();
    let second = cache
        .begin(&key, Mutation::create("sale", fields(json!({"total": 60}))))
        .unwrap();
    assert_eq!(cache.in_flight(&key), 2);
    assert_eq!(cache.get(&key).unwrap().len(), 3);

    // Second answers first
    let second_temp = second.target_id().to_string();
    cache
        .settle_success(&key, second, Some(JsonRecord::new("s3", fields(json!({"total": 60})))))
        .unwrap();

    let data = cache.get(&key).unwrap();
    assert!(data.iter().all(|item| item.id() != second_temp));
    assert_eq!(data.iter().filter(|item| item.is_optimistic()).count(), 1);

    let resolution = cache
        .settle_success(&key, first, Some(JsonRecord::new("s2", fields(json!({"total": 45})))))
        .unwrap();
    assert_eq!(resolution, Resolution::Confirmed);

    let ids: Vec<_> = cache.get(&key).unwrap().iter().map(|item| item.id().to_string()).collect();
    assert_eq!(ids, vec!["s1", "s2", "s3"]);
    assert_eq!(cache.in_flight(&key), 0);
}

#[test]
fn cache_success_then_failure() {
    let mut cache = QueryCache::new();
    let key = QueryKey::new("sale");
    cache.set(
        key.clone(),
        vec![Tracked::confirmed(JsonRecord::new("s1", fields(json!({"total": 120}))))],
    );

    let first = cache
        .begin(&key, Mutation::create("sale", fields(json!({"total": 45}))))
        .unwrap();
    let second = cache
        .begin(&key, Mutation::create("sale", fields(json!({"total": 60}))))
        .unwrap();
    let second_temp = second.target_id().to_string();

    cache
        .settle_success(&key, first, Some(JsonRecord::new("s2", fields(json!({"total": 45})))))
        .unwrap();
    assert_eq!(cache.settle_failure(&key, second), Resolution::RolledBack);

    // The first create stays settled; only the failed one disappears
    let data = cache.get(&key).unwrap();
    let ids: Vec<&str> = data.iter().map(Tracked::id).collect();
    assert_eq!(ids, ["s1", "s2"]);
    assert!(data.iter().all(|item| !item.is_optimistic()));
    assert!(data.iter().all(|item| item.id() != second_temp));
    assert_eq!(cache.in_flight(&key), 0);
}

#[test]
fn cache_failed_delete_returns_to_its_slot() {
    let mut cache = QueryCache::new();
    let key = QueryKey::new("customer");
    cache.set(
        key.clone(),
        ["c1", "c2", "c3"]
            .into_iter()
            .map(|id| Tracked::confirmed(JsonRecord::new(id, Map::new())))
            .collect(),
    );

    let update = cache
        .begin(&key, Mutation::update("customer", "c1", fields(json!({"name": "Ade"}))))
        .unwrap();
    let delete = cache.begin(&key, Mutation::delete("customer", "c2")).unwrap();

    let server = JsonRecord::new("c1", fields(json!({"name": "Ade Farms"})));
    cache.settle_success(&key, update, Some(server.clone())).unwrap();
    cache.settle_failure(&key, delete);

    let data = cache.get(&key).unwrap();
    let ids: Vec<&str> = data.iter().map(Tracked::id).collect();
    assert_eq!(ids, ["c1", "c2", "c3"]);
    assert_eq!(data[0], Tracked::confirmed(server));
    assert_eq!(cache.in_flight(&key), 0);
}
