use std::collections::BTreeSet;
use swapi_people::*;

fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    for (id, name) in [
        ("14", "Snowspeeder"),
        ("30", "Imperial Speeder Bike"),
        ("38", "Tribubble bongo"),
        ("42", "Sith speeder"),
    ] {
        store.insert_conveyance(RelationKind::Vehicles, id, Some(name)).unwrap();
    }
    for (id, name) in [("12", "X-wing"), ("22", "Imperial shuttle"), ("48", "Jedi starfighter")] {
        store.insert_conveyance(RelationKind::Starships, id, Some(name)).unwrap();
    }
    store
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn payload(json: &str) -> CharacterPayload {
    serde_json::from_str(json).unwrap()
}

#[test]
fn round_trip_add_then_get() {
    let store = seeded_store();
    let characters = CharacterStore::new();

    let created = characters
        .add(
            &store,
            &payload(
                r#"{
                    "name": "Luke Skywalker",
                    "height": "172",
                    "mass": "77",
                    "hair_color": "blond",
                    "skin_color": "fair",
                    "eye_color": "blue",
                    "birth_year": "19BBY",
                    "gender": "male",
                    "homeworld": "1",
                    "vehicles_id": ["14", 30, "14"],
                    "starships_id": [12]
                }"#,
            ),
        )
        .unwrap();

    let fetched = characters.get(&store, Some(&created.id)).unwrap();
    assert_eq!(fetched, vec![created.clone()]);

    assert_eq!(created.birth_year.as_deref(), Some("19BBY"));
    assert_eq!(created.eye_color.as_deref(), Some("blue"));
    assert_eq!(created.vehicle_ids, set(&["14", "30"]));
    assert_eq!(created.starship_ids, set(&["12"]));
}

#[test]
fn monotonic_ids_from_empty_store() {
    let store = seeded_store();
    let characters = CharacterStore::new();

    let ids: Vec<String> = (0..5)
        .map(|_| characters.add(&store, &CharacterPayload::default()).unwrap().id)
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn merge_scenario_two_vehicles_one_starship() {
    let store = seeded_store();
    let characters = CharacterStore::new();
    let json = r#"{"name": "C", "vehicles_id": ["14", "30"], "starships_id": ["12"]}"#;
    characters.add(&store, &payload(json)).unwrap();

    let found = characters.get(&store, Some("1")).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].vehicle_ids, set(&["14", "30"]));
    assert_eq!(found[0].starship_ids, set(&["12"]));
}

#[test]
fn not_found_on_empty_store() {
    let store = seeded_store();
    let characters = CharacterStore::new();

    assert!(matches!(characters.get(&store, Some("999")), Err(Error::NotFound(_))));
    assert!(matches!(characters.delete(&store, "999"), Err(Error::NotFound(_))));
    assert!(!store.in_transaction());
}

#[test]
fn update_with_current_membership_is_idempotent() {
    let store = seeded_store();
    let characters = CharacterStore::new();
    let created = characters
        .add(&store, &payload(r#"{"name": "Han Solo", "starships_id": ["22", "12"]}"#))
        .unwrap();

    let linker = characters.linker(RelationKind::Starships);
    let outcome = linker
        .update(&store, &created.id, &created.starship_ids, Some(["12", "22"]))
        .unwrap();
    assert!(outcome.is_noop());

    let updated = characters
        .update(&store, &created.id, &payload(r#"{"starships_id": [22, 12]}"#))
        .unwrap();
    assert_eq!(updated.starship_ids, set(&["12", "22"]));
    assert_eq!(updated.edited, None);
}

#[test]
fn set_convergence_for_assorted_transitions() {
    let store = seeded_store();
    let characters = CharacterStore::new();
    let linker = characters.linker(RelationKind::Vehicles);

    let transitions: &[(&[&str], &[&str])] = &[
        (&[], &["14"]),
        (&["14"], &["14", "30", "38"]),
        (&["14", "30", "38"], &["42"]),
        (&["42"], &["42"]),
        (&["42"], &[]),
        (&[], &[]),
    ];

    let created = characters.add(&store, &CharacterPayload::default()).unwrap();
    for (old, new) in transitions {
        let current: Vec<String> = linker.get_by_character(&store, &created.id).unwrap();
        assert_eq!(current.into_iter().collect::<BTreeSet<_>>(), set(old));

        linker.update(&store, &created.id, old.iter(), Some(new.iter())).unwrap();

        let after: BTreeSet<String> =
            linker.get_by_character(&store, &created.id).unwrap().into_iter().collect();
        assert_eq!(after, set(new));
    }
}

#[test]
fn referential_validation_rejects_unknown_ids() {
    let store = seeded_store();
    let characters = CharacterStore::new();
    let created = characters.add(&store, &CharacterPayload::default()).unwrap();

    let err = characters
        .update(&store, &created.id, &payload(r#"{"vehicles_id": ["14", "999"]}"#))
        .unwrap_err();
    match err {
        Error::InvalidReference { relation, id } => {
            assert_eq!(relation, RelationKind::Vehicles);
            assert_eq!(id, "999");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Partial state: "14" sorted before "999" and stays committed
    let members = characters
        .linker(RelationKind::Vehicles)
        .get_by_character(&store, &created.id)
        .unwrap();
    assert_eq!(members, vec!["14"]);
}

#[test]
fn failed_vehicle_phase_skips_starship_phase() {
    let store = seeded_store();
    let characters = CharacterStore::new();
    let created = characters
        .add(&store, &payload(r#"{"name": "Wedge Antilles", "starships_id": ["12"]}"#))
        .unwrap();

    let err = characters
        .update(
            &store,
            &created.id,
            &payload(r#"{"name": "Wedge", "vehicles_id": ["404"], "starships_id": []}"#),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidReference { .. }));

    // Scalar stage committed, vehicle stage failed, starship stage never ran
    let current = characters.get_one(&store, &created.id).unwrap();
    assert_eq!(current.name.as_deref(), Some("Wedge"));
    assert!(current.edited.is_some());
    assert!(current.vehicle_ids.is_empty());
    assert_eq!(current.starship_ids, set(&["12"]));
}

#[test]
fn deletion_cascades_both_relations() {
    let store = seeded_store();
    let characters = CharacterStore::new();
    let json = r#"{"name": "Obi-Wan Kenobi", "vehicles_id": ["38"], "starships_id": ["48"]}"#;
    characters.add(&store, &payload(json)).unwrap();
    characters
        .add(&store, &payload(r#"{"name": "Anakin Skywalker", "vehicles_id": ["38"]}"#))
        .unwrap();

    assert_eq!(characters.delete(&store, "1").unwrap(), "1");

    for kind in RelationKind::all() {
        assert!(characters.linker(*kind).get_by_character(&store, "1").unwrap().is_empty());
    }
    let remaining = characters.get(&store, None).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].vehicle_ids, set(&["38"]));
}

#[test]
fn persisted_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swapi.dat");
    let characters = CharacterStore::new();

    {
        let store = SqliteStore::open(&path).unwrap();
        store.insert_conveyance(RelationKind::Vehicles, "14", Some("Snowspeeder")).unwrap();
        characters
            .add(&store, &payload(r#"{"name": "Luke Skywalker", "vehicles_id": ["14"]}"#))
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let luke = characters.get_one(&store, "1").unwrap();
    assert_eq!(luke.vehicle_ids, set(&["14"]));
    assert_eq!(luke.vehicle_names, set(&["Snowspeeder"]));
}
