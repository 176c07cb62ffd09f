//! Row flattening for the character read path
//!
//! The read query unions two shapes: one joined through `people_vehicles`
//! (starship columns NULL) and one joined through `people_starships`
//! (vehicle columns NULL). A character with three memberships therefore
//! comes back as several rows; [`merge_rows`] folds them into one
//! [`Character`] per id.

use std::collections::HashMap;
use super::model::Character;

/// One physical row of the flattened query.
///
/// `character` carries the scalar columns with empty membership sets; at most
/// one of the vehicle/starship pairs is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterRow {
    pub character: Character,
    pub vehicle_id: Option<String>,
    pub vehicle_name: Option<String>,
    pub starship_id: Option<String>,
    pub starship_name: Option<String>,
}

/// Group rows by character id and union their membership columns.
///
/// Scalars come from the first row seen for an id. NULL membership columns
/// contribute nothing. Output is ordered by numeric id, with ids that do not
/// parse as integers last.
pub fn merge_rows<I>(rows: I) -> Vec<Character>
where
    I: IntoIterator<Item = CharacterRow>,
{
    let mut merged: Vec<Character> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let CharacterRow { character, vehicle_id, vehicle_name, starship_id, starship_name } = row;

        let slot = match slots.get(&character.id) {
            Some(&slot) => slot,
            None => {
                slots.insert(character.id.clone(), merged.len());
                merged.push(character);
                merged.len() - 1
            }
        };

        let entry = &mut merged[slot];
        entry.vehicle_ids.extend(vehicle_id);
        entry.vehicle_names.extend(vehicle_name);
        entry.starship_ids.extend(starship_id);
        entry.starship_names.extend(starship_name);
    }

    merged.sort_by(|a, b| id_order(&a.id).cmp(&id_order(&b.id)));
    merged
}

fn id_order(id: &str) -> (i64, &str) {
    (id.parse::<i64>().unwrap_or(i64::MAX), id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn character(id: &str, name: &str) -> Character {
        Character {
            id: id.to_string(),
            url: Some(id.to_string()),
            created: "2014-12-09T13:50:51.644000Z".to_string(),
            name: Some(name.to_string()),
            ..Character::default()
        }
    }

    fn vehicle_row(id: &str, name: &str, vehicle: Option<(&str, &str)>) -> CharacterRow {
        CharacterRow {
            character: character(id, name),
            vehicle_id: vehicle.map(|(v, _)| v.to_string()),
            vehicle_name: vehicle.map(|(_, n)| n.to_string()),
            ..CharacterRow::default()
        }
    }

    fn starship_row(id: &str, name: &str, starship: Option<(&str, &str)>) -> CharacterRow {
        CharacterRow {
            character: character(id, name),
            starship_id: starship.map(|(s, _)| s.to_string()),
            starship_name: starship.map(|(_, n)| n.to_string()),
            ..CharacterRow::default()
        }
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merges_both_relations_into_one_character() {
        let rows = vec![
            vehicle_row("1", "Luke Skywalker", Some(("14", "Snowspeeder"))),
            vehicle_row("1", "Luke Skywalker", Some(("30", "Imperial Speeder Bike"))),
            starship_row("1", "Luke Skywalker", Some(("12", "X-wing"))),
        ];

        let merged = merge_rows(rows);

        assert_eq!(merged.len(), 1);
        let luke = &merged[0];
        assert_eq!(luke.vehicle_ids, set(&["14", "30"]));
        assert_eq!(luke.vehicle_names, set(&["Snowspeeder", "Imperial Speeder Bike"]));
        assert_eq!(luke.starship_ids, set(&["12"]));
        assert_eq!(luke.starship_names, set(&["X-wing"]));
    }

    #[test]
    fn test_null_memberships_yield_empty_sets() {
        let rows = vec![
            vehicle_row("3", "R2-D2", None),
            starship_row("3", "R2-D2", None),
        ];

        let merged = merge_rows(rows);

        assert_eq!(merged.len(), 1);
        assert!(merged[0].vehicle_ids.is_empty());
        assert!(merged[0].vehicle_names.is_empty());
        assert!(merged[0].starship_ids.is_empty());
        assert!(merged[0].starship_names.is_empty());
    }

    #[test]
    fn test_only_one_relation_populated() {
        let rows = vec![
            vehicle_row("5", "Leia Organa", Some(("30", "Imperial Speeder Bike"))),
            starship_row("5", "Leia Organa", None),
        ];

        let merged = merge_rows(rows);

        assert_eq!(merged[0].vehicle_ids, set(&["30"]));
        assert!(merged[0].starship_ids.is_empty());
    }

    #[test]
    fn test_interleaved_characters_are_grouped_by_id() {
        let rows = vec![
            starship_row("10", "Obi-Wan Kenobi", Some(("48", "Jedi starfighter"))),
            vehicle_row("1", "Luke Skywalker", Some(("14", "Snowspeeder"))),
            starship_row("1", "Luke Skywalker", Some(("22", "Imperial shuttle"))),
            vehicle_row("10", "Obi-Wan Kenobi", Some(("38", "Tribubble bongo"))),
            starship_row("10", "Obi-Wan Kenobi", Some(("59", "Trade Federation cruiser"))),
            vehicle_row("2", "C-3PO", None),
        ];

        let merged = merge_rows(rows);

        let ids: Vec<&str> = merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);

        let obi_wan = &merged[2];
        assert_eq!(obi_wan.name.as_deref(), Some("Obi-Wan Kenobi"));
        assert_eq!(obi_wan.vehicle_ids, set(&["38"]));
        assert_eq!(obi_wan.starship_ids, set(&["48", "59"]));

        let luke = &merged[0];
        assert_eq!(luke.vehicle_ids, set(&["14"]));
        assert_eq!(luke.starship_ids, set(&["22"]));
        assert!(merged[1].vehicle_ids.is_empty());
    }

    #[test]
    fn test_duplicate_rows_collapse() {
        let rows = vec![
            vehicle_row("1", "Luke Skywalker", Some(("14", "Snowspeeder"))),
            vehicle_row("1", "Luke Skywalker", Some(("14", "Snowspeeder"))),
        ];

        let merged = merge_rows(rows);
        assert_eq!(merged[0].vehicle_ids.len(), 1);
        assert_eq!(merged[0].vehicle_names.len(), 1);
    }

    #[test]
    fn test_membership_without_name_keeps_id() {
        let mut row = vehicle_row("1", "Luke Skywalker", Some(("14", "Snowspeeder")));
        row.vehicle_name = None;

        let merged = merge_rows(vec![row]);
        assert_eq!(merged[0].vehicle_ids, set(&["14"]));
        assert!(merged[0].vehicle_names.is_empty());
    }

    #[test]
    fn test_scalars_come_from_first_row() {
        let mut second = starship_row("1", "Luke Skywalker", Some(("12", "X-wing")));
        second.character.edited = Some("never read".to_string());
        let first = vehicle_row("1", "Luke Skywalker", None);

        let merged = merge_rows(vec![first, second]);
        assert_eq!(merged[0].edited, None);
        assert_eq!(merged[0].starship_ids, set(&["12"]));
    }

    #[test]
    fn test_non_numeric_ids_sort_last() {
        let rows = vec![
            vehicle_row("legacy", "Unknown", None),
            vehicle_row("11", "Anakin Skywalker", None),
            vehicle_row("9", "Biggs Darklighter", None),
        ];

        let ids: Vec<String> = merge_rows(rows).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["9", "11", "legacy"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_rows(Vec::new()).is_empty());
    }
}
