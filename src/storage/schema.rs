//! Database schema definitions

/// SQL to create the people table
///
/// Every column is text; `id` holds a decimal integer rendered as a string.
pub const CREATE_PEOPLE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS people (
    id TEXT PRIMARY KEY,
    url TEXT,
    created TEXT NOT NULL,
    edited TEXT,
    name TEXT,
    height TEXT,
    mass TEXT,
    hair_color TEXT,
    skin_color TEXT,
    eye_color TEXT,
    birth_year TEXT,
    gender TEXT,
    homeworld TEXT
)
"#;

/// SQL to create the vehicles table (external, only `id` is relied upon)
pub const CREATE_VEHICLES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS vehicles (
    id TEXT PRIMARY KEY,
    name TEXT
)
"#;

/// SQL to create the starships table (external, only `id` is relied upon)
pub const CREATE_STARSHIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS starships (
    id TEXT PRIMARY KEY,
    name TEXT
)
"#;

/// SQL to create the people/vehicles junction table
///
/// No uniqueness constraint: duplicates are filtered by the linker.
pub const CREATE_PEOPLE_VEHICLES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS people_vehicles (
    people TEXT NOT NULL,
    vehicles TEXT NOT NULL
)
"#;

/// SQL to create the people/starships junction table
pub const CREATE_PEOPLE_STARSHIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS people_starships (
    people TEXT NOT NULL,
    starships TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_people_vehicles_people ON people_vehicles(people)",
    "CREATE INDEX IF NOT EXISTS idx_people_starships_people ON people_starships(people)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_PEOPLE_TABLE,
        CREATE_VEHICLES_TABLE,
        CREATE_STARSHIPS_TABLE,
        CREATE_PEOPLE_VEHICLES_TABLE,
        CREATE_PEOPLE_STARSHIPS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
