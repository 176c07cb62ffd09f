//! Characters - the `people` entity with its vehicle and starship memberships
//!
//! - `model`: the merged `Character` view and the `CharacterPayload` input
//! - `merge`: folding the flattened read rows into one character per id
//! - `store`: `CharacterStore`, the get/add/update/delete entry point

pub mod merge;
pub mod model;
pub mod store;

pub use merge::{CharacterRow, merge_rows};
pub use model::{Character, CharacterPayload, ScalarField};
pub use store::CharacterStore;
