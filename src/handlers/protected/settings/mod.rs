pub mod genders;

// Re-export handler functions for use in routing
pub use genders::destroy as genders_destroy;
pub use genders::destroy_and_replace as genders_destroy_and_replace;
pub use genders::index as genders_index;
pub use genders::store as genders_store;
pub use genders::types as genders_types;
pub use genders::update as genders_update;
