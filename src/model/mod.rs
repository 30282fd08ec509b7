pub mod app_state;
pub mod field;
pub mod field_path;
pub mod field_rows;
pub mod preview;
pub mod schema_store;
