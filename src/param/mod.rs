pub mod schema;
pub mod store;

pub use schema::{ParamSchema, ParamType};
pub use store::{ParamStore, ParamValue};
