//! Module records and the factory that creates them.
pub mod factory;
pub mod record;

pub use factory::ModuleFactory;
pub use record::{ModuleId, ModuleRecord};
