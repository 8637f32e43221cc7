//! Small pure helpers shared by the core services and adapters.

pub mod domain_name;
