// Parameter control: validated, rollback-safe writes to the session.

pub mod store;
