// Layers, inside out:
// - domain: roles, permissions and care records
// - application: ports, access scoping and use cases
// - infrastructure: Postgres repositories and the report file store
// - presentation: axum handlers, extractors and routing
// - bootstrap: configuration and the shared app context

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
