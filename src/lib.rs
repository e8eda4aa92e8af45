// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - infrastructure: Postgres and in-memory stores, password hashing
// - presentation: HTTP handlers and routing
// - application: ports, unit of work and use cases
// - domain: users, messages, follows and likes

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
