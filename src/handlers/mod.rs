// handlers/mod.rs - HTTP handlers
//
// public: banner, health and login (/, /health, /auth/*)
// data:   one module per entity (/employee, /department, /manager, /area)
pub mod data;
pub mod public;
