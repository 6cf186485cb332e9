// handlers/data/mod.rs - Entity CRUD handlers
//
// Every entity exposes the same seven routes:
//   GET    /:entity                 list, references joined
//   GET    /:entity/:key            one record
//   GET    /:entity/search/:query   key or name search
//   POST   /:entity                 create (201)
//   PUT    /:entity/:key            partial update
//   PATCH  /:entity/:key            single-field replace, `override` unlocks relationships
//   DELETE /:entity/:key?force=true delete, detaching dependents when forced
pub mod area;
pub mod department;
pub mod employee;
pub mod manager;
pub mod utils;
