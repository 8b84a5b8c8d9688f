pub mod clean;
pub mod enrich;
pub mod inspect;
