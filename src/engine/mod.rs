pub mod backfill;
pub mod day_key;
pub mod events;
pub mod holidays;
pub mod leave;
pub mod marker;
pub mod stats;
pub mod store;
