pub mod entity;
pub mod payload;
pub mod record;
