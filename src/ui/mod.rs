pub mod charts;
pub mod customer;
pub mod drivers;
pub mod overview;
pub mod sources;
pub mod status;
pub mod table;
