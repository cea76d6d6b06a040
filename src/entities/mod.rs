pub mod alert;
pub mod booking;
pub mod driver;
pub mod organization;
pub mod trip;
pub mod trip_stop;
pub mod user;
pub mod vehicle;
