pub mod controller;
pub mod record;
pub mod state;
