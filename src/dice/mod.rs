pub mod notation;
pub mod roll;
