pub mod observation;
pub mod price;
pub mod timestamp;
