//! JT/T 808 附加信息记录

pub mod location;

pub use location::{LocationExtra, TemperatureBlock, VendorBlock};
