pub mod home;

pub use home::{map_page, MapPageVm};
