pub mod logging;
pub mod media;
pub mod timing;
