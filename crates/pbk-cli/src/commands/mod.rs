pub mod build;
pub mod check_params;
pub mod dispatch;
pub mod names;
pub mod shared;
pub mod simulate;
