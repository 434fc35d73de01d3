pub mod app;

pub use app::{bearer, json_body, make_test_app};
pub use xlsx::roster_xlsx;
