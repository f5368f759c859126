pub mod licensing;
pub mod review_import;
