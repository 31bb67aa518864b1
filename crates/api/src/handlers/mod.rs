pub mod books;
pub mod import;
pub mod orders;
pub mod payments;
