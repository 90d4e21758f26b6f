// src/repository/mod.rs
//! SQLite-backed stores. Each repository borrows the pool for the duration of a request.

pub mod applications;
pub mod cvs;
pub mod users;

pub use applications::ApplicationRepository;
pub use cvs::{CvRecord, CvRepository};
pub use users::{User, UserRepository};
