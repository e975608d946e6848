pub mod handlers;
pub mod receiver;
pub mod repository;
pub mod storage;
pub mod validation;
