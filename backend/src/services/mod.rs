pub mod assembler;
pub mod crawler;
pub mod fetchers;
pub mod harvest_service;
pub mod storage;
pub mod transcript;
pub mod youtube;

#[cfg(test)]
pub(crate) mod mock;
