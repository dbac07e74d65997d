pub mod entity;
pub mod file;
pub mod memory;
pub mod migrations;
pub mod sea_orm_repo;

pub use file::FileRegistrationsRepository;
pub use memory::MemoryRegistrationsRepository;
pub use sea_orm_repo::SeaOrmRegistrationsRepository;
