//! Persistence collaborators.
//!
//! Handlers and the statistics aggregator only see the traits in
//! [`repository`]. Two backends implement them: [`postgres`] for deployments
//! and [`memory`] for tests and local runs (`DATABASE_URL=memory://`).

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;
pub use repository::{
    DayRepository, FullRepository, RepositoryError, RepositoryResult, UserRepository,
};
