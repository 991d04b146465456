mod memory;
mod postgres;

pub use memory::MemoryWorkStore;
pub use postgres::PgWorkStore;
