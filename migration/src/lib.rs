pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users_table;
mod m20261001_000002_create_contracts_table;
mod m20261001_000003_create_contract_signatures_table;
mod m20261002_000001_add_contract_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users_table::Migration),
            Box::new(m20261001_000002_create_contracts_table::Migration),
            Box::new(m20261001_000003_create_contract_signatures_table::Migration),
            Box::new(m20261002_000001_add_contract_indexes::Migration),
        ]
    }
}
