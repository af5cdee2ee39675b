pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_profiles_table;
mod m20250301_000002_create_assignments_table;
mod m20250301_000003_create_submissions_table;
mod m20250301_000004_create_withdrawals_table;
mod m20250302_000001_add_workflow_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_profiles_table::Migration),
            Box::new(m20250301_000002_create_assignments_table::Migration),
            Box::new(m20250301_000003_create_submissions_table::Migration),
            Box::new(m20250301_000004_create_withdrawals_table::Migration),
            Box::new(m20250302_000001_add_workflow_indexes::Migration),
        ]
    }
}
