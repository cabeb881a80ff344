use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS edugen;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO edugen, public;")
            .await?;

        // Let the application role manage everything created in the schema
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    GRANT ALL ON SCHEMA edugen TO edugen;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA edugen GRANT ALL ON TABLES TO edugen;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA edugen GRANT ALL ON SEQUENCES TO edugen;
                END $$;
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS edugen CASCADE;")
            .await?;

        Ok(())
    }
}
