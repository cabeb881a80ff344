use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for (type_name, values) in [
            ("input_type", "'video', 'pdf', 'word', 'youtube', 'text'"),
            (
                "feature",
                "'summary', 'flashcards', 'quiz', 'presentation', 'chatbot'",
            ),
            ("media_kind", "'audio', 'video'"),
        ] {
            db.execute_unprepared(&format!(
                "CREATE TYPE edugen.{type_name} AS ENUM ({values})"
            ))
            .await?;
        }

        db.execute_unprepared(
            "CREATE TABLE edugen.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .await?;

        // References between tables are plain ids; ownership is checked by the application.
        db.execute_unprepared(
            "CREATE TABLE edugen.contents (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL,
                input_type edugen.input_type NOT NULL,
                normalized_text TEXT NOT NULL,
                title VARCHAR(200),
                source_name TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE edugen.generated_outputs (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL,
                content_id UUID NOT NULL,
                feature edugen.feature NOT NULL,
                options JSONB NOT NULL DEFAULT '{}'::jsonb,
                output JSONB NOT NULL DEFAULT '{}'::jsonb,
                score JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE edugen.quiz_attempts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL,
                quiz_id UUID NOT NULL,
                content_id UUID NOT NULL,
                responses JSONB NOT NULL DEFAULT '[]'::jsonb,
                score INTEGER NOT NULL,
                percentage DOUBLE PRECISION NOT NULL,
                mode VARCHAR(32) NOT NULL,
                attempted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE edugen.transcriptions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL,
                filename TEXT NOT NULL,
                file_type edugen.media_kind NOT NULL,
                transcript TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .await?;

        // Every list endpoint is "this user's rows, newest first"
        for statement in [
            "CREATE INDEX idx_contents_user_created ON edugen.contents(user_id, created_at DESC)",
            "CREATE INDEX idx_generated_outputs_content_user ON edugen.generated_outputs(content_id, user_id, created_at DESC)",
            "CREATE INDEX idx_quiz_attempts_user ON edugen.quiz_attempts(user_id, attempted_at DESC)",
            "CREATE INDEX idx_quiz_attempts_content ON edugen.quiz_attempts(content_id)",
            "CREATE INDEX idx_transcriptions_user_created ON edugen.transcriptions(user_id, created_at DESC)",
        ] {
            db.execute_unprepared(statement).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in [
            "transcriptions",
            "quiz_attempts",
            "generated_outputs",
            "contents",
            "users",
        ] {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS edugen.{table}"))
                .await?;
        }

        for type_name in ["media_kind", "feature", "input_type"] {
            db.execute_unprepared(&format!("DROP TYPE IF EXISTS edugen.{type_name}"))
                .await?;
        }

        Ok(())
    }
}
