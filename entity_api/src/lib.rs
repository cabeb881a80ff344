use chrono::Utc;
use entity::input_type::InputType;
use log::info;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};

pub use entity::{access_token, contents, generated_outputs, quiz_attempts, transcriptions, users, Id};

pub mod content;
pub mod error;
pub mod generated_output;
pub mod quiz_attempt;
pub mod transcription;
pub mod user;

/// Seeds a demo account with one piece of pasted-text content so a fresh
/// database can be explored right away.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = Utc::now();

    let demo_user = users::ActiveModel {
        id: Set(Id::new_v4()),
        name: Set("Demo Student".to_owned()),
        email: Set("demo@edugen.local".to_owned()),
        password: Set(user::generate_hash("password")),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    contents::ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(demo_user.id),
        input_type: Set(InputType::Text),
        normalized_text: Set(
            "Photosynthesis is the process plants use to convert light energy into chemical \
             energy. It takes place in the chloroplasts. Carbon dioxide and water are \
             combined into glucose, releasing oxygen as a by-product. The light-dependent \
             reactions produce ATP and NADPH. The Calvin cycle uses them to fix carbon."
                .to_owned(),
        ),
        title: Set(Some("Photosynthesis basics".to_owned())),
        source_name: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    info!("Seeded demo user {}", demo_user.email);
    Ok(())
}
