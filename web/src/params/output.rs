use crate::extractors::form_data::FormData;
use crate::Error;
use domain::error::Error as DomainError;
use domain::generated_output::ScoreSubmission;

impl TryFrom<FormData> for ScoreSubmission {
    type Error = Error;

    fn try_from(form: FormData) -> Result<Self, Self::Error> {
        let required = |name: &str| DomainError::invalid(format!("{name} is required"));

        let user_answers = form
            .text("user_answers")
            .map(|answers| {
                serde_json::from_str(&answers)
                    .map_err(|_| DomainError::invalid("user_answers must be valid JSON"))
            })
            .transpose()?;

        Ok(ScoreSubmission {
            score: form.number("score")?.ok_or_else(|| required("score"))?,
            total: form.number("total")?.ok_or_else(|| required("total"))?,
            percentage: form
                .number("percentage")?
                .ok_or_else(|| required("percentage"))?,
            user_answers,
        })
    }
}
