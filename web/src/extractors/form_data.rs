//! Form bodies sent either as `multipart/form-data` or as
//! `application/x-www-form-urlencoded`.
//!
//! Browsers post `FormData` as multipart while scripts and tests tend to send
//! urlencoded bodies, so every form endpoint accepts both. Text fields are
//! collected by name; the part named `file` is kept as the uploaded file.

use crate::Error;
use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use domain::content::UploadedFile;
use domain::error::Error as DomainError;
use domain::Id;
use log::*;
use std::collections::HashMap;
use std::str::FromStr;

const FILE_FIELD: &str = "file";

#[derive(Debug, Default)]
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    pub(crate) file: Option<UploadedFile>,
}

impl FormData {
    /// The raw value of a field, blank or not.
    pub(crate) fn raw(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// A trimmed, non-blank text field.
    pub(crate) fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub(crate) fn required_id(&self, name: &str) -> Result<Id, Error> {
        let value = self
            .text(name)
            .ok_or_else(|| DomainError::invalid(format!("{name} is required")))?;
        Id::parse_str(&value)
            .map_err(|_| DomainError::invalid(format!("{name} is not a valid id")).into())
    }

    /// A numeric field. Blank counts as absent.
    pub(crate) fn number<T: FromStr>(&self, name: &str) -> Result<Option<T>, Error> {
        self.text(name)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|_| DomainError::invalid(format!("{name} must be a number")).into())
            })
            .transpose()
    }

    /// A checkbox-style flag: `true/false`, `1/0`, `yes/no` or `on/off`.
    pub(crate) fn flag(&self, name: &str) -> Result<Option<bool>, Error> {
        self.text(name)
            .map(|value| match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(DomainError::invalid(format!("{name} must be true or false")).into()),
            })
            .transpose()
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, Error> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Malformed multipart body: {e}");
            DomainError::invalid(e.body_text())
        })? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);

            match file_name {
                Some(file_name) if name == FILE_FIELD => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| DomainError::invalid(e.body_text()))?;
                    form.file = Some(UploadedFile {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                Some(file_name) => {
                    debug!("Ignoring unexpected file part {name} ({file_name})");
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| DomainError::invalid(e.body_text()))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_lowercase);

        match content_type {
            None => Ok(FormData::default()),
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| DomainError::invalid(e.body_text()))?;
                Self::from_multipart(multipart).await
            }
            Some(_) => {
                let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|e| DomainError::invalid(e.body_text()))?;
                Ok(FormData { fields, file: None })
            }
        }
    }
}
