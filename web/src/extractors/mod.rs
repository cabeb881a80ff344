pub(crate) mod authenticated_user;
pub(crate) mod form_data;
pub(crate) mod path;
