use super::{
    error::{Error, Result},
    model::CreateTodo,
};

/// Longest accepted title, in bytes.
pub const MAX_TITLE_LEN: usize = 200;

/// Longest accepted description, in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Checks every field of a create request.
pub fn validate_create(input: &CreateTodo) -> Result<()> {
    validate_title(&input.title)?;
    validate_description(&input.description)
}

/// A title must contain something other than whitespace and fit in
/// [`MAX_TITLE_LEN`] bytes.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("title is required"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(Error::validation("title too long"));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<()> {
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(Error::validation("description too long"));
    }
    Ok(())
}
