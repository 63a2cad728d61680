//! Submission gate.

use conform_types::{CONNECTOR_NAME_FIELD, FieldSchema, FieldValue, FormValues};

/// Returns true when the form can be submitted.
///
/// The connector name must be non-blank after trimming, and every value that
/// is the empty string must belong to a field marked optional. Keys without a
/// schema count as required. Lists, booleans, and raw values never count as
/// empty here; their presence is the ruleset's concern.
pub fn is_form_submittable(values: &FormValues, schemas: &[FieldSchema]) -> bool {
    let name_present = values
        .get(CONNECTOR_NAME_FIELD)
        .and_then(FieldValue::as_text)
        .is_some_and(|name| !name.trim().is_empty());
    if !name_present {
        return false;
    }
    values.iter().all(|(key, value)| {
        let optional = schemas.iter().any(|field| field.name == *key && field.optional);
        optional || !value.is_empty_text()
    })
}

/// Parent notified when the form's completability changes.
pub trait FormStatusListener {
    fn form_status_changed(&mut self, submittable: bool);

    /// Advanced options are exposed for every connector form.
    fn allow_advanced(&mut self, _allowed: bool) {}
}

impl<F> FormStatusListener for F
where
    F: FnMut(bool),
{
    fn form_status_changed(&mut self, submittable: bool) {
        self(submittable)
    }
}
