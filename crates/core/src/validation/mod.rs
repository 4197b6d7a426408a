pub mod form_validation;

pub use form_validation::{
    validate_amount, validate_budget_form, validate_transaction_form, validate_unique_name,
    FormErrors, NameError,
};
