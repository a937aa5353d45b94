//! The user form: field state, field rules, and the mapping to
//! `UserCreateInput`.
//!
//! # Design
//! The form is rendering-agnostic. A view reads `value`, `is_disabled` and
//! `is_required` per field, pushes keystrokes through `set`, and calls
//! `submit` when the user confirms. Validation runs entirely client-side, so
//! an input missing a required field never reaches a controller.
//!
//! In edit mode a blank password means "keep the current one" and the
//! produced input has no password at all.

use std::sync::LazyLock;

use regex::Regex;

use crate::controller::CreateUserState;
use crate::error::ValidationErrors;
use crate::types::{UserCreateInput, UserRecord};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)*$").expect("email pattern compiles")
});

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 8;
pub const NAME_MAX: usize = 50;
pub const PHONE_MAX: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Email,
    Password,
    FirstName,
    LastName,
    PhoneNumber,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Username,
        Field::Email,
        Field::Password,
        Field::FirstName,
        Field::LastName,
        Field::PhoneNumber,
    ];

    /// Wire and validation key for the field.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Email => "email",
            Field::Password => "password",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::PhoneNumber => "phoneNumber",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Username => "Username",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::PhoneNumber => "Phone Number",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldValues {
    username: String,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    phone_number: String,
}

impl FieldValues {
    fn from_initial(initial: Option<&UserCreateInput>) -> Self {
        let Some(initial) = initial else {
            return Self::default();
        };
        Self {
            username: initial.username.clone(),
            email: initial.email.clone(),
            password: String::new(),
            first_name: initial.first_name.clone().unwrap_or_default(),
            last_name: initial.last_name.clone().unwrap_or_default(),
            phone_number: initial.phone_number.clone().unwrap_or_default(),
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Username => &mut self.username,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::PhoneNumber => &mut self.phone_number,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserForm {
    pub is_loading: bool,
    pub error: Option<String>,
    pub submit_button_text: String,
    is_edit_mode: bool,
    initial_data: Option<UserCreateInput>,
    values: FieldValues,
}

impl UserForm {
    pub fn create() -> Self {
        Self {
            is_loading: false,
            error: None,
            submit_button_text: "Create User".to_string(),
            is_edit_mode: false,
            initial_data: None,
            values: FieldValues::default(),
        }
    }

    /// Pre-fill from a server record. The password always starts blank.
    pub fn edit(record: &UserRecord) -> Self {
        let initial = UserCreateInput {
            username: record.username.clone(),
            email: record.email.clone(),
            password: None,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            phone_number: record.phone_number.clone(),
        };
        Self {
            is_loading: false,
            error: None,
            submit_button_text: "Update User".to_string(),
            is_edit_mode: true,
            values: FieldValues::from_initial(Some(&initial)),
            initial_data: Some(initial),
        }
    }

    pub fn with_submit_button_text(mut self, text: impl Into<String>) -> Self {
        self.submit_button_text = text.into();
        self
    }

    pub fn is_edit_mode(&self) -> bool {
        self.is_edit_mode
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit_mode {
            "Edit User"
        } else {
            "Create New User"
        }
    }

    pub fn initial_data(&self) -> Option<&UserCreateInput> {
        self.initial_data.as_ref()
    }

    /// Replace the initial data and reset every field from it. Clearing the
    /// initial data of an edit form keeps whatever has been typed.
    pub fn set_initial_data(&mut self, initial: Option<UserCreateInput>) {
        if initial.is_some() || !self.is_edit_mode {
            self.values = FieldValues::from_initial(initial.as_ref());
        }
        self.initial_data = initial;
    }

    /// Mirror a controller's loading/error state onto the form.
    pub fn apply_state(&mut self, state: &CreateUserState) {
        self.is_loading = state.is_loading;
        self.error = state.error.clone();
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.values.username,
            Field::Email => &self.values.email,
            Field::Password => &self.values.password,
            Field::FirstName => &self.values.first_name,
            Field::LastName => &self.values.last_name,
            Field::PhoneNumber => &self.values.phone_number,
        }
    }

    /// Update a field. Returns `false`, leaving the value untouched, when the
    /// field is disabled.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.is_disabled(field) {
            return false;
        }
        *self.values.slot(field) = value.into();
        true
    }

    pub fn is_disabled(&self, field: Field) -> bool {
        if self.is_loading {
            return true;
        }
        field == Field::Username
            && self.is_edit_mode
            && self.initial_data.as_ref().is_some_and(|d| !d.username.is_empty())
    }

    pub fn is_required(&self, field: Field) -> bool {
        match field {
            Field::Username | Field::Email => true,
            Field::Password => !self.is_edit_mode,
            Field::FirstName | Field::LastName | Field::PhoneNumber => false,
        }
    }

    pub fn password_hint(&self) -> Option<&'static str> {
        self.is_edit_mode.then_some("(Leave blank to keep current)")
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let v = &self.values;

        let username_len = v.username.chars().count();
        if v.username.trim().is_empty() {
            errors.add(Field::Username.name(), "Username cannot be blank");
        } else if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
            errors.add(
                Field::Username.name(),
                format!("Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"),
            );
        }

        if v.email.trim().is_empty() {
            errors.add(Field::Email.name(), "Email cannot be blank");
        } else {
            if !EMAIL_PATTERN.is_match(&v.email) {
                errors.add(Field::Email.name(), "Email should be valid");
            }
            if v.email.chars().count() > EMAIL_MAX {
                errors.add(Field::Email.name(), format!("Email cannot exceed {EMAIL_MAX} characters"));
            }
        }

        if v.password.is_empty() {
            if self.is_required(Field::Password) {
                errors.add(Field::Password.name(), "Password cannot be blank");
            }
        } else if v.password.chars().count() < PASSWORD_MIN {
            errors.add(
                Field::Password.name(),
                format!("Password must be at least {PASSWORD_MIN} characters long"),
            );
        }

        for (field, value, max) in [
            (Field::FirstName, &v.first_name, NAME_MAX),
            (Field::LastName, &v.last_name, NAME_MAX),
            (Field::PhoneNumber, &v.phone_number, PHONE_MAX),
        ] {
            if value.chars().count() > max {
                errors.add(field.name(), format!("{} cannot exceed {max} characters", field.label()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and build the payload.
    ///
    /// `Ok(None)` while a submission is already in flight: the trigger is
    /// disabled and nothing is produced.
    pub fn submit(&self) -> Result<Option<UserCreateInput>, ValidationErrors> {
        if self.is_loading {
            return Ok(None);
        }
        self.validate()?;

        let v = &self.values;
        let optional = |s: &String| (!s.is_empty()).then(|| s.clone());
        let password = (!self.is_edit_mode || !v.password.is_empty()).then(|| v.password.clone());

        Ok(Some(UserCreateInput {
            username: v.username.clone(),
            email: v.email.clone(),
            password,
            first_name: optional(&v.first_name),
            last_name: optional(&v.last_name),
            phone_number: optional(&v.phone_number),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::record;

    fn filled_create_form() -> UserForm {
        let mut form = UserForm::create();
        form.set(Field::Username, "jdoe");
        form.set(Field::Email, "jdoe@example.com");
        form.set(Field::Password, "correct-horse");
        form
    }

    #[test]
    fn create_mode_always_sends_password() {
        let input = filled_create_form().submit().unwrap().unwrap();
        assert_eq!(input.password.as_deref(), Some("correct-horse"));
        assert_eq!(input.first_name, None);
        assert_eq!(input.phone_number, None);
    }

    #[test]
    fn create_mode_requires_password() {
        let mut form = filled_create_form();
        form.set(Field::Password, "");
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.on("password"), ["Password cannot be blank"]);
    }

    #[test]
    fn edit_with_blank_password_omits_the_key() {
        let form = UserForm::edit(&record("1", "jdoe"));
        let input = form.submit().unwrap().unwrap();
        assert_eq!(input.password, None);
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn edit_with_new_password_sends_it() {
        let mut form = UserForm::edit(&record("1", "jdoe"));
        form.set(Field::Password, "brand-new-pass");
        let input = form.submit().unwrap().unwrap();
        assert_eq!(input.password.as_deref(), Some("brand-new-pass"));
    }

    #[test]
    fn edit_form_round_trips_record_fields() {
        let user = record("1", "jdoe");
        let form = UserForm::edit(&user);

        assert_eq!(form.value(Field::Username), user.username);
        assert_eq!(form.value(Field::Email), user.email);
        assert_eq!(form.value(Field::FirstName), "Jane");
        assert_eq!(form.value(Field::LastName), "Doe");
        assert_eq!(form.value(Field::PhoneNumber), "");
        assert_eq!(form.value(Field::Password), "");
        assert!(form.is_disabled(Field::Username));
        assert!(!form.is_disabled(Field::Email));
        assert_eq!(form.title(), "Edit User");
        assert!(!form.is_required(Field::Password));
    }

    #[test]
    fn disabled_username_ignores_edits() {
        let mut form = UserForm::edit(&record("1", "jdoe"));
        assert!(!form.set(Field::Username, "someone-else"));
        assert_eq!(form.value(Field::Username), "jdoe");
    }

    #[test]
    fn loading_disables_fields_and_submission() {
        let mut form = filled_create_form();
        form.is_loading = true;
        assert!(Field::ALL.iter().all(|f| form.is_disabled(*f)));
        assert_eq!(form.submit(), Ok(None));
    }

    #[test]
    fn length_limits_are_enforced() {
        let mut form = filled_create_form();
        form.set(Field::Username, "jd");
        form.set(Field::Password, "short");
        form.set(Field::FirstName, "x".repeat(51));
        form.set(Field::PhoneNumber, "5".repeat(21));
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.on("username"), ["Username must be between 3 and 100 characters"]);
        assert_eq!(errors.on("password"), ["Password must be at least 8 characters long"]);
        assert_eq!(errors.on("firstName"), ["First Name cannot exceed 50 characters"]);
        assert_eq!(errors.on("phoneNumber"), ["Phone Number cannot exceed 20 characters"]);
        assert!(!errors.has_error("lastName"));
    }

    #[test]
    fn email_must_be_present_and_well_formed() {
        let mut form = filled_create_form();
        form.set(Field::Email, "");
        assert_eq!(form.validate().unwrap_err().on("email"), ["Email cannot be blank"]);

        form.set(Field::Email, "not-an-email");
        assert_eq!(form.validate().unwrap_err().on("email"), ["Email should be valid"]);

        form.set(Field::Email, "jdoe@example.");
        assert_eq!(form.validate().unwrap_err().on("email"), ["Email should be valid"]);
    }

    #[test]
    fn submit_button_text_can_be_overridden() {
        assert_eq!(UserForm::create().submit_button_text, "Create User");
        let form = UserForm::create().with_submit_button_text("Save");
        assert_eq!(form.submit_button_text, "Save");
    }

    #[test]
    fn email_domain_without_dot_is_accepted() {
        let mut form = UserForm::create();
        form.set(Field::Username, "admin");
        form.set(Field::Email, "admin@localhost");
        form.set(Field::Password, "correct-horse");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn reset_from_initial_data_clears_password() {
        let mut form = UserForm::edit(&record("1", "jdoe"));
        form.set(Field::Password, "typed-something");
        form.set_initial_data(form.initial_data().cloned());
        assert_eq!(form.value(Field::Password), "");

        form.set(Field::Email, "typed@example.com");
        form.set_initial_data(None);
        assert_eq!(form.value(Field::Username), "jdoe");
        assert_eq!(form.value(Field::Email), "typed@example.com");
        assert!(form.initial_data().is_none());
    }

    #[test]
    fn clearing_initial_data_of_create_form_resets_fields() {
        let mut form = filled_create_form();
        form.set_initial_data(None);
        for field in Field::ALL {
            assert_eq!(form.value(field), "", "{}", field.name());
        }
    }

    #[test]
    fn controller_state_flows_into_form() {
        let mut form = UserForm::create();
        form.apply_state(&CreateUserState {
            is_loading: false,
            error: Some("Network Error".to_string()),
            success: false,
        });
        assert_eq!(form.error.as_deref(), Some("Network Error"));
        assert!(!form.is_loading);
    }
}
