//! Step validation producing field → message maps
//!
//! Each wizard step owns a slice of the [`RegistrationForm`]. The slice is
//! converted to JSON, empty optional values are pruned (so optional fields are
//! only checked when filled in), and the result is checked against the
//! step's embedded JSON Schema. Messages come from the `x-errors` table of
//! the failing property, falling back to a generic message built from its
//! `title`. Rules that need more than one field or outside data (reference
//! lists, today's date, the image list) run afterwards in Rust.
//!
//! Validation never fails: the outcome is always a [`ValidationErrors`] map,
//! empty when the step is acceptable.

use chrono::{Local, NaiveDate};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, Validator as JsonValidator};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

use crate::entities::image::ImageSet;
use crate::entities::reference::{ReferenceData, ReferenceKind};
use crate::entities::registration::RegistrationForm;
use crate::schema::registry::SchemaRegistry;
use crate::schema::rules::{check_past_date, is_disposable_email, primary_count, DateProblem};
use crate::wizard::step::WizardStep;

/// Field path (dot notation, e.g. `bankAccounts.0.bankId`) → message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message unless the field already has one
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Keep only entries whose path satisfies the predicate
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> ValidationErrors {
        ValidationErrors {
            errors: self
                .errors
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Merge another map, keeping existing messages on conflict
    pub fn extend(&mut self, other: ValidationErrors) {
        for (path, message) in other.errors {
            self.insert(path, message);
        }
    }
}

struct CompiledStep {
    schema: Value,
    validator: JsonValidator,
}

/// Validator for every wizard step
pub struct StepValidator {
    compiled: HashMap<WizardStep, CompiledStep>,
    reference: ReferenceData,
}

impl StepValidator {
    /// Compile the embedded schemas
    pub fn new() -> Self {
        let registry = SchemaRegistry;
        let mut compiled = HashMap::new();

        for step in WizardStep::all() {
            let Some(schema) = registry.get_json(*step) else {
                continue;
            };
            match validator_for(&schema) {
                Ok(validator) => {
                    compiled.insert(*step, CompiledStep { schema, validator });
                }
                Err(e) => {
                    tracing::error!(step = %step, error = %e, "failed to compile step schema");
                }
            }
        }

        Self {
            compiled,
            reference: ReferenceData::default(),
        }
    }

    /// Check reference ids against these lists
    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = reference;
        self
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Validate one step as of today
    pub fn validate(&self, step: WizardStep, form: &RegistrationForm, images: &ImageSet) -> ValidationErrors {
        self.validate_on(step, form, images, Local::now().date_naive())
    }

    /// Validate one step, treating `today` as the latest acceptable date
    pub fn validate_on(
        &self,
        step: WizardStep,
        form: &RegistrationForm,
        images: &ImageSet,
        today: NaiveDate,
    ) -> ValidationErrors {
        let mut errors = self.schema_errors(step, form);

        match step {
            WizardStep::BusinessInfo => self.refine_business(form, today, &mut errors),
            WizardStep::Address => {}
            WizardStep::BankDetails => self.refine_bank_accounts(form, &mut errors),
            WizardStep::Contacts => refine_contacts(form, &mut errors),
            WizardStep::Staff => refine_staff(form, &mut errors),
            WizardStep::Images => {
                if images.is_empty() {
                    errors.insert("images", "Upload at least one property image");
                }
            }
        }

        tracing::debug!(step = %step, errors = errors.len(), "validated step");
        errors
    }

    /// Validate every step, returning only the steps that have errors
    pub fn validate_all_by_step(
        &self,
        form: &RegistrationForm,
        images: &ImageSet,
    ) -> Vec<(WizardStep, ValidationErrors)> {
        WizardStep::all()
            .iter()
            .map(|step| (*step, self.validate(*step, form, images)))
            .filter(|(_, errors)| !errors.is_empty())
            .collect()
    }

    fn schema_errors(&self, step: WizardStep, form: &RegistrationForm) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let Some(compiled) = self.compiled.get(&step) else {
            return errors;
        };

        let mut instance = step_slice(step, form);
        prune_empty(&mut instance);

        for error in compiled.validator.iter_errors(&instance) {
            let schema_path = error.schema_path.as_str().to_string();
            let (parent, keyword) = split_pointer(&schema_path);
            let instance_path = pointer_to_dotted(error.instance_path.as_str());

            let (path, field_schema) = match &error.kind {
                ValidationErrorKind::Required { property } => {
                    let property = property.as_str().unwrap_or_default().to_string();
                    let field_schema = compiled
                        .schema
                        .pointer(parent)
                        .and_then(|s| s.get("properties"))
                        .and_then(|p| p.get(&property));
                    (join_path(&instance_path, &property), field_schema)
                }
                _ => (instance_path, compiled.schema.pointer(parent)),
            };

            let message = field_schema
                .and_then(|s| s.get("x-errors"))
                .and_then(|m| m.get(keyword))
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| fallback_message(keyword, field_schema, &path));
            errors.insert(path, message);
        }
        errors
    }

    fn refine_business(&self, form: &RegistrationForm, today: NaiveDate, errors: &mut ValidationErrors) {
        let business = &form.business;

        if !errors.contains("registrationDate") && !business.registration_date.trim().is_empty() {
            match check_past_date(&business.registration_date, today) {
                Ok(_) => {}
                Err(DateProblem::Unparseable) => {
                    errors.insert("registrationDate", "Enter a valid registration date")
                }
                Err(DateProblem::InFuture) => {
                    errors.insert("registrationDate", "Registration date cannot be in the future")
                }
            }
        }

        if !errors.contains("contactEmail") && is_disposable_email(&business.contact_email) {
            errors.insert("contactEmail", "Disposable email addresses are not allowed");
        }

        self.check_reference(
            ReferenceKind::BusinessTypes,
            &business.business_type_id,
            "businessTypeId",
            "Select a valid business type",
            errors,
        );
        self.check_reference(
            ReferenceKind::OwnershipTypes,
            &business.ownership_type_id,
            "ownershipTypeId",
            "Select a valid ownership type",
            errors,
        );
    }

    fn refine_bank_accounts(&self, form: &RegistrationForm, errors: &mut ValidationErrors) {
        for (i, account) in form.bank_accounts.iter().enumerate() {
            self.check_reference(
                ReferenceKind::Banks,
                &account.bank_id,
                &format!("bankAccounts.{}.bankId", i),
                "Select a valid bank",
                errors,
            );
            self.check_reference(
                ReferenceKind::AccountTypes,
                &account.account_type_id,
                &format!("bankAccounts.{}.accountTypeId", i),
                "Select a valid account type",
                errors,
            );
        }
        if !form.bank_accounts.is_empty() && primary_count(&form.bank_accounts) != 1 {
            errors.insert("bankAccounts", "Mark exactly one bank account as primary");
        }
    }

    fn check_reference(
        &self,
        kind: ReferenceKind,
        id: &str,
        path: &str,
        message: &str,
        errors: &mut ValidationErrors,
    ) {
        if id.trim().is_empty() || errors.contains(path) {
            return;
        }
        if self.reference.contains(kind, id) == Some(false) {
            errors.insert(path, message);
        }
    }
}

impl Default for StepValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn refine_contacts(form: &RegistrationForm, errors: &mut ValidationErrors) {
    for (i, contact) in form.contacts.iter().enumerate() {
        let path = format!("contacts.{}.email", i);
        if !errors.contains(&path) && is_disposable_email(&contact.email) {
            errors.insert(path, "Disposable email addresses are not allowed");
        }
    }
    if !form.contacts.is_empty() && primary_count(&form.contacts) != 1 {
        errors.insert("contacts", "Mark exactly one contact as primary");
    }
}

fn refine_staff(form: &RegistrationForm, errors: &mut ValidationErrors) {
    for (i, member) in form.staff.iter().enumerate() {
        let path = format!("staff.{}.email", i);
        if !errors.contains(&path) && is_disposable_email(&member.email) {
            errors.insert(path, "Disposable email addresses are not allowed");
        }
    }
}

/// The part of the form a step validates
fn step_slice(step: WizardStep, form: &RegistrationForm) -> Value {
    let value = match step {
        WizardStep::BusinessInfo => serde_json::to_value(&form.business),
        WizardStep::Address => serde_json::to_value(&form.address),
        WizardStep::BankDetails => Ok(json!({ "bankAccounts": form.bank_accounts })),
        WizardStep::Contacts => Ok(json!({ "contacts": form.contacts })),
        WizardStep::Staff => Ok(json!({ "staff": form.staff })),
        WizardStep::Images => serde_json::to_value(&form.attachments),
    };
    // Plain data structs always serialize
    value.unwrap_or(Value::Null)
}

/// Drop blank strings and nulls from objects, recursively
fn prune_empty(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            });
            for v in map.values_mut() {
                prune_empty(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(prune_empty),
        _ => {}
    }
}

/// Split a JSON pointer into (parent pointer, last segment)
fn split_pointer(pointer: &str) -> (&str, &str) {
    match pointer.rfind('/') {
        Some(i) => (&pointer[..i], &pointer[i + 1..]),
        None => ("", pointer),
    }
}

/// `/bankAccounts/0/bankId` → `bankAccounts.0.bankId`
fn pointer_to_dotted(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

fn fallback_message(keyword: &str, field_schema: Option<&Value>, path: &str) -> String {
    let label = field_schema
        .and_then(|s| s.get("title"))
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| path.rsplit('.').next().unwrap_or(path).to_string());
    match keyword {
        "required" => format!("{} is required", label),
        "minLength" => format!("{} is too short", label),
        "maxLength" => format!("{} is too long", label),
        "pattern" => format!("{} has an invalid format", label),
        "enum" => format!("{} has an unsupported value", label),
        "type" => format!("{} has the wrong type", label),
        "minItems" => format!("{} needs more entries", label),
        "maxItems" => format!("{} has too many entries", label),
        _ => format!("{} is invalid", label),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entities::image::ImageCandidate;
    use crate::entities::reference::ReferenceItem;
    use crate::entities::registration::{BankAccount, Contact, StaffMember};
    use std::path::PathBuf;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    pub(crate) fn valid_form() -> RegistrationForm {
        let mut form = RegistrationForm::new();
        form.business.legal_name = "Lakeside Lodge Ltd".to_string();
        form.business.business_type_id = "1".to_string();
        form.business.ownership_type_id = "2".to_string();
        form.business.registration_date = "2019-03-14".to_string();
        form.business.contact_phone = "+256764521328".to_string();
        form.business.contact_email = "info@lakeside.ug".to_string();
        form.address.parish_name = "Nakasero I".to_string();
        form.address.physical_address = "Plot 12, Kyadondo Road".to_string();
        form.bank_accounts[0] = BankAccount {
            bank_id: "10".to_string(),
            account_name: "Lakeside Lodge Ltd".to_string(),
            account_number: "9030012345678".to_string(),
            account_type_id: "3".to_string(),
            is_primary: true,
            ..Default::default()
        };
        form.contacts[0] = Contact {
            name: "Grace Namubiru".to_string(),
            phone: "+256772000111".to_string(),
            is_primary: true,
            ..Default::default()
        };
        form.attachments.owner_nin = "CM12345678ABCD".to_string();
        form
    }

    pub(crate) fn one_image() -> ImageSet {
        let mut images = ImageSet::new();
        images.add(vec![ImageCandidate {
            path: PathBuf::from("front.jpg"),
            file_name: "front.jpg".to_string(),
            content_type: Some("image/jpeg"),
            size: 2048,
        }]);
        images
    }

    fn check(step: WizardStep, form: &RegistrationForm) -> ValidationErrors {
        StepValidator::new().validate_on(step, form, &one_image(), today())
    }

    #[test]
    fn test_valid_form_passes_every_step() {
        let form = valid_form();
        for step in WizardStep::all() {
            let errors = check(*step, &form);
            assert!(errors.is_empty(), "{} failed: {:?}", step, errors);
        }
    }

    #[test]
    fn test_missing_required_fields_use_schema_messages() {
        let form = RegistrationForm::new();
        let errors = check(WizardStep::BusinessInfo, &form);
        assert_eq!(errors.get("legalName"), Some("Legal name is required"));
        assert_eq!(errors.get("businessTypeId"), Some("Select a business type"));
        assert_eq!(errors.get("contactPhone"), Some("Contact phone is required"));
        // optional and empty: not validated
        assert!(!errors.contains("website"));
        assert!(!errors.contains("tradingName"));
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let mut form = valid_form();
        form.business.legal_name = "   ".to_string();
        let errors = check(WizardStep::BusinessInfo, &form);
        assert_eq!(errors.get("legalName"), Some("Legal name is required"));
    }

    #[test]
    fn test_optional_field_validated_when_filled() {
        let mut form = valid_form();
        form.business.website = "lakeside".to_string();
        let errors = check(WizardStep::BusinessInfo, &form);
        assert!(errors.get("website").unwrap().contains("http"));

        form.business.website = "https://lakeside.ug".to_string();
        assert!(check(WizardStep::BusinessInfo, &form).is_empty());
    }

    #[test]
    fn test_phone_pattern() {
        let mut form = valid_form();
        for (phone, ok) in [
            ("+25676452132", true),
            ("+12345678", true),
            ("+12345678901234567890", true),
            ("+1234567", false),
            ("+123456789012345678901", false),
            ("+0764521328", false),
            ("256764521328", false),
            ("+256 764521328", false),
        ] {
            form.business.contact_phone = phone.to_string();
            let errors = check(WizardStep::BusinessInfo, &form);
            assert_eq!(errors.contains("contactPhone"), !ok, "phone {}", phone);
        }
    }

    #[test]
    fn test_email_rules() {
        let mut form = valid_form();
        form.business.contact_email = "not-an-email".to_string();
        assert_eq!(
            check(WizardStep::BusinessInfo, &form).get("contactEmail"),
            Some("Enter a valid email address")
        );

        form.business.contact_email = "owner@mailinator.com".to_string();
        assert_eq!(
            check(WizardStep::BusinessInfo, &form).get("contactEmail"),
            Some("Disposable email addresses are not allowed")
        );
    }

    #[test]
    fn test_registration_date_rules() {
        let mut form = valid_form();
        form.business.registration_date = "14/03/2019".to_string();
        assert_eq!(
            check(WizardStep::BusinessInfo, &form).get("registrationDate"),
            Some("Registration date must be in YYYY-MM-DD format")
        );

        form.business.registration_date = "2019-02-30".to_string();
        assert_eq!(
            check(WizardStep::BusinessInfo, &form).get("registrationDate"),
            Some("Enter a valid registration date")
        );

        form.business.registration_date = "2024-06-02".to_string();
        assert_eq!(
            check(WizardStep::BusinessInfo, &form).get("registrationDate"),
            Some("Registration date cannot be in the future")
        );
    }

    #[test]
    fn test_bank_account_paths_use_dot_notation() {
        let mut form = valid_form();
        form.bank_accounts.push(BankAccount::default());
        form.bank_accounts[1].account_number = "12ab".to_string();
        let errors = check(WizardStep::BankDetails, &form);
        assert_eq!(errors.get("bankAccounts.1.bankId"), Some("Select a bank"));
        assert_eq!(
            errors.get("bankAccounts.1.accountNumber"),
            Some("Account number must be 6 to 20 digits")
        );
        assert!(!errors.contains("bankAccounts.0.bankId"));
    }

    #[test]
    fn test_bank_accounts_need_exactly_one_primary() {
        let mut form = valid_form();
        form.bank_accounts[0].is_primary = false;
        assert!(check(WizardStep::BankDetails, &form).contains("bankAccounts"));

        let mut second = form.bank_accounts[0].clone();
        second.is_primary = true;
        form.bank_accounts[0].is_primary = true;
        form.bank_accounts.push(second);
        assert_eq!(
            check(WizardStep::BankDetails, &form).get("bankAccounts"),
            Some("Mark exactly one bank account as primary")
        );
    }

    #[test]
    fn test_empty_bank_list_needs_an_account() {
        let mut form = valid_form();
        form.bank_accounts.clear();
        assert_eq!(
            check(WizardStep::BankDetails, &form).get("bankAccounts"),
            Some("Add at least one bank account")
        );
    }

    #[test]
    fn test_currency_enum() {
        let mut form = valid_form();
        form.bank_accounts[0].currency = "BTC".to_string();
        assert!(check(WizardStep::BankDetails, &form).contains("bankAccounts.0.currency"));
    }

    #[test]
    fn test_reference_membership_only_when_lists_loaded() {
        let form = valid_form();
        let validator = StepValidator::new().with_reference(ReferenceData {
            banks: vec![ReferenceItem::new("11", "Centenary")],
            ..Default::default()
        });
        let errors = validator.validate_on(WizardStep::BankDetails, &form, &one_image(), today());
        assert_eq!(errors.get("bankAccounts.0.bankId"), Some("Select a valid bank"));
        // account types list empty → not checked
        assert!(!errors.contains("bankAccounts.0.accountTypeId"));
    }

    #[test]
    fn test_contacts_rules() {
        let mut form = valid_form();
        form.contacts.push(Contact {
            name: "J".to_string(),
            phone: "0772000111".to_string(),
            email: "j@yopmail.com".to_string(),
            ..Default::default()
        });
        let errors = check(WizardStep::Contacts, &form);
        assert!(errors.contains("contacts.1.name"));
        assert!(errors.contains("contacts.1.phone"));
        assert_eq!(
            errors.get("contacts.1.email"),
            Some("Disposable email addresses are not allowed")
        );
        assert!(!errors.contains("contacts"));
    }

    #[test]
    fn test_staff_is_optional_but_entries_are_checked() {
        let mut form = valid_form();
        assert!(check(WizardStep::Staff, &form).is_empty());

        form.staff.push(StaffMember {
            full_name: "Okello Peter".to_string(),
            role: "BUTLER".to_string(),
            ..Default::default()
        });
        let errors = check(WizardStep::Staff, &form);
        assert_eq!(errors.get("staff.0.role"), Some("Select a valid role"));
    }

    #[test]
    fn test_images_step_requires_image_and_nin() {
        let mut form = valid_form();
        form.attachments.owner_nin = "12345".to_string();
        let errors = StepValidator::new().validate_on(WizardStep::Images, &form, &ImageSet::new(), today());
        assert_eq!(errors.get("images"), Some("Upload at least one property image"));
        assert_eq!(
            errors.get("ownerNin"),
            Some("NIN must be 14 characters starting with CM or CF")
        );
    }

    #[test]
    fn test_free_text_parish_passes_address_step() {
        let mut form = valid_form();
        form.address.parish_id.clear();
        form.address.parish_name = "Kisugu".to_string();
        assert!(check(WizardStep::Address, &form).is_empty());

        form.address.parish_name.clear();
        assert_eq!(check(WizardStep::Address, &form).get("parishName"), Some("Parish is required"));
    }

    #[test]
    fn test_validate_all_by_step_reports_only_failing_steps() {
        let mut form = valid_form();
        form.address.physical_address.clear();
        let failing = StepValidator::new().validate_all_by_step(&form, &one_image());
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].0, WizardStep::Address);
    }

    #[test]
    fn test_pointer_helpers() {
        assert_eq!(pointer_to_dotted("/bankAccounts/0/bankId"), "bankAccounts.0.bankId");
        assert_eq!(pointer_to_dotted(""), "");
        assert_eq!(split_pointer("/properties/a/minLength"), ("/properties/a", "minLength"));
        assert_eq!(split_pointer("/required"), ("", "required"));
        assert_eq!(join_path("", "legalName"), "legalName");
    }
}
