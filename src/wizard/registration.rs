//! Registration wizard session
//!
//! Owns one form exclusively and routes every edit through the store, so
//! the rest of the wizard (validation, visibility, navigation, submission)
//! always sees a consistent snapshot.

use std::path::Path;

use crate::api::client::RegistrationBackend;
use crate::entities::address::{AddressHierarchy, AddressItem, ParishSelection};
use crate::entities::image::{FileRejection, ImageError, ImageSet, UploadedImage};
use crate::entities::reference::ReferenceData;
use crate::entities::registration::RegistrationForm;
use crate::schema::validator::{StepValidator, ValidationErrors};
use crate::wizard::confirmation::Confirmation;
use crate::wizard::draft::Draft;
use crate::wizard::step::WizardStep;
use crate::wizard::stepper::Stepper;
use crate::wizard::store::{self, Patch};
use crate::wizard::submission::{SubmissionAssembler, SubmissionPayload, SubmitError};
use crate::wizard::visibility::FieldStates;

const IMAGES_PATH: &str = "images";

pub struct RegistrationWizard {
    form: RegistrationForm,
    images: ImageSet,
    fields: FieldStates,
    stepper: Stepper,
    validator: StepValidator,
    hierarchy: AddressHierarchy,
    assembler: SubmissionAssembler,
    errors: ValidationErrors,
}

impl RegistrationWizard {
    pub fn new(validator: StepValidator, hierarchy: AddressHierarchy, assembler: SubmissionAssembler) -> Self {
        let mut wizard = Self {
            form: RegistrationForm::new(),
            images: ImageSet::new(),
            fields: FieldStates::new(),
            stepper: Stepper::new(),
            validator,
            hierarchy,
            assembler,
            errors: ValidationErrors::new(),
        };
        wizard.revalidate();
        wizard
    }

    /// Replace the form and images with a draft's. Returns rejected files.
    pub fn load_draft(&mut self, draft: &Draft) -> Vec<FileRejection> {
        let (images, rejections) = draft.image_set();
        self.form = store::normalize_phones(&draft.form);
        self.images = images;
        self.fields = FieldStates::new();
        self.stepper = Stepper::new();
        self.revalidate();
        rejections
    }

    /// Snapshot of the current form and images as a draft
    pub fn to_draft(&self) -> Draft {
        Draft {
            form: self.form.clone(),
            images: self.images.images().iter().map(|i| i.path.clone()).collect(),
            cover_image: self.images.cover_index(),
        }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn hierarchy(&self) -> &AddressHierarchy {
        &self.hierarchy
    }

    pub fn reference(&self) -> &ReferenceData {
        self.validator.reference()
    }

    pub fn current_step(&self) -> Option<WizardStep> {
        self.stepper.current()
    }

    pub fn is_submitted(&self) -> bool {
        self.stepper.is_submitted()
    }

    /// Apply an edit, mark the field touched and re-validate the current step
    pub fn apply(&mut self, patch: Patch) {
        self.form = store::apply(&self.form, &patch);
        match &patch {
            Patch::RemoveBankAccount(index) => self.fields.remove_index("bankAccounts", *index),
            Patch::RemoveContact(index) => self.fields.remove_index("contacts", *index),
            Patch::RemoveStaff(index) => self.fields.remove_index("staff", *index),
            _ => {}
        }
        if let Some(path) = patch.path() {
            self.fields.touch(path);
        }
        self.revalidate();
    }

    /// Resolve typed parish text and apply the outcome
    pub fn enter_parish(&mut self, text: &str) -> ParishSelection {
        let selection = self.hierarchy.match_parish_input(text);
        self.apply(Patch::Parish(selection.clone()));
        selection
    }

    pub fn parish_suggestions(&self, query: &str) -> Vec<&AddressItem> {
        self.hierarchy.search_parishes(query)
    }

    pub fn add_images<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<FileRejection> {
        let rejections = self.images.add_paths(paths);
        self.fields.touch(IMAGES_PATH);
        self.revalidate();
        rejections
    }

    pub fn remove_image(&mut self, index: usize) -> Result<UploadedImage, ImageError> {
        let removed = self.images.remove(index)?;
        self.fields.touch(IMAGES_PATH);
        self.revalidate();
        Ok(removed)
    }

    pub fn set_cover(&mut self, index: usize) -> Result<(), ImageError> {
        self.images.set_cover(index)
    }

    /// Every error of the current step, shown or not
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Errors for fields the user has touched or tried to submit
    pub fn visible_errors(&self) -> ValidationErrors {
        self.fields.visible(&self.errors)
    }

    /// Advance if the current step is clean; otherwise reveal its errors
    pub fn next(&mut self) -> Result<WizardStep, ValidationErrors> {
        let result = self.stepper.next(&self.validator, &self.form, &self.images);
        if let Err(errors) = &result {
            self.fields.mark_submitted(errors);
        }
        self.revalidate();
        result
    }

    pub fn previous(&mut self) -> Option<WizardStep> {
        let step = self.stepper.previous();
        self.revalidate();
        step
    }

    pub fn go_back_to(&mut self, step: WizardStep) -> bool {
        let moved = self.stepper.go_back_to(step);
        self.revalidate();
        moved
    }

    /// Press `Next` until the last step, stopping at the first step with errors
    pub fn advance_to_last(&mut self) -> Result<WizardStep, (WizardStep, ValidationErrors)> {
        loop {
            let Some(step) = self.current_step() else {
                return Ok(WizardStep::Images);
            };
            if step.is_last() {
                return Ok(step);
            }
            self.next().map_err(|errors| (step, errors))?;
        }
    }

    /// The payload a submit would send right now
    pub fn preview(&self) -> SubmissionPayload {
        self.assembler.assemble(&self.form, &self.images)
    }

    /// Submit from the last step
    pub fn submit(&mut self, backend: &dyn RegistrationBackend) -> Result<Confirmation, SubmitError> {
        let result = self
            .stepper
            .submit(&self.validator, &self.assembler, backend, &self.form, &self.images);
        match result {
            Ok(outcome) => {
                self.errors = ValidationErrors::new();
                Ok(Confirmation::new(
                    &self.form,
                    &self.images,
                    Some(outcome.reference),
                    &outcome.receipt,
                ))
            }
            Err(SubmitError::Invalid(failing)) => {
                for (_, errors) in &failing {
                    self.fields.mark_submitted(errors);
                }
                Err(SubmitError::Invalid(failing))
            }
            Err(e) => Err(e),
        }
    }

    fn revalidate(&mut self) {
        self.errors = match self.stepper.current() {
            Some(step) => self.validator.validate(step, &self.form, &self.images),
            None => ValidationErrors::new(),
        };
    }
}
