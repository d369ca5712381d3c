//! Stepper navigation and submission gate

use crate::api::client::RegistrationBackend;
use crate::entities::image::ImageSet;
use crate::entities::registration::RegistrationForm;
use crate::schema::validator::{StepValidator, ValidationErrors};
use crate::wizard::step::WizardStep;
use crate::wizard::submission::{SubmissionAssembler, SubmitError, SubmitOutcome};

/// Where the wizard is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    Step(WizardStep),
    Submitted,
}

/// Linear step controller.
///
/// `next` only advances when the current step validates cleanly; `previous`
/// never validates. Submission is only possible from the last step and
/// re-validates every step first.
#[derive(Debug, Clone)]
pub struct Stepper {
    state: StepperState,
}

impl Default for Stepper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stepper {
    pub fn new() -> Self {
        Self {
            state: StepperState::Step(WizardStep::BusinessInfo),
        }
    }

    pub fn state(&self) -> StepperState {
        self.state
    }

    /// Current step, `None` once submitted
    pub fn current(&self) -> Option<WizardStep> {
        match self.state {
            StepperState::Step(step) => Some(step),
            StepperState::Submitted => None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.state == StepperState::Submitted
    }

    /// Validate the current step and advance if it is clean. Once submitted
    /// there is no step to advance from, so this fails with no field errors.
    pub fn next(
        &mut self,
        validator: &StepValidator,
        form: &RegistrationForm,
        images: &ImageSet,
    ) -> Result<WizardStep, ValidationErrors> {
        let Some(step) = self.current() else {
            return Err(ValidationErrors::new());
        };
        let errors = validator.validate(step, form, images);
        if !errors.is_empty() {
            tracing::debug!(step = %step, errors = errors.len(), "next blocked");
            return Err(errors);
        }
        let target = WizardStep::from_index(step.index() + 1).unwrap_or(step);
        self.state = StepperState::Step(target);
        Ok(target)
    }

    /// Go back one step; stays put on the first step
    pub fn previous(&mut self) -> Option<WizardStep> {
        let step = self.current()?;
        let target = step
            .index()
            .checked_sub(1)
            .and_then(WizardStep::from_index)
            .unwrap_or(step);
        self.state = StepperState::Step(target);
        Some(target)
    }

    /// Jump back to an earlier (or the current) step
    pub fn go_back_to(&mut self, target: WizardStep) -> bool {
        match self.current() {
            Some(step) if target.index() <= step.index() => {
                self.state = StepperState::Step(target);
                true
            }
            _ => false,
        }
    }

    /// Validate everything, assemble, and send. Only a successful backend
    /// response moves the stepper to [`StepperState::Submitted`].
    pub fn submit(
        &mut self,
        validator: &StepValidator,
        assembler: &SubmissionAssembler,
        backend: &dyn RegistrationBackend,
        form: &RegistrationForm,
        images: &ImageSet,
    ) -> Result<SubmitOutcome, SubmitError> {
        match self.current() {
            Some(step) if step.is_last() => {}
            _ => return Err(SubmitError::NotOnLastStep),
        }

        let failing = validator.validate_all_by_step(form, images);
        if !failing.is_empty() {
            return Err(SubmitError::Invalid(failing));
        }

        let payload = assembler.assemble(form, images);
        let receipt = backend.register_business(&payload).map_err(|e| {
            tracing::warn!(reference = %payload.reference, error = %e, "registration failed");
            SubmitError::from(e)
        })?;
        tracing::info!(
            reference = %payload.reference,
            business_id = receipt.business_id.as_deref().unwrap_or("-"),
            "registration accepted"
        );
        self.state = StepperState::Submitted;
        Ok(SubmitOutcome {
            reference: payload.reference,
            receipt,
        })
    }
}
