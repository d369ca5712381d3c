//! Multi-step business registration wizard

pub mod confirmation;
pub mod draft;
pub mod registration;
pub mod step;
pub mod stepper;
pub mod store;
pub mod submission;
pub mod visibility;

pub use confirmation::{Confirmation, ConfirmationError, ConfirmationRenderer};
pub use draft::{Draft, DraftError};
pub use registration::RegistrationWizard;
pub use step::WizardStep;
pub use stepper::{Stepper, StepperState};
pub use store::{apply, handle_primary_change, Patch};
pub use submission::{SubmissionAssembler, SubmissionPayload, SubmitError, SubmitOutcome};
pub use visibility::{FieldState, FieldStates};
