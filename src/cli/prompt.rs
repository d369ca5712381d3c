//! Terminal front end for the registration wizard
//!
//! Every prompt turns into a [`Patch`] applied through the wizard, so the
//! terminal never edits the form directly.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::api::RegistrationBackend;
use crate::cli::helpers::{print_rejections, print_step_errors};
use crate::entities::address::ParishSelection;
use crate::entities::image::ImageError;
use crate::entities::reference::ReferenceKind;
use crate::entities::registration::{
    AttachmentField, BankField, BusinessField, ContactField, StaffField, STAFF_ROLES,
};
use crate::wizard::{Confirmation, Patch, RegistrationWizard, SubmitError, WizardStep};

/// How an interactive session ended
pub enum Outcome {
    Submitted(Confirmation),
    Cancelled,
}

enum Action {
    Next,
    Back,
    Edit,
    Submit,
    Cancel,
}

pub struct WizardPrompt<'a> {
    wizard: &'a mut RegistrationWizard,
    theme: ColorfulTheme,
}

impl<'a> WizardPrompt<'a> {
    pub fn new(wizard: &'a mut RegistrationWizard) -> Self {
        Self {
            wizard,
            theme: ColorfulTheme::default(),
        }
    }

    /// Drive the wizard until it is submitted or the user cancels
    pub fn run(&mut self, backend: &dyn RegistrationBackend) -> Result<Outcome> {
        let mut edit = true;
        loop {
            let Some(step) = self.wizard.current_step() else {
                return Ok(Outcome::Cancelled);
            };
            if edit {
                self.header(step);
                self.edit_step(step)?;
            }
            edit = true;
            self.show_visible_errors(step);

            match self.choose_action(step)? {
                Action::Next => {
                    if let Err(errors) = self.wizard.next() {
                        println!();
                        print_step_errors(step, &errors);
                        println!();
                        edit = false;
                    }
                }
                Action::Back => {
                    self.wizard.previous();
                }
                Action::Edit => {}
                Action::Submit => match self.wizard.submit(backend) {
                    Ok(confirmation) => return Ok(Outcome::Submitted(confirmation)),
                    Err(SubmitError::Invalid(failing)) => {
                        println!();
                        for (failed, errors) in &failing {
                            print_step_errors(*failed, errors);
                        }
                        if let Some((first, _)) = failing.first() {
                            self.wizard.go_back_to(*first);
                        }
                    }
                    Err(e) => {
                        println!("\n{} {}", style("✗").red(), e);
                        if e.requires_login() {
                            println!("  Run {} and try again.", style("innkeeper login").cyan());
                            return Ok(Outcome::Cancelled);
                        }
                        edit = false;
                    }
                },
                Action::Cancel => {
                    if confirm_cancel()? {
                        return Ok(Outcome::Cancelled);
                    }
                    edit = false;
                }
            }
        }
    }

    fn header(&self, step: WizardStep) {
        println!();
        println!(
            "{} Step {}/{}: {}",
            style("◆").cyan(),
            step.index() + 1,
            WizardStep::count(),
            style(step.title()).bold()
        );
        println!("  {}", style(step.description()).dim());
        println!("{}", style("─".repeat(50)).dim());
    }

    fn show_visible_errors(&self, step: WizardStep) {
        let visible = self.wizard.visible_errors();
        if !visible.is_empty() {
            print_step_errors(step, &visible);
        }
    }

    fn choose_action(&self, step: WizardStep) -> Result<Action> {
        let mut items = Vec::new();
        if step.is_last() {
            items.push(("Submit registration", Action::Submit));
        } else {
            items.push(("Next", Action::Next));
        }
        if step.index() > 0 {
            items.push(("Back", Action::Back));
        }
        items.push(("Edit this step again", Action::Edit));
        items.push(("Cancel", Action::Cancel));

        let labels: Vec<&str> = items.iter().map(|(label, _)| *label).collect();
        let choice = Select::with_theme(&self.theme)
            .with_prompt("Continue")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        Ok(items.swap_remove(choice).1)
    }

    fn edit_step(&mut self, step: WizardStep) -> Result<()> {
        match step {
            WizardStep::BusinessInfo => self.edit_business(),
            WizardStep::Address => self.edit_address(),
            WizardStep::BankDetails => self.edit_bank_accounts(),
            WizardStep::Contacts => self.edit_contacts(),
            WizardStep::Staff => self.edit_staff(),
            WizardStep::Images => self.edit_images(),
        }
    }

    fn text(&self, prompt: &str, current: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()
    }

    /// Pick from a reference list, or type an id when the list is unavailable
    fn reference(&self, prompt: &str, kind: ReferenceKind, current: &str) -> Result<String> {
        let items = self.wizard.reference().list(kind);
        if items.is_empty() {
            return self.text(&format!("{} (id)", prompt), current);
        }
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        let default = items.iter().position(|i| i.id == current).unwrap_or(0);
        let choice = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&names)
            .default(default)
            .interact()
            .into_diagnostic()?;
        Ok(items[choice].id.clone())
    }

    fn edit_business(&mut self) -> Result<()> {
        for field in BusinessField::all() {
            let current = self.wizard.form().business.get(*field).to_string();
            let value = match field {
                BusinessField::BusinessTypeId => {
                    self.reference(field.label(), ReferenceKind::BusinessTypes, &current)?
                }
                BusinessField::OwnershipTypeId => {
                    self.reference(field.label(), ReferenceKind::OwnershipTypes, &current)?
                }
                _ => self.text(field.label(), &current)?,
            };
            self.wizard.apply(Patch::Business(*field, value));
        }
        Ok(())
    }

    fn edit_address(&mut self) -> Result<()> {
        let current = self.wizard.form().address.parish_name.clone();
        let typed = self.text("Parish", &current)?;
        let mut chosen = typed.clone();

        if matches!(
            self.wizard.hierarchy().match_parish_input(&typed),
            ParishSelection::FreeText(_)
        ) {
            let suggestions: Vec<String> = self
                .wizard
                .parish_suggestions(&typed)
                .into_iter()
                .map(|p| p.name.clone())
                .collect();
            if !suggestions.is_empty() {
                let mut labels = suggestions.clone();
                labels.push(format!("Keep \"{}\" as typed", typed.trim()));
                let choice = Select::with_theme(&self.theme)
                    .with_prompt("Matching parishes")
                    .items(&labels)
                    .default(0)
                    .interact()
                    .into_diagnostic()?;
                if let Some(name) = suggestions.get(choice) {
                    chosen = name.clone();
                }
            }
        }

        match self.wizard.enter_parish(&chosen) {
            ParishSelection::Matched(chain) => println!(
                "  {} {} › {} › {} › {}",
                style("✓").green(),
                chain.region.name,
                chain.district.name,
                chain.county.name,
                chain.sub_county.name
            ),
            ParishSelection::FreeText(_) if !chosen.trim().is_empty() => println!(
                "  {} Parish not found in the address list; it will be submitted unverified",
                style("!").yellow()
            ),
            ParishSelection::FreeText(_) => {}
        }

        let current = self.wizard.form().address.physical_address.clone();
        let value = self.text("Physical address", &current)?;
        self.wizard.apply(Patch::PhysicalAddress(value));
        Ok(())
    }

    fn edit_bank_accounts(&mut self) -> Result<()> {
        if self.wizard.form().bank_accounts.is_empty() {
            self.wizard.apply(Patch::AddBankAccount);
        }
        let mut index = 0;
        while index < self.wizard.form().bank_accounts.len() {
            println!("  {}", style(format!("Bank account {}", index + 1)).bold());
            for field in BankField::all() {
                let current = self.wizard.form().bank_accounts[index].get(*field).to_string();
                let value = match field {
                    BankField::BankId => self.reference(field.label(), ReferenceKind::Banks, &current)?,
                    BankField::AccountTypeId => {
                        self.reference(field.label(), ReferenceKind::AccountTypes, &current)?
                    }
                    _ => self.text(field.label(), &current)?,
                };
                self.wizard.apply(Patch::BankAccount {
                    index,
                    field: *field,
                    value,
                });
            }
            index += 1;
        }

        loop {
            let count = self.wizard.form().bank_accounts.len();
            let choice = self.list_menu(
                "Bank accounts",
                &["Add another account", "Remove an account", "Set primary account", "Done"],
            )?;
            match choice {
                0 => {
                    self.wizard.apply(Patch::AddBankAccount);
                    let index = count;
                    for field in BankField::all() {
                        let value = match field {
                            BankField::BankId => self.reference(field.label(), ReferenceKind::Banks, "")?,
                            BankField::AccountTypeId => {
                                self.reference(field.label(), ReferenceKind::AccountTypes, "")?
                            }
                            BankField::Currency => self.text(field.label(), "UGX")?,
                            _ => self.text(field.label(), "")?,
                        };
                        self.wizard.apply(Patch::BankAccount {
                            index,
                            field: *field,
                            value,
                        });
                    }
                }
                1 => {
                    if let Some(index) = self.pick_entry("Remove which account", &self.bank_labels())? {
                        self.wizard.apply(Patch::RemoveBankAccount(index));
                    }
                }
                2 => {
                    if let Some(index) = self.pick_entry("Primary account", &self.bank_labels())? {
                        self.wizard.apply(Patch::BankPrimary { index, primary: true });
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn bank_labels(&self) -> Vec<String> {
        self.wizard
            .form()
            .bank_accounts
            .iter()
            .map(|a| {
                format!(
                    "{} {}{}",
                    a.account_name,
                    a.account_number,
                    if a.is_primary { " (primary)" } else { "" }
                )
            })
            .collect()
    }

    fn edit_contacts(&mut self) -> Result<()> {
        if self.wizard.form().contacts.is_empty() {
            self.wizard.apply(Patch::AddContact);
        }
        let mut index = 0;
        while index < self.wizard.form().contacts.len() {
            println!("  {}", style(format!("Contact {}", index + 1)).bold());
            self.edit_contact(index)?;
            index += 1;
        }

        loop {
            let choice = self.list_menu(
                "Contacts",
                &["Add another contact", "Remove a contact", "Set primary contact", "Done"],
            )?;
            match choice {
                0 => {
                    self.wizard.apply(Patch::AddContact);
                    let index = self.wizard.form().contacts.len() - 1;
                    self.edit_contact(index)?;
                }
                1 => {
                    if let Some(index) = self.pick_entry("Remove which contact", &self.contact_labels())? {
                        self.wizard.apply(Patch::RemoveContact(index));
                    }
                }
                2 => {
                    if let Some(index) = self.pick_entry("Primary contact", &self.contact_labels())? {
                        self.wizard.apply(Patch::ContactPrimary { index, primary: true });
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn edit_contact(&mut self, index: usize) -> Result<()> {
        for field in ContactField::all() {
            let current = self.wizard.form().contacts[index].get(*field).to_string();
            let value = self.text(field.label(), &current)?;
            self.wizard.apply(Patch::Contact {
                index,
                field: *field,
                value,
            });
        }
        Ok(())
    }

    fn contact_labels(&self) -> Vec<String> {
        self.wizard
            .form()
            .contacts
            .iter()
            .map(|c| format!("{}{}", c.name, if c.is_primary { " (primary)" } else { "" }))
            .collect()
    }

    fn edit_staff(&mut self) -> Result<()> {
        for (i, member) in self.wizard.form().staff.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, member.full_name, member.role);
        }
        loop {
            let choice = self.list_menu("Staff", &["Add staff member", "Remove staff member", "Done"])?;
            match choice {
                0 => {
                    self.wizard.apply(Patch::AddStaff);
                    let index = self.wizard.form().staff.len() - 1;
                    for field in StaffField::all() {
                        let value = if *field == StaffField::Role {
                            let choice = Select::with_theme(&self.theme)
                                .with_prompt(field.label())
                                .items(STAFF_ROLES)
                                .default(0)
                                .interact()
                                .into_diagnostic()?;
                            STAFF_ROLES[choice].to_string()
                        } else {
                            self.text(field.label(), "")?
                        };
                        self.wizard.apply(Patch::Staff {
                            index,
                            field: *field,
                            value,
                        });
                    }
                }
                1 => {
                    let labels: Vec<String> = self
                        .wizard
                        .form()
                        .staff
                        .iter()
                        .map(|m| format!("{} ({})", m.full_name, m.role))
                        .collect();
                    if let Some(index) = self.pick_entry("Remove which staff member", &labels)? {
                        self.wizard.apply(Patch::RemoveStaff(index));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn edit_images(&mut self) -> Result<()> {
        loop {
            self.list_images();
            let choice = self.list_menu(
                "Images",
                &["Add images", "Remove an image", "Set cover image", "Done"],
            )?;
            match choice {
                0 => {
                    let raw = self.text("Image paths (comma separated)", "")?;
                    let paths: Vec<&str> = raw
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .collect();
                    let rejections = self.wizard.add_images(&paths);
                    print_rejections(&rejections);
                }
                1 => {
                    if let Some(index) = self.pick_entry("Remove which image", &self.image_labels())? {
                        match self.wizard.remove_image(index) {
                            Ok(removed) => println!("  Removed {}", removed.file_name),
                            Err(ImageError::LastImage) => println!(
                                "  {} At least one image is required; add another before removing this one",
                                style("!").yellow()
                            ),
                            Err(e) => println!("  {} {}", style("!").yellow(), e),
                        }
                    }
                }
                2 => {
                    if let Some(index) = self.pick_entry("Cover image", &self.image_labels())? {
                        self.wizard.set_cover(index).into_diagnostic()?;
                    }
                }
                _ => break,
            }
        }

        let current = self.wizard.form().attachments.owner_nin.clone();
        let nin = self.text(AttachmentField::OwnerNin.label(), &current)?;
        self.wizard.apply(Patch::Attachment(AttachmentField::OwnerNin, nin));

        let current = self
            .wizard
            .form()
            .attachments
            .license_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let license = self.text(AttachmentField::LicenseDocument.label(), &current)?;
        self.wizard.apply(Patch::Attachment(AttachmentField::LicenseDocument, license));
        Ok(())
    }

    fn list_images(&self) {
        let images = self.wizard.images();
        if images.is_empty() {
            println!("  {}", style("No images yet").dim());
        }
        for (i, image) in images.images().iter().enumerate() {
            let marker = if images.is_cover(i) {
                style("★ cover").yellow().to_string()
            } else {
                String::new()
            };
            println!("  {}. {} {}", i + 1, style(image.preview_url()).dim(), marker);
        }
    }

    fn image_labels(&self) -> Vec<String> {
        self.wizard.images().images().iter().map(|i| i.file_name.clone()).collect()
    }

    fn list_menu(&self, prompt: &str, items: &[&str]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(items.len() - 1)
            .interact()
            .into_diagnostic()
    }

    fn pick_entry(&self, prompt: &str, labels: &[String]) -> Result<Option<usize>> {
        if labels.is_empty() {
            return Ok(None);
        }
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(labels)
            .default(0)
            .interact_opt()
            .into_diagnostic()
    }
}

/// Ask before discarding a half-filled form
pub fn confirm_cancel() -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Discard this registration?")
        .default(false)
        .interact()
        .into_diagnostic()
}
